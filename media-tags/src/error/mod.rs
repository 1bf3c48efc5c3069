use std::borrow::Cow;

use uuid::Uuid;

mod response;
pub use response::{default_handler, error_response};

fn join_ids(ids: &[Uuid]) -> String {
	ids.iter()
		.map(Uuid::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}

#[derive(Debug, thiserror::Error)]
#[error("SQL error: {0}")]
pub struct Sqlx(#[source] pub sqlx::Error);

#[derive(Debug, thiserror::Error)]
#[error("record with ID {{{0}}} not found")]
pub struct RecordNotFound(pub Uuid);

/// Some, but not necessarily all, of a batch of requested records are missing.
#[derive(Debug, thiserror::Error)]
#[error("records with IDs {{{}}} not found", join_ids(.0))]
pub struct RecordsNotFound(pub Vec<Uuid>);

#[derive(Debug, thiserror::Error)]
#[error("tags with the following IDs could not be found: {}", join_ids(.0))]
pub struct InvalidTags(pub Vec<Uuid>);

#[derive(Debug, thiserror::Error)]
#[error("invalid value supplied {{{0}}}, expected a UUID")]
pub struct InvalidUuid(pub String);

#[derive(Debug, thiserror::Error)]
#[error("invalid file type for uploaded file, expected {0}")]
pub struct InvalidFileType(pub &'static str);

#[derive(Debug, thiserror::Error)]
#[error("required value {0} missing")]
pub struct RequiredValueMissing(pub &'static str);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Multipart(#[source] pub axum::extract::multipart::MultipartError);

#[derive(Debug, thiserror::Error)]
#[error("IO error while {0}: {1}")]
pub struct Io(pub &'static str, #[source] pub std::io::Error);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BadRequest(pub Cow<'static, str>);

#[derive(Debug, thiserror::Error)]
#[error("no route for {0}")]
pub struct RouteNotFound(pub String);

macro_rules! impl_response {
	($struct_name:ident, $status:ident) => {
		impl axum::response::IntoResponse for $struct_name {
			fn into_response(self) -> axum::response::Response {
				crate::error::error_response(&self, http::StatusCode::$status)
			}
		}
	};
}

impl_response!(Sqlx, INTERNAL_SERVER_ERROR);
impl_response!(RecordNotFound, NOT_FOUND);
impl_response!(RecordsNotFound, NOT_FOUND);
impl_response!(InvalidTags, BAD_REQUEST);
impl_response!(InvalidUuid, BAD_REQUEST);
impl_response!(InvalidFileType, BAD_REQUEST);
impl_response!(RequiredValueMissing, BAD_REQUEST);
impl_response!(Multipart, BAD_REQUEST);
impl_response!(Io, INTERNAL_SERVER_ERROR);
impl_response!(BadRequest, BAD_REQUEST);
impl_response!(RouteNotFound, NOT_FOUND);
