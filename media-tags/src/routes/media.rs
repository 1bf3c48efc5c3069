use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::response::{ErrorResponse, IntoResponse};
use axum::{extract, Json, Router};
use http::StatusCode;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{BaseObject, Media, Tag};
use crate::database::query::Filter;
use crate::error;
use crate::helpers::parse_id;
use crate::helpers::upload::read_media_form;
use crate::services::media::ByTagName;
use crate::services::{self, Service};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
	pub id: Uuid,
	pub name: String,
	pub tags: Vec<String>,
	pub file_url: String,
}

impl From<&Media> for MediaResponse {
	fn from(media: &Media) -> Self {
		Self {
			id: media.base.id,
			name: media.name.clone(),
			tags: media.tags.iter().map(|tag| tag.name.clone()).collect(),
			file_url: media.file_url.clone(),
		}
	}
}

#[derive(Debug, serde::Deserialize)]
pub struct ListQuery {
	tag: Option<String>,
}

async fn list_handler(
	query: Result<extract::Query<ListQuery>, QueryRejection>,
	extract::Extension(media): extract::Extension<Service<Media>>,
) -> Result<Json<Vec<MediaResponse>>, ErrorResponse> {
	let extract::Query(query) =
		query.map_err(|rejection| error::BadRequest(rejection.to_string().into()))?;

	let items = match query.tag.filter(|tag| !tag.is_empty()) {
		Some(tag) => {
			let filter = ByTagName::new(tag);
			let filters: [&dyn Filter<Media>; 1] = [&filter];
			media.get(&filters).await?
		}
		None => media.get(&[]).await?,
	};

	Ok(Json(items.iter().map(MediaResponse::from).collect()))
}

async fn get_handler(
	extract::Path(id): extract::Path<String>,
	extract::Extension(media): extract::Extension<Service<Media>>,
) -> Result<Json<MediaResponse>, ErrorResponse> {
	let id = parse_id(&id)?;
	let item = media.get_with_id(id).await?;
	Ok(Json(MediaResponse::from(&item)))
}

async fn post_handler(
	multipart: Result<extract::Multipart, MultipartRejection>,
	extract::Extension(media): extract::Extension<Service<Media>>,
	extract::Extension(tags): extract::Extension<Service<Tag>>,
	extract::Extension(config): extract::Extension<Arc<Config>>,
) -> Result<impl IntoResponse, ErrorResponse> {
	let mut multipart = multipart.map_err(|rejection| {
		tracing::debug!(%rejection, "media upload is not multipart");
		error::RequiredValueMissing("file")
	})?;

	let form = read_media_form(&mut multipart, &config.file_storage).await?;
	let file = form.file.ok_or(error::RequiredValueMissing("file"))?;

	let tags = tags
		.get_with_ids(&form.tags)
		.await
		.map_err(|failure| match failure {
			services::Error::MissingIds(error::RecordsNotFound(ids)) => {
				ErrorResponse::from(error::InvalidTags(ids))
			}
			other => ErrorResponse::from(other),
		})?;

	let id = Uuid::new_v4();
	let file_name = format!("{id}.{}", file.extension);
	let path = config.file_storage.join(&file_name);
	let size = file.size;
	file.persist(&path)?;

	let mut item = Media {
		base: BaseObject::with_id(id),
		name: form.name,
		tags,
		file_url: config.file_url(&file_name),
	};
	if let Err(failure) = media.create(std::slice::from_mut(&mut item)).await {
		if let Err(remove_error) = tokio::fs::remove_file(&path).await {
			tracing::warn!(path = %path.display(), %remove_error, "failed to remove orphaned upload");
		}
		return Err(failure.into());
	}
	tracing::info!(%id, name = %item.name, size, "created media");

	Ok((StatusCode::CREATED, Json(MediaResponse::from(&item))))
}

pub fn configure() -> Router {
	let mut app = Router::new();
	app = app.route(
		"/media",
		axum::routing::get(list_handler).post(post_handler),
	);
	app = app.route("/media/:id", axum::routing::get(get_handler));
	app
}
