use axum::extract::rejection::JsonRejection;
use axum::response::{ErrorResponse, IntoResponse};
use axum::{extract, Json, Router};
use http::StatusCode;
use uuid::Uuid;

use crate::database::models::Tag;
use crate::error;
use crate::helpers::parse_id;
use crate::services::Service;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TagResponse {
	pub id: Uuid,
	pub name: String,
}

impl From<&Tag> for TagResponse {
	fn from(tag: &Tag) -> Self {
		Self {
			id: tag.base.id,
			name: tag.name.clone(),
		}
	}
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateRequest {
	#[serde(default)]
	name: String,
}

async fn list_handler(
	extract::Extension(tags): extract::Extension<Service<Tag>>,
) -> Result<Json<Vec<TagResponse>>, ErrorResponse> {
	let tags = tags.get(&[]).await?;
	Ok(Json(tags.iter().map(TagResponse::from).collect()))
}

async fn get_handler(
	extract::Path(id): extract::Path<String>,
	extract::Extension(tags): extract::Extension<Service<Tag>>,
) -> Result<Json<TagResponse>, ErrorResponse> {
	let id = parse_id(&id)?;
	let tag = tags.get_with_id(id).await?;
	Ok(Json(TagResponse::from(&tag)))
}

async fn post_handler(
	request: Result<Json<CreateRequest>, JsonRejection>,
	extract::Extension(tags): extract::Extension<Service<Tag>>,
) -> Result<impl IntoResponse, ErrorResponse> {
	let Json(request) =
		request.map_err(|rejection| error::BadRequest(rejection.to_string().into()))?;
	let name = request.name.trim();
	if name.is_empty() {
		return Err(error::RequiredValueMissing("name").into());
	}

	let mut tag = Tag::new(name);
	tags.create(std::slice::from_mut(&mut tag)).await?;
	tracing::info!(id = %tag.base.id, name = %tag.name, "created tag");

	Ok((StatusCode::CREATED, Json(TagResponse::from(&tag))))
}

async fn delete_handler(
	extract::Path(id): extract::Path<String>,
	extract::Extension(tags): extract::Extension<Service<Tag>>,
) -> Result<StatusCode, ErrorResponse> {
	let id = parse_id(&id)?;
	tags.delete(id).await?;
	tracing::info!(%id, "deleted tag");
	Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router {
	let mut app = Router::new();
	app = app.route(
		"/tags",
		axum::routing::get(list_handler).post(post_handler),
	);
	app = app.route(
		"/tags/:id",
		axum::routing::get(get_handler).delete(delete_handler),
	);
	app
}
