use std::borrow::Cow;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

#[derive(serde::Serialize)]
struct Body<'a> {
	error: Cow<'a, str>,
}

/// Renders `{"error": ...}`. Server errors are logged and replaced with a generic message.
pub fn error_response(error: &dyn std::error::Error, status_code: StatusCode) -> Response {
	let message = if status_code.is_server_error() {
		tracing::error!(%error, status = status_code.as_u16(), "request failed");
		Cow::Borrowed("internal server error")
	} else {
		tracing::debug!(%error, status = status_code.as_u16(), "request rejected");
		Cow::Owned(error.to_string())
	};

	IntoResponse::into_response((status_code, Json(Body { error: message })))
}

pub async fn default_handler(uri: http::Uri) -> Response {
	error_response(
		&super::RouteNotFound(uri.path().to_owned()),
		StatusCode::NOT_FOUND,
	)
}
