use std::borrow::Cow;
use std::path::Path;

use axum::extract::multipart::{Field, Multipart};
use axum::response::ErrorResponse;
use mime::Mime;
use tempfile::TempPath;
use uuid::Uuid;

use crate::error;

/// The fields of a media upload, which may arrive in any order.
#[derive(Debug, Default)]
pub struct MediaForm {
	pub name: String,
	pub tags: Vec<Uuid>,
	pub file: Option<StagedFile>,
}

/// An uploaded image written to a temporary file next to its final location.
///
/// The temporary file is removed when this is dropped without being persisted.
#[derive(Debug)]
pub struct StagedFile {
	temp_path: TempPath,
	/// Derived from the image subtype, e.g. `png`.
	pub extension: &'static str,
	pub size: usize,
}

impl StagedFile {
	pub fn persist(self, path: &Path) -> Result<(), error::Io> {
		self
			.temp_path
			.persist(path)
			.map_err(|error| error::Io("moving uploaded file into place", error.error))
	}
}

pub async fn read_media_form(
	multipart: &mut Multipart,
	storage: &Path,
) -> Result<MediaForm, ErrorResponse> {
	let mut form = MediaForm::default();

	while let Some(field) = multipart.next_field().await.map_err(error::Multipart)? {
		let name = field.name().map(str::to_owned);
		match name.as_deref() {
			Some("file") => {
				if form.file.is_some() {
					return Err(error::BadRequest(Cow::Borrowed("duplicate file field")).into());
				}
				form.file = Some(stage_image(field, storage).await?);
			}
			Some("name") => {
				form.name = field.text().await.map_err(error::Multipart)?;
			}
			Some("tags" | "tags[]") => {
				let text = field.text().await.map_err(error::Multipart)?;
				for raw in text.split(',').filter(|raw| !raw.trim().is_empty()) {
					form.tags.push(super::parse_id(raw)?);
				}
			}
			_ => tracing::debug!(field = ?name, "ignoring unknown multipart field"),
		}
	}

	Ok(form)
}

async fn stage_image(mut field: Field<'_>, storage: &Path) -> Result<StagedFile, ErrorResponse> {
	use futures::TryStreamExt as _;
	use tokio::io::AsyncWriteExt as _;

	let content_type = field
		.content_type()
		.and_then(|content_type| content_type.parse::<Mime>().ok());
	let extension = match content_type {
		Some(content_type) if content_type.type_() == mime::IMAGE => image_extension(&content_type),
		_ => return Err(error::InvalidFileType("image").into()),
	};

	let (file, temp_path) = tempfile::Builder::new()
		.prefix(".upload-")
		.tempfile_in(storage)
		.map_err(|err| error::Io("creating temporary upload file", err))?
		.into_parts();
	let mut file = tokio::fs::File::from_std(file);

	let mut size = 0;
	while let Some(chunk) = field.try_next().await.map_err(error::Multipart)? {
		size += chunk.len();
		file
			.write_all(&chunk)
			.await
			.map_err(|err| error::Io("writing temporary upload file", err))?;
	}
	file
		.flush()
		.await
		.map_err(|err| error::Io("writing temporary upload file", err))?;

	Ok(StagedFile {
		temp_path,
		extension,
		size,
	})
}

/// The file extension stored images get. Structured suffixes such as `+xml` are ignored and unknown subtypes become `bin`.
fn image_extension(content_type: &Mime) -> &'static str {
	match content_type.subtype().as_str().to_ascii_lowercase().as_str() {
		"png" => "png",
		"jpeg" | "jpg" | "pjpeg" => "jpg",
		"gif" => "gif",
		"webp" => "webp",
		"avif" => "avif",
		"bmp" => "bmp",
		"tiff" => "tiff",
		"svg" => "svg",
		"x-icon" | "vnd.microsoft.icon" => "ico",
		_ => "bin",
	}
}
