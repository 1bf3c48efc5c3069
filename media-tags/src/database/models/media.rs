use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Row as _};
use uuid::Uuid;

use super::{BaseObject, Entity, Tag};
use crate::database::query::ID_CHUNK;
use crate::database::Database;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
	pub base: BaseObject,
	pub name: String,
	/// Referenced through `media_tags`, in the order they were attached.
	pub tags: Vec<Tag>,
	pub file_url: String,
}

impl Media {
	pub fn new(name: impl Into<String>, tags: Vec<Tag>, file_url: impl Into<String>) -> Self {
		Self {
			base: BaseObject::default(),
			name: name.into(),
			tags,
			file_url: file_url.into(),
		}
	}
}

impl<'r> FromRow<'r, SqliteRow> for Media {
	fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
		Ok(Self {
			base: BaseObject::from_row(row)?,
			name: row.try_get("name")?,
			tags: Vec::new(),
			file_url: row.try_get("file_url")?,
		})
	}
}

#[async_trait]
impl Entity for Media {
	const TABLE: &'static str = "media";

	fn base(&self) -> &BaseObject {
		&self.base
	}

	fn base_mut(&mut self) -> &mut BaseObject {
		&mut self.base
	}

	async fn insert(&mut self, connection: &mut SqliteConnection) -> sqlx::Result<()> {
		sqlx::query(
			"INSERT INTO media (id, created_at, updated_at, name, file_url) VALUES (?, ?, ?, ?, ?)",
		)
		.bind(self.base.id)
		.bind(self.base.created_at)
		.bind(self.base.updated_at)
		.bind(self.name.as_str())
		.bind(self.file_url.as_str())
		.execute(&mut *connection)
		.await?;

		for tag in &mut self.tags {
			tag.base.ensure_id();
			tag.insert_if_absent(&mut *connection).await?;
			sqlx::query("INSERT INTO media_tags (media_id, tag_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
				.bind(self.base.id)
				.bind(tag.base.id)
				.execute(&mut *connection)
				.await?;
		}

		Ok(())
	}

	async fn load_relations(database: &Database, items: &mut [Self]) -> sqlx::Result<()> {
		if items.is_empty() {
			return Ok(());
		}

		let mut tags_by_media: HashMap<Uuid, Vec<Tag>> = HashMap::new();
		// every tag of one media item comes from the same chunk, so attachment order holds
		for chunk in items.chunks(ID_CHUNK) {
			let mut builder = QueryBuilder::<Sqlite>::new(
				"SELECT media_tags.media_id, tags.id, tags.created_at, tags.updated_at, tags.name FROM media_tags INNER JOIN tags ON tags.id = media_tags.tag_id WHERE media_tags.media_id IN (",
			);
			let mut separated = builder.separated(", ");
			for item in chunk {
				separated.push_bind(item.base.id);
			}
			separated.push_unseparated(") ORDER BY media_tags.rowid");

			let rows = builder.build().fetch_all(database).await?;
			for row in &rows {
				let media_id: Uuid = row.try_get("media_id")?;
				tags_by_media
					.entry(media_id)
					.or_default()
					.push(Tag::from_row(row)?);
			}
		}
		for item in items {
			item.tags = tags_by_media.remove(&item.base.id).unwrap_or_default();
		}

		Ok(())
	}
}
