use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{FromRow, Row as _};

use super::{BaseObject, Entity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	pub base: BaseObject,
	pub name: String,
}

impl Tag {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			base: BaseObject::default(),
			name: name.into(),
		}
	}

	/// Inserts the tag unless a tag with the same ID is already stored.
	pub(super) async fn insert_if_absent(
		&self,
		connection: &mut SqliteConnection,
	) -> sqlx::Result<()> {
		sqlx::query(
			"INSERT INTO tags (id, created_at, updated_at, name) VALUES (?, ?, ?, ?) ON CONFLICT (id) DO NOTHING",
		)
		.bind(self.base.id)
		.bind(self.base.created_at)
		.bind(self.base.updated_at)
		.bind(self.name.as_str())
		.execute(connection)
		.await
		.map(drop)
	}
}

impl<'r> FromRow<'r, SqliteRow> for Tag {
	fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
		Ok(Self {
			base: BaseObject::from_row(row)?,
			name: row.try_get("name")?,
		})
	}
}

#[async_trait]
impl Entity for Tag {
	const TABLE: &'static str = "tags";

	fn base(&self) -> &BaseObject {
		&self.base
	}

	fn base_mut(&mut self) -> &mut BaseObject {
		&mut self.base
	}

	async fn insert(&mut self, connection: &mut SqliteConnection) -> sqlx::Result<()> {
		sqlx::query("INSERT INTO tags (id, created_at, updated_at, name) VALUES (?, ?, ?, ?)")
			.bind(self.base.id)
			.bind(self.base.created_at)
			.bind(self.base.updated_at)
			.bind(self.name.as_str())
			.execute(connection)
			.await
			.map(drop)
	}
}
