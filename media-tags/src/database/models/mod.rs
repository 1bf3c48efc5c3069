use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::FromRow;
use uuid::Uuid;

use super::Database;

pub mod base;
pub mod media;
pub mod tag;

pub use base::BaseObject;
pub use media::Media;
pub use tag::Tag;

/// A record stored in its own table, keyed by the `id` of its `BaseObject`.
#[async_trait]
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
	const TABLE: &'static str;

	fn base(&self) -> &BaseObject;
	fn base_mut(&mut self) -> &mut BaseObject;

	#[inline]
	fn id(&self) -> Uuid {
		self.base().id
	}

	/// Writes the row (and anything it owns) using an already prepared `BaseObject`.
	async fn insert(&mut self, connection: &mut SqliteConnection) -> sqlx::Result<()>;

	/// Fills in data that lives outside the entity's own table.
	async fn load_relations(_database: &Database, _items: &mut [Self]) -> sqlx::Result<()> {
		Ok(())
	}
}
