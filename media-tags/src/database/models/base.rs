use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row as _};
use uuid::Uuid;

use crate::timestamp::{self, Timestamp};

/// Fields shared by every stored entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseObject {
	pub id: Uuid,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

impl BaseObject {
	pub fn with_id(id: Uuid) -> Self {
		let now = timestamp::now();
		Self {
			id,
			created_at: now,
			updated_at: now,
		}
	}

	/// Assigns a fresh ID if none is set yet.
	pub fn ensure_id(&mut self) {
		if self.id.is_nil() {
			self.id = Uuid::new_v4();
		}
	}

	/// Readies the object for its first insert.
	pub fn prepare(&mut self, now: Timestamp) {
		self.ensure_id();
		self.created_at = now;
		self.updated_at = now;
	}
}

impl Default for BaseObject {
	fn default() -> Self {
		Self::with_id(Uuid::nil())
	}
}

impl<'r> FromRow<'r, SqliteRow> for BaseObject {
	fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
		Ok(Self {
			id: row.try_get("id")?,
			created_at: row.try_get("created_at")?,
			updated_at: row.try_get("updated_at")?,
		})
	}
}
