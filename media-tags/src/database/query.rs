//! Composable `SELECT` descriptions over a single entity table.
//!
//! Filters append joins, conditions, and grouping to a [`Select`], which is rendered into a parameterized query only when it is executed. Every value is bound; only table and column names are interpolated.

use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{FromRow, QueryBuilder};
use uuid::Uuid;

use super::Database;

/// How many IDs are bound in one `IN (...)` list. SQLite rejects statements with more than 32766 parameters.
pub const ID_CHUNK: usize = 30_000;

/// A restriction applied to a query for entities of type `T` before it runs.
pub trait Filter<T>: Send + Sync {
	fn apply(&self, select: &mut Select);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	Text(String),
	Id(Uuid),
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<Uuid> for Value {
	fn from(id: Uuid) -> Self {
		Self::Id(id)
	}
}

#[derive(Debug)]
enum Condition {
	Equals(String, Value),
	In(String, Vec<Uuid>),
}

#[derive(Debug)]
pub struct Select {
	table: &'static str,
	joins: Vec<String>,
	conditions: Vec<Condition>,
	group_by_id: bool,
	aliases: usize,
}

impl Select {
	pub fn new(table: &'static str) -> Self {
		Self {
			table,
			joins: Vec::new(),
			conditions: Vec::new(),
			group_by_id: false,
			aliases: 0,
		}
	}

	#[inline]
	pub fn table(&self) -> &'static str {
		self.table
	}

	/// Returns a table alias that no other filter on this query uses.
	pub fn alias(&mut self, table: &str) -> String {
		self.aliases += 1;
		format!("{table}_{}", self.aliases)
	}

	pub fn join(&mut self, clause: impl Into<String>) -> &mut Self {
		self.joins.push(clause.into());
		self
	}

	/// Requires `column = value`. Conditions are combined with `AND`.
	pub fn filter(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self
			.conditions
			.push(Condition::Equals(column.into(), value.into()));
		self
	}

	pub fn filter_ids(&mut self, ids: &[Uuid]) -> &mut Self {
		let column = format!("{}.id", self.table);
		self.conditions.push(Condition::In(column, ids.to_vec()));
		self
	}

	/// Collapses rows that joins duplicated, leaving one per entity.
	pub fn group_by_id(&mut self) -> &mut Self {
		self.group_by_id = true;
		self
	}

	fn query_builder(&self) -> QueryBuilder<'static, Sqlite> {
		let table = self.table;
		let mut builder = QueryBuilder::new(format!("SELECT {table}.* FROM {table}"));

		for join in &self.joins {
			builder.push(' ').push(join);
		}

		for (index, condition) in self.conditions.iter().enumerate() {
			builder.push(if index == 0 { " WHERE " } else { " AND " });
			match condition {
				Condition::Equals(column, Value::Text(text)) => {
					builder.push(column).push(" = ").push_bind(text.clone());
				}
				Condition::Equals(column, Value::Id(id)) => {
					builder.push(column).push(" = ").push_bind(*id);
				}
				Condition::In(column, ids) => {
					builder.push(column).push(" IN (");
					let mut separated = builder.separated(", ");
					for id in ids {
						separated.push_bind(*id);
					}
					separated.push_unseparated(")");
				}
			}
		}

		if self.group_by_id {
			builder.push(format_args!(" GROUP BY {table}.id"));
		}
		builder.push(format_args!(" ORDER BY {table}.rowid"));

		builder
	}

	pub async fn fetch_all<T>(&self, database: &Database) -> sqlx::Result<Vec<T>>
	where
		T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
	{
		let mut builder = self.query_builder();
		builder.build_query_as::<T>().fetch_all(database).await
	}

	pub async fn fetch_optional<T>(&self, database: &Database) -> sqlx::Result<Option<T>>
	where
		T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
	{
		let mut builder = self.query_builder();
		builder.build_query_as::<T>().fetch_optional(database).await
	}

	#[cfg(test)]
	pub fn sql(&self) -> String {
		use sqlx::Execute as _;

		let mut builder = self.query_builder();
		let sql = builder.build().sql().to_owned();
		sql
	}
}
