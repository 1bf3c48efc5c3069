use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Result;

pub mod models;
pub mod query;

pub type Database = SqlitePool;

pub async fn connect(conn_str: &str, max_connections: u32) -> Result<Database> {
	let options = SqliteConnectOptions::from_str(conn_str)?.create_if_missing(true);
	let conn = SqlitePoolOptions::new()
		.max_connections(max_connections)
		.connect_with(options)
		.await?;
	sqlx::migrate!().run(&conn).await?;
	Ok(conn)
}

/// A migrated database that lives as long as its single pooled connection.
#[cfg(test)]
pub async fn connect_in_memory() -> Database {
	let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("valid options");
	let conn = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await
		.expect("opening in-memory database");
	sqlx::migrate!()
		.run(&conn)
		.await
		.expect("migrating in-memory database");
	conn
}
