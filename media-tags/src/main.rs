#![deny(
	absolute_paths_not_starting_with_crate,
	keyword_idents,
	macro_use_extern_crate,
	meta_variable_misuse,
	missing_abi,
	non_ascii_idents,
	nonstandard_style,
	noop_method_call,
	rust_2018_idioms
)]
#![forbid(unsafe_code)]

use std::sync::Arc;

mod config;
mod database;
mod error;
mod helpers;
mod routes;
mod server;
mod services;
mod timestamp;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("reading configuration: {0}")]
	Config(#[from] figment::Error),
	#[error("connecting to database: {0}")]
	ConnectDb(#[from] sqlx::Error),
	#[error("running server: {0}")]
	RunServer(#[from] hyper::Error),
	#[error("creating file storage directory due to it not existing at startup: {0}")]
	CreateFileStorage(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let config = config::config()?;

	if !config.file_storage.exists() {
		std::fs::create_dir_all(&config.file_storage).map_err(Error::CreateFileStorage)?;
	}

	init_logging(config.log_level);

	let database = database::connect(&config.database_url, config.max_connections).await?;
	let address = config.address;

	let app = routes::app(database, Arc::new(config))
		.layer(tower_http::trace::TraceLayer::new_for_http());

	tracing::info!(%address, "listening");
	server::run(app, &address).await
}

fn init_logging(log_level: config::LogLevel) {
	use tracing_subscriber::filter::FilterFn;
	use tracing_subscriber::layer::{Layer, SubscriberExt};
	use tracing_subscriber::util::SubscriberInitExt;

	let filter = FilterFn::new(move |metadata| {
		let internal = metadata.target().split("::").next() == Some(env!("CARGO_CRATE_NAME"));
		let required_level = if internal {
			log_level.internal
		} else {
			log_level.external
		};
		// a `Level` less than or equal to a `LevelFilter` is enabled
		metadata.level() <= &required_level
	});

	let layer = tracing_subscriber::fmt::layer()
		.with_file(true)
		.with_line_number(true)
		.with_writer(std::io::stderr);

	tracing_subscriber::registry()
		.with(layer.with_filter(filter))
		.init();
}
