use std::sync::Arc;

use axum::{Extension, Router};

use crate::config::Config;
use crate::database::models::{Media, Tag};
use crate::database::Database;
use crate::services::Service;

mod media;
mod tags;
#[cfg(test)]
mod test;

macro_rules! merge {
	($app:ident, $name:ident) => {
		$app = $app.merge($name::configure());
	};
	($app:ident; $($name:ident),+) => {
		$(merge!($app, $name));+
	};
}

pub fn configure() -> Router {
	let mut app = Router::new();

	merge!(app; media, tags);

	app.fallback(axum::handler::Handler::into_service(
		crate::error::default_handler,
	))
}

/// The routes together with the services and configuration their handlers extract.
pub fn app(database: Database, config: Arc<Config>) -> Router {
	configure()
		.layer(Extension(Service::<Tag>::new(database.clone())))
		.layer(Extension(Service::<Media>::new(database)))
		.layer(Extension(config))
}
