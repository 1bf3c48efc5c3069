use std::net::SocketAddr;

use axum::Router;

use super::Error;

pub async fn run(app: Router, addr: &SocketAddr) -> Result<(), Error> {
	axum::Server::bind(addr)
		.serve(app.into_make_service())
		.await
		.map_err(Error::RunServer)
}
