use std::net::SocketAddr;

use axum::{
  response::IntoResponse,
  routing::{get, post},
  Router,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod download;
mod error;
mod extractor;
mod formats;
mod info;
mod proxy;
mod resolver;
mod util;

pub use error::{Error, Result};

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let app = Router::new()
    .route("/health", get(health))
    .route("/video-info", post(info::video_info))
    .route("/download", post(download::download))
    .route("/proxy-download", get(proxy::proxy_download))
    // the browser frontend lives on another origin
    .layer(CorsLayer::permissive());

  let addr = SocketAddr::from(([0, 0, 0, 0], config::listen_port()));
  tracing::info!("listening on {addr}");

  axum::Server::bind(&addr)
    .serve(app.into_make_service())
    .await
    .expect("failed to start server");

  Ok(())
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}
