use axum::{
  response::{IntoResponse, Response},
  Json,
};
use reqwest::StatusCode;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingParameter(&'static str),

  // one strategy attempt failed inside the extraction engine
  #[error("extraction failed: {0}")]
  Extraction(String),

  #[error("{0}")]
  ResolutionFailed(String),

  #[error("upstream fetch failed: {0}")]
  UpstreamFetch(String),

  #[error(transparent)]
  Request(#[from] reqwest::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Http(#[from] http::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::MissingParameter(_) => StatusCode::BAD_REQUEST,
      Error::UpstreamFetch(_) | Error::Request(_) => StatusCode::BAD_GATEWAY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status_code();
    let body = Json(json!({ "detail": self.to_string() }));
    (status, body).into_response()
  }
}
