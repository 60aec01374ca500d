use std::time::Duration;

use axum::{
  body::StreamBody,
  extract::Query,
  http::{header, HeaderMap, HeaderValue, Response},
  response::IntoResponse,
};
use futures::TryStreamExt;
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{BROWSER_USER_AGENT, ORIGIN_REFERER};
use crate::{Error, Result};

// No overall request deadline: media bodies are long-lived and may be
// gigabytes. Only the connect phase is bounded.
static PROXY_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
  reqwest::Client::builder()
    .connect_timeout(Duration::from_secs(10))
    .build()
    .expect("failed to build proxy HTTP client")
});

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
  url: Option<String>,
  filename: Option<String>,
}

/// Relay the resolved media URL back to the client chunk by chunk,
/// forwarding range semantics and forcing a save-as download. Dropping
/// the response body (client disconnect) drops the reqwest response and
/// aborts the upstream connection with it.
pub async fn proxy_download(
  Query(params): Query<ProxyParams>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
  let url = params
    .url
    .as_deref()
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingParameter("url"))?;
  let filename = params
    .filename
    .as_deref()
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingParameter("filename"))?;

  let mut upstream_req = PROXY_CLIENT
    .get(url)
    .header(header::USER_AGENT, BROWSER_USER_AGENT)
    .header(header::REFERER, ORIGIN_REFERER);

  // forward Range verbatim so seeking and resume keep working
  if let Some(range) = headers.get(header::RANGE) {
    upstream_req = upstream_req.header(header::RANGE, range.clone());
  }

  let upstream = upstream_req
    .send()
    .await
    .map_err(|e| Error::UpstreamFetch(e.to_string()))?;

  let status = upstream.status();
  if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
    // dropping the response closes the upstream connection
    drop(upstream);
    return Err(Error::UpstreamFetch(format!("status {status}")));
  }

  let mut builder = Response::builder().status(status);

  let content_type = upstream
    .headers()
    .get(header::CONTENT_TYPE)
    .cloned()
    .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
  builder = builder.header(header::CONTENT_TYPE, content_type);

  for name in [
    header::CONTENT_LENGTH,
    header::ACCEPT_RANGES,
    header::CONTENT_RANGE,
  ] {
    if let Some(value) = upstream.headers().get(&name) {
      builder = builder.header(name, value.clone());
    }
  }

  let resp = builder
    .header(
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"{}\"", filename.replace('"', "")),
    )
    // resolved media URLs are time-limited and signed
    .header(header::CACHE_CONTROL, "no-store")
    .body(StreamBody::new(upstream.bytes_stream().inspect_err(
      |e| tracing::warn!("upstream stream interrupted: {e}"),
    )))?;

  Ok(resp)
}
