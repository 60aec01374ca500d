use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::extractor::Ytdlp;
use crate::{resolver, Error, Result};

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
  url: Option<String>,
  quality: Option<String>,
  format: Option<String>,
}

#[derive(Debug, Serialize)]
struct DownloadResponse {
  success: bool,
  #[serde(rename = "downloadUrl")]
  download_url: String,
  filename: String,
  title: String,
  message: &'static str,
}

pub async fn download(
  Json(body): Json<DownloadRequest>,
) -> Result<impl IntoResponse, Error> {
  let url = body
    .url
    .as_deref()
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingParameter("url"))?;
  let quality = body
    .quality
    .as_deref()
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingParameter("quality"))?;
  let container = body
    .format
    .as_deref()
    .filter(|s| !s.is_empty())
    .unwrap_or("mp4");

  let resolved = resolver::resolve(&Ytdlp, url, quality, container).await?;
  let download_url = proxy_url(&resolved.direct_url, &resolved.filename);

  Ok(Json(DownloadResponse {
    success: true,
    download_url,
    filename: resolved.filename,
    title: resolved.title,
    message: "Download URL generated successfully",
  }))
}

/// Route clients through our own proxy endpoint, never the raw upstream
/// URL; the signed URL and the filename travel as query parameters.
fn proxy_url(direct_url: &str, filename: &str) -> String {
  format!(
    "/proxy-download?url={}&filename={}",
    urlencoding::encode(direct_url),
    urlencoding::encode(filename)
  )
}
