use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::extractor::Ytdlp;
use crate::formats::{build_catalog, FormatOption};
use crate::{resolver, Error, Result};

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
  url: Option<String>,
}

#[derive(Debug, Serialize)]
struct InfoResponse {
  success: bool,
  title: Option<String>,
  thumbnail: Option<String>,
  duration: Option<f64>,
  views: Option<u64>,
  channel: Option<String>,
  #[serde(rename = "videoId")]
  video_id: Option<String>,
  formats: Vec<FormatOption>,
  is_live: bool,
}

pub async fn video_info(
  Json(body): Json<InfoRequest>,
) -> Result<impl IntoResponse, Error> {
  let url = body
    .url
    .as_deref()
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingParameter("url"))?;

  let metadata = resolver::fetch_metadata(&Ytdlp, url).await?;
  let formats = build_catalog(&metadata.formats);

  Ok(Json(InfoResponse {
    success: true,
    title: metadata.title,
    thumbnail: metadata.thumbnail,
    duration: metadata.duration,
    views: metadata.view_count,
    channel: metadata.uploader,
    video_id: metadata.id,
    formats,
    is_live: metadata.is_live.unwrap_or(false),
  }))
}
