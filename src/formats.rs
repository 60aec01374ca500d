use std::collections::HashSet;

use serde::Serialize;

use crate::extractor::RawFormat;

pub const AUDIO_ONLY_FORMAT_ID: &str = "bestaudio";

/// Display-ready catalog entry served to clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormatOption {
  pub format_id: String,
  pub ext: String,
  pub resolution: String,
  pub filesize: Option<u64>,
  pub has_video: bool,
  pub has_audio: bool,
}

/// Collapse the engine's raw format list into one entry per distinct
/// vertical resolution, preserving the engine's ordering (first-seen
/// wins), with a single audio-only entry appended last.
pub fn build_catalog(raw: &[RawFormat]) -> Vec<FormatOption> {
  let mut seen = HashSet::new();
  let mut catalog = Vec::new();

  for format in raw {
    if !format.has_video() {
      continue;
    }
    let Some(height) = format.height else {
      continue;
    };
    let resolution = format!("{height}p");
    if !seen.insert(height) {
      continue;
    }

    catalog.push(FormatOption {
      format_id: format.format_id.clone(),
      ext: format.ext.clone().unwrap_or_else(|| "mp4".to_string()),
      resolution,
      filesize: format.size(),
      has_video: true,
      has_audio: format.has_audio(),
    });
  }

  catalog.push(FormatOption {
    format_id: AUDIO_ONLY_FORMAT_ID.to_string(),
    ext: "mp3".to_string(),
    resolution: "audio".to_string(),
    filesize: None,
    has_video: false,
    has_audio: true,
  });

  catalog
}
