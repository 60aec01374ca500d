use tracing::{info, warn};

use crate::extractor::{Extractor, PlayerClient, RawFormat, VideoMetadata};
use crate::util::sanitize_title;
use crate::{Error, Result};

/// Client identities tried strictly in order; the first engine-level
/// success stops the chain.
pub const STRATEGY_ORDER: [PlayerClient; 3] =
  [PlayerClient::Web, PlayerClient::Android, PlayerClient::Ios];

const DEFAULT_TITLE: &str = "video";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
  pub direct_url: String,
  pub filename: String,
  pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selected<'a> {
  pub url: &'a str,
  pub ext: Option<&'a str>,
}

/// Fold over the ordered client identities: per-strategy failures are
/// swallowed and logged, the last one is surfaced if every strategy fails.
pub async fn fetch_metadata(
  extractor: &dyn Extractor,
  page_url: &str,
) -> Result<VideoMetadata> {
  let mut last_err: Option<Error> = None;

  for client in STRATEGY_ORDER {
    match extractor.extract(page_url, client).await {
      Ok(metadata) => {
        info!("extracted {page_url} with {client} client");
        return Ok(metadata);
      }
      Err(err) => {
        warn!("{client} client failed for {page_url}: {err}");
        last_err = Some(err);
      }
    }
  }

  let detail = match last_err {
    Some(err) => err.to_string(),
    None => "no extraction strategies configured".to_string(),
  };
  Err(Error::ResolutionFailed(detail))
}

pub async fn resolve(
  extractor: &dyn Extractor,
  page_url: &str,
  quality: &str,
  container: &str,
) -> Result<ResolvedMedia> {
  let metadata = fetch_metadata(extractor, page_url).await?;

  let Some(pick) = select_format(&metadata, quality, container) else {
    // A selection miss after a structurally successful extraction is
    // terminal: other client identities are unlikely to expose different
    // formats, and retrying would mask a selection bug.
    warn!(
      "extraction of {page_url} succeeded but no format matched \
       quality={quality} container={container}"
    );
    return Err(Error::ResolutionFailed(
      "no downloadable format matched the requested quality".to_string(),
    ));
  };

  let title = metadata
    .title
    .clone()
    .unwrap_or_else(|| DEFAULT_TITLE.to_string());

  let ext = if container == "mp3" {
    "mp3"
  } else {
    pick.ext.unwrap_or("mp4")
  };

  let mut stem = sanitize_title(&title);
  if stem.is_empty() {
    stem = DEFAULT_TITLE.to_string();
  }

  Ok(ResolvedMedia {
    direct_url: pick.url.to_string(),
    filename: format!("{stem}.{ext}"),
    title,
  })
}

pub fn quality_ceiling(quality: &str) -> Option<u32> {
  match quality {
    "1080p" => Some(1080),
    "720p" => Some(720),
    "480p" => Some(480),
    // "best" and anything unrecognized: no ceiling
    _ => None,
  }
}

/// Prioritized predicate chain over the engine's format list: the
/// container/ceiling-aware scan first, then any format with a URL.
pub fn select_format<'a>(
  metadata: &'a VideoMetadata,
  quality: &str,
  container: &str,
) -> Option<Selected<'a>> {
  if container == "mp3" {
    // the engine may have collapsed its own pick to a top-level URL
    if let Some(url) = metadata.url.as_deref() {
      return Some(Selected {
        url,
        ext: metadata.ext.as_deref(),
      });
    }

    let audio = metadata.formats.iter().find_map(|format| {
      if !format.has_audio() {
        return None;
      }
      selected(format)
    });
    if audio.is_some() {
      return audio;
    }
  } else {
    let ceiling = quality_ceiling(quality);
    let video = metadata.formats.iter().find_map(|format| {
      if !format.has_video() || !within_ceiling(format, ceiling) {
        return None;
      }
      selected(format)
    });
    if video.is_some() {
      return video;
    }
  }

  // last resort: anything the engine exposed with a playable URL
  metadata.formats.iter().find_map(selected)
}

fn within_ceiling(format: &RawFormat, ceiling: Option<u32>) -> bool {
  match ceiling {
    Some(max) => matches!(format.height, Some(h) if h <= max),
    None => true,
  }
}

fn selected(format: &RawFormat) -> Option<Selected<'_>> {
  Some(Selected {
    url: format.url.as_deref()?,
    ext: format.ext.as_deref(),
  })
}

#[cfg(test)]
mod test {
  use std::collections::VecDeque;
  use std::sync::Mutex;

  use async_trait::async_trait;

  use super::*;

  struct Scripted {
    responses: Mutex<VecDeque<Result<VideoMetadata>>>,
    calls: Mutex<Vec<PlayerClient>>,
  }

  impl Scripted {
    fn new(responses: Vec<Result<VideoMetadata>>) -> Self {
      Self {
        responses: Mutex::new(responses.into()),
        calls: Mutex::new(Vec::new()),
      }
    }

    fn calls(&self) -> Vec<PlayerClient> {
      self.calls.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl Extractor for Scripted {
    async fn extract(
      &self,
      _page_url: &str,
      client: PlayerClient,
    ) -> Result<VideoMetadata> {
      self.calls.lock().unwrap().push(client);
      self
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .expect("more calls than scripted responses")
    }
  }

  fn video_format(id: &str, height: u32, url: Option<&str>) -> RawFormat {
    RawFormat {
      format_id: id.to_string(),
      ext: Some("mp4".to_string()),
      vcodec: Some("avc1.4d401f".to_string()),
      acodec: Some("none".to_string()),
      height: Some(height),
      url: url.map(str::to_string),
      ..Default::default()
    }
  }

  fn audio_format(id: &str, url: Option<&str>) -> RawFormat {
    RawFormat {
      format_id: id.to_string(),
      ext: Some("m4a".to_string()),
      vcodec: Some("none".to_string()),
      acodec: Some("mp4a.40.2".to_string()),
      url: url.map(str::to_string),
      ..Default::default()
    }
  }

  fn metadata_with(formats: Vec<RawFormat>) -> VideoMetadata {
    VideoMetadata {
      title: Some("Example Video".to_string()),
      formats,
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn test_first_success_short_circuits() {
    let extractor = Scripted::new(vec![Ok(metadata_with(vec![video_format(
      "a",
      720,
      Some("U720"),
    )]))]);

    let resolved = resolve(&extractor, "https://example/watch?v=X", "720p", "mp4")
      .await
      .unwrap();

    assert_eq!(resolved.direct_url, "U720");
    assert_eq!(extractor.calls(), vec![PlayerClient::Web]);
  }

  #[tokio::test]
  async fn test_failures_fall_through_in_order() {
    let extractor = Scripted::new(vec![
      Err(Error::Extraction("web blocked".to_string())),
      Err(Error::Extraction("android blocked".to_string())),
      Ok(metadata_with(vec![video_format("a", 480, Some("U480"))])),
    ]);

    let resolved = resolve(&extractor, "https://example/watch?v=X", "best", "mp4")
      .await
      .unwrap();

    assert_eq!(resolved.direct_url, "U480");
    assert_eq!(
      extractor.calls(),
      vec![PlayerClient::Web, PlayerClient::Android, PlayerClient::Ios]
    );
  }

  #[tokio::test]
  async fn test_all_failures_surface_last_message() {
    let extractor = Scripted::new(vec![
      Err(Error::Extraction("first".to_string())),
      Err(Error::Extraction("second".to_string())),
      Err(Error::Extraction("third".to_string())),
    ]);

    let err = resolve(&extractor, "https://example/watch?v=X", "best", "mp4")
      .await
      .unwrap_err();

    match err {
      Error::ResolutionFailed(detail) => {
        assert!(detail.contains("third"));
        assert!(!detail.contains("first"));
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_selection_miss_does_not_retry_other_strategies() {
    // engine succeeds but exposes no URLs at all; the remaining scripted
    // response must never be consumed
    let extractor = Scripted::new(vec![
      Ok(metadata_with(vec![video_format("a", 720, None)])),
      Ok(metadata_with(vec![video_format("b", 720, Some("U"))])),
    ]);

    let err = resolve(&extractor, "https://example/watch?v=X", "720p", "mp4")
      .await
      .unwrap_err();

    assert!(matches!(err, Error::ResolutionFailed(_)));
    assert_eq!(extractor.calls(), vec![PlayerClient::Web]);
  }

  #[test]
  fn test_ceiling_respected_per_quality_label() {
    let metadata = metadata_with(vec![
      video_format("hi", 1080, Some("U1080")),
      video_format("mid", 720, Some("U720")),
      video_format("low", 480, Some("U480")),
    ]);

    for (quality, expected) in
      [("1080p", "U1080"), ("720p", "U720"), ("480p", "U480")]
    {
      let pick = select_format(&metadata, quality, "mp4").unwrap();
      assert_eq!(pick.url, expected, "quality {quality}");
      let ceiling = quality_ceiling(quality).unwrap();
      let height = metadata
        .formats
        .iter()
        .find(|f| f.url.as_deref() == Some(expected))
        .and_then(|f| f.height)
        .unwrap();
      assert!(height <= ceiling);
    }

    // "best" applies no ceiling: first video format wins
    let pick = select_format(&metadata, "best", "mp4").unwrap();
    assert_eq!(pick.url, "U1080");
  }

  #[test]
  fn test_fallback_to_any_url_when_ceiling_scan_misses() {
    // only an audio stream carries a URL; the ceiling-aware scan finds
    // nothing and the any-URL fallback kicks in
    let metadata = metadata_with(vec![
      video_format("hi", 2160, None),
      audio_format("aud", Some("UAUDIO")),
    ]);

    let pick = select_format(&metadata, "480p", "mp4").unwrap();
    assert_eq!(pick.url, "UAUDIO");
  }

  #[test]
  fn test_no_usable_url_yields_none() {
    let metadata = metadata_with(vec![
      video_format("hi", 1080, None),
      audio_format("aud", None),
    ]);
    assert!(select_format(&metadata, "best", "mp4").is_none());
  }

  #[test]
  fn test_mp3_prefers_engine_top_level_url() {
    let mut metadata = metadata_with(vec![audio_format("aud", Some("UAUDIO"))]);
    metadata.url = Some("UTOP".to_string());
    metadata.ext = Some("m4a".to_string());

    let pick = select_format(&metadata, "best", "mp3").unwrap();
    assert_eq!(pick.url, "UTOP");
  }

  #[test]
  fn test_mp3_scans_for_first_audio_format() {
    let metadata = metadata_with(vec![
      video_format("vid", 720, Some("UVIDEO")),
      audio_format("no-url", None),
      audio_format("aud", Some("UAUDIO")),
    ]);

    let pick = select_format(&metadata, "best", "mp3").unwrap();
    assert_eq!(pick.url, "UAUDIO");
  }

  #[tokio::test]
  async fn test_end_to_end_720p_scenario() {
    let extractor = Scripted::new(vec![Ok(metadata_with(vec![
      video_format("hi", 1080, Some("U1080")),
      video_format("A", 720, Some("U720")),
      video_format("low", 480, Some("U480")),
    ]))]);

    let resolved =
      resolve(&extractor, "https://example/watch?v=X", "720p", "mp4")
        .await
        .unwrap();

    assert_eq!(resolved.direct_url, "U720");
    assert!(resolved.filename.ends_with(".mp4"));
    assert_eq!(resolved.filename, "Example Video.mp4");
  }

  #[tokio::test]
  async fn test_mp3_container_forces_mp3_extension() {
    let extractor = Scripted::new(vec![Ok(metadata_with(vec![audio_format(
      "aud",
      Some("UAUDIO"),
    )]))]);

    let resolved =
      resolve(&extractor, "https://example/watch?v=X", "best", "mp3")
        .await
        .unwrap();

    assert_eq!(resolved.filename, "Example Video.mp3");
  }

  #[tokio::test]
  async fn test_untitled_video_gets_default_filename() {
    let metadata = VideoMetadata {
      formats: vec![video_format("a", 360, Some("U"))],
      ..Default::default()
    };
    let extractor = Scripted::new(vec![Ok(metadata)]);

    let resolved =
      resolve(&extractor, "https://example/watch?v=X", "best", "mp4")
        .await
        .unwrap();

    assert_eq!(resolved.filename, "video.mp4");
  }
}
