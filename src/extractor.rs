mod ytdlp;

use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;

pub use ytdlp::Ytdlp;

/// Client identity the engine impersonates when requesting manifests.
/// YouTube serves different manifests (and applies different bot checks)
/// per front-end, so identities are tried in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClient {
  Web,
  Android,
  Ios,
}

impl PlayerClient {
  pub fn as_str(&self) -> &'static str {
    match self {
      PlayerClient::Web => "web",
      PlayerClient::Android => "android",
      PlayerClient::Ios => "ios",
    }
  }
}

impl std::fmt::Display for PlayerClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One candidate media stream as reported by the engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
  pub format_id: String,
  pub ext: Option<String>,
  pub vcodec: Option<String>,
  pub acodec: Option<String>,
  pub height: Option<u32>,
  pub filesize: Option<u64>,
  pub filesize_approx: Option<u64>,
  pub url: Option<String>,
}

impl RawFormat {
  pub fn has_video(&self) -> bool {
    matches!(&self.vcodec, Some(c) if c != "none")
  }

  pub fn has_audio(&self) -> bool {
    matches!(&self.acodec, Some(c) if c != "none")
  }

  pub fn size(&self) -> Option<u64> {
    self.filesize.or(self.filesize_approx)
  }
}

/// Structured result of a successful extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMetadata {
  pub id: Option<String>,
  pub title: Option<String>,
  pub thumbnail: Option<String>,
  pub duration: Option<f64>,
  pub view_count: Option<u64>,
  pub uploader: Option<String>,
  pub is_live: Option<bool>,
  // present when the engine already collapsed its pick to one stream
  pub url: Option<String>,
  pub ext: Option<String>,
  #[serde(default)]
  pub formats: Vec<RawFormat>,
}

#[async_trait]
pub trait Extractor: Send + Sync {
  async fn extract(
    &self,
    page_url: &str,
    client: PlayerClient,
  ) -> Result<VideoMetadata>;
}
