use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::config::{
  cookies_file, ytdlp_proxy, BROWSER_USER_AGENT, ENGINE_RETRIES,
  ENGINE_SOCKET_TIMEOUT_SECS, ORIGIN_REFERER, YTDLP_MUTEX,
};
use crate::{Error, Result};

use super::{Extractor, PlayerClient, VideoMetadata};

// run yt-dlp command line to dump page metadata as JSON.
// requires yt-dlp executable to be in PATH.
pub struct Ytdlp;

#[async_trait]
impl Extractor for Ytdlp {
  async fn extract(
    &self,
    page_url: &str,
    client: PlayerClient,
  ) -> Result<VideoMetadata> {
    let mut cmd = Command::new("yt-dlp");

    cmd
      .arg("-j")
      .arg("--no-warnings")
      .arg("--no-playlist")
      .arg("--extractor-args")
      .arg(format!("youtube:player_client={client}"))
      .arg("--user-agent")
      .arg(BROWSER_USER_AGENT)
      .arg("--add-header")
      .arg(format!("Referer:{ORIGIN_REFERER}"))
      .arg("--geo-bypass")
      .arg("--no-check-certificates")
      .arg("--retries")
      .arg(ENGINE_RETRIES.to_string())
      .arg("--socket-timeout")
      .arg(ENGINE_SOCKET_TIMEOUT_SECS.to_string());

    if let Some(cookies) = cookies_file() {
      cmd.arg("--cookies").arg(cookies);
    }

    if let Some(proxy) = ytdlp_proxy() {
      // used to remove cred info from proxy url before printing
      static AUTH_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"//[^:]+(:[^@]+)@").unwrap());
      tracing::debug!(
        "using proxy: {}",
        AUTH_REGEX.replace(proxy, "//<REDACTED>@")
      );
      cmd.arg("--proxy").arg(proxy);
    }

    cmd.arg(page_url);

    let guard = YTDLP_MUTEX.acquire().await;
    let output = cmd.output().await?;
    drop(guard);

    if !output.status.success() {
      return Err(Error::Extraction(extract_error_line(&output.stderr)));
    }

    let metadata: VideoMetadata = serde_json::from_slice(&output.stdout)
      .map_err(|e| Error::Extraction(format!("malformed engine output: {e}")))?;

    Ok(metadata)
  }
}

// yt-dlp prints one "ERROR: ..." line per fatal failure; surface that
// line rather than the whole stderr dump.
fn extract_error_line(stderr: &[u8]) -> String {
  let text = String::from_utf8_lossy(stderr);
  text
    .lines()
    .find(|line| line.starts_with("ERROR:"))
    .unwrap_or("yt-dlp exited with a non-zero status")
    .to_string()
}
