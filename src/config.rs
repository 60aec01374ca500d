use std::sync::LazyLock;

use tokio::sync::Semaphore;

// Some CDNs refuse requests without a browser-like UA and referer.
pub const BROWSER_USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
   (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const ORIGIN_REFERER: &str = "https://www.youtube.com/";

// network knobs passed down to the extraction engine per attempt
pub const ENGINE_SOCKET_TIMEOUT_SECS: u32 = 30;
pub const ENGINE_RETRIES: u32 = 3;

// ensure only a limited set of ytdlp processes at a time
pub static YTDLP_MUTEX: LazyLock<Semaphore> = LazyLock::new(|| {
  let concurrency = std::env::var("YTDLP_CONCURRENCY")
    .ok()
    .and_then(|s| s.parse::<usize>().ok())
    .unwrap_or(4);
  Semaphore::new(concurrency)
});

// optional cookie jar handed to the engine for age/consent-gated videos
static COOKIES_FILE: LazyLock<Option<String>> =
  LazyLock::new(|| std::env::var("COOKIES_FILE").ok());

pub fn cookies_file() -> Option<&'static str> {
  COOKIES_FILE.as_deref()
}

// read ytdlp proxy from environment variable (YTDLP_PROXY) and return it.
static YTDLP_PROXY: LazyLock<Option<String>> =
  LazyLock::new(|| std::env::var("YTDLP_PROXY").ok());

pub fn ytdlp_proxy() -> Option<&'static str> {
  YTDLP_PROXY.as_deref()
}

pub fn listen_port() -> u16 {
  std::env::var("PORT")
    .ok()
    .and_then(|s| s.parse::<u16>().ok())
    .unwrap_or(8000)
}
