use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_CHARS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 _\-]").unwrap());

/// Strip everything but alphanumerics, space, hyphen and underscore from
/// a video title so it is safe to use in a Content-Disposition filename.
pub fn sanitize_title(title: &str) -> String {
  UNSAFE_CHARS.replace_all(title, "").trim_end().to_string()
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_sanitize_title() {
    assert_eq!(sanitize_title("Foo: Bar? <Baz>"), "Foo Bar Baz");
    assert_eq!(sanitize_title("plain_title-1 "), "plain_title-1");
    assert_eq!(sanitize_title("видео"), "");
    assert_eq!(sanitize_title("a/b\\c"), "abc");
  }
}
