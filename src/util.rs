use url::Url;

use crate::error::{Error, Result};

/// Parses a base URL, accepting only absolute http(s) URLs that can carry a path.
pub(crate) fn parse_base_url(base: &str) -> Result<Url> {
    let url = Url::parse(base.trim())
        .map_err(|e| Error::Config(format!("invalid base URL `{}`: {}", base, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "invalid base URL `{}`: expected an http(s) URL",
            base
        )));
    }
    Ok(url)
}

/// Appends `segments` to the path of `base`, each percent-encoded as a single
/// path segment. A trailing `/` on the base does not produce an empty segment.
///
/// Empty, `.` and `..` segments are rejected: they would otherwise collapse
/// onto the parent path.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(Error::Input(format!(
            "`{}` is not a valid identifier in a request path",
            bad
        )));
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("base URL `{}` cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Shows the first and last four characters of a key.
pub(crate) fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub(crate) fn guess_filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().and_then(|s| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    })
}
