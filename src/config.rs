use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.culturecoded.ai/v1";

pub(crate) const ENV_API_KEY: &str = "CULTURECODED_API_KEY";
pub(crate) const ENV_BASE_URL: &str = "CULTURECODED_BASE_URL";
pub(crate) const ENV_VERIFY: &str = "CULTURECODED_VERIFY";
pub(crate) const ENV_RC: &str = "CULTURECODED_RC";
const RC_FILE: &str = ".culturecodedrc";

/// Settings a [`Client`](crate::Client) is built from.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// API root, used verbatim. Defaults to [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Per-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            verify: true,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    verify: Option<bool>,
}

/// Resolves a [`ClientConfig`] from (in order of precedence) the explicit
/// arguments, the `CULTURECODED_*` environment variables and an rc file.
pub fn load_config(
    api_key: Option<String>,
    base_url: Option<String>,
    verify: Option<bool>,
) -> Result<ClientConfig> {
    let mut api_key = api_key.or_else(|| non_empty_env(ENV_API_KEY));
    let mut base_url = base_url.or_else(|| non_empty_env(ENV_BASE_URL));
    let mut verify = verify.or_else(|| non_empty_env(ENV_VERIFY).map(|v| parse_verify(&v)));

    let rc_candidates = rc_candidates();

    if api_key.is_none() || base_url.is_none() || verify.is_none() {
        if let Some(rc_path) = rc_candidates.iter().find(|p| p.exists()) {
            let cfg = read_rc(rc_path)?;
            api_key = api_key.or(cfg.api_key);
            base_url = base_url.or(cfg.base_url);
            verify = verify.or(cfg.verify);
        }
    }

    let api_key = match api_key {
        Some(v) => v,
        None if rc_candidates.is_empty() => {
            return Err(Error::Config(format!(
                "missing API key (set {} or create {})",
                ENV_API_KEY, RC_FILE
            )));
        }
        None => {
            return Err(Error::Config(format!(
                "missing API key (set {} or put `api_key:` in one of: {})",
                ENV_API_KEY,
                rc_candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    };

    Ok(ClientConfig {
        api_key,
        base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        verify: verify.unwrap_or(true),
        timeout: None,
    })
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_verify(v: &str) -> bool {
    !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no")
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // `api_key:` may be on one line with the value on the next.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !line.contains(':') {
                cfg.set(pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending_key = match k {
                    "api_key" => Some("api_key"),
                    "base_url" => Some("base_url"),
                    _ => None,
                };
            } else {
                cfg.set(k, v);
            }
        }
    }

    cfg
}

impl RcConfig {
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "api_key" => self.api_key = Some(value.to_string()),
            "base_url" => self.base_url = Some(value.to_string()),
            "verify" => self.verify = Some(parse_verify(value)),
            _ => {}
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) CULTURECODED_RC (explicit)
    // 2) ./.culturecodedrc
    // 3) ~/.culturecodedrc
    if let Some(p) = non_empty_env(ENV_RC) {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(RC_FILE));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(RC_FILE));
    }
    v
}
