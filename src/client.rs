use log::{debug, trace};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

pub use crate::config::ClientConfig;
use crate::config::load_config;
use crate::error::{Error, Result, api_error};
use crate::models::{
    Analysis, AnalyzeRequest, EthnicGroup, ExportRequest, ExportResult, Regions, UsageStats, User,
};
use crate::util::{endpoint, mask_key, parse_base_url};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Blocking client for the CultureCoded API.
///
/// Holds only immutable configuration; clones share one connection pool and
/// may be used from several threads at once.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) root: Url,
    pub(crate) api_key: HeaderValue,
    pub(crate) progress: bool,

    pub(crate) http: HttpClient,
}

impl Client {
    /// Creates a client for the production API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key))
    }

    /// Creates a client for a staging or self-hosted API root.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key).with_base_url(base_url))
    }

    /// Creates a client using (in order of precedence):
    /// - environment variables `CULTURECODED_API_KEY` / `CULTURECODED_BASE_URL`
    /// - config file from `CULTURECODED_RC` or `.culturecodedrc`
    pub fn from_env() -> Result<Self> {
        Self::from_config(load_config(None, None, None)?)
    }

    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(Error::Config("API key is required".to_string()));
        }
        let mut api_key = HeaderValue::from_str(&cfg.api_key).map_err(|_| {
            Error::Config("API key contains characters not allowed in a header".to_string())
        })?;
        api_key.set_sensitive(true);

        let root = parse_base_url(&cfg.base_url)?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("culturecoded-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("culturecoded-rs")),
        );
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = HttpClient::builder().default_headers(default_headers);
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;

        debug!("Creating CultureCoded client");
        debug!("  API key: {}", mask_key(&cfg.api_key));
        debug!("  Base URL: {}", cfg.base_url);

        Ok(Self {
            base_url: cfg.base_url,
            root,
            api_key,
            progress: false,
            http,
        })
    }

    /// Show a progress bar while downloading exports.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// The API root exactly as configured.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submits a design for analysis.
    ///
    /// Fails with [`Error::Input`] before sending anything unless exactly one
    /// of `image_url` / `image_base64` is set, or when the design type is
    /// [`DesignType::Unknown`](crate::DesignType::Unknown).
    pub fn analyze_design(&self, request: &AnalyzeRequest) -> Result<Analysis> {
        request.validate()?;
        self.api_json(Method::POST, &["analyses"], Some(request))
    }

    pub fn list_analyses(&self) -> Result<Vec<Analysis>> {
        self.api_json(Method::GET, &["analyses"], None::<&()>)
    }

    pub fn get_analysis(&self, id: &str) -> Result<Analysis> {
        self.api_json(Method::GET, &["analyses", id], None::<&()>)
    }

    /// Deletes an analysis. A `204 No Content` reply is success.
    pub fn delete_analysis(&self, id: &str) -> Result<()> {
        self.api_call(Method::DELETE, &["analyses", id], None::<&()>)?;
        Ok(())
    }

    /// Ethnic groups known for `country`. The name is sent as one escaped path segment.
    pub fn get_ethnic_groups(&self, country: &str) -> Result<Vec<EthnicGroup>> {
        self.api_json(Method::GET, &["ethnic-groups", country], None::<&()>)
    }

    /// Region name to the countries in it.
    pub fn get_regions(&self) -> Result<Regions> {
        self.api_json(Method::GET, &["regions"], None::<&()>)
    }

    /// Exports an analysis. Figma exports need a file key; a missing one is an
    /// [`Error::Config`] raised before sending anything.
    pub fn export_analysis(&self, request: &ExportRequest) -> Result<ExportResult> {
        request.validate()?;
        self.api_json(Method::POST, &["exports"], Some(request))
    }

    /// Exports an analysis into the Figma file identified by `file_key`.
    pub fn export_to_figma(&self, analysis_id: &str, file_key: &str) -> Result<ExportResult> {
        self.export_analysis(&ExportRequest::figma(analysis_id, file_key))
    }

    pub fn list_exports(&self) -> Result<Vec<ExportResult>> {
        self.api_json(Method::GET, &["exports"], None::<&()>)
    }

    /// The account the API key belongs to.
    pub fn get_user(&self) -> Result<User> {
        self.api_json(Method::GET, &["user"], None::<&()>)
    }

    pub fn get_usage_stats(&self) -> Result<UsageStats> {
        self.api_json(Method::GET, &["stats"], None::<&()>)
    }

    pub(crate) fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(API_KEY_HEADER, self.api_key.clone())
    }

    fn api_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TReq>,
    ) -> Result<TResp> {
        let (url, status, text) = self.api_call(method, segments, body)?;

        let parsed = if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_str(&text)
        };
        parsed.map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Sends one request and returns the raw body of a 2xx response.
    fn api_call<TReq: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TReq>,
    ) -> Result<(Url, StatusCode, String)> {
        let url = endpoint(&self.root, segments)?;
        debug!("HTTP {} {}", method, url);

        let mut req = self.apply_auth(self.http.request(method, url.clone()));
        if let Some(body) = body {
            if log::log_enabled!(log::Level::Trace) {
                trace!(
                    "Request body: {}",
                    serde_json::to_string(body).unwrap_or_else(|_| "<unserializable>".to_string())
                );
            }
            req = req.json(body);
        }

        let resp = req.send()?;
        let status = resp.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(api_error(status, &text));
        }

        let text = resp.text()?;
        Ok((url, status, text))
    }
}
