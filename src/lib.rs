//! A small Rust client for the CultureCoded cultural UX analysis API.
//!
//! Every [`Client`] method is one HTTP round trip: build the URL under the
//! configured API root, attach the `X-API-Key` header, send the JSON body,
//! then decode the JSON reply or turn a non-2xx status into [`Error::Api`].
//! The client never retries.
//!
//! ## Quick start
//! - Pass an API key to [`Client::new`], or configure it via the
//!   `CULTURECODED_API_KEY` environment variable or a `.culturecodedrc` file
//!   and call [`Client::from_env`].
//! - Call [`Client::analyze_design`] with an [`AnalyzeRequest`].
//!
//! ```no_run
//! use culturecoded::{AnalyzeRequest, Client, DesignType, Priority};
//!
//! fn main() -> culturecoded::Result<()> {
//!     let client = Client::from_env()?;
//!     let request = AnalyzeRequest::from_url(
//!         "https://example.com/landing.png",
//!         "West Africa",
//!         "Nigeria",
//!         DesignType::LandingPage,
//!     )
//!     .with_ethnic_group("Yoruba")
//!     .with_industry("fintech");
//!
//!     let analysis = client.analyze_design(&request)?;
//!     for rec in analysis.recommendations_with(Priority::High) {
//!         println!("[{}] {}", rec.category, rec.suggestion);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod config;
mod download;
mod error;
mod image;
mod models;
mod util;

pub use client::{API_KEY_HEADER, Client, ClientConfig};
pub use config::{DEFAULT_BASE_URL, load_config};
pub use error::{Error, Result};
pub use models::{
    Analysis, AnalyzeRequest, CulturalScores, DesignType, EthnicGroup, ExportFormat,
    ExportRequest, ExportResult, Priority, Recommendation, Regions, Tier, UsageStats, User,
};
