//! Records exchanged with the CultureCoded API.
//!
//! Field names on the wire are camelCase. Enumerations are closed on the
//! request side; when decoding responses an unrecognised value maps to the
//! `Unknown` variant so newer service values do not break older clients.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
            /// A value this client version does not know about.
            #[serde(other)]
            Unknown,
        }

        impl $name {
            /// Every known value, in wire order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unknown => "unknown",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(Error::Input(format!(
                        concat!("unknown ", $what, " `{}` (expected one of: {})"),
                        other,
                        $name::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                    ))),
                }
            }
        }
    };
}

wire_enum! {
    /// Kind of design submitted for analysis.
    DesignType, "design type" {
        LandingPage => "landing_page",
        MobileApp => "mobile_app",
        Dashboard => "dashboard",
        Ecommerce => "ecommerce",
        SocialMedia => "social_media",
        Email => "email",
        Advertisement => "advertisement",
        Other => "other",
    }
}

wire_enum! {
    /// Output format of an export.
    ExportFormat, "export format" {
        Pdf => "pdf",
        Csv => "csv",
        Figma => "figma",
    }
}

impl ExportFormat {
    /// Figma exports target an existing file and need its key.
    pub fn requires_file_key(&self) -> bool {
        matches!(self, ExportFormat::Figma)
    }
}

wire_enum! {
    /// Priority of a recommendation.
    Priority, "priority" {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

wire_enum! {
    /// Account plan.
    Tier, "tier" {
        Starter => "starter",
        Professional => "professional",
        Enterprise => "enterprise",
    }
}

/// Cultural-dimension name to score, e.g. `"individualism" -> 20.0`.
pub type CulturalScores = BTreeMap<String, f64>;

/// Region name to the countries it contains.
pub type Regions = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Research framework the suggestion is drawn from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

/// Result of analysing one design for a target market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub user_id: String,
    pub region: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnic_group: Option<String>,
    pub design_type: DesignType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_scores: Option<CulturalScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_sources: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    /// Recommendations with the given priority, in service order.
    pub fn recommendations_with(&self, priority: Priority) -> impl Iterator<Item = &Recommendation> {
        self.recommendations
            .iter()
            .filter(move |r| r.priority == priority)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthnicGroup {
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_dimensions: Option<CulturalScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_considerations: Option<Vec<String>>,
}

/// Artifact produced by exporting an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub format: ExportFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Export payload embedded in the response (Figma exports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Credits charged.
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub credits: f64,
    pub tier: Tier,
}

/// Usage in the current billing period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    #[serde(default)]
    pub total_analyses: u64,
    #[serde(default)]
    pub analyses_this_month: u64,
    #[serde(default)]
    pub credits_used: f64,
    #[serde(default)]
    pub credits_remaining: f64,
}

/// Body of `POST /analyses`.
///
/// Exactly one of `image_url` / `image_base64` must be set; the client checks
/// this before sending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Base64-encoded image contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    pub region: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnic_group: Option<String>,
    pub design_type: DesignType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Free-text context about the design or audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl AnalyzeRequest {
    /// Analyse an image hosted at `image_url`.
    pub fn from_url(
        image_url: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
        design_type: DesignType,
    ) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..Self::empty(region.into(), country.into(), design_type)
        }
    }

    /// Analyse an already base64-encoded image.
    pub fn from_base64(
        image_base64: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
        design_type: DesignType,
    ) -> Self {
        Self {
            image_base64: Some(image_base64.into()),
            ..Self::empty(region.into(), country.into(), design_type)
        }
    }

    pub(crate) fn empty(region: String, country: String, design_type: DesignType) -> Self {
        Self {
            image_url: None,
            image_base64: None,
            region,
            country,
            ethnic_group: None,
            design_type,
            industry: None,
            context: None,
        }
    }

    pub fn with_ethnic_group(mut self, ethnic_group: impl Into<String>) -> Self {
        self.ethnic_group = Some(ethnic_group.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.design_type == DesignType::Unknown {
            return Err(Error::Input(format!(
                "design type must be one of: {}",
                DesignType::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let has_url = self.image_url.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_inline = self
            .image_base64
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());

        match (has_url, has_inline) {
            (true, false) | (false, true) => Ok(()),
            (false, false) => Err(Error::Input(
                "either image_url or image_base64 is required".to_string(),
            )),
            (true, true) => Err(Error::Input(
                "provide only one of image_url or image_base64".to_string(),
            )),
        }
    }
}

/// Body of `POST /exports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub analysis_id: String,
    pub format: ExportFormat,
    /// Target Figma file; required for [`ExportFormat::Figma`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
}

impl ExportRequest {
    pub fn new(analysis_id: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            format,
            file_key: None,
        }
    }

    pub fn figma(analysis_id: impl Into<String>, file_key: impl Into<String>) -> Self {
        Self::new(analysis_id, ExportFormat::Figma).with_file_key(file_key)
    }

    pub fn with_file_key(mut self, file_key: impl Into<String>) -> Self {
        self.file_key = Some(file_key.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.format == ExportFormat::Unknown {
            return Err(Error::Config("export format must be pdf, csv or figma".to_string()));
        }
        let has_key = self.file_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if self.format.requires_file_key() && !has_key {
            return Err(Error::Config(format!(
                "file_key is required for {} export",
                self.format
            )));
        }
        Ok(())
    }
}
