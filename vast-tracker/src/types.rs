//! Core types for the VAST tracker library
//!
//! This module defines the read-only ad model the tracker consumes (as produced
//! by a VAST parser) and the error type returned by tracker operations. Field
//! names deserialize from the camelCase shape VAST clients commonly emit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Mapping from VAST event name to the URL templates declared for it
pub type TrackingEventMap = BTreeMap<String, Vec<UrlTemplate>>;

/// Errors that can occur while tracking
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("No adVerifications provided")]
    NoAdVerifications,

    #[error("No vendor provided, unable to find associated verificationNotExecuted")]
    NoVendorProvided,

    #[error("No associated verification element found for vendor: {0}")]
    VerificationVendorNotFound(String),

    #[error("Unknown tracking event: {0}")]
    UnknownEvent(String),

    #[error("Unknown quartile: {0}")]
    UnknownQuartile(String),
}

impl TrackerError {
    /// True for errors caused by an ad model that cannot serve the request
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            TrackerError::NoAdVerifications
                | TrackerError::NoVendorProvided
                | TrackerError::VerificationVendorNotFound(_)
        )
    }
}

/// A tracking URL, possibly containing bracketed macro placeholders
///
/// Placeholders such as `[ASSETURI]` are left untouched by the tracker;
/// substitution belongs to the [`BeaconSender`](crate::BeaconSender).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "UrlTemplateRepr")]
pub struct UrlTemplate {
    /// Identifier from the VAST document (may be empty)
    pub id: String,
    /// URL with placeholders
    pub url: String,
}

impl UrlTemplate {
    /// Create a new URL template
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Create a template without an identifier
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(String::new(), url)
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Parsers emit either `{id, url}` objects or bare URL strings
#[derive(Deserialize)]
#[serde(untagged)]
enum UrlTemplateRepr {
    Url(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        url: String,
    },
}

impl From<UrlTemplateRepr> for UrlTemplate {
    fn from(repr: UrlTemplateRepr) -> Self {
        match repr {
            UrlTemplateRepr::Url(url) => UrlTemplate::from_url(url),
            UrlTemplateRepr::Full { id, url } => UrlTemplate::new(id.unwrap_or_default(), url),
        }
    }
}

/// A VAST ad with its creatives and ad-level tracking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ad {
    /// Ad identifier
    pub id: Option<String>,
    /// Position of the ad inside a pod
    pub sequence: Option<u32>,
    /// Ad type attribute (video, audio, hybrid)
    pub ad_type: Option<String>,
    /// Ad serving identifier
    pub ad_serving_id: Option<String>,
    /// Category codes
    pub categories: Vec<AdCategory>,
    /// Impression pixels, fired once per tracker
    #[serde(rename = "impressionURLTemplates")]
    pub impression_url_templates: Vec<UrlTemplate>,
    /// Error pixels
    #[serde(rename = "errorURLTemplates")]
    pub error_url_templates: Vec<UrlTemplate>,
    /// Verification vendors and their tracking
    pub ad_verifications: Vec<AdVerification>,
    /// Creatives in document order
    pub creatives: Vec<Creative>,
}

/// An ad category code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdCategory {
    /// Category taxonomy authority URL
    pub authority: Option<String>,
    /// Category code
    pub value: String,
}

/// Creative kind, which decides linear-only behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeKind {
    #[default]
    Linear,
    Nonlinear,
    Companion,
}

/// A playable creative with its own tracking-event map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Creative {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: CreativeKind,
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
    /// Seconds before the skip button is offered
    pub skip_delay: Option<f64>,
    pub tracking_events: TrackingEventMap,
    #[serde(rename = "videoClickThroughURLTemplate")]
    pub video_click_through_url_template: Option<UrlTemplate>,
    #[serde(rename = "videoClickTrackingURLTemplates")]
    pub video_click_tracking_url_templates: Vec<UrlTemplate>,
    pub universal_ad_ids: Vec<UniversalAdId>,
    pub media_files: Vec<MediaFile>,
}

impl Creative {
    /// True for linear (video) creatives
    pub fn is_linear(&self) -> bool {
        self.kind == CreativeKind::Linear
    }
}

/// A universal ad identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniversalAdId {
    pub id_registry: String,
    pub value: String,
}

/// A media file of a linear creative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaFile {
    #[serde(rename = "fileURL")]
    pub file_url: Option<String>,
    pub mime_type: Option<String>,
}

/// A verification vendor entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdVerification {
    /// Vendor key; `None` never matches a lookup
    pub vendor: Option<String>,
    pub tracking_events: TrackingEventMap,
}
