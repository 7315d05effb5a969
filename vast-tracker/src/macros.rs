//! Macro maps and playhead formatting
//!
//! VAST tracking URLs carry bracketed placeholders (`[ADPLAYHEAD]`,
//! `[ERRORCODE]`, ...). The tracker never substitutes them itself; it only
//! assembles the [`MacroMap`] handed to the beacon sender. Values computed by
//! the tracker always override caller-supplied values for the same macro.

use crate::types::{Ad, Creative};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

/// VAST macro names
///
/// Vendor-specific names that are not part of the VAST 4 macro list are kept
/// verbatim in [`Macro::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Macro {
    AdCategories,
    AdCount,
    AdPlayhead,
    AdServingId,
    AdType,
    AppBundle,
    AssetUri,
    BlockedAdCategories,
    BreakMaxAds,
    BreakMaxDuration,
    BreakMinAds,
    BreakMinDuration,
    BreakPosition,
    CacheBusting,
    ClickPos,
    ContentPlayhead,
    ContentUri,
    ErrorCode,
    IfaType,
    LimitAdTracking,
    MediaPlayhead,
    PageUrl,
    PlayerSize,
    PodSequence,
    Reason,
    ServerSide,
    Timestamp,
    TransactionId,
    UniversalAdId,
    VerificationVendors,
    /// Any other placeholder name
    Custom(String),
}

impl Macro {
    /// The placeholder name as it appears between brackets
    pub fn name(&self) -> &str {
        match self {
            Macro::AdCategories => "ADCATEGORIES",
            Macro::AdCount => "ADCOUNT",
            Macro::AdPlayhead => "ADPLAYHEAD",
            Macro::AdServingId => "ADSERVINGID",
            Macro::AdType => "ADTYPE",
            Macro::AppBundle => "APPBUNDLE",
            Macro::AssetUri => "ASSETURI",
            Macro::BlockedAdCategories => "BLOCKEDADCATEGORIES",
            Macro::BreakMaxAds => "BREAKMAXADS",
            Macro::BreakMaxDuration => "BREAKMAXDURATION",
            Macro::BreakMinAds => "BREAKMINADS",
            Macro::BreakMinDuration => "BREAKMINDURATION",
            Macro::BreakPosition => "BREAKPOSITION",
            Macro::CacheBusting => "CACHEBUSTING",
            Macro::ClickPos => "CLICKPOS",
            Macro::ContentPlayhead => "CONTENTPLAYHEAD",
            Macro::ContentUri => "CONTENTURI",
            Macro::ErrorCode => "ERRORCODE",
            Macro::IfaType => "IFATYPE",
            Macro::LimitAdTracking => "LIMITADTRACKING",
            Macro::MediaPlayhead => "MEDIAPLAYHEAD",
            Macro::PageUrl => "PAGEURL",
            Macro::PlayerSize => "PLAYERSIZE",
            Macro::PodSequence => "PODSEQUENCE",
            Macro::Reason => "REASON",
            Macro::ServerSide => "SERVERSIDE",
            Macro::Timestamp => "TIMESTAMP",
            Macro::TransactionId => "TRANSACTIONID",
            Macro::UniversalAdId => "UNIVERSALADID",
            Macro::VerificationVendors => "VERIFICATIONVENDORS",
            Macro::Custom(name) => name,
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Macro {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Macro::from(s.to_string()))
    }
}

impl From<String> for Macro {
    fn from(name: String) -> Self {
        match name.as_str() {
            "ADCATEGORIES" => Macro::AdCategories,
            "ADCOUNT" => Macro::AdCount,
            "ADPLAYHEAD" => Macro::AdPlayhead,
            "ADSERVINGID" => Macro::AdServingId,
            "ADTYPE" => Macro::AdType,
            "APPBUNDLE" => Macro::AppBundle,
            "ASSETURI" => Macro::AssetUri,
            "BLOCKEDADCATEGORIES" => Macro::BlockedAdCategories,
            "BREAKMAXADS" => Macro::BreakMaxAds,
            "BREAKMAXDURATION" => Macro::BreakMaxDuration,
            "BREAKMINADS" => Macro::BreakMinAds,
            "BREAKMINDURATION" => Macro::BreakMinDuration,
            "BREAKPOSITION" => Macro::BreakPosition,
            "CACHEBUSTING" => Macro::CacheBusting,
            "CLICKPOS" => Macro::ClickPos,
            "CONTENTPLAYHEAD" => Macro::ContentPlayhead,
            "CONTENTURI" => Macro::ContentUri,
            "ERRORCODE" => Macro::ErrorCode,
            "IFATYPE" => Macro::IfaType,
            "LIMITADTRACKING" => Macro::LimitAdTracking,
            "MEDIAPLAYHEAD" => Macro::MediaPlayhead,
            "PAGEURL" => Macro::PageUrl,
            "PLAYERSIZE" => Macro::PlayerSize,
            "PODSEQUENCE" => Macro::PodSequence,
            "REASON" => Macro::Reason,
            "SERVERSIDE" => Macro::ServerSide,
            "TIMESTAMP" => Macro::Timestamp,
            "TRANSACTIONID" => Macro::TransactionId,
            "UNIVERSALADID" => Macro::UniversalAdId,
            "VERIFICATIONVENDORS" => Macro::VerificationVendors,
            _ => Macro::Custom(name),
        }
    }
}

impl From<&str> for Macro {
    fn from(name: &str) -> Self {
        Macro::from(name.to_string())
    }
}

impl From<Macro> for String {
    fn from(m: Macro) -> Self {
        match m {
            Macro::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

/// Ordered mapping from macro to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroMap(BTreeMap<Macro, String>);

impl MacroMap {
    /// Create an empty macro map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a macro value
    pub fn with(mut self, key: impl Into<Macro>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a macro value, returning the previous one
    pub fn insert(&mut self, key: impl Into<Macro>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Value of a macro, if set
    pub fn get(&self, key: &Macro) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &Macro) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Macro, String> {
        self.0.iter()
    }

    /// Merge `computed` over `self`; computed values win on collisions
    pub fn merged_with(&self, computed: &MacroMap) -> MacroMap {
        let mut merged = self.clone();
        for (key, value) in computed.iter() {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl<K: Into<Macro>, V: Into<String>> FromIterator<(K, V)> for MacroMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a MacroMap {
    type Item = (&'a Macro, &'a String);
    type IntoIter = btree_map::Iter<'a, Macro, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Merge caller-supplied and tracker-computed macros (computed wins)
pub fn resolve(caller: &MacroMap, computed: &MacroMap) -> MacroMap {
    caller.merged_with(computed)
}

/// Format a playhead position as `HH:MM:SS.mmm`
///
/// Milliseconds are rounded; a rounding carry propagates into the seconds.
/// Negative or non-finite input formats as zero.
pub fn convert_to_timecode(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Append the encoded playhead to a click-through URL
pub fn build_clickthrough_url(base: &str, encoded_playhead: &str) -> String {
    format!("{}_adplayhead:{}", base, encoded_playhead)
}

/// Percent-encode a value for use inside a URL (URI component rules)
pub fn encode_uri_component(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for b in src.bytes() {
        if is_unreserved_byte(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(to_hex_upper(b >> 4));
            out.push(to_hex_upper(b & 0x0F));
        }
    }
    out
}

fn is_unreserved_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

fn to_hex_upper(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        _ => (b'A' + nibble - 10) as char,
    }
}

/// Computes the macros the tracker derives from the ad model and playhead
#[derive(Debug, Clone)]
pub struct MacroResolver {
    linear: bool,
    static_macros: MacroMap,
}

impl MacroResolver {
    /// Capture ad-derived macros for one (ad, creative) pair
    pub fn new(ad: &Ad, creative: &Creative) -> Self {
        let mut static_macros = MacroMap::new();

        if creative.is_linear() {
            if let Some(uri) = creative.media_files.first().and_then(|m| m.file_url.as_deref()) {
                static_macros.insert(Macro::AssetUri, uri);
            }
        }
        if !creative.universal_ad_ids.is_empty() {
            let ids = creative
                .universal_ad_ids
                .iter()
                .map(|uid| format!("{} {}", uid.id_registry, uid.value))
                .collect::<Vec<_>>()
                .join(",");
            static_macros.insert(Macro::UniversalAdId, ids);
        }
        if let Some(sequence) = ad.sequence {
            static_macros.insert(Macro::PodSequence, sequence.to_string());
        }
        if let Some(ad_type) = &ad.ad_type {
            static_macros.insert(Macro::AdType, ad_type.as_str());
        }
        if let Some(serving_id) = &ad.ad_serving_id {
            static_macros.insert(Macro::AdServingId, serving_id.as_str());
        }
        if !ad.categories.is_empty() {
            let categories = ad
                .categories
                .iter()
                .map(|c| c.value.as_str())
                .collect::<Vec<_>>()
                .join(",");
            static_macros.insert(Macro::AdCategories, categories);
        }

        Self {
            linear: creative.is_linear(),
            static_macros,
        }
    }

    /// Macros computed for a tracking call at the given playhead
    pub fn computed(&self, progress: f64) -> MacroMap {
        let mut computed = self.static_macros.clone();
        if self.linear && progress > 0.0 {
            computed.insert(Macro::AdPlayhead, convert_to_timecode(progress));
        }
        computed
    }
}
