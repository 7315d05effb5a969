//! Replay beacon sender
//!
//! Resolves macro placeholders the way a pixel-firing layer would and
//! records the resulting URLs instead of requesting them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use vast_tracker::macros::encode_uri_component;
use vast_tracker::{BeaconSender, Macro, MacroMap, TrackOptions, UrlTemplate};

/// Error code reported when a non-custom `ERRORCODE` is not a VAST code
const UNDEFINED_ERROR_CODE: &str = "900";

/// A beacon that would have been fired
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBeacon {
    pub timestamp: DateTime<Utc>,
    pub template_id: String,
    pub url: String,
}

/// Beacon sender that records resolved URLs
#[derive(Debug, Default)]
pub struct ReplayBeaconSender {
    pub beacons: Vec<ResolvedBeacon>,
    pub skipped: usize,
}

impl BeaconSender for ReplayBeaconSender {
    fn track(&mut self, templates: &[UrlTemplate], macros: &MacroMap, options: TrackOptions) {
        let now = Utc::now();
        for template in templates {
            if !is_valid_url(&template.url) {
                log::warn!("Skipping template {:?} with invalid URL: {:?}", template.id, template.url);
                self.skipped += 1;
                continue;
            }
            let url = resolve_url(&template.url, macros, options, now);
            log::info!("Beacon: {}", url);
            self.beacons.push(ResolvedBeacon {
                timestamp: now,
                template_id: template.id.clone(),
                url,
            });
        }
    }
}

/// Substitute `[NAME]` and `%%NAME%%` placeholders with encoded values
///
/// `TIMESTAMP` and `CACHEBUSTING` default to values derived from `now`.
/// Unknown placeholders are left in place.
pub fn resolve_url(template: &str, macros: &MacroMap, options: TrackOptions, now: DateTime<Utc>) -> String {
    let cache_busting = format!("{:08}", now.timestamp_subsec_nanos() % 100_000_000);
    let defaults = MacroMap::new()
        .with(Macro::Timestamp, now.to_rfc3339_opts(SecondsFormat::Millis, true))
        .with(Macro::CacheBusting, cache_busting.as_str())
        .with("RANDOM", cache_busting.as_str());

    let mut effective = defaults.merged_with(macros);
    if let Some(code) = effective.get(&Macro::ErrorCode) {
        if !options.is_custom_code && !is_vast_error_code(code) {
            effective.insert(Macro::ErrorCode, UNDEFINED_ERROR_CODE);
        }
    }

    let mut url = template.to_string();
    for (name, value) in &effective {
        let encoded = encode_uri_component(value);
        url = url
            .replace(&format!("[{}]", name), &encoded)
            .replace(&format!("%%{}%%", name), &encoded);
    }
    url
}

/// Only absolute http(s) and protocol-relative URLs are fired
pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    ["http://", "https://", "//"]
        .iter()
        .any(|prefix| url.len() > prefix.len() && url.starts_with(prefix))
}

fn is_vast_error_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit())
}
