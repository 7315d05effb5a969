// Shared fixtures and recording doubles for the integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use vast_tracker::{
    Ad, AdVerification, BeaconSender, Creative, CreativeKind, MacroMap, Notification,
    NotificationSink, TrackOptions, UrlTemplate,
};

/// One call made to the beacon sender
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconCall {
    pub templates: Vec<UrlTemplate>,
    pub macros: MacroMap,
    pub options: TrackOptions,
}

#[derive(Debug, Default)]
pub struct RecordingSender {
    pub calls: Vec<BeaconCall>,
}

impl BeaconSender for RecordingSender {
    fn track(&mut self, templates: &[UrlTemplate], macros: &MacroMap, options: TrackOptions) {
        self.calls.push(BeaconCall {
            templates: templates.to_vec(),
            macros: macros.clone(),
            options,
        });
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub notifications: Vec<(String, Notification)>,
}

impl RecordingSink {
    /// Names of every notification, in order
    pub fn names(&self) -> Vec<&str> {
        self.notifications.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.notifications.iter().filter(|(n, _)| n == name).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, event: &str, payload: Notification) {
        self.notifications.push((event.to_string(), payload));
    }
}

pub fn urls(prefix: &str, names: &[&str]) -> Vec<UrlTemplate> {
    names
        .iter()
        .map(|name| UrlTemplate::new(format!("{}-{}", prefix, name), format!("http://example.com/{}", name)))
        .collect()
}

/// A linear ad shaped like a parsed inline VAST document
pub fn inline_ad() -> Ad {
    let mut tracking_events = BTreeMap::new();
    for event in [
        "creativeView",
        "start",
        "firstQuartile",
        "midpoint",
        "thirdQuartile",
        "complete",
        "mute",
        "unmute",
        "rewind",
        "minimize",
        "otherAdInteraction",
        "acceptInvitation",
        "adExpand",
        "adCollapse",
        "overlayViewDuration",
        "notUsed",
        "progress-5",
        "progress-2%",
        "progress-3%",
        "progress-4%",
        "progress-50%",
    ] {
        tracking_events.insert(event.to_string(), urls("track", &[event]));
    }

    let mut verification_events = BTreeMap::new();
    verification_events.insert(
        "verificationNotExecuted".to_string(),
        vec![UrlTemplate::from_url(
            "http://example.com/verification-not-executed-JS_[REASON]",
        )],
    );

    Ad {
        id: Some("ad-id-1".to_string()),
        impression_url_templates: vec![
            UrlTemplate::new(
                "sample-impression1",
                "http://example.com/impression1_asset:[ASSETURI]_[CACHEBUSTING]",
            ),
            UrlTemplate::new("sample-impression2", "http://example.com/impression2_[random]"),
            UrlTemplate::new("sample-impression3", "//example.com/impression3_[RANDOM]"),
        ],
        error_url_templates: vec![UrlTemplate::from_url("http://example.com/error_[ERRORCODE]")],
        ad_verifications: vec![AdVerification {
            vendor: Some("company.com-omid".to_string()),
            tracking_events: verification_events,
        }],
        creatives: vec![Creative {
            id: Some("id130984".to_string()),
            kind: CreativeKind::Linear,
            duration: 30.0,
            tracking_events,
            video_click_through_url_template: Some(UrlTemplate::new(
                "click-through",
                "http://example.com/linear-clickthrough",
            )),
            video_click_tracking_url_templates: urls("click", &["linear-clicktracking1", "linear-clicktracking2"]),
            ..Creative::default()
        }],
        ..Ad::default()
    }
}
