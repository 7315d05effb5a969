//! Outbound capabilities injected into the tracker
//!
//! The tracker never fires requests or talks to listeners directly. It hands
//! URL templates to a [`BeaconSender`] and events to a [`NotificationSink`],
//! both supplied by the host player.

use crate::macros::MacroMap;
use crate::types::UrlTemplate;
use serde::{Deserialize, Serialize};

/// Options forwarded to the beacon sender
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOptions {
    /// `ERRORCODE` carries a publisher-specific code rather than a VAST one
    pub is_custom_code: bool,
}

impl TrackOptions {
    pub fn custom_code(is_custom_code: bool) -> Self {
        Self { is_custom_code }
    }
}

/// Fires tracking beacons
///
/// Implementations own placeholder substitution, validity filtering and
/// any retry policy. The tracker forwards templates untouched.
pub trait BeaconSender {
    fn track(&mut self, templates: &[UrlTemplate], macros: &MacroMap, options: TrackOptions);
}

impl<T: BeaconSender + ?Sized> BeaconSender for &mut T {
    fn track(&mut self, templates: &[UrlTemplate], macros: &MacroMap, options: TrackOptions) {
        (**self).track(templates, macros, options)
    }
}

/// Payload delivered with a tracker notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    /// A tracking event with the URL templates about to be fired
    TrackingUrls {
        #[serde(rename = "trackingURLTemplates")]
        tracking_url_templates: Vec<UrlTemplate>,
    },
    /// A lifecycle event the creative declares no URLs for
    Empty,
    /// Fully built click-through URL the player should open
    ClickThrough { url: String },
    /// Seconds remaining before the ad becomes skippable
    SkipCountdown { remaining: f64 },
}

impl Notification {
    pub fn tracking_urls(templates: &[UrlTemplate]) -> Self {
        Notification::TrackingUrls {
            tracking_url_templates: templates.to_vec(),
        }
    }
}

/// Receives tracker events, synchronously and in call order
pub trait NotificationSink {
    fn notify(&mut self, event: &str, payload: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &mut T {
    fn notify(&mut self, event: &str, payload: Notification) {
        (**self).notify(event, payload)
    }
}

/// Sink that only logs notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, event: &str, payload: Notification) {
        log::debug!("Tracker notification '{}': {:?}", event, payload);
    }
}
