//! Tracker configuration types
//!
//! Everything here is optional: a tracker built with the default
//! configuration takes duration and skip delay from the creative and starts
//! unmuted.

use serde::{Deserialize, Serialize};

/// Configuration for a tracker instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Initial mute state of the player
    #[serde(default)]
    pub muted: bool,

    /// Optional: asset duration in seconds, overriding the creative's
    #[serde(default)]
    pub asset_duration: Option<f64>,

    /// Optional: skip delay in seconds, overriding the creative's
    #[serde(default)]
    pub skip_delay: Option<f64>,

    /// Notify lifecycle events even when the creative declares no URLs for them
    #[serde(default = "default_true")]
    pub always_notify_lifecycle: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            muted: false,
            asset_duration: None,
            skip_delay: None,
            always_notify_lifecycle: true,
        }
    }
}

impl TrackerConfig {
    /// Create a new tracker configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the initial mute state
    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// Builder method: override the asset duration
    pub fn with_asset_duration(mut self, seconds: f64) -> Self {
        self.asset_duration = Some(seconds);
        self
    }

    /// Builder method: override the skip delay
    pub fn with_skip_delay(mut self, seconds: f64) -> Self {
        self.skip_delay = Some(seconds);
        self
    }

    /// Builder method: toggle notifications for undeclared lifecycle events
    pub fn with_lifecycle_notifications(mut self, enabled: bool) -> Self {
        self.always_notify_lifecycle = enabled;
        self
    }
}
