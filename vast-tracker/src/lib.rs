//! VAST Tracker Library
//!
//! Turns video-ad playback lifecycle events into IAB VAST tracking beacons.
//!
//! # Architecture
//!
//! The library is the stateful event engine between a media player and the
//! beacon transport:
//! - Converts a push-driven playhead into progress and percentage events
//! - Dispatches creative-level events to their declared URL templates
//! - Assembles macro maps, with tracker-computed values taking precedence
//! - Guards once-only flows (impression) and mute-toggle edge cases
//!
//! The library does NOT:
//! - Parse VAST XML (it consumes an already parsed [`Ad`])
//! - Substitute macros or fire requests (that is the [`BeaconSender`])
//! - Own any listener registry (that is the [`NotificationSink`])
//!
//! Everything runs synchronously on the caller's thread.
//!
//! # Example Usage
//!
//! ```
//! use vast_tracker::{
//!     Ad, BeaconSender, Creative, LogSink, MacroMap, TrackOptions, UrlTemplate, VastTracker,
//! };
//!
//! struct PrintSender;
//!
//! impl BeaconSender for PrintSender {
//!     fn track(&mut self, templates: &[UrlTemplate], _macros: &MacroMap, _options: TrackOptions) {
//!         for template in templates {
//!             println!("beacon: {}", template.url);
//!         }
//!     }
//! }
//!
//! let ad = Ad::default();
//! let creative = Creative { duration: 30.0, ..Creative::default() };
//! let mut tracker = VastTracker::new(&ad, &creative, PrintSender, LogSink);
//!
//! let macros = MacroMap::new();
//! tracker.track_impression(&macros);
//! tracker.set_progress(7.5, &macros);
//! tracker.track_quartiles(&macros);
//! assert_eq!(tracker.last_percentage(), 25);
//! ```

// Public modules
pub mod config;
pub mod events;
pub mod macros;
pub mod progress;
pub mod sink;
pub mod tracker;
pub mod types;

// Re-export main types for convenience
pub use config::TrackerConfig;
pub use events::{Quartile, TrackingEvent};
pub use macros::{convert_to_timecode, resolve, Macro, MacroMap, MacroResolver};
pub use progress::{ProgressStep, ProgressTracker};
pub use sink::{BeaconSender, LogSink, Notification, NotificationSink, TrackOptions};
pub use tracker::VastTracker;
pub use types::{
    Ad, AdCategory, AdVerification, Creative, CreativeKind, MediaFile, Result, TrackerError,
    TrackingEventMap, UniversalAdId, UrlTemplate,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
