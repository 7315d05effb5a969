//! VAST tracking event names
//!
//! Creative-level tracking events form a closed set; the parameterised
//! progress events (`progress-5`, `progress-50%`) are addressed by key
//! helpers instead.

use crate::types::TrackerError;
use std::fmt;
use std::str::FromStr;

/// Creative-level VAST tracking events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingEvent {
    CreativeView,
    Start,
    FirstQuartile,
    Midpoint,
    ThirdQuartile,
    Complete,
    Mute,
    Unmute,
    Pause,
    Resume,
    Rewind,
    Skip,
    CloseLinear,
    Close,
    Fullscreen,
    ExitFullscreen,
    Expand,
    Collapse,
    PlayerExpand,
    PlayerCollapse,
    Minimize,
    OtherAdInteraction,
    AcceptInvitation,
    AcceptInvitationLinear,
    AdExpand,
    AdCollapse,
    OverlayViewDuration,
    NotUsed,
    Loaded,
    TimeSpentViewing,
}

impl TrackingEvent {
    /// Every event, in declaration order
    pub const ALL: [TrackingEvent; 30] = [
        TrackingEvent::CreativeView,
        TrackingEvent::Start,
        TrackingEvent::FirstQuartile,
        TrackingEvent::Midpoint,
        TrackingEvent::ThirdQuartile,
        TrackingEvent::Complete,
        TrackingEvent::Mute,
        TrackingEvent::Unmute,
        TrackingEvent::Pause,
        TrackingEvent::Resume,
        TrackingEvent::Rewind,
        TrackingEvent::Skip,
        TrackingEvent::CloseLinear,
        TrackingEvent::Close,
        TrackingEvent::Fullscreen,
        TrackingEvent::ExitFullscreen,
        TrackingEvent::Expand,
        TrackingEvent::Collapse,
        TrackingEvent::PlayerExpand,
        TrackingEvent::PlayerCollapse,
        TrackingEvent::Minimize,
        TrackingEvent::OtherAdInteraction,
        TrackingEvent::AcceptInvitation,
        TrackingEvent::AcceptInvitationLinear,
        TrackingEvent::AdExpand,
        TrackingEvent::AdCollapse,
        TrackingEvent::OverlayViewDuration,
        TrackingEvent::NotUsed,
        TrackingEvent::Loaded,
        TrackingEvent::TimeSpentViewing,
    ];

    /// Key of this event in a creative's tracking-event map
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingEvent::CreativeView => "creativeView",
            TrackingEvent::Start => "start",
            TrackingEvent::FirstQuartile => "firstQuartile",
            TrackingEvent::Midpoint => "midpoint",
            TrackingEvent::ThirdQuartile => "thirdQuartile",
            TrackingEvent::Complete => "complete",
            TrackingEvent::Mute => "mute",
            TrackingEvent::Unmute => "unmute",
            TrackingEvent::Pause => "pause",
            TrackingEvent::Resume => "resume",
            TrackingEvent::Rewind => "rewind",
            TrackingEvent::Skip => "skip",
            TrackingEvent::CloseLinear => "closeLinear",
            TrackingEvent::Close => "close",
            TrackingEvent::Fullscreen => "fullscreen",
            TrackingEvent::ExitFullscreen => "exitFullscreen",
            TrackingEvent::Expand => "expand",
            TrackingEvent::Collapse => "collapse",
            TrackingEvent::PlayerExpand => "playerExpand",
            TrackingEvent::PlayerCollapse => "playerCollapse",
            TrackingEvent::Minimize => "minimize",
            TrackingEvent::OtherAdInteraction => "otherAdInteraction",
            TrackingEvent::AcceptInvitation => "acceptInvitation",
            TrackingEvent::AcceptInvitationLinear => "acceptInvitationLinear",
            TrackingEvent::AdExpand => "adExpand",
            TrackingEvent::AdCollapse => "adCollapse",
            TrackingEvent::OverlayViewDuration => "overlayViewDuration",
            TrackingEvent::NotUsed => "notUsed",
            TrackingEvent::Loaded => "loaded",
            TrackingEvent::TimeSpentViewing => "timeSpentViewing",
        }
    }

    /// Lifecycle events notify listeners even when the creative declares no URLs
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            TrackingEvent::CreativeView
                | TrackingEvent::Start
                | TrackingEvent::FirstQuartile
                | TrackingEvent::Midpoint
                | TrackingEvent::ThirdQuartile
                | TrackingEvent::Complete
                | TrackingEvent::Resume
                | TrackingEvent::Pause
                | TrackingEvent::Rewind
                | TrackingEvent::Skip
                | TrackingEvent::CloseLinear
                | TrackingEvent::Close
        )
    }
}

impl fmt::Display for TrackingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrackingEvent {
    type Err = TrackerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TrackingEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| TrackerError::UnknownEvent(s.to_string()))
    }
}

/// The five canonical playback checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quartile {
    Start,
    FirstQuartile,
    Midpoint,
    ThirdQuartile,
    Complete,
}

impl Quartile {
    pub const ALL: [Quartile; 5] = [
        Quartile::Start,
        Quartile::FirstQuartile,
        Quartile::Midpoint,
        Quartile::ThirdQuartile,
        Quartile::Complete,
    ];

    /// Threshold as a percentage of the asset duration
    pub fn threshold_percent(&self) -> f64 {
        match self {
            Quartile::Start => 0.0,
            Quartile::FirstQuartile => 25.0,
            Quartile::Midpoint => 50.0,
            Quartile::ThirdQuartile => 75.0,
            Quartile::Complete => 100.0,
        }
    }

    /// The tracking event fired when this quartile is reached
    pub fn event(&self) -> TrackingEvent {
        match self {
            Quartile::Start => TrackingEvent::Start,
            Quartile::FirstQuartile => TrackingEvent::FirstQuartile,
            Quartile::Midpoint => TrackingEvent::Midpoint,
            Quartile::ThirdQuartile => TrackingEvent::ThirdQuartile,
            Quartile::Complete => TrackingEvent::Complete,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Quartile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event().as_str())
    }
}

impl FromStr for Quartile {
    type Err = TrackerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Quartile::ALL
            .iter()
            .copied()
            .find(|q| q.event().as_str() == s)
            .ok_or_else(|| TrackerError::UnknownQuartile(s.to_string()))
    }
}

/// Set of quartiles that already fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QuartileSet([bool; 5]);

impl QuartileSet {
    pub(crate) fn contains(&self, quartile: Quartile) -> bool {
        self.0[quartile.index()]
    }

    pub(crate) fn insert(&mut self, quartile: Quartile) {
        self.0[quartile.index()] = true;
    }
}

/// Key of the percentage progress event for `percent`
pub fn progress_percent_key(percent: u32) -> String {
    format!("progress-{}%", percent)
}

/// Offset in seconds of an absolute progress key (`progress-<N>`)
///
/// Percentage keys (`progress-<N>%`) and anything else return `None`.
pub fn parse_progress_offset(key: &str) -> Option<f64> {
    let offset = key.strip_prefix("progress-")?;
    if offset.ends_with('%') {
        return None;
    }
    offset.parse::<f64>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}
