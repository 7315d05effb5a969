//! Scripted session replay
//!
//! Drives a [`VastTracker`] through the steps of a session file and
//! records what it notified and which beacons it would have fired.

use crate::beacon::ReplayBeaconSender;
use crate::config::{SessionConfig, Step};
use crate::report::{SessionReport, SessionSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use vast_tracker::{Ad, Notification, NotificationSink, TrackingEvent, VastTracker};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Creative index {index} out of range (ad has {count} creatives)")]
    CreativeOutOfRange { index: usize, count: usize },
}

/// A notification emitted by the tracker during replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedNotification {
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub payload: Notification,
}

/// Notification sink that keeps every event in order
#[derive(Debug, Default)]
pub struct SessionRecorder {
    pub notifications: Vec<RecordedNotification>,
}

impl NotificationSink for SessionRecorder {
    fn notify(&mut self, event: &str, payload: Notification) {
        log::debug!("Notification: {}", event);
        self.notifications.push(RecordedNotification {
            timestamp: Utc::now(),
            event: event.to_string(),
            payload,
        });
    }
}

type ReplayTracker<'a> = VastTracker<'a, ReplayBeaconSender, SessionRecorder>;

/// Replay every step of `config` against `ad`
pub fn run(ad: &Ad, config: &SessionConfig) -> Result<SessionReport> {
    let index = config.ad.creative;
    let creative = ad.creatives.get(index).ok_or(SessionError::CreativeOutOfRange {
        index,
        count: ad.creatives.len(),
    })?;

    let mut tracker = VastTracker::with_config(
        ad,
        creative,
        ReplayBeaconSender::default(),
        SessionRecorder::default(),
        config.playback.tracker_config(),
    );

    for (i, step) in config.steps.iter().enumerate() {
        log::info!("Step {}: {:?}", i + 1, step);
        apply_step(&mut tracker, step).with_context(|| format!("Step {} failed", i + 1))?;
    }

    let summary = SessionSummary {
        steps: config.steps.len(),
        impressed: tracker.impressed(),
        muted: tracker.muted(),
        asset_duration: tracker.asset_duration(),
        progress: tracker.progress(),
        last_percentage: tracker.last_percentage(),
    };
    let (sender, recorder) = tracker.into_parts();

    log::info!(
        "Session replayed: {} notifications, {} beacons",
        recorder.notifications.len(),
        sender.beacons.len()
    );

    Ok(SessionReport {
        generated_at: Utc::now(),
        ad_id: ad.id.clone(),
        creative_index: index,
        creative_id: creative.id.clone(),
        summary,
        notifications: recorder.notifications,
        beacons: sender.beacons,
        skipped_templates: sender.skipped,
    })
}

fn apply_step(tracker: &mut ReplayTracker<'_>, step: &Step) -> Result<()> {
    match step {
        Step::Impression { macros } => tracker.track_impression(macros),
        Step::Progress { time, macros } => tracker.set_progress(*time, macros),
        Step::Quartiles { macros } => {
            let fired = tracker.track_quartiles(macros);
            log::debug!("Quartiles fired: {:?}", fired);
        }
        Step::Mute { value, macros } => {
            if value.as_bool().is_none() {
                log::warn!("Ignoring non-boolean mute value: {}", value);
            }
            tracker.set_muted(value.as_bool(), macros);
        }
        Step::Pause { paused, macros } => tracker.set_paused(*paused, macros),
        Step::Fullscreen { fullscreen, macros } => tracker.set_fullscreen(*fullscreen, macros),
        Step::Expand { expanded, macros } => tracker.set_expand(*expanded, macros),
        Step::Click { url, macros } => tracker.click(url.as_deref(), macros),
        Step::Event { name, macros } => {
            let event: TrackingEvent = name.parse()?;
            tracker.fire_event(event, macros);
        }
        Step::OverlayViewDuration { viewed, macros } => tracker.overlay_view_duration(*viewed, macros),
        Step::VerificationNotExecuted { vendor, macros } => {
            tracker.verification_not_executed(vendor, macros)?
        }
        Step::Error { code, custom } => tracker.error_with_code(code, *custom),
        Step::Skip { macros } => tracker.skip(macros),
        Step::Complete { macros } => tracker.complete(macros),
        Step::Close { macros } => tracker.close(macros),
        Step::NotUsed { macros } => tracker.not_used(macros),
        Step::Duration { seconds } => tracker.set_duration(*seconds),
        Step::SkipDelay { seconds } => tracker.set_skip_delay(*seconds),
    }
    Ok(())
}
