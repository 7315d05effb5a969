//! Main tracker API
//!
//! A [`VastTracker`] is created when playback of one creative starts and
//! dropped when the player moves past it. It owns all per-ad state, decides
//! which VAST events are due, notifies listeners through the injected
//! [`NotificationSink`] and hands URL templates to the [`BeaconSender`].

use crate::config::TrackerConfig;
use crate::events::{Quartile, TrackingEvent};
use crate::macros::{
    build_clickthrough_url, convert_to_timecode, encode_uri_component, resolve, Macro, MacroMap,
    MacroResolver,
};
use crate::progress::ProgressTracker;
use crate::sink::{BeaconSender, Notification, NotificationSink, TrackOptions};
use crate::types::{Ad, Creative, Result, TrackerError, UrlTemplate};

/// Tracking-event key for verification vendors that were not executed
const VERIFICATION_NOT_EXECUTED: &str = "verificationNotExecuted";

/// Notification name carrying the built click-through URL
const CLICKTHROUGH: &str = "clickthrough";

/// Notification name carrying the remaining skip delay
const SKIP_COUNTDOWN: &str = "skip-countdown";

/// Tracks one creative of one ad
pub struct VastTracker<'a, B, N>
where
    B: BeaconSender,
    N: NotificationSink,
{
    ad: &'a Ad,
    creative: &'a Creative,
    sender: B,
    sink: N,
    config: TrackerConfig,
    resolver: MacroResolver,
    progress: ProgressTracker,
    impressed: bool,
    muted: bool,
    paused: bool,
    fullscreen: bool,
    expanded: bool,
    skip_delay: Option<f64>,
    skippable: bool,
    /// Set by `not_used`; silences every later creative-level event
    disabled: bool,
}

impl<'a, B, N> VastTracker<'a, B, N>
where
    B: BeaconSender,
    N: NotificationSink,
{
    /// Create a tracker with the default configuration
    pub fn new(ad: &'a Ad, creative: &'a Creative, sender: B, sink: N) -> Self {
        Self::with_config(ad, creative, sender, sink, TrackerConfig::default())
    }

    /// Create a tracker with an explicit configuration
    pub fn with_config(
        ad: &'a Ad,
        creative: &'a Creative,
        sender: B,
        sink: N,
        config: TrackerConfig,
    ) -> Self {
        let asset_duration = config.asset_duration.unwrap_or(creative.duration);
        let skip_delay = config.skip_delay.or(creative.skip_delay);

        log::debug!(
            "Tracking creative {:?} of ad {:?} (duration {}s, skip delay {:?})",
            creative.id,
            ad.id,
            asset_duration,
            skip_delay
        );

        Self {
            ad,
            creative,
            sender,
            sink,
            resolver: MacroResolver::new(ad, creative),
            progress: ProgressTracker::new(asset_duration),
            impressed: false,
            muted: config.muted,
            paused: false,
            fullscreen: false,
            expanded: false,
            skip_delay,
            skippable: false,
            disabled: false,
            config,
        }
    }

    pub fn ad(&self) -> &'a Ad {
        self.ad
    }

    pub fn creative(&self) -> &'a Creative {
        self.creative
    }

    pub fn sender(&self) -> &B {
        &self.sender
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Consume the tracker, returning the injected sender and sink
    pub fn into_parts(self) -> (B, N) {
        (self.sender, self.sink)
    }

    pub fn asset_duration(&self) -> f64 {
        self.progress.asset_duration
    }

    pub fn last_percentage(&self) -> u32 {
        self.progress.last_percentage
    }

    /// Overwrite the highest ticked percentage
    ///
    /// The next `set_progress` backfills every percentage above this value.
    pub fn set_last_percentage(&mut self, percentage: u32) {
        self.progress.last_percentage = percentage.min(100);
    }

    /// Last reported playhead in seconds
    pub fn progress(&self) -> f64 {
        self.progress.progress()
    }

    pub fn impressed(&self) -> bool {
        self.impressed
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn skip_delay(&self) -> Option<f64> {
        self.skip_delay
    }

    /// The skip countdown has elapsed
    pub fn is_skippable(&self) -> bool {
        self.skippable
    }

    /// Format seconds as an `HH:MM:SS.mmm` timecode
    pub fn convert_to_timecode(seconds: f64) -> String {
        convert_to_timecode(seconds)
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.progress.asset_duration = duration;
    }

    pub fn set_skip_delay(&mut self, skip_delay: impl Into<Option<f64>>) {
        self.skip_delay = skip_delay.into();
    }

    /// Update the mute state
    ///
    /// Anything but a boolean different from the current state is ignored.
    pub fn set_muted(&mut self, muted: impl Into<Option<bool>>, macros: &MacroMap) {
        let Some(muted) = muted.into() else {
            log::trace!("Ignoring non-boolean mute state");
            return;
        };
        if muted == self.muted {
            return;
        }
        self.muted = muted;
        let event = if muted { TrackingEvent::Mute } else { TrackingEvent::Unmute };
        self.track(event.as_str(), macros);
    }

    /// Overwrite the mute flag without firing `mute` or `unmute`
    pub fn set_muted_state(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Update the paused state, firing `pause` or `resume` on change
    pub fn set_paused(&mut self, paused: bool, macros: &MacroMap) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        let event = if paused { TrackingEvent::Pause } else { TrackingEvent::Resume };
        self.track(event.as_str(), macros);
    }

    /// Update the fullscreen state, firing `fullscreen` or `exitFullscreen` on change
    pub fn set_fullscreen(&mut self, fullscreen: bool, macros: &MacroMap) {
        if fullscreen == self.fullscreen {
            return;
        }
        self.fullscreen = fullscreen;
        let event = if fullscreen {
            TrackingEvent::Fullscreen
        } else {
            TrackingEvent::ExitFullscreen
        };
        self.track(event.as_str(), macros);
    }

    /// Update the expanded state of the player
    pub fn set_expand(&mut self, expanded: bool, macros: &MacroMap) {
        if expanded == self.expanded {
            return;
        }
        self.expanded = expanded;
        let (legacy, player) = if expanded {
            (TrackingEvent::Expand, TrackingEvent::PlayerExpand)
        } else {
            (TrackingEvent::Collapse, TrackingEvent::PlayerCollapse)
        };
        self.track(legacy.as_str(), macros);
        self.track(player.as_str(), macros);
    }

    /// Report the playhead position in seconds
    ///
    /// Fires, in order: declared `progress-<N>` offsets reached for the
    /// first time, then one `progress-<p>%` for every whole percentage
    /// crossed since the last call, then `rewind` if the playhead went back.
    /// Quartiles are left to [`track_quartiles`](Self::track_quartiles).
    pub fn set_progress(&mut self, current_time: f64, macros: &MacroMap) {
        self.update_skip_countdown(current_time);

        let creative = self.creative;
        let step = self
            .progress
            .advance(current_time, creative.tracking_events.keys().map(String::as_str));

        for event in &step.events {
            self.track(event, macros);
        }
        if step.rewound {
            self.track(TrackingEvent::Rewind.as_str(), macros);
        }
    }

    fn update_skip_countdown(&mut self, current_time: f64) {
        let Some(skip_delay) = self.skip_delay.filter(|delay| *delay >= 0.0) else {
            return;
        };
        if self.skippable || !current_time.is_finite() {
            return;
        }

        let remaining = if skip_delay > current_time {
            skip_delay - current_time
        } else {
            self.skippable = true;
            0.0
        };
        self.sink
            .notify(SKIP_COUNTDOWN, Notification::SkipCountdown { remaining });
    }

    /// Whether `quartile`, due at `quartile_offset` seconds, is reached at
    /// `position` seconds (see [`ProgressTracker::is_quartile_reached`])
    pub fn is_quartile_reached(&self, quartile: Quartile, quartile_offset: f64, position: f64) -> bool {
        self.progress.is_quartile_reached(quartile, quartile_offset, position)
    }

    /// Fire every quartile reached at the current playhead, once each
    pub fn track_quartiles(&mut self, macros: &MacroMap) -> Vec<Quartile> {
        let due = self.progress.due_quartiles();
        for quartile in &due {
            self.progress.mark_quartile(*quartile);
            self.track(quartile.event().as_str(), macros);
        }
        due
    }

    /// Fire a creative-level event
    ///
    /// Events the creative does not declare are silently skipped.
    pub fn fire_event(&mut self, event: TrackingEvent, macros: &MacroMap) {
        self.track(event.as_str(), macros);
    }

    pub fn minimize(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::Minimize, macros);
    }

    pub fn other_ad_interaction(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::OtherAdInteraction, macros);
    }

    pub fn accept_invitation(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::AcceptInvitation, macros);
    }

    pub fn ad_expand(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::AdExpand, macros);
    }

    pub fn ad_collapse(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::AdCollapse, macros);
    }

    pub fn skip(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::Skip, macros);
    }

    pub fn load(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::Loaded, macros);
    }

    /// Fire `complete`; it will not fire again through `track_quartiles`
    pub fn complete(&mut self, macros: &MacroMap) {
        self.progress.mark_quartile(Quartile::Complete);
        self.fire_event(TrackingEvent::Complete, macros);
    }

    /// Fire `closeLinear` for linear creatives, `close` otherwise
    pub fn close(&mut self, macros: &MacroMap) {
        let event = if self.creative.is_linear() {
            TrackingEvent::CloseLinear
        } else {
            TrackingEvent::Close
        };
        self.fire_event(event, macros);
    }

    /// Fire `notUsed`, then stop tracking creative-level events
    pub fn not_used(&mut self, macros: &MacroMap) {
        self.fire_event(TrackingEvent::NotUsed, macros);
        self.disabled = true;
    }

    /// Fire `overlayViewDuration` with `ADPLAYHEAD` set to the viewed duration
    pub fn overlay_view_duration(&mut self, viewed_seconds: f64, macros: &MacroMap) {
        let computed = self
            .resolver
            .computed(self.progress.progress())
            .with(Macro::AdPlayhead, convert_to_timecode(viewed_seconds));
        self.dispatch(TrackingEvent::OverlayViewDuration.as_str(), macros, &computed);
    }

    /// Report a click on the creative
    ///
    /// Notifies `clickthrough` with `url` (or the creative's click-through
    /// target) suffixed with the encoded playhead, then fires the click
    /// tracking templates.
    pub fn click(&mut self, url: Option<&str>, macros: &MacroMap) {
        let creative = self.creative;
        let timecode = convert_to_timecode(self.progress.progress());

        let target = url.or_else(|| {
            creative
                .video_click_through_url_template
                .as_ref()
                .map(|template| template.url.as_str())
        });
        match target {
            Some(target) => {
                let url = build_clickthrough_url(target, &encode_uri_component(&timecode));
                self.sink.notify(CLICKTHROUGH, Notification::ClickThrough { url });
            }
            None => log::debug!("Click without a click-through target"),
        }

        let computed = MacroMap::new().with(Macro::AdPlayhead, timecode);
        self.track_urls(
            &creative.video_click_tracking_url_templates,
            &resolve(macros, &computed),
            TrackOptions::default(),
        );
    }

    /// Report that a verification vendor's script was not executed
    ///
    /// # Errors
    /// Fails when the ad has no verifications, when `vendor` is empty, or when
    /// no verification entry belongs to `vendor`.
    pub fn verification_not_executed(&mut self, vendor: &str, macros: &MacroMap) -> Result<()> {
        let ad = self.ad;
        if ad.ad_verifications.is_empty() {
            return Err(TrackerError::NoAdVerifications);
        }
        if vendor.is_empty() {
            return Err(TrackerError::NoVendorProvided);
        }

        let verification = ad
            .ad_verifications
            .iter()
            .find(|v| v.vendor.as_deref() == Some(vendor))
            .ok_or_else(|| TrackerError::VerificationVendorNotFound(vendor.to_string()))?;

        match verification.tracking_events.get(VERIFICATION_NOT_EXECUTED) {
            Some(templates) => {
                self.sink
                    .notify(VERIFICATION_NOT_EXECUTED, Notification::tracking_urls(templates));
                self.track_urls(templates, &resolve(macros, &MacroMap::new()), TrackOptions::default());
            }
            None => log::debug!("Vendor '{}' declares no {} tracking", vendor, VERIFICATION_NOT_EXECUTED),
        }
        Ok(())
    }

    /// Fire impression pixels and `creativeView`, at most once per tracker
    pub fn track_impression(&mut self, macros: &MacroMap) {
        if self.impressed {
            log::trace!("Impression already tracked");
            return;
        }
        let ad = self.ad;
        self.track_urls(&ad.impression_url_templates, macros, TrackOptions::default());
        self.track(TrackingEvent::CreativeView.as_str(), macros);
        self.impressed = true;
    }

    /// Fire the ad's error pixels
    pub fn error(&mut self, macros: &MacroMap, is_custom_code: bool) {
        let ad = self.ad;
        self.track_urls(
            &ad.error_url_templates,
            macros,
            TrackOptions::custom_code(is_custom_code),
        );
    }

    /// Fire the ad's error pixels with `ERRORCODE` set to `code`
    pub fn error_with_code(&mut self, code: &str, is_custom_code: bool) {
        self.error(&MacroMap::new().with(Macro::ErrorCode, code), is_custom_code);
    }

    /// Notify `event` and fire its URL templates with the computed macros
    pub fn track(&mut self, event: &str, macros: &MacroMap) {
        let computed = self.resolver.computed(self.progress.progress());
        self.dispatch(event, macros, &computed);
    }

    fn dispatch(&mut self, event: &str, macros: &MacroMap, computed: &MacroMap) {
        if self.disabled {
            log::trace!("Tracker disabled, dropping '{}'", event);
            return;
        }

        let creative = self.creative;
        let tracking_events = &creative.tracking_events;

        // closeLinear only exists since VAST 3
        let close_linear = TrackingEvent::CloseLinear.as_str();
        let close = TrackingEvent::Close.as_str();
        let key = if event == close_linear
            && !tracking_events.contains_key(close_linear)
            && tracking_events.contains_key(close)
        {
            close
        } else {
            event
        };

        match tracking_events.get(key) {
            Some(templates) => {
                log::debug!("Tracking '{}' ({} URLs)", key, templates.len());
                self.sink.notify(key, Notification::tracking_urls(templates));
                self.track_urls(templates, &resolve(macros, computed), TrackOptions::default());
            }
            None if self.config.always_notify_lifecycle && is_lifecycle(key) => {
                self.sink.notify(key, Notification::Empty);
            }
            None => log::trace!("No tracking URLs declared for '{}'", key),
        }
    }

    /// Forward templates to the beacon sender unchanged
    pub fn track_urls(&mut self, templates: &[UrlTemplate], macros: &MacroMap, options: TrackOptions) {
        self.sender.track(templates, macros, options);
    }
}

fn is_lifecycle(event: &str) -> bool {
    event
        .parse::<TrackingEvent>()
        .map(|e| e.is_lifecycle())
        .unwrap_or(false)
}
