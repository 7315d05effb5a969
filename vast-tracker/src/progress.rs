//! Playback progress state machine
//!
//! Converts a monotonically advancing playhead into the progress events that
//! became due since the previous update. Percentage ticks are backfilled, so
//! a player reporting progress infrequently still produces every tick in
//! ascending order.

use crate::events::{parse_progress_offset, progress_percent_key, Quartile, QuartileSet};
use std::collections::BTreeSet;

/// Slack allowed between a supplied quartile offset and the computed one
const OFFSET_TOLERANCE: f64 = 0.001;

/// Events produced by one playhead update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressStep {
    /// Progress event keys in firing order
    pub events: Vec<String>,
    /// The playhead moved backwards
    pub rewound: bool,
}

/// Per-instance progress state
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    /// Asset duration in seconds
    pub asset_duration: f64,
    /// Highest whole percentage already ticked
    pub last_percentage: u32,
    progress: f64,
    fired_offsets: BTreeSet<String>,
    triggered_quartiles: QuartileSet,
}

impl ProgressTracker {
    pub fn new(asset_duration: f64) -> Self {
        Self {
            asset_duration,
            ..Self::default()
        }
    }

    /// Last reported playhead in seconds
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Playhead as a percentage of the asset, clamped to `[0, 100]`
    pub fn percentage(&self, current_time: f64) -> f64 {
        if self.asset_duration > 0.0 {
            (current_time * 100.0 / self.asset_duration).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Move the playhead and collect the progress events now due
    ///
    /// `declared` lists the event keys of the creative; only absolute offset
    /// keys among them are considered. Percentage keys are produced for every
    /// whole percent crossed whether declared or not.
    pub fn advance<'k, I>(&mut self, current_time: f64, declared: I) -> ProgressStep
    where
        I: IntoIterator<Item = &'k str>,
    {
        if !current_time.is_finite() {
            log::warn!("Ignoring non-finite playhead: {}", current_time);
            return ProgressStep::default();
        }

        let mut step = ProgressStep {
            events: Vec::new(),
            rewound: current_time < self.progress,
        };

        let mut offsets: Vec<(f64, &str)> = declared
            .into_iter()
            .filter_map(|key| parse_progress_offset(key).map(|offset| (offset, key)))
            .filter(|(offset, key)| *offset <= current_time && !self.fired_offsets.contains(*key))
            .collect();
        offsets.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, key) in offsets {
            self.fired_offsets.insert(key.to_string());
            step.events.push(key.to_string());
        }

        let new_percentage = self.percentage(current_time).floor() as u32;
        for percent in self.last_percentage.saturating_add(1)..=new_percentage {
            step.events.push(progress_percent_key(percent));
        }
        self.last_percentage = self.last_percentage.max(new_percentage);
        self.progress = current_time;

        step
    }

    /// Offset in seconds at which `quartile` falls, when the duration is known
    pub fn quartile_offset(&self, quartile: Quartile) -> Option<f64> {
        (self.asset_duration > 0.0).then(|| self.asset_duration * quartile.threshold_percent() / 100.0)
    }

    /// Whether `quartile`, due at `quartile_offset`, is reached at `position`
    ///
    /// Both values are playhead positions in the same unit (seconds for the
    /// tracker itself). The reported `position` decides; the asset duration
    /// does not. A quartile that already fired is never reached again. With
    /// a known duration, an offset that does not match the quartile's own
    /// threshold is logged.
    pub fn is_quartile_reached(&self, quartile: Quartile, quartile_offset: f64, position: f64) -> bool {
        if self.quartile_fired(quartile) {
            return false;
        }

        if let Some(expected) = self.quartile_offset(quartile) {
            if (expected - quartile_offset).abs() > OFFSET_TOLERANCE {
                log::warn!(
                    "Quartile '{}' checked at {}s, expected {}s for a {}s asset",
                    quartile,
                    quartile_offset,
                    expected,
                    self.asset_duration
                );
            }
        }
        quartile_offset <= position
    }

    /// Quartiles reached at the current playhead that have not fired yet
    ///
    /// Empty until the playhead moved and the duration is known.
    pub fn due_quartiles(&self) -> Vec<Quartile> {
        if self.progress <= 0.0 {
            return Vec::new();
        }
        Quartile::ALL
            .iter()
            .copied()
            .filter(|q| {
                self.quartile_offset(*q)
                    .is_some_and(|offset| self.is_quartile_reached(*q, offset, self.progress))
            })
            .collect()
    }

    /// Record that a quartile fired
    pub fn mark_quartile(&mut self, quartile: Quartile) {
        self.triggered_quartiles.insert(quartile);
    }

    /// Whether `quartile` already fired
    pub fn quartile_fired(&self, quartile: Quartile) -> bool {
        self.triggered_quartiles.contains(quartile)
    }
}
