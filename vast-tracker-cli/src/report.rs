//! Report generation
//!
//! Renders a replayed session as plain text or JSON.

use crate::beacon::ResolvedBeacon;
use crate::config::OutputFormat;
use crate::session::RecordedNotification;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use vast_tracker::{convert_to_timecode, Notification};

const RULE: &str = "═══════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────";

/// Outcome of one replayed session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub generated_at: DateTime<Utc>,
    pub ad_id: Option<String>,
    pub creative_index: usize,
    pub creative_id: Option<String>,
    pub summary: SessionSummary,
    pub notifications: Vec<RecordedNotification>,
    pub beacons: Vec<ResolvedBeacon>,
    pub skipped_templates: usize,
}

/// Tracker state at the end of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub steps: usize,
    pub impressed: bool,
    pub muted: bool,
    pub asset_duration: f64,
    pub progress: f64,
    pub last_percentage: u32,
}

/// Render the report as human-readable text
pub fn render_txt(report: &SessionReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  VAST Tracker - Session Report");
    let _ = writeln!(out, "{}\n", RULE);
    let _ = writeln!(
        out,
        "Generated: {}",
        report.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, "Ad:        {}", report.ad_id.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "Creative:  #{} ({})",
        report.creative_index,
        report.creative_id.as_deref().unwrap_or("-")
    );

    let _ = writeln!(out, "\nSummary");
    let _ = writeln!(out, "{}", THIN_RULE);
    let _ = writeln!(out, "  Steps:           {}", summary.steps);
    let _ = writeln!(out, "  Impressed:       {}", yes_no(summary.impressed));
    let _ = writeln!(out, "  Muted:           {}", yes_no(summary.muted));
    let _ = writeln!(out, "  Duration:        {}s", summary.asset_duration);
    let _ = writeln!(
        out,
        "  Playhead:        {}",
        convert_to_timecode(summary.progress)
    );
    let _ = writeln!(out, "  Last percentage: {}%", summary.last_percentage);

    let _ = writeln!(out, "\nNotifications ({})", report.notifications.len());
    let _ = writeln!(out, "{}", THIN_RULE);
    for notification in &report.notifications {
        let _ = writeln!(
            out,
            "  {:<24} {}",
            notification.event,
            describe(&notification.payload)
        );
    }

    let _ = writeln!(out, "\nBeacons ({})", report.beacons.len());
    let _ = writeln!(out, "{}", THIN_RULE);
    for beacon in &report.beacons {
        let _ = writeln!(out, "  {}", beacon.url);
    }
    if report.skipped_templates > 0 {
        let _ = writeln!(out, "\n⚠️  {} template(s) skipped (invalid URL)", report.skipped_templates);
    }

    out
}

/// Render the report as pretty-printed JSON
pub fn render_json(report: &SessionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Write the report to `path`, or stdout when no path is given
pub fn write_report(report: &SessionReport, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Txt => render_txt(report),
        OutputFormat::Json => render_json(report)?,
    };

    match path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn describe(payload: &Notification) -> String {
    match payload {
        Notification::TrackingUrls {
            tracking_url_templates,
        } => format!("{} URL(s)", tracking_url_templates.len()),
        Notification::Empty => "-".to_string(),
        Notification::ClickThrough { url } => url.clone(),
        Notification::SkipCountdown { remaining } => format!("{}s remaining", remaining),
    }
}
