//! Session configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vast_tracker::{Ad, MacroMap, TrackerConfig};

/// A scripted playback session (loaded from session.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub ad: AdConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdConfig {
    /// JSON ad model, relative to the session file
    pub file: PathBuf,
    /// Index of the creative to track
    #[serde(default)]
    pub creative: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackConfig {
    #[serde(default)]
    pub muted: bool,
    pub duration: Option<f64>,
    pub skip_delay: Option<f64>,
    #[serde(default = "default_true")]
    pub notify_lifecycle: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            muted: false,
            duration: None,
            skip_delay: None,
            notify_lifecycle: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl PlaybackConfig {
    /// Tracker configuration for this playback
    pub fn tracker_config(&self) -> TrackerConfig {
        let mut config = TrackerConfig::new()
            .with_muted(self.muted)
            .with_lifecycle_notifications(self.notify_lifecycle);
        if let Some(duration) = self.duration {
            config = config.with_asset_duration(duration);
        }
        if let Some(skip_delay) = self.skip_delay {
            config = config.with_skip_delay(skip_delay);
        }
        config
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

/// One scripted player action
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Impression {
        #[serde(default)]
        macros: MacroMap,
    },
    Progress {
        time: f64,
        #[serde(default)]
        macros: MacroMap,
    },
    Quartiles {
        #[serde(default)]
        macros: MacroMap,
    },
    /// Any TOML value; non-booleans are ignored by the tracker
    Mute {
        value: toml::Value,
        #[serde(default)]
        macros: MacroMap,
    },
    Pause {
        paused: bool,
        #[serde(default)]
        macros: MacroMap,
    },
    Fullscreen {
        fullscreen: bool,
        #[serde(default)]
        macros: MacroMap,
    },
    Expand {
        expanded: bool,
        #[serde(default)]
        macros: MacroMap,
    },
    Click {
        url: Option<String>,
        #[serde(default)]
        macros: MacroMap,
    },
    /// Any creative-level event by VAST name
    Event {
        name: String,
        #[serde(default)]
        macros: MacroMap,
    },
    OverlayViewDuration {
        viewed: f64,
        #[serde(default)]
        macros: MacroMap,
    },
    VerificationNotExecuted {
        vendor: String,
        #[serde(default)]
        macros: MacroMap,
    },
    Error {
        code: String,
        #[serde(default)]
        custom: bool,
    },
    Skip {
        #[serde(default)]
        macros: MacroMap,
    },
    Complete {
        #[serde(default)]
        macros: MacroMap,
    },
    Close {
        #[serde(default)]
        macros: MacroMap,
    },
    NotUsed {
        #[serde(default)]
        macros: MacroMap,
    },
    Duration {
        seconds: f64,
    },
    SkipDelay {
        seconds: f64,
    },
}

/// Load a session from a TOML file
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {:?}", path))?;

    let config: SessionConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {:?}", path))?;

    Ok(config)
}

/// Load a parsed ad model from a JSON file
pub fn load_ad(path: &Path) -> Result<Ad> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ad file: {:?}", path))?;

    let ad: Ad = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ad file: {:?}", path))?;

    Ok(ad)
}

/// Resolve `file` relative to the directory holding the session file
pub fn resolve_relative(session_path: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match session_path.parent() {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    }
}
