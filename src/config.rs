use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timer periods for the recording/analysis cycle, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Elapsed-time ticker period; each tick adds this much recorded time.
    pub tick_ms: u64,
    /// Stops issued before this much recorded time are ignored.
    pub min_recording_ms: u64,
    /// Length of the fake analysis.
    pub analysis_delay_ms: u64,
    /// How often the analysis status message is re-rolled.
    pub status_rotate_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            min_recording_ms: 500,
            analysis_delay_ms: 2000,
            status_rotate_ms: 800,
        }
    }
}

impl Timings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn min_recording(&self) -> Duration {
        Duration::from_millis(self.min_recording_ms)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn status_rotate(&self) -> Duration {
        Duration::from_millis(self.status_rotate_ms.max(1))
    }
}

/// Which synthesizer to hand translations to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechEngine {
    /// First of spd-say, espeak found on PATH.
    #[default]
    Auto,
    SpdSay,
    Espeak,
    Disabled,
}

/// Delivery rate and pitch are fixed, see `speech::SPEECH_RATE` / `speech::SPEECH_PITCH`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub engine: SpeechEngine,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timings: Timings,
    pub speech: SpeechConfig,
}

impl Config {
    /// Directory: ~/.config/bark-translator/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("bark-translator");
        p
    }

    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from the default location. Missing or invalid files give defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
