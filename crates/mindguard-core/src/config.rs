//! TOML-based configuration.
//!
//! Holds the scheduler's timing options and the simulation seed. Stored at
//! `~/.config/mindguard/config.toml` (`MINDGUARD_ENV=dev` switches to
//! `mindguard-dev`). Missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::clock::Millis;
use crate::error::ConfigError;

/// Timing options for [`crate::NotificationScheduler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// A scroll span longer than this asks for an intervention.
    #[serde(default = "default_intervention_threshold_secs")]
    pub intervention_threshold_secs: u64,
    /// Quiet period that closes a scroll span.
    #[serde(default = "default_debounce_window_ms")]
    pub debounce_window_ms: Millis,
    /// An unanswered intervention hides itself after this long.
    #[serde(default = "default_auto_dismiss_ms")]
    pub auto_dismiss_ms: Millis,
    #[serde(default = "default_break_interval_ms")]
    pub break_interval_ms: Millis,
    /// Delay before re-suggesting after a skipped break.
    #[serde(default = "default_break_skip_rearm_ms")]
    pub break_skip_rearm_ms: Millis,
    /// One countdown second, for breaks and the focus challenge.
    #[serde(default = "default_break_tick_ms")]
    pub break_tick_ms: Millis,
    #[serde(default = "default_feed_refresh_interval_ms")]
    pub feed_refresh_interval_ms: Millis,
    /// Number of distinct cards per feed draw.
    #[serde(default = "default_feed_size")]
    pub feed_size: usize,
    #[serde(default = "default_demo_trigger_delay_ms")]
    pub demo_trigger_delay_ms: Millis,
    #[serde(default = "default_dashboard_reveal_delay_ms")]
    pub dashboard_reveal_delay_ms: Millis,
    /// Delay before the community challenge widget appears.
    #[serde(default = "default_challenge_reveal_delay_ms")]
    pub challenge_reveal_delay_ms: Millis,
    /// Length of the focus challenge countdown.
    #[serde(default = "default_challenge_duration_secs")]
    pub challenge_duration_secs: u32,
    /// Breaths in one mindful breathing exercise.
    #[serde(default = "default_breath_count")]
    pub breath_count: u32,
    #[serde(default = "default_inhale_ms")]
    pub inhale_ms: Millis,
    #[serde(default = "default_exhale_ms")]
    pub exhale_ms: Millis,
}

fn default_intervention_threshold_secs() -> u64 {
    10
}
fn default_debounce_window_ms() -> Millis {
    1_000
}
fn default_auto_dismiss_ms() -> Millis {
    10_000
}
fn default_break_interval_ms() -> Millis {
    25 * 60 * 1_000
}
fn default_break_skip_rearm_ms() -> Millis {
    5 * 60 * 1_000
}
fn default_break_tick_ms() -> Millis {
    1_000
}
fn default_feed_refresh_interval_ms() -> Millis {
    300_000
}
fn default_feed_size() -> usize {
    3
}
fn default_demo_trigger_delay_ms() -> Millis {
    30_000
}
fn default_dashboard_reveal_delay_ms() -> Millis {
    10_000
}
fn default_challenge_reveal_delay_ms() -> Millis {
    5_000
}
fn default_challenge_duration_secs() -> u32 {
    120
}
fn default_breath_count() -> u32 {
    5
}
fn default_inhale_ms() -> Millis {
    3_000
}
fn default_exhale_ms() -> Millis {
    2_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            intervention_threshold_secs: default_intervention_threshold_secs(),
            debounce_window_ms: default_debounce_window_ms(),
            auto_dismiss_ms: default_auto_dismiss_ms(),
            break_interval_ms: default_break_interval_ms(),
            break_skip_rearm_ms: default_break_skip_rearm_ms(),
            break_tick_ms: default_break_tick_ms(),
            feed_refresh_interval_ms: default_feed_refresh_interval_ms(),
            feed_size: default_feed_size(),
            demo_trigger_delay_ms: default_demo_trigger_delay_ms(),
            dashboard_reveal_delay_ms: default_dashboard_reveal_delay_ms(),
            challenge_reveal_delay_ms: default_challenge_reveal_delay_ms(),
            challenge_duration_secs: default_challenge_duration_secs(),
            breath_count: default_breath_count(),
            inhale_ms: default_inhale_ms(),
            exhale_ms: default_exhale_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn intervention_threshold_ms(&self) -> Millis {
        self.intervention_threshold_secs.saturating_mul(1_000)
    }

    /// Reject values that would make a timer fire continuously.
    ///
    /// One-shot delays (`demo_trigger_delay_ms`, `dashboard_reveal_delay_ms`,
    /// `challenge_reveal_delay_ms`) may be zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("scheduler.debounce_window_ms", self.debounce_window_ms),
            ("scheduler.auto_dismiss_ms", self.auto_dismiss_ms),
            ("scheduler.break_interval_ms", self.break_interval_ms),
            ("scheduler.break_skip_rearm_ms", self.break_skip_rearm_ms),
            ("scheduler.break_tick_ms", self.break_tick_ms),
            ("scheduler.feed_refresh_interval_ms", self.feed_refresh_interval_ms),
            ("scheduler.inhale_ms", self.inhale_ms),
            ("scheduler.exhale_ms", self.exhale_ms),
            (
                "scheduler.challenge_duration_secs",
                u64::from(self.challenge_duration_secs),
            ),
            ("scheduler.breath_count", u64::from(self.breath_count)),
            ("scheduler.feed_size", self.feed_size as u64),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }
}

/// Simulation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for break and feed selection. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Returns `~/.config/mindguard[-dev]/` based on MINDGUARD_ENV.
pub fn data_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDGUARD_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("mindguard-dev")
    } else {
        base_dir.join("mindguard")
    }
}

impl Config {
    /// Default config file location.
    pub fn path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    /// Load from `path`, or defaults if the file is absent.
    ///
    /// Unlike a missing file, a file that exists but does not parse or
    /// validate is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                })
            }
        };
        let cfg: Config = toml::from_str(&content)?;
        cfg.scheduler.validate()?;
        Ok(cfg)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.into(),
                message: e.to_string(),
            })?;
        updated.scheduler.validate()?;
        *self = updated;
        Ok(())
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            current = current.get_mut(part).ok_or_else(unknown)?;
            continue;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(part).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            // Optional numbers (the seed) serialize as null until set.
            serde_json::Value::Number(_) | serde_json::Value::Null => {
                if value == "none" || value == "null" {
                    serde_json::Value::Null
                } else {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
            }
            serde_json::Value::Object(_) => return Err(unknown()),
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(part.to_string(), new_value);
        return Ok(());
    }

    Err(unknown())
}
