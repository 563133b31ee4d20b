//! Configuration loading and management
//!
//! Handles parsing of `nudge.toml`. Every field has a default, so a
//! missing file or an empty table is a fully working configuration.
//! Resolution order: explicit `--config` path, `$NUDGE_CONFIG`, then
//! `nudge.toml` under the user's config directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scheduler::{DEFAULT_TICK_SECS, DEFAULT_WINDOW_SECS};
use crate::storage::RETENTION_DAYS;

pub const CONFIG_FILE: &str = "nudge.toml";
pub const CONFIG_ENV: &str = "NUDGE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Store file override; defaults to the per-user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: None,
            scheduler: SchedulerConfig::default(),
            retention: RetentionConfig::default(),
            alerts: AlertsConfig::default(),
        }
    }
}

/// Scheduler period and alert window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between evaluation ticks
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Half-width of the alert window, seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
}

fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}

fn default_window_secs() -> i64 {
    DEFAULT_WINDOW_SECS
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            window_secs: default_window_secs(),
        }
    }
}

/// Retention eviction rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Days after creation beyond which events are evicted on load
    #[serde(default = "default_retention_days")]
    pub days: i64,
}

fn default_retention_days() -> i64 {
    RETENTION_DAYS
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_retention_days(),
        }
    }
}

/// Alert side-channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertsConfig {
    /// Attempt desktop notifications
    #[serde(default = "default_true")]
    pub desktop: bool,

    /// Notifier command, invoked as `<command> SUMMARY BODY`
    #[serde(default = "default_notify_command")]
    pub notify_command: String,

    /// Play an audio cue on reminder
    #[serde(default = "default_true")]
    pub sound: bool,

    /// Sound command; terminal bell when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_command: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_notify_command() -> String {
    "notify-send".to_string()
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            desktop: default_true(),
            notify_command: default_notify_command(),
            sound: default_true(),
            sound_command: None,
        }
    }
}

impl Config {
    /// Load from an explicit path; the file must exist and parse.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::InvalidConfig(format!("{}: {err}", path.display()))
        })?;
        let config: Config = toml::from_str(&raw)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the active configuration: `--config`, `$NUDGE_CONFIG`, the
    /// user config dir, then defaults when no file exists.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(from_env) = std::env::var(CONFIG_ENV) {
            let trimmed = from_env.trim();
            if !trimmed.is_empty() {
                return Self::load(Path::new(trimmed));
            }
        }

        if let Some(dirs) = ProjectDirs::from("", "", "nudge") {
            let path = dirs.config_dir().join(CONFIG_FILE);
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.tick_secs == 0 {
            return Err(Error::InvalidConfig(
                "scheduler.tick_secs must be positive".to_string(),
            ));
        }
        if self.scheduler.window_secs < 0 {
            return Err(Error::InvalidConfig(
                "scheduler.window_secs must not be negative".to_string(),
            ));
        }
        if self.retention.days <= 0 {
            return Err(Error::InvalidConfig(
                "retention.days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_engine_constants() {
        let config = Config::default();
        assert_eq!(config.scheduler.tick_secs, 10);
        assert_eq!(config.scheduler.window_secs, 60);
        assert_eq!(config.retention.days, 30);
        assert!(config.alerts.desktop);
        assert_eq!(config.alerts.notify_command, "notify-send");
        assert!(config.store.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[scheduler]\ntick_secs = 5\n\n[alerts]\ndesktop = false\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.scheduler.tick_secs, 5);
        assert_eq!(config.scheduler.window_secs, 60);
        assert!(!config.alerts.desktop);
        assert!(config.alerts.sound);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "unknown_key = 1\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_tick_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "[scheduler]\ntick_secs = 0\n").unwrap();

        assert!(Config::load(&path).is_err());
    }
}
