//! Configuration management for worktick.
//!
//! Settings live in `config.json` inside the platform application data
//! directory (see [`DataStorage`]). Each section is optional; a missing
//! file or section falls back to defaults, so `worktick watch` works
//! without any setup against a dashboard on `http://127.0.0.1:5000`.
//!
//! ```rust,no_run
//! use worktick::libs::config::Config;
//!
//! let config = Config::read()?;
//! let tracker = config.tracker.clone().unwrap_or_default();
//! println!("Reporting every {}s to {}", tracker.check_interval, config.api_url());
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::clock::Millis;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Overrides `server.api_url` when set.
pub const API_URL_ENV: &str = "WORKTICK_API_URL";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

pub const DEFAULT_STORAGE_KEY: &str = "activityTrackerState";

/// Upper bound for every configured interval: one year.
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// A section offered by the interactive setup.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Timing and persistence settings of the activity tracker.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Reporting period in seconds. A period counts as worked when the
    /// last activity happened less than one period ago.
    pub check_interval: u64,

    /// Seconds without input after which the status shows Inactive.
    pub activity_timeout: u64,

    /// Status refresh interval in milliseconds.
    pub status_interval: u64,

    /// Seconds a saved state stays eligible for restore.
    pub state_ttl: u64,

    /// Key the state snapshot is stored under.
    pub storage_key: String,
}

impl Default for TrackerConfig {
    /// Five minute periods, 30 second activity window, one second status
    /// refresh, one hour state lifetime.
    fn default() -> Self {
        TrackerConfig {
            check_interval: 300,
            activity_timeout: 30,
            status_interval: 1000,
            state_ttl: 3600,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.check_interval.min(MAX_INTERVAL_SECS))
    }

    pub fn period_millis(&self) -> Millis {
        secs_to_millis(self.check_interval)
    }

    pub fn activity_timeout_millis(&self) -> Millis {
        secs_to_millis(self.activity_timeout)
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_millis(self.status_interval.min(MAX_INTERVAL_SECS * 1000))
    }

    pub fn state_ttl_millis(&self) -> Millis {
        secs_to_millis(self.state_ttl)
    }
}

// Oversized values are clamped, so timers and elapsed-time checks stay in range.
fn secs_to_millis(secs: u64) -> Millis {
    secs.min(MAX_INTERVAL_SECS) as Millis * 1000
}

/// Dashboard server the heartbeat is reported to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Base URL; `/log_activity` is appended.
    pub api_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<TrackerConfig>,
}

impl Config {
    /// Reads the configuration from the default data directory.
    ///
    /// A missing file yields the default configuration; a corrupt one is
    /// an error.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Server base URL: `WORKTICK_API_URL`, then `server.api_url`, then
    /// the local default.
    pub fn api_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.server
            .as_ref()
            .map(|server| server.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Interactive setup, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "server".to_string(),
                name: "Server".to_string(),
            },
            ConfigModule {
                key: "tracker".to_string(),
                name: "Tracker".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "server" => {
                    let default = config.server.clone().unwrap_or(ServerConfig {
                        api_url: DEFAULT_API_URL.to_string(),
                    });
                    msg_print!(Message::ConfigModuleServer);
                    config.server = Some(ServerConfig {
                        api_url: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptServerApiUrl.to_string())
                            .default(default.api_url)
                            .interact_text()?,
                    });
                }
                "tracker" => {
                    let default = config.tracker.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleTracker);
                    config.tracker = Some(TrackerConfig {
                        check_interval: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptCheckInterval.to_string())
                            .default(default.check_interval)
                            .interact_text()?,
                        activity_timeout: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptActivityTimeout.to_string())
                            .default(default.activity_timeout)
                            .interact_text()?,
                        status_interval: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptStatusInterval.to_string())
                            .default(default.status_interval)
                            .interact_text()?,
                        state_ttl: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptStateTtl.to_string())
                            .default(default.state_ttl)
                            .interact_text()?,
                        storage_key: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptStorageKey.to_string())
                            .default(default.storage_key)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
