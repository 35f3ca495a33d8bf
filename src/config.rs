// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the tracker

pub mod analytics_config;

use crate::constants::{defaults, env_config, service};
use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use analytics_config::{AnalyticsConfig, RecommendationThresholds, ScoreWeights};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite URL of the persistent track store
    pub database_url: Option<String>,
    /// Root of a JSON document tree
    pub data_dir: Option<PathBuf>,
    /// Offset used to bucket points by local hour
    pub utc_offset_minutes: i32,
    pub analytics: AnalyticsConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Interval between automatic steps in milliseconds
    pub default_speed_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            data_dir: None,
            utc_offset_minutes: defaults::UTC_OFFSET_MINUTES,
            analytics: AnalyticsConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_speed_ms: defaults::PLAYBACK_SPEED_MS,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, the platform config dir, or the environment
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Self::default_path().to_string_lossy().to_string());

        if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path))
        } else {
            dotenv::dotenv().ok();
            Ok(Self::from_env())
        }
    }

    /// Build configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Self {
            database_url: env_config::database_url(),
            data_dir: env_config::data_dir().map(PathBuf::from),
            utc_offset_minutes: env_config::utc_offset_minutes(),
            ..Self::default()
        };
        config.analytics.expected_work_hours = env_config::expected_work_hours();
        config.playback.default_speed_ms = env_config::playback_speed_ms();
        config
    }

    /// Write the configuration as toml, creating parent directories
    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(|| Self::default_path().to_string_lossy().to_string());

        let parent = Path::new(&config_path).parent()
            .context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }

    /// Timezone used for hour bucketing; UTC when the offset is out of range
    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(service::CONFIG_DIR_NAME).join(service::CONFIG_FILE_NAME))
            .unwrap_or_else(|| service::CONFIG_FILE_NAME.into())
    }
}

/// Fixed offset east of UTC, or UTC itself when out of range
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}
