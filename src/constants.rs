// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable configuration.

/// Service identity
pub mod service {
    /// Service name used in logs and the config directory
    pub const SERVICE_NAME: &str = "mandor-tracker";

    /// Service version from Cargo.toml
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Directory under the platform config dir holding `config.toml`
    pub const CONFIG_DIR_NAME: &str = "mandor-tracker";

    /// Config file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Environment-based configuration
pub mod env_config {
    use std::env;

    /// Get database URL from environment, if configured
    pub fn database_url() -> Option<String> {
        env::var("DATABASE_URL").ok()
    }

    /// Get the document-tree root directory from environment, if configured
    pub fn data_dir() -> Option<String> {
        env::var("DATA_DIR").ok()
    }

    /// Get the UTC offset (minutes) used for hour bucketing
    pub fn utc_offset_minutes() -> i32 {
        env::var("UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::defaults::UTC_OFFSET_MINUTES)
    }

    /// Get the default daily target in hours
    pub fn expected_work_hours() -> f64 {
        env::var("EXPECTED_WORK_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::defaults::EXPECTED_WORK_HOURS)
    }

    /// Get the default playback interval in milliseconds
    pub fn playback_speed_ms() -> u64 {
        env::var("PLAYBACK_SPEED_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::defaults::PLAYBACK_SPEED_MS)
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

/// Default values for analytics and playback
pub mod defaults {
    /// Daily target when a summary does not specify one
    pub const EXPECTED_WORK_HOURS: f64 = 8.0;

    /// Mobility points lost per geofence status switch
    pub const SWITCH_PENALTY: f64 = 5.0;

    /// Consistency/mobility score used when a summary has no activity pattern
    pub const PATTERN_FALLBACK_SCORE: f64 = 70.0;

    /// WIB (UTC+07:00)
    pub const UTC_OFFSET_MINUTES: i32 = 7 * 60;

    /// Interval between automatic playback steps (1x)
    pub const PLAYBACK_SPEED_MS: u64 = 200;

    /// Lower bound for playback intervals
    pub const MIN_PLAYBACK_SPEED_MS: u64 = 1;
}

/// Overall score weights
pub mod scoring {
    pub const EFFICIENCY_WEIGHT: f64 = 0.4;
    pub const PRODUCTIVITY_WEIGHT: f64 = 0.3;
    pub const CONSISTENCY_WEIGHT: f64 = 0.2;
    pub const MOBILITY_WEIGHT: f64 = 0.1;

    /// Score ceiling
    pub const MAX_SCORE: f64 = 100.0;
}

/// Recommendation rule thresholds
pub mod thresholds {
    /// Efficiency (%) below which more working hours are advised
    pub const LOW_EFFICIENCY: f64 = 70.0;
    /// Efficiency (%) above which work-life balance is advised
    pub const HIGH_EFFICIENCY: f64 = 120.0;
    /// Outside-area share (%) above which area focus is advised
    pub const HIGH_OUTSIDE_PERCENTAGE: f64 = 30.0;
    /// Status switch count above which a steadier pattern is advised
    pub const HIGH_SWITCH_COUNT: usize = 20;
    /// Efficiency band (%) for the positive case
    pub const EXCELLENT_EFFICIENCY_MIN: f64 = 90.0;
    pub const EXCELLENT_EFFICIENCY_MAX: f64 = 110.0;
    /// Outside-area share (%) below which the positive case may fire
    pub const EXCELLENT_OUTSIDE_MAX: f64 = 20.0;
}

/// Document-tree layout
pub mod paths {
    /// Directory containing one subdirectory per employee
    pub const EMPLOYEES_DIR: &str = "employees";
    /// Prefix of per-day log files inside an employee directory
    pub const LOGS_PREFIX: &str = "logs_";
    /// Directory holding persisted daily summaries
    pub const DAILY_SUMMARIES_DIR: &str = "daily_summaries";
    /// File listing all geofences
    pub const GEOFENCES_FILE: &str = "geofences.json";
}

/// Unit conversions
pub mod units {
    pub const MINUTES_PER_HOUR: f64 = 60.0;
    pub const MILLIS_PER_MINUTE: f64 = 60_000.0;
}
