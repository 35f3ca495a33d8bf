// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Mandor Tracker
//!
//! Daily activity analytics and route playback for plantation field
//! employees ("mandor"). Location samples flagged as inside or outside the
//! assigned work area are turned into work/outside-area time, scores and
//! advisory messages, and can be replayed step by step for a map.
//!
//! ## Features
//!
//! - **Activity analytics**: left-weighted time integration, peak hour,
//!   status switches, work streak consistency and mobility scores
//! - **Recommendations**: ordered, deterministic advisory messages
//! - **Playback**: a generation-guarded state machine driven by a tokio timer
//! - **Data sources**: in-memory, exported JSON document tree, or SQLite
//!
//! ## Architecture
//!
//! - **Models**: track points, daily summaries and geofences
//! - **Analytics**: the analyzer, derived metrics and the recommendation engine
//! - **Playback**: controller, timer driver and speed presets
//! - **Data sources**: the `TrackSource` pull interface and its backends
//! - **History**: orchestration of one history query and its playback
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mandor_tracker::config::AppConfig;
//! use mandor_tracker::data_source::JsonTrackSource;
//! use mandor_tracker::history::HistoryService;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let source = Arc::new(JsonTrackSource::new("./export"));
//!     let service = HistoryService::new(source, &config);
//!
//!     let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
//!     let report = service.load("mandor-01", date).await?;
//!     println!("Overall score: {}", report.score.overall);
//!
//!     Ok(())
//! }
//! ```

/// Track point, summary and geofence data models
pub mod models;

/// Activity analyzer, metrics and recommendations
pub mod analytics;

/// Route playback state machine and timer driver
pub mod playback;

/// Track data sources (memory, JSON tree, SQLite)
pub mod data_source;

/// History query orchestration
pub mod history;

/// Plain-text report rendering
pub mod report;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Structured logging setup
pub mod logging;
