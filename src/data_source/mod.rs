// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Track Data Sources
//!
//! Where track points, persisted summaries and geofences come from.
//!
//! The analytics and playback layers never see storage details. Every
//! backend implements [`TrackSource`] and hands back normalized, sorted
//! [`TrackPoint`]s:
//!
//! - [`InMemoryTrackSource`]: fixtures and embedding
//! - [`JsonTrackSource`]: an exported document tree on disk
//! - [`SqliteTrackSource`]: a local SQLite database

use crate::models::{Geofence, SummaryRecord, TrackPoint};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub mod json;
pub mod memory;
pub mod raw;
pub mod sqlite;

pub use json::JsonTrackSource;
pub use memory::InMemoryTrackSource;
pub use raw::{normalize_logs, validate_geofence, RawTimestamp, RawTrackLog};
pub use sqlite::SqliteTrackSource;

/// Errors raised while turning stored records into models
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid track record: {0}")]
    InvalidRecord(String),

    #[error("invalid geofence '{id}': {reason}")]
    InvalidGeofence { id: String, reason: String },
}

/// Read access to an employee's tracking data
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &'static str;

    /// Points for one employee-day, sorted by timestamp
    ///
    /// A day without data yields an empty list, not an error.
    async fn fetch_points(&self, employee_id: &str, date: NaiveDate) -> Result<Vec<TrackPoint>>;

    /// Previously persisted summary for the employee-day, if any
    async fn fetch_summary(&self, employee_id: &str, date: NaiveDate) -> Result<Option<SummaryRecord>>;

    /// Work area assigned to the employee, if any
    async fn fetch_geofence(&self, employee_id: &str) -> Result<Option<Geofence>>;
}
