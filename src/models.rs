// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures shared by the analytics, playback and data source
//! layers. Every model is plain data with `serde` support so it can be read
//! from the document tree, stored in SQLite, or emitted as JSON by the CLI.
//!
//! ## Core Models
//!
//! - [`TrackPoint`]: one timestamped location sample for an employee
//! - [`DailySummary`]: aggregated work/outside-area time for one employee-day
//! - [`ActivityPattern`]: hour buckets, status switches and streak statistics
//! - [`SummaryRecord`]: a persisted summary whose fields may be missing
//! - [`Recommendation`]: an advisory message derived from a summary
//! - [`Geofence`]: the work polygon assigned to an employee

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single location observation of an employee
///
/// Points for one (employee, date) query are ordered non-decreasing by
/// `timestamp`. Whether the point lies inside the work polygon is decided
/// upstream and trusted as given.
///
/// # Examples
///
/// ```rust
/// use mandor_tracker::models::TrackPoint;
/// use chrono::{TimeZone, Utc};
///
/// let point = TrackPoint {
///     timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 7, 30, 0).unwrap(),
///     lat: -0.5021,
///     lng: 101.4478,
///     in_geofence: true,
/// };
/// assert!(point.in_geofence);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    /// Device-reported capture time
    pub timestamp: DateTime<Utc>,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
    /// Whether the point was inside the assigned work polygon
    pub in_geofence: bool,
}

impl TrackPoint {
    /// Coordinates of this point
    pub fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A maximal run of consecutive points inside the geofence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStreak {
    /// Timestamp of the first point of the run
    pub start: DateTime<Utc>,
    /// Timestamp of the last point of the run
    pub end: DateTime<Utc>,
    /// `end - start` in minutes, never negative
    pub duration_minutes: f64,
}

/// Activity pattern derived from a day's points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPattern {
    /// Hour (0-23, configured offset) with the most points
    pub peak_activity_hour: u32,
    /// Point count per hour bucket
    pub hourly_activity: BTreeMap<u32, usize>,
    /// Adjacent pairs whose geofence status differs
    pub total_switches: usize,
    /// 0-100, lower when work streak lengths vary a lot
    pub consistency_score: f64,
    /// 0-100, five points lost per status switch
    pub mobility_score: f64,
    /// Work streaks in chronological order
    pub work_streaks: Vec<WorkStreak>,
}

/// Aggregated activity for one employee-day
///
/// A summary is computed fresh for every query and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub employee_id: String,
    pub date: NaiveDate,
    /// Minutes charged to intervals that started inside the geofence
    pub total_work_minutes: f64,
    /// Minutes charged to intervals that started outside the geofence
    pub total_outside_area_minutes: f64,
    /// Daily target in hours
    pub expected_work_hours: f64,
    pub total_data_points: usize,
    pub first_update: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    /// Absent for an empty day or a persisted summary without points
    pub activity_pattern: Option<ActivityPattern>,
}

impl DailySummary {
    /// Zero-valued summary for a day without points
    pub fn empty(employee_id: impl Into<String>, date: NaiveDate, expected_work_hours: f64) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            total_work_minutes: 0.0,
            total_outside_area_minutes: 0.0,
            expected_work_hours,
            total_data_points: 0,
            first_update: None,
            last_update: None,
            activity_pattern: None,
        }
    }

    /// Work plus outside-area minutes
    pub fn tracked_minutes(&self) -> f64 {
        self.total_work_minutes + self.total_outside_area_minutes
    }
}

/// A previously persisted daily summary
///
/// Persisted documents are written by other tools and may be incomplete;
/// every field is optional and missing values are backfilled from points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    #[serde(default)]
    pub total_work_minutes: Option<f64>,
    #[serde(default)]
    pub total_outside_area_minutes: Option<f64>,
    #[serde(default)]
    pub expected_work_hours: Option<f64>,
    #[serde(default)]
    pub total_data_points: Option<usize>,
    #[serde(default)]
    pub first_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl From<&DailySummary> for SummaryRecord {
    fn from(summary: &DailySummary) -> Self {
        Self {
            total_work_minutes: Some(summary.total_work_minutes),
            total_outside_area_minutes: Some(summary.total_outside_area_minutes),
            expected_work_hours: Some(summary.expected_work_hours),
            total_data_points: Some(summary.total_data_points),
            first_update: summary.first_update,
            last_update: summary.last_update,
        }
    }
}

/// Category of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Success,
    Warning,
    Info,
}

/// Advisory message generated from a daily summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
    pub icon: String,
    pub title: String,
    pub message: String,
}

/// Shape of a drawn geofence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceKind {
    #[default]
    Polygon,
    Polyline,
}

/// Work area assigned to an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Employee the area is assigned to
    pub assigned_to: String,
    #[serde(rename = "type", default)]
    pub kind: GeofenceKind,
    /// Vertices in drawing order, at least two
    pub coordinates: Vec<LatLng>,
}
