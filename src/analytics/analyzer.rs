// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Activity analyzer turning a day's track points into a daily summary

use crate::config::{offset_from_minutes, AnalyticsConfig};
use crate::constants::{defaults, scoring, units};
use crate::models::{ActivityPattern, DailySummary, SummaryRecord, TrackPoint, WorkStreak};
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Main analyzer for daily activity summaries
///
/// All operations are pure and infallible: an empty day yields a zero-valued
/// summary and backward timestamps contribute no time.
#[derive(Debug, Clone)]
pub struct ActivityAnalyzer {
    config: AnalyticsConfig,
    utc_offset: FixedOffset,
}

impl Default for ActivityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityAnalyzer {
    /// Create an analyzer with default parameters, bucketing hours in WIB
    pub fn new() -> Self {
        Self {
            config: AnalyticsConfig::default(),
            utc_offset: offset_from_minutes(defaults::UTC_OFFSET_MINUTES),
        }
    }

    /// Create an analyzer with custom parameters
    pub fn with_config(config: AnalyticsConfig, utc_offset: FixedOffset) -> Self {
        Self { config, utc_offset }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Compute a fresh summary from an ordered point list
    ///
    /// `expected_work_hours` falls back to the configured target when absent
    /// or non-positive.
    pub fn compute_summary(
        &self,
        employee_id: &str,
        date: NaiveDate,
        points: &[TrackPoint],
        expected_work_hours: Option<f64>,
    ) -> DailySummary {
        let expected = self.config.resolve_expected_hours(expected_work_hours);

        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return DailySummary::empty(employee_id, date, expected);
        };

        let (total_work_minutes, total_outside_area_minutes) = integrate_minutes(points);

        debug!(
            employee.id = %employee_id,
            date = %date,
            points = points.len(),
            work_minutes = total_work_minutes,
            outside_minutes = total_outside_area_minutes,
            "Computed daily summary"
        );

        DailySummary {
            employee_id: employee_id.to_string(),
            date,
            total_work_minutes,
            total_outside_area_minutes,
            expected_work_hours: expected,
            total_data_points: points.len(),
            first_update: Some(first.timestamp),
            last_update: Some(last.timestamp),
            activity_pattern: self.analyze_pattern(points),
        }
    }

    /// Merge a possibly incomplete persisted summary with the point list
    ///
    /// Without a record the summary is computed from points. With one, its
    /// values win and missing ones are backfilled; the activity pattern always
    /// comes from the points. Negative or non-finite stored minutes count as
    /// missing.
    pub fn reconcile(
        &self,
        employee_id: &str,
        date: NaiveDate,
        record: Option<&SummaryRecord>,
        points: &[TrackPoint],
    ) -> DailySummary {
        let Some(record) = record else {
            return self.compute_summary(employee_id, date, points, None);
        };

        let computed = self.compute_summary(employee_id, date, points, record.expected_work_hours);

        DailySummary {
            total_work_minutes: usable_minutes(record.total_work_minutes)
                .unwrap_or(computed.total_work_minutes),
            total_outside_area_minutes: usable_minutes(record.total_outside_area_minutes)
                .unwrap_or(computed.total_outside_area_minutes),
            total_data_points: record
                .total_data_points
                .filter(|&count| count > 0)
                .unwrap_or(computed.total_data_points),
            first_update: record.first_update.or(computed.first_update),
            last_update: record.last_update.or(computed.last_update),
            ..computed
        }
    }

    /// Hour buckets, status switches and streak statistics
    ///
    /// Returns `None` for an empty list.
    pub fn analyze_pattern(&self, points: &[TrackPoint]) -> Option<ActivityPattern> {
        if points.is_empty() {
            return None;
        }

        let mut hourly_activity: BTreeMap<u32, usize> = BTreeMap::new();
        let mut first_seen: Vec<u32> = Vec::new();
        let mut work_streaks: Vec<WorkStreak> = Vec::new();
        let mut current_streak: Option<WorkStreak> = None;
        let mut total_switches = 0;
        let mut previous_status: Option<bool> = None;

        for point in points {
            let hour = self.local_hour(point.timestamp);
            let count = hourly_activity.entry(hour).or_insert(0);
            if *count == 0 {
                first_seen.push(hour);
            }
            *count += 1;

            if point.in_geofence {
                match current_streak.as_mut() {
                    Some(streak) => {
                        streak.end = point.timestamp;
                        streak.duration_minutes = minutes_between(streak.start, point.timestamp);
                    }
                    None => {
                        current_streak = Some(WorkStreak {
                            start: point.timestamp,
                            end: point.timestamp,
                            duration_minutes: 0.0,
                        });
                    }
                }
            } else if let Some(streak) = current_streak.take() {
                work_streaks.push(streak);
            }

            if previous_status.is_some_and(|status| status != point.in_geofence) {
                total_switches += 1;
            }
            previous_status = Some(point.in_geofence);
        }

        if let Some(streak) = current_streak {
            work_streaks.push(streak);
        }

        // Strictly greater keeps the first-seen hour on ties
        let mut peak: Option<(u32, usize)> = None;
        for hour in first_seen {
            let count = hourly_activity.get(&hour).copied().unwrap_or(0);
            if peak.map_or(true, |(_, best)| count > best) {
                peak = Some((hour, count));
            }
        }
        let peak_activity_hour = peak.map_or(0, |(hour, _)| hour);

        let mobility_score =
            (scoring::MAX_SCORE - total_switches as f64 * self.config.switch_penalty).max(0.0);
        let consistency_score = consistency_score(&work_streaks);

        Some(ActivityPattern {
            peak_activity_hour,
            hourly_activity,
            total_switches,
            consistency_score,
            mobility_score,
            work_streaks,
        })
    }

    fn local_hour(&self, timestamp: DateTime<Utc>) -> u32 {
        timestamp.with_timezone(&self.utc_offset).hour()
    }
}

/// Left-weighted integration of work and outside-area minutes
///
/// Each interval is charged to the status of its earlier point. Backward or
/// equal timestamps contribute zero.
pub fn integrate_minutes(points: &[TrackPoint]) -> (f64, f64) {
    points
        .windows(2)
        .fold((0.0, 0.0), |(work, outside), pair| {
            let delta = minutes_between(pair[0].timestamp, pair[1].timestamp);
            if pair[0].in_geofence {
                (work + delta, outside)
            } else {
                (work, outside + delta)
            }
        })
}

/// Population-variance based consistency of work streak durations
///
/// Zero or one streak scores 100.
pub fn consistency_score(streaks: &[WorkStreak]) -> f64 {
    if streaks.is_empty() {
        return scoring::MAX_SCORE;
    }

    let count = streaks.len() as f64;
    let mean = streaks.iter().map(|s| s.duration_minutes).sum::<f64>() / count;
    let variance = streaks
        .iter()
        .map(|s| (s.duration_minutes - mean).powi(2))
        .sum::<f64>()
        / count;

    (scoring::MAX_SCORE - variance.sqrt()).max(0.0)
}

fn usable_minutes(minutes: Option<f64>) -> Option<f64> {
    minutes.filter(|m| m.is_finite() && *m >= 0.0)
}

fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds() as f64;
    (millis / units::MILLIS_PER_MINUTE).max(0.0)
}
