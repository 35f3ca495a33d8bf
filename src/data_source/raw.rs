// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Raw location logs as written by devices, and their normalization
//!
//! Devices and export tools disagree on the timestamp shape. Everything is
//! converted to `DateTime<Utc>` here so the analyzer only ever sees one
//! representation.

use super::SourceError;
use crate::models::{Geofence, TrackPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp in any of the shapes found in stored logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// `{"seconds": .., "nanoseconds": ..}`, also with leading underscores
    Document {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(alias = "_nanoseconds", default)]
        nanoseconds: u32,
    },
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    /// Milliseconds with a fractional part, as some exporters write them
    FractionalMillis(f64),
    /// RFC 3339 text
    Text(String),
}

impl RawTimestamp {
    pub fn normalize(&self) -> Result<DateTime<Utc>, SourceError> {
        match self {
            Self::Document { seconds, nanoseconds } => DateTime::from_timestamp(*seconds, *nanoseconds)
                .ok_or_else(|| SourceError::InvalidTimestamp(format!("{}s {}ns", seconds, nanoseconds))),
            Self::EpochMillis(millis) => DateTime::from_timestamp_millis(*millis)
                .ok_or_else(|| SourceError::InvalidTimestamp(millis.to_string())),
            Self::FractionalMillis(millis) => fractional_millis(*millis)
                .ok_or_else(|| SourceError::InvalidTimestamp(millis.to_string())),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| SourceError::InvalidTimestamp(text.clone())),
        }
    }
}

fn fractional_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let seconds = (millis / 1000.0).floor();
    let nanos = ((millis - seconds * 1000.0) * 1_000_000.0).round().clamp(0.0, 999_999_999.0);
    DateTime::from_timestamp(seconds as i64, nanos as u32)
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(timestamp: DateTime<Utc>) -> Self {
        Self::Text(timestamp.to_rfc3339())
    }
}

/// One stored location log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrackLog {
    pub device_timestamp: RawTimestamp,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub in_geofence: bool,
}

impl RawTrackLog {
    pub fn normalize(&self) -> Result<TrackPoint, SourceError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(SourceError::InvalidRecord(format!(
                "non-finite coordinates ({}, {})",
                self.lat, self.lng
            )));
        }

        Ok(TrackPoint {
            timestamp: self.device_timestamp.normalize()?,
            lat: self.lat,
            lng: self.lng,
            in_geofence: self.in_geofence,
        })
    }
}

/// Normalize a batch of logs into timestamp order
///
/// The sort is stable so logs sharing a timestamp keep their stored order.
pub fn normalize_logs(logs: &[RawTrackLog]) -> Result<Vec<TrackPoint>, SourceError> {
    let mut points = logs
        .iter()
        .map(RawTrackLog::normalize)
        .collect::<Result<Vec<_>, _>>()?;
    points.sort_by_key(|point| point.timestamp);
    Ok(points)
}

/// Reject shapes that cannot be drawn
pub fn validate_geofence(geofence: &Geofence) -> Result<(), SourceError> {
    if geofence.coordinates.len() < 2 {
        return Err(SourceError::InvalidGeofence {
            id: geofence.id.clone(),
            reason: format!("{} vertices, at least 2 required", geofence.coordinates.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_shapes_normalize_to_same_instant() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 1, 30, 0).unwrap();

        let text: RawTimestamp = serde_json::from_str(r#""2024-05-02T08:30:00+07:00""#).unwrap();
        let millis: RawTimestamp = serde_json::from_str("1714613400000").unwrap();
        let document: RawTimestamp =
            serde_json::from_str(r#"{"seconds": 1714613400, "nanoseconds": 0}"#).unwrap();
        let exported: RawTimestamp = serde_json::from_str(r#"{"_seconds": 1714613400}"#).unwrap();

        assert_eq!(text.normalize().unwrap(), expected);
        assert_eq!(millis.normalize().unwrap(), expected);
        assert_eq!(document.normalize().unwrap(), expected);
        assert_eq!(exported.normalize().unwrap(), expected);
    }

    #[test]
    fn test_fractional_epoch_millis() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 1, 30, 0).unwrap() + chrono::Duration::microseconds(500);

        let raw: RawTimestamp = serde_json::from_str("1714613400000.5").unwrap();
        assert_eq!(raw, RawTimestamp::FractionalMillis(1714613400000.5));
        assert_eq!(raw.normalize().unwrap(), expected);

        // Whole numbers keep the integer form
        let whole: RawTimestamp = serde_json::from_str("1714613400000").unwrap();
        assert_eq!(whole, RawTimestamp::EpochMillis(1714613400000));

        assert!(RawTimestamp::FractionalMillis(f64::NAN).normalize().is_err());
    }

    #[test]
    fn test_invalid_timestamp_text() {
        let raw = RawTimestamp::Text("yesterday".to_string());

        assert!(matches!(raw.normalize(), Err(SourceError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_normalize_logs_sorts_by_timestamp() {
        let logs: Vec<RawTrackLog> = serde_json::from_str(
            r#"[
                {"device_timestamp": "2024-05-02T09:00:00Z", "lat": 1.0, "lng": 2.0, "in_geofence": false},
                {"device_timestamp": "2024-05-02T08:00:00Z", "lat": 1.1, "lng": 2.1, "in_geofence": true}
            ]"#,
        )
        .unwrap();

        let points = normalize_logs(&logs).unwrap();

        assert_eq!(points.len(), 2);
        assert!(points[0].in_geofence);
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let log = RawTrackLog {
            device_timestamp: RawTimestamp::EpochMillis(0),
            lat: f64::NAN,
            lng: 0.0,
            in_geofence: true,
        };

        assert!(matches!(log.normalize(), Err(SourceError::InvalidRecord(_))));
    }
}
