// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading an exported document tree from disk

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use mandor_tracker::config::AppConfig;
use mandor_tracker::data_source::{JsonTrackSource, TrackSource};
use mandor_tracker::history::{HistoryService, HistoryView};
use mandor_tracker::models::GeofenceKind;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Logs in mixed timestamp shapes, stored out of order
fn seed(root: &Path) -> Result<()> {
    write(
        root,
        "employees/mandor-01/logs_2024-05-02.json",
        r#"[
            {"device_timestamp": "2024-05-02T08:30:00+07:00", "lat": -0.5021, "lng": 101.4478, "in_geofence": false},
            {"device_timestamp": {"seconds": 1714608000, "nanoseconds": 0}, "lat": -0.5020, "lng": 101.4477, "in_geofence": true},
            {"device_timestamp": 1714611600000, "lat": -0.5022, "lng": 101.4479, "in_geofence": true}
        ]"#,
    )?;
    write(
        root,
        "daily_summaries/mandor-01_2024-05-02.json",
        r#"{"expectedWorkHours": 2.0}"#,
    )?;
    write(
        root,
        "geofences.json",
        r#"[
            {"id": "bad", "name": "Rusak", "assignedTo": "mandor-01", "type": "polygon",
             "coordinates": [{"lat": -0.5, "lng": 101.4}]},
            {"id": "blok-a", "name": "Blok A", "assignedTo": "mandor-01", "type": "polyline",
             "coordinates": [{"lat": -0.50, "lng": 101.44}, {"lat": -0.51, "lng": 101.45}]}
        ]"#,
    )?;
    Ok(())
}

#[tokio::test]
async fn test_points_are_normalized_and_sorted() -> Result<()> {
    let dir = TempDir::new()?;
    seed(dir.path())?;
    let source = JsonTrackSource::new(dir.path());

    let points = source.fetch_points("mandor-01", date()).await?;

    // 07:00, 08:00 and 08:30 WIB
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].timestamp, Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
    assert_eq!(points[1].timestamp, Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap());
    assert_eq!(points[2].timestamp, Utc.with_ymd_and_hms(2024, 5, 2, 1, 30, 0).unwrap());
    assert!(!points[2].in_geofence);

    Ok(())
}

#[tokio::test]
async fn test_unusable_geofence_is_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    seed(dir.path())?;
    let source = JsonTrackSource::new(dir.path());

    let geofence = source.fetch_geofence("mandor-01").await?.unwrap();

    assert_eq!(geofence.id, "blok-a");
    assert_eq!(geofence.kind, GeofenceKind::Polyline);
    assert!(source.fetch_geofence("mandor-99").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_history_over_document_tree() -> Result<()> {
    let dir = TempDir::new()?;
    seed(dir.path())?;
    let service = HistoryService::new(Arc::new(JsonTrackSource::new(dir.path())), &AppConfig::default());

    let report = service.load("mandor-01", date()).await?;

    // 90 minutes inside, then the last point; target from the persisted document
    assert_eq!(report.summary.total_work_minutes, 90.0);
    assert_eq!(report.summary.total_outside_area_minutes, 0.0);
    assert_eq!(report.summary.expected_work_hours, 2.0);
    assert_eq!(report.metrics.work_efficiency_ratio, 75.0);
    assert_eq!(report.geofence.as_ref().map(|g| g.name.as_str()), Some("Blok A"));

    Ok(())
}

#[tokio::test]
async fn test_bad_timestamp_fails_the_query() -> Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "employees/mandor-01/logs_2024-05-02.json",
        r#"[{"device_timestamp": "kemarin", "lat": 0.0, "lng": 0.0, "in_geofence": true}]"#,
    )?;
    let source = JsonTrackSource::new(dir.path());

    assert!(source.fetch_points("mandor-01", date()).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_view_query_on_missing_day() -> Result<()> {
    let dir = TempDir::new()?;
    let service = HistoryService::new(Arc::new(JsonTrackSource::new(dir.path())), &AppConfig::default());
    let mut view = HistoryView::new(service, Duration::from_millis(200));

    let report = view.query("mandor-01", date()).await?;
    assert!(report.points.is_empty());
    assert!(report.recommendations.is_empty());

    // Play on an empty route is a no-op
    view.playback_mut().play().await;
    assert!(!view.playback().snapshot().await.is_playing);

    view.close().await;
    assert!(view.report().is_none());

    Ok(())
}
