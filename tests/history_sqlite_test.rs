// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! History queries against a SQLite track store

use anyhow::Result;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use mandor_tracker::config::AppConfig;
use mandor_tracker::data_source::{SqliteTrackSource, TrackSource};
use mandor_tracker::history::HistoryService;
use mandor_tracker::models::{Geofence, GeofenceKind, LatLng, RecommendationType, SummaryRecord, TrackPoint};
use std::sync::Arc;
use tempfile::TempDir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

/// 07:00-15:00 WIB, one point every 10 minutes, outside between 10:00 and 11:00
fn workday() -> Vec<TrackPoint> {
    let start = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
    (0..=48)
        .map(|i| TrackPoint {
            timestamp: start + Duration::minutes(i * 10),
            lat: -0.5021,
            lng: 101.4478,
            in_geofence: !(18..24).contains(&i),
        })
        .collect()
}

#[tokio::test]
async fn test_report_from_imported_points() -> Result<()> {
    let store = SqliteTrackSource::new("sqlite::memory:").await?;
    store.insert_points("mandor-01", date(), &workday()).await?;

    let service = HistoryService::new(Arc::new(store), &AppConfig::default());
    let report = service.load("mandor-01", date()).await?;

    assert_eq!(report.points.len(), 49);
    assert_eq!(report.summary.total_work_minutes, 420.0);
    assert_eq!(report.summary.total_outside_area_minutes, 60.0);

    let pattern = report.summary.activity_pattern.as_ref().unwrap();
    assert_eq!(pattern.total_switches, 2);
    assert_eq!(pattern.work_streaks.len(), 2);
    // Six points per local hour from 07:00; 07:00 is seen first
    assert_eq!(pattern.peak_activity_hour, 7);

    // 87.5% efficiency: no warnings, not in the excellent band either
    assert!(report.recommendations.is_empty());
    assert!((report.metrics.outside_percentage - 12.5).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_persisted_summary_values_win() -> Result<()> {
    let store = SqliteTrackSource::new("sqlite::memory:").await?;
    store.insert_points("mandor-01", date(), &workday()).await?;
    store
        .save_summary(
            "mandor-01",
            date(),
            &SummaryRecord {
                total_work_minutes: Some(200.0),
                expected_work_hours: Some(0.0),
                total_data_points: Some(0),
                ..SummaryRecord::default()
            },
        )
        .await?;

    let service = HistoryService::new(Arc::new(store), &AppConfig::default());
    let summary = service.load("mandor-01", date()).await?.summary;

    assert_eq!(summary.total_work_minutes, 200.0);
    assert_eq!(summary.total_outside_area_minutes, 60.0);
    assert_eq!(summary.expected_work_hours, 8.0);
    assert_eq!(summary.total_data_points, 49);
    assert!(summary.first_update.is_some());
    assert!(summary.activity_pattern.is_some());

    Ok(())
}

#[tokio::test]
async fn test_summary_without_points_uses_fallback_scores() -> Result<()> {
    let store = SqliteTrackSource::new("sqlite::memory:").await?;
    store
        .save_summary(
            "mandor-02",
            date(),
            &SummaryRecord {
                total_work_minutes: Some(480.0),
                total_outside_area_minutes: Some(0.0),
                ..SummaryRecord::default()
            },
        )
        .await?;

    let service = HistoryService::new(Arc::new(store), &AppConfig::default());
    let report = service.load("mandor-02", date()).await?;

    assert!(report.summary.activity_pattern.is_none());
    assert_eq!(report.score.breakdown.consistency, 70);
    assert_eq!(report.score.breakdown.mobility, 70);
    // 100 * 0.4 + 100 * 0.3 + 70 * 0.2 + 70 * 0.1
    assert_eq!(report.score.overall, 91);
    assert_eq!(report.recommendations[0].recommendation_type, RecommendationType::Success);

    Ok(())
}

#[tokio::test]
async fn test_file_database_persists_between_connections() -> Result<()> {
    let dir = TempDir::new()?;
    let url = format!("sqlite:{}", dir.path().join("tracks.db").display());

    {
        let store = SqliteTrackSource::new(&url).await?;
        store.insert_points("mandor-01", date(), &workday()).await?;
        store
            .save_geofence(&Geofence {
                id: "blok-a".to_string(),
                name: "Blok A".to_string(),
                assigned_to: "mandor-01".to_string(),
                kind: GeofenceKind::Polygon,
                coordinates: vec![
                    LatLng { lat: -0.50, lng: 101.44 },
                    LatLng { lat: -0.50, lng: 101.45 },
                    LatLng { lat: -0.51, lng: 101.45 },
                ],
            })
            .await?;
    }

    let store = SqliteTrackSource::new(&url).await?;
    assert_eq!(store.fetch_points("mandor-01", date()).await?.len(), 49);

    let geofence = store.fetch_geofence("mandor-01").await?.unwrap();
    assert_eq!(geofence.name, "Blok A");
    assert_eq!(geofence.coordinates.len(), 3);

    Ok(())
}
