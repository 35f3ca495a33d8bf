// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # SQLite Track Storage
//!
//! Local storage for imported track logs, persisted summaries and assigned
//! geofences. Timestamps are stored as RFC 3339 text in UTC.

use super::{validate_geofence, SourceError, TrackSource};
use crate::models::{Geofence, GeofenceKind, LatLng, SummaryRecord, TrackPoint};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

/// SQLite-backed track source
#[derive(Clone)]
pub struct SqliteTrackSource {
    pool: Pool<Sqlite>,
}

impl SqliteTrackSource {
    /// Connect and run migrations
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create the file on first use
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
            && !database_url.contains('?')
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // Every connection to an in-memory URL opens a fresh database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_options)
            .await?;

        let source = Self { pool };
        source.migrate().await?;

        Ok(source)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS track_points (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id TEXT NOT NULL,
                date TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                in_geofence BOOLEAN NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_track_points_day ON track_points(employee_id, date, timestamp)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_summaries (
                employee_id TEXT NOT NULL,
                date TEXT NOT NULL,
                total_work_minutes REAL,
                total_outside_area_minutes REAL,
                expected_work_hours REAL,
                total_data_points INTEGER,
                first_update TEXT,
                last_update TEXT,
                PRIMARY KEY (employee_id, date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS geofences (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                assigned_to TEXT NOT NULL,
                kind TEXT NOT NULL,
                coordinates TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_geofences_assigned ON geofences(assigned_to)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store points for an employee-day in one transaction
    pub async fn insert_points(&self, employee_id: &str, date: NaiveDate, points: &[TrackPoint]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let date = date.to_string();

        for point in points {
            sqlx::query(
                r#"
                INSERT INTO track_points (employee_id, date, timestamp, lat, lng, in_geofence)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(employee_id)
            .bind(&date)
            .bind(encode_timestamp(point.timestamp))
            .bind(point.lat)
            .bind(point.lng)
            .bind(point.in_geofence)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(employee_id, date = %date, count = points.len(), "Stored track points");
        Ok(points.len() as u64)
    }

    /// Insert or replace the persisted summary for an employee-day
    pub async fn save_summary(&self, employee_id: &str, date: NaiveDate, record: &SummaryRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO daily_summaries
                (employee_id, date, total_work_minutes, total_outside_area_minutes,
                 expected_work_hours, total_data_points, first_update, last_update)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(employee_id)
        .bind(date.to_string())
        .bind(record.total_work_minutes)
        .bind(record.total_outside_area_minutes)
        .bind(record.expected_work_hours)
        .bind(record.total_data_points.map(|n| n as i64))
        .bind(record.first_update.map(encode_timestamp))
        .bind(record.last_update.map(encode_timestamp))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace a geofence
    pub async fn save_geofence(&self, geofence: &Geofence) -> Result<()> {
        validate_geofence(geofence)?;

        let kind = match geofence.kind {
            GeofenceKind::Polygon => "polygon",
            GeofenceKind::Polyline => "polyline",
        };

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO geofences (id, name, assigned_to, kind, coordinates)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&geofence.id)
        .bind(&geofence.name)
        .bind(&geofence.assigned_to)
        .bind(kind)
        .bind(serde_json::to_string(&geofence.coordinates)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_point(row: &SqliteRow) -> Result<TrackPoint> {
        let timestamp: String = row.try_get("timestamp")?;

        Ok(TrackPoint {
            timestamp: decode_timestamp(&timestamp)?,
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
            in_geofence: row.try_get("in_geofence")?,
        })
    }

    fn row_to_summary(row: &SqliteRow) -> Result<SummaryRecord> {
        let total_data_points: Option<i64> = row.try_get("total_data_points")?;
        let first_update: Option<String> = row.try_get("first_update")?;
        let last_update: Option<String> = row.try_get("last_update")?;

        Ok(SummaryRecord {
            total_work_minutes: row.try_get("total_work_minutes")?,
            total_outside_area_minutes: row.try_get("total_outside_area_minutes")?,
            expected_work_hours: row.try_get("expected_work_hours")?,
            total_data_points: total_data_points.map(|n| n.max(0) as usize),
            first_update: first_update.as_deref().map(decode_timestamp).transpose()?,
            last_update: last_update.as_deref().map(decode_timestamp).transpose()?,
        })
    }

    fn row_to_geofence(row: &SqliteRow) -> Result<Geofence> {
        let kind: String = row.try_get("kind")?;
        let coordinates: String = row.try_get("coordinates")?;
        let coordinates: Vec<LatLng> = serde_json::from_str(&coordinates)?;

        let kind = match kind.as_str() {
            "polyline" => GeofenceKind::Polyline,
            _ => GeofenceKind::Polygon,
        };

        Ok(Geofence {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            assigned_to: row.try_get("assigned_to")?,
            kind,
            coordinates,
        })
    }
}

fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_timestamp(text: &str) -> Result<DateTime<Utc>, SourceError> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| SourceError::InvalidTimestamp(text.to_string()))
}

#[async_trait]
impl TrackSource for SqliteTrackSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_points(&self, employee_id: &str, date: NaiveDate) -> Result<Vec<TrackPoint>> {
        let rows = sqlx::query(
            r#"
            SELECT timestamp, lat, lng, in_geofence FROM track_points
            WHERE employee_id = ?1 AND date = ?2
            ORDER BY timestamp, id
            "#,
        )
        .bind(employee_id)
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut points = rows.iter().map(Self::row_to_point).collect::<Result<Vec<_>>>()?;
        points.sort_by_key(|point| point.timestamp);
        Ok(points)
    }

    async fn fetch_summary(&self, employee_id: &str, date: NaiveDate) -> Result<Option<SummaryRecord>> {
        let row = sqlx::query("SELECT * FROM daily_summaries WHERE employee_id = ?1 AND date = ?2")
            .bind(employee_id)
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_summary(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_geofence(&self, employee_id: &str) -> Result<Option<Geofence>> {
        let row = sqlx::query("SELECT * FROM geofences WHERE assigned_to = ?1 ORDER BY id LIMIT 1")
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_geofence(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn create_test_source() -> SqliteTrackSource {
        SqliteTrackSource::new("sqlite::memory:").await.unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[tokio::test]
    async fn test_points_come_back_sorted() {
        let source = create_test_source().await;
        let late = TrackPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 0).unwrap(),
            lat: -0.5,
            lng: 101.4,
            in_geofence: false,
        };
        let early = TrackPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap(),
            in_geofence: true,
            ..late
        };

        let stored = source.insert_points("emp-1", date(), &[late, early]).await.unwrap();
        assert_eq!(stored, 2);

        let points = source.fetch_points("emp-1", date()).await.unwrap();
        assert_eq!(points, vec![early, late]);
        assert!(source.fetch_points("emp-2", date()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_summary_round_trip() {
        let source = create_test_source().await;
        let record = SummaryRecord {
            total_work_minutes: Some(300.0),
            ..SummaryRecord::default()
        };

        source.save_summary("emp-1", date(), &record).await.unwrap();
        let loaded = source.fetch_summary("emp-1", date()).await.unwrap().unwrap();

        assert_eq!(loaded.total_work_minutes, Some(300.0));
        assert!(loaded.total_outside_area_minutes.is_none());
        assert!(loaded.first_update.is_none());
    }

    #[tokio::test]
    async fn test_geofence_storage() {
        let source = create_test_source().await;
        let geofence = Geofence {
            id: "gf-1".to_string(),
            name: "Blok A".to_string(),
            assigned_to: "emp-1".to_string(),
            kind: GeofenceKind::Polyline,
            coordinates: vec![LatLng { lat: 0.0, lng: 0.0 }, LatLng { lat: 0.1, lng: 0.1 }],
        };

        source.save_geofence(&geofence).await.unwrap();

        assert_eq!(source.fetch_geofence("emp-1").await.unwrap(), Some(geofence));
        assert!(source.fetch_geofence("emp-2").await.unwrap().is_none());
    }
}
