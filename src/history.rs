// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # History Orchestration
//!
//! Glue between a [`TrackSource`] and the analytics and playback cores.
//!
//! [`HistoryService`] answers one (employee, date) query: it pulls points,
//! the persisted summary and the geofence, reconciles the summary, and
//! derives scores and recommendations. [`HistoryView`] adds the playback
//! lifecycle of an open history screen: each new query stops playback and
//! replaces the point list, so timers armed for the previous query can no
//! longer touch state.

use crate::analytics::{ActivityAnalyzer, OverallScore, RecommendationEngine, ScoreCalculator, SummaryMetrics};
use crate::config::AppConfig;
use crate::data_source::TrackSource;
use crate::logging::AppLogger;
use crate::models::{DailySummary, Geofence, Recommendation, SummaryRecord, TrackPoint};
use crate::playback::{PlaybackController, PlaybackDriver, RouteBounds};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Everything the presentation layer needs for one employee-day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryReport {
    pub points: Vec<TrackPoint>,
    pub summary: DailySummary,
    pub metrics: SummaryMetrics,
    pub score: OverallScore,
    pub recommendations: Vec<Recommendation>,
    pub geofence: Option<Geofence>,
    pub route_bounds: Option<RouteBounds>,
}

/// Answers history queries against one track source
pub struct HistoryService {
    source: Arc<dyn TrackSource>,
    analyzer: ActivityAnalyzer,
    scores: ScoreCalculator,
    recommendations: RecommendationEngine,
}

impl HistoryService {
    pub fn new(source: Arc<dyn TrackSource>, config: &AppConfig) -> Self {
        let analytics = config.analytics.clone();
        Self {
            source,
            scores: ScoreCalculator::new(&analytics),
            recommendations: RecommendationEngine::with_thresholds(analytics.recommendation_thresholds.clone()),
            analyzer: ActivityAnalyzer::with_config(analytics, config.utc_offset()),
        }
    }

    pub fn source(&self) -> &dyn TrackSource {
        self.source.as_ref()
    }

    pub async fn load(&self, employee_id: &str, date: NaiveDate) -> Result<HistoryReport> {
        self.load_with_target(employee_id, date, None).await
    }

    /// Like [`load`](Self::load), with an explicit daily target in hours
    ///
    /// A positive `expected_work_hours` overrides whatever the persisted
    /// summary says.
    pub async fn load_with_target(
        &self,
        employee_id: &str,
        date: NaiveDate,
        expected_work_hours: Option<f64>,
    ) -> Result<HistoryReport> {
        let started = Instant::now();

        let points = self
            .source
            .fetch_points(employee_id, date)
            .await
            .with_context(|| format!("Failed to fetch track points for {employee_id} on {date}"))?;

        let persisted = self
            .source
            .fetch_summary(employee_id, date)
            .await
            .with_context(|| format!("Failed to fetch daily summary for {employee_id} on {date}"))?;

        // Geofence failures do not fail the query
        let geofence = match self.source.fetch_geofence(employee_id).await {
            Ok(geofence) => geofence,
            Err(e) => {
                warn!(employee.id = %employee_id, error = %e, "Geofence unavailable");
                None
            }
        };

        if persisted.is_some() && points.is_empty() {
            AppLogger::log_data_quality_issue(employee_id, "persisted summary without track points");
        }

        let record = with_target(persisted, expected_work_hours);

        let summary = self.analyzer.reconcile(employee_id, date, record.as_ref(), &points);
        let metrics = SummaryMetrics::from_summary(&summary);
        let score = self.scores.calculate(&summary);
        let recommendations = self.recommendations.generate(&summary);
        let route_bounds = RouteBounds::from_points(&points);

        AppLogger::log_history_query(
            employee_id,
            &date.to_string(),
            self.source.name(),
            points.len(),
            started.elapsed().as_millis() as u64,
        );

        Ok(HistoryReport {
            points,
            summary,
            metrics,
            score,
            recommendations,
            geofence,
            route_bounds,
        })
    }
}

/// Apply a positive daily target on top of the persisted record, if any
fn with_target(record: Option<SummaryRecord>, expected_work_hours: Option<f64>) -> Option<SummaryRecord> {
    match expected_work_hours.filter(|h| *h > 0.0) {
        Some(hours) => {
            let mut record = record.unwrap_or_default();
            record.expected_work_hours = Some(hours);
            Some(record)
        }
        None => record,
    }
}

/// One open history screen: the latest report plus its playback
pub struct HistoryView {
    service: HistoryService,
    driver: PlaybackDriver,
    report: Option<HistoryReport>,
}

impl HistoryView {
    pub fn new(service: HistoryService, speed: Duration) -> Self {
        Self {
            service,
            driver: PlaybackDriver::new(PlaybackController::new(Vec::<TrackPoint>::new(), speed)),
            report: None,
        }
    }

    /// Run a new query, resetting playback to the start of the new route
    pub async fn query(&mut self, employee_id: &str, date: NaiveDate) -> Result<&HistoryReport> {
        self.query_with_target(employee_id, date, None).await
    }

    pub async fn query_with_target(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        expected_work_hours: Option<f64>,
    ) -> Result<&HistoryReport> {
        // No tick may land on the old route while fetching
        self.driver.stop().await;

        let report = self
            .service
            .load_with_target(employee_id, date, expected_work_hours)
            .await?;
        self.driver.load(report.points.clone()).await;

        Ok(self.report.insert(report))
    }

    pub fn report(&self) -> Option<&HistoryReport> {
        self.report.as_ref()
    }

    pub fn playback(&self) -> &PlaybackDriver {
        &self.driver
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackDriver {
        &mut self.driver
    }

    /// Tear down playback and forget the report
    pub async fn close(&mut self) {
        self.driver.dispose().await;
        self.report = None;
    }
}
