// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Exported document tree on disk
//!
//! ```text
//! <root>/employees/<employee>/logs_<YYYY-MM-DD>.json    [RawTrackLog, ..]
//! <root>/daily_summaries/<employee>_<YYYY-MM-DD>.json   SummaryRecord
//! <root>/geofences.json                                 [Geofence, ..]
//! ```
//!
//! A missing file means there is no data, never an error.

use super::{normalize_logs, validate_geofence, RawTrackLog, TrackSource};
use crate::constants::paths;
use crate::logging::AppLogger;
use crate::models::{Geofence, SummaryRecord, TrackPoint};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct JsonTrackSource {
    root: PathBuf,
}

impl JsonTrackSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_path(&self, employee_id: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join(paths::EMPLOYEES_DIR)
            .join(employee_id)
            .join(format!("{}{}.json", paths::LOGS_PREFIX, date.format(DATE_FORMAT)))
    }

    pub fn summary_path(&self, employee_id: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join(paths::DAILY_SUMMARIES_DIR)
            .join(format!("{}_{}.json", employee_id, date.format(DATE_FORMAT)))
    }

    pub fn geofences_path(&self) -> PathBuf {
        self.root.join(paths::GEOFENCES_FILE)
    }
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No document");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

#[async_trait]
impl TrackSource for JsonTrackSource {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn fetch_points(&self, employee_id: &str, date: NaiveDate) -> Result<Vec<TrackPoint>> {
        let path = self.logs_path(employee_id, date);
        let logs: Vec<RawTrackLog> = read_document(&path).await?.unwrap_or_default();
        let points = normalize_logs(&logs).with_context(|| format!("Bad log in {}", path.display()))?;
        Ok(points)
    }

    async fn fetch_summary(&self, employee_id: &str, date: NaiveDate) -> Result<Option<SummaryRecord>> {
        read_document(&self.summary_path(employee_id, date)).await
    }

    async fn fetch_geofence(&self, employee_id: &str) -> Result<Option<Geofence>> {
        let geofences: Vec<Geofence> = read_document(&self.geofences_path()).await?.unwrap_or_default();

        for geofence in geofences.into_iter().filter(|g| g.assigned_to == employee_id) {
            match validate_geofence(&geofence) {
                Ok(()) => return Ok(Some(geofence)),
                Err(e) => AppLogger::log_data_quality_issue(employee_id, &e.to_string()),
            }
        }
        Ok(None)
    }
}
