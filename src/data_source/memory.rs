// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{validate_geofence, TrackSource};
use crate::models::{Geofence, SummaryRecord, TrackPoint};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;

type DayKey = (String, NaiveDate);

/// Track source backed by in-process maps
#[derive(Default)]
pub struct InMemoryTrackSource {
    points: RwLock<HashMap<DayKey, Vec<TrackPoint>>>,
    summaries: RwLock<HashMap<DayKey, SummaryRecord>>,
    geofences: RwLock<HashMap<String, Geofence>>,
}

impl InMemoryTrackSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append points for an employee-day; stored order is kept sorted
    pub fn insert_points(&self, employee_id: &str, date: NaiveDate, points: impl IntoIterator<Item = TrackPoint>) {
        let mut map = self.points.write().unwrap_or_else(|e| e.into_inner());
        let day = map.entry((employee_id.to_string(), date)).or_default();
        day.extend(points);
        day.sort_by_key(|point| point.timestamp);
    }

    pub fn insert_summary(&self, employee_id: &str, date: NaiveDate, record: SummaryRecord) {
        let mut map = self.summaries.write().unwrap_or_else(|e| e.into_inner());
        map.insert((employee_id.to_string(), date), record);
    }

    pub fn insert_geofence(&self, geofence: Geofence) -> Result<()> {
        validate_geofence(&geofence)?;
        let mut map = self.geofences.write().unwrap_or_else(|e| e.into_inner());
        map.insert(geofence.assigned_to.clone(), geofence);
        Ok(())
    }
}

#[async_trait]
impl TrackSource for InMemoryTrackSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_points(&self, employee_id: &str, date: NaiveDate) -> Result<Vec<TrackPoint>> {
        let map = self.points.read().unwrap_or_else(|e| e.into_inner());
        Ok(map
            .get(&(employee_id.to_string(), date))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_summary(&self, employee_id: &str, date: NaiveDate) -> Result<Option<SummaryRecord>> {
        let map = self.summaries.read().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(&(employee_id.to_string(), date)).cloned())
    }

    async fn fetch_geofence(&self, employee_id: &str) -> Result<Option<Geofence>> {
        let map = self.geofences.read().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(employee_id).cloned())
    }
}
