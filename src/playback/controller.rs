// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Playback state machine stepping through a day's track points
//!
//! The controller itself never schedules anything. A driver calls [`tick`]
//! with the generation it was armed with; every change that affects timing
//! (play state, speed, point list, disposal) bumps the generation so a late
//! tick from an old timer is ignored.
//!
//! [`tick`]: PlaybackController::tick

use crate::constants::defaults;
use crate::models::{LatLng, TrackPoint};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Coarse playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Full route shown, no scrubbing engaged
    Idle,
    /// Progressive route up to the current index, paused
    Scrubbing,
    /// Progressive route advancing on every tick
    Playing,
}

/// Result of a timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved to the contained index
    Advanced(usize),
    /// Ran past the last point; playback ended
    Completed,
    /// Tick from an outdated timer, nothing changed
    Stale,
}

/// Immutable view of the playback state for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub index: usize,
    pub is_playing: bool,
    pub is_active: bool,
    pub speed_ms: u64,
    pub point_count: usize,
    /// `index / last`, 0 for fewer than two points
    pub progress: f64,
    pub current_marker: Option<TrackPoint>,
    pub generation: u64,
}

/// Bounding box of a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl RouteBounds {
    pub fn from_points(points: &[TrackPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = (first.lat, first.lng, first.lat, first.lng);
        let (min_lat, min_lng, max_lat, max_lng) =
            points.iter().fold(init, |(min_lat, min_lng, max_lat, max_lng), p| {
                (min_lat.min(p.lat), min_lng.min(p.lng), max_lat.max(p.lat), max_lng.max(p.lng))
            });

        Some(Self {
            south_west: LatLng { lat: min_lat, lng: min_lng },
            north_east: LatLng { lat: max_lat, lng: max_lng },
        })
    }
}

/// Playback controller for one history view
#[derive(Debug, Clone)]
pub struct PlaybackController {
    points: Arc<[TrackPoint]>,
    index: usize,
    is_playing: bool,
    is_active: bool,
    speed: Duration,
    generation: u64,
}

impl PlaybackController {
    pub fn new(points: impl Into<Arc<[TrackPoint]>>, speed: Duration) -> Self {
        Self {
            points: points.into(),
            index: 0,
            is_playing: false,
            is_active: false,
            speed: clamp_speed(speed),
            generation: 0,
        }
    }

    /// Controller with the default 1x speed
    pub fn with_points(points: impl Into<Arc<[TrackPoint]>>) -> Self {
        Self::new(points, Duration::from_millis(defaults::PLAYBACK_SPEED_MS))
    }

    /// Adopt a new point list, stopping any playback first
    pub fn load(&mut self, points: impl Into<Arc<[TrackPoint]>>) {
        self.stop();
        self.points = points.into();
        self.bump();
    }

    /// Toggle playback
    ///
    /// Starts from the first point when idle or parked on the last point;
    /// pauses when already playing. No-op without points.
    pub fn play(&mut self) {
        let Some(last) = self.last_index() else {
            return;
        };

        if self.is_playing {
            self.pause();
            return;
        }

        if !self.is_active || self.index >= last {
            self.index = 0;
        }
        self.is_active = true;
        self.is_playing = true;
        self.bump();
        debug!(index = self.index, generation = self.generation, "Playback started");
    }

    /// Stop auto-advance, keeping the progressive view
    pub fn pause(&mut self) {
        if self.is_playing {
            self.is_playing = false;
            self.bump();
        }
    }

    /// Advance one step if `generation` matches the current one
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation || !self.is_playing {
            return TickOutcome::Stale;
        }
        let Some(last) = self.last_index() else {
            return TickOutcome::Stale;
        };

        if self.index >= last {
            self.index = last;
            self.is_playing = false;
            self.is_active = false;
            self.bump();
            debug!(index = self.index, "Playback completed");
            return TickOutcome::Completed;
        }

        self.index += 1;
        TickOutcome::Advanced(self.index)
    }

    /// Step forward one point; no-op on the last point
    pub fn next(&mut self) {
        match self.last_index() {
            Some(last) if self.index < last => self.scrub_to(self.index + 1),
            _ => {}
        }
    }

    /// Step back one point; no-op on the first point
    pub fn previous(&mut self) {
        if self.last_index().is_some() && self.index > 0 {
            self.scrub_to(self.index - 1);
        }
    }

    /// Jump to an index, clamped to the point range
    pub fn seek(&mut self, index: usize) {
        if let Some(last) = self.last_index() {
            self.scrub_to(index.min(last));
        }
    }

    /// Back to the full-route view at the first point
    pub fn stop(&mut self) {
        self.index = 0;
        self.is_playing = false;
        self.is_active = false;
        self.bump();
    }

    /// Change the step interval without moving the index
    pub fn set_speed(&mut self, speed: Duration) {
        self.speed = clamp_speed(speed);
        self.bump();
    }

    /// Invalidate every outstanding timer
    pub fn dispose(&mut self) {
        self.is_playing = false;
        self.bump();
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (self.is_active, self.is_playing) {
            (_, true) => PlaybackPhase::Playing,
            (true, false) => PlaybackPhase::Scrubbing,
            (false, false) => PlaybackPhase::Idle,
        }
    }

    /// Trail up to and including the current point while active, else the full route
    pub fn visible_points(&self) -> &[TrackPoint] {
        if self.is_active && !self.points.is_empty() {
            &self.points[..=self.index.min(self.points.len() - 1)]
        } else {
            &self.points
        }
    }

    /// Highlighted point while active
    pub fn current_marker(&self) -> Option<&TrackPoint> {
        if self.is_active {
            self.points.get(self.index)
        } else {
            None
        }
    }

    /// Bounds of the full route, for fitting the map
    pub fn route_bounds(&self) -> Option<RouteBounds> {
        RouteBounds::from_points(&self.points)
    }

    pub fn progress(&self) -> f64 {
        match self.last_index() {
            Some(last) if last > 0 => self.index as f64 / last as f64,
            _ => 0.0,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase(),
            index: self.index,
            is_playing: self.is_playing,
            is_active: self.is_active,
            speed_ms: u64::try_from(self.speed.as_millis()).unwrap_or(u64::MAX),
            point_count: self.points.len(),
            progress: self.progress(),
            current_marker: self.current_marker().copied(),
            generation: self.generation,
        }
    }

    fn scrub_to(&mut self, index: usize) {
        self.pause();
        self.is_active = true;
        self.index = index;
    }

    fn last_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

fn clamp_speed(speed: Duration) -> Duration {
    speed.max(Duration::from_millis(defaults::MIN_PLAYBACK_SPEED_MS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn points(count: usize) -> Vec<TrackPoint> {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| TrackPoint {
                timestamp: start + ChronoDuration::minutes(i as i64),
                lat: -0.5 + i as f64 * 0.001,
                lng: 101.4 - i as f64 * 0.001,
                in_geofence: true,
            })
            .collect()
    }

    fn controller(count: usize) -> PlaybackController {
        PlaybackController::with_points(points(count))
    }

    fn run_to_end(ctl: &mut PlaybackController) {
        let generation = ctl.generation();
        while ctl.tick(generation) != TickOutcome::Completed {}
    }

    #[test]
    fn test_initial_state_is_idle() {
        let ctl = controller(3);

        assert_eq!(ctl.phase(), PlaybackPhase::Idle);
        assert_eq!(ctl.visible_points().len(), 3);
        assert!(ctl.current_marker().is_none());
    }

    #[test]
    fn test_play_on_empty_list_is_noop() {
        let mut ctl = controller(0);
        ctl.play();

        assert_eq!(ctl.phase(), PlaybackPhase::Idle);
        assert_eq!(ctl.generation(), 0);
    }

    #[test]
    fn test_play_toggles_pause() {
        let mut ctl = controller(5);
        ctl.play();
        assert_eq!(ctl.phase(), PlaybackPhase::Playing);

        ctl.play();
        assert_eq!(ctl.phase(), PlaybackPhase::Scrubbing);
        assert!(ctl.is_active());
    }

    #[test]
    fn test_ticks_advance_and_complete() {
        let mut ctl = controller(3);
        ctl.play();
        let generation = ctl.generation();

        assert_eq!(ctl.tick(generation), TickOutcome::Advanced(1));
        assert_eq!(ctl.tick(generation), TickOutcome::Advanced(2));
        assert_eq!(ctl.visible_points().len(), 3);
        assert_eq!(ctl.current_marker(), Some(&ctl.points()[2]));

        assert_eq!(ctl.tick(generation), TickOutcome::Completed);
        assert!(!ctl.is_playing());
        assert!(!ctl.is_active());
        assert_eq!(ctl.index(), 2);

        // Same timer firing again must not move anything
        assert_eq!(ctl.tick(generation), TickOutcome::Stale);
        assert_eq!(ctl.index(), 2);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut ctl = controller(5);
        ctl.play();
        let old = ctl.generation();
        ctl.set_speed(Duration::from_millis(50));

        assert_eq!(ctl.tick(old), TickOutcome::Stale);
        assert_eq!(ctl.index(), 0);
        assert_eq!(ctl.tick(ctl.generation()), TickOutcome::Advanced(1));
    }

    #[test]
    fn test_play_at_last_index_wraps() {
        let mut ctl = controller(4);
        ctl.seek(3);
        assert_eq!(ctl.index(), 3);

        ctl.play();
        assert_eq!(ctl.index(), 0);
        assert!(ctl.is_playing());
    }

    #[test]
    fn test_play_after_completion_restarts() {
        let mut ctl = controller(3);
        ctl.play();
        run_to_end(&mut ctl);

        ctl.play();
        assert_eq!(ctl.index(), 0);
        assert_eq!(ctl.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_play_resumes_from_scrub_position() {
        let mut ctl = controller(5);
        ctl.seek(2);
        ctl.play();

        assert_eq!(ctl.index(), 2);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut ctl = controller(3);
        let generation = ctl.generation();
        ctl.previous();
        assert_eq!(ctl.index(), 0);
        assert_eq!(ctl.phase(), PlaybackPhase::Idle);
        assert_eq!(ctl.generation(), generation);

        ctl.seek(2);
        ctl.next();
        assert_eq!(ctl.index(), 2);
    }

    #[test]
    fn test_next_pauses_playback() {
        let mut ctl = controller(5);
        ctl.play();
        ctl.next();

        assert_eq!(ctl.index(), 1);
        assert_eq!(ctl.phase(), PlaybackPhase::Scrubbing);

        ctl.previous();
        assert_eq!(ctl.index(), 0);
        assert!(ctl.is_active());
    }

    #[test]
    fn test_seek_clamps() {
        let mut ctl = controller(4);
        ctl.seek(99);

        assert_eq!(ctl.index(), 3);
        assert!(ctl.is_active());
        assert!(!ctl.is_playing());
    }

    #[test]
    fn test_stop_resets() {
        let mut ctl = controller(4);
        ctl.seek(2);
        ctl.stop();

        assert_eq!(ctl.index(), 0);
        assert_eq!(ctl.phase(), PlaybackPhase::Idle);
        assert_eq!(ctl.visible_points().len(), 4);
    }

    #[test]
    fn test_set_speed_keeps_index_and_clamps_zero() {
        let mut ctl = controller(4);
        ctl.seek(2);
        ctl.set_speed(Duration::ZERO);

        assert_eq!(ctl.index(), 2);
        assert_eq!(ctl.speed(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_stops_and_replaces() {
        let mut ctl = controller(4);
        ctl.play();
        let old = ctl.generation();
        ctl.load(points(2));

        assert_eq!(ctl.phase(), PlaybackPhase::Idle);
        assert_eq!(ctl.points().len(), 2);
        assert_eq!(ctl.tick(old), TickOutcome::Stale);
    }

    #[test]
    fn test_dispose_invalidates_timer() {
        let mut ctl = controller(4);
        ctl.play();
        let generation = ctl.generation();
        ctl.dispose();

        assert_eq!(ctl.tick(generation), TickOutcome::Stale);
        assert_eq!(ctl.index(), 0);
    }

    #[test]
    fn test_single_point_playback() {
        let mut ctl = controller(1);
        ctl.play();
        assert_eq!(ctl.progress(), 0.0);

        assert_eq!(ctl.tick(ctl.generation()), TickOutcome::Completed);
        assert_eq!(ctl.index(), 0);
    }

    #[test]
    fn test_snapshot_and_bounds() {
        let mut ctl = controller(5);
        ctl.seek(2);
        let snapshot = ctl.snapshot();

        assert_eq!(snapshot.phase, PlaybackPhase::Scrubbing);
        assert_eq!(snapshot.progress, 0.5);
        assert_eq!(snapshot.speed_ms, 200);
        assert_eq!(snapshot.current_marker, Some(ctl.points()[2]));

        let bounds = ctl.route_bounds().unwrap();
        assert!((bounds.south_west.lat - -0.5).abs() < 1e-9);
        assert!((bounds.north_east.lat - -0.496).abs() < 1e-9);
        assert!((bounds.south_west.lng - 101.396).abs() < 1e-9);
        assert!((bounds.north_east.lng - 101.4).abs() < 1e-9);
        assert!(RouteBounds::from_points(&[]).is_none());
    }
}
