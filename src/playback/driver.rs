// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Timer-driven playback
//!
//! The driver owns the only asynchronous piece of playback: a fixed-delay
//! tick task. The task is aborted and re-armed after every state change
//! (calls that change nothing leave it running) and carries the controller generation it was armed with, so a tick that slips
//! through after a change is rejected by the controller.

use super::controller::{PlaybackController, PlaybackSnapshot, TickOutcome};
use crate::logging::AppLogger;
use crate::models::TrackPoint;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Runs a [`PlaybackController`] on a tokio timer and publishes snapshots
pub struct PlaybackDriver {
    controller: Arc<Mutex<PlaybackController>>,
    updates: Arc<watch::Sender<PlaybackSnapshot>>,
    ticker: Option<JoinHandle<()>>,
}

impl PlaybackDriver {
    /// Wrap a controller; no timer runs until playback starts
    pub fn new(controller: PlaybackController) -> Self {
        let (updates, _) = watch::channel(controller.snapshot());
        Self {
            controller: Arc::new(Mutex::new(controller)),
            updates: Arc::new(updates),
            ticker: None,
        }
    }

    /// Receive a snapshot after every state change and tick
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Run a read-only projection against the current state
    pub async fn inspect<R>(&self, f: impl FnOnce(&PlaybackController) -> R) -> R {
        let controller = self.controller.lock().await;
        f(&controller)
    }

    /// Replace the point list, stopping playback first
    pub async fn load(&mut self, points: impl Into<Arc<[TrackPoint]>>) {
        let points = points.into();
        self.apply("load", move |c| c.load(points)).await;
    }

    /// Toggle playback
    pub async fn play(&mut self) {
        self.apply("play", PlaybackController::play).await;
    }

    pub async fn pause(&mut self) {
        self.apply("pause", PlaybackController::pause).await;
    }

    pub async fn next(&mut self) {
        self.apply("next", PlaybackController::next).await;
    }

    pub async fn previous(&mut self) {
        self.apply("previous", PlaybackController::previous).await;
    }

    pub async fn seek(&mut self, index: usize) {
        self.apply("seek", move |c| c.seek(index)).await;
    }

    pub async fn stop(&mut self) {
        self.apply("stop", PlaybackController::stop).await;
    }

    pub async fn set_speed(&mut self, speed: Duration) {
        self.apply("set_speed", move |c| c.set_speed(speed)).await;
    }

    /// Cancel the timer and invalidate any tick already in flight
    pub async fn dispose(&mut self) {
        self.apply("dispose", PlaybackController::dispose).await;
    }

    async fn apply(&mut self, event: &str, change: impl FnOnce(&mut PlaybackController)) {
        let (before, snapshot) = {
            let mut controller = self.controller.lock().await;
            let before = controller.generation();
            change(&mut controller);
            (before, controller.snapshot())
        };

        // Boundary no-ops keep the running timer and its phase
        if snapshot.generation == before {
            debug!(event, "Playback unchanged");
            return;
        }

        AppLogger::log_playback_event(event, snapshot.index, snapshot.point_count, snapshot.generation);
        self.rearm(&snapshot);
        self.updates.send_replace(snapshot);
    }

    fn rearm(&mut self, snapshot: &PlaybackSnapshot) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }

        if snapshot.is_playing {
            let period = Duration::from_millis(snapshot.speed_ms);
            debug!(
                generation = snapshot.generation,
                speed_ms = snapshot.speed_ms,
                "Arming playback timer"
            );
            self.ticker = Some(tokio::spawn(tick_loop(
                Arc::clone(&self.controller),
                Arc::clone(&self.updates),
                snapshot.generation,
                period,
            )));
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

async fn tick_loop(
    controller: Arc<Mutex<PlaybackController>>,
    updates: Arc<watch::Sender<PlaybackSnapshot>>,
    generation: u64,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let (outcome, snapshot) = {
            let mut controller = controller.lock().await;
            let outcome = controller.tick(generation);
            (outcome, controller.snapshot())
        };

        match outcome {
            TickOutcome::Advanced(_) => {
                updates.send_replace(snapshot);
            }
            TickOutcome::Completed => {
                info!(index = snapshot.index, "Playback reached the end of the route");
                updates.send_replace(snapshot);
                break;
            }
            TickOutcome::Stale => {
                debug!(generation, "Dropping stale playback timer");
                break;
            }
        }
    }
}
