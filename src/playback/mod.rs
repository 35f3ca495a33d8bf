// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Playback Module
//!
//! Time-scrubbing replay of a day's track points for map visualization.
//! The [`PlaybackController`] is a synchronous state machine; the
//! [`PlaybackDriver`] steps it on a tokio timer.

pub mod controller;
pub mod driver;
pub mod speed;

pub use controller::{PlaybackController, PlaybackPhase, PlaybackSnapshot, RouteBounds, TickOutcome};
pub use driver::PlaybackDriver;
pub use speed::{speed_label, PlaybackSpeed};
