// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Named playback speed presets

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback speed presets offered to users
///
/// Smaller intervals mean faster playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpeed {
    /// 400 ms per step
    Half,
    /// 200 ms per step
    #[default]
    Normal,
    /// 100 ms per step
    Double,
    /// 50 ms per step
    Quadruple,
}

impl PlaybackSpeed {
    pub const ALL: [PlaybackSpeed; 4] = [Self::Half, Self::Normal, Self::Double, Self::Quadruple];

    pub fn interval_ms(&self) -> u64 {
        match self {
            Self::Half => 400,
            Self::Normal => 200,
            Self::Double => 100,
            Self::Quadruple => 50,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Half => "0.5x",
            Self::Normal => "1x",
            Self::Double => "2x",
            Self::Quadruple => "4x",
        }
    }

    /// Preset with exactly this interval
    pub fn from_interval_ms(ms: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.interval_ms() == ms)
    }
}

/// Display label for an arbitrary interval; non-preset values show as "1x"
pub fn speed_label(ms: u64) -> &'static str {
    PlaybackSpeed::from_interval_ms(ms)
        .unwrap_or_default()
        .label()
}
