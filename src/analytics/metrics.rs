// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Request-time metrics derived from a daily summary
//!
//! None of these values are stored on the summary; consumers compute them
//! when they need them.

use crate::config::{AnalyticsConfig, ScoreWeights};
use crate::constants::{scoring, units};
use crate::models::DailySummary;
use serde::{Deserialize, Serialize};

/// Derived percentages for one summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    /// Work minutes against the daily target, uncapped
    pub work_efficiency_ratio: f64,
    /// Share of tracked time spent outside the geofence
    pub outside_percentage: f64,
    /// Share of tracked time spent inside the geofence
    pub productivity_score: f64,
}

impl SummaryMetrics {
    pub fn from_summary(summary: &DailySummary) -> Self {
        Self {
            work_efficiency_ratio: work_efficiency_ratio(summary),
            outside_percentage: outside_percentage(summary),
            productivity_score: productivity_score(summary),
        }
    }
}

/// `work / (expected * 60) * 100`, 0 when there is no target
pub fn work_efficiency_ratio(summary: &DailySummary) -> f64 {
    let expected_minutes = summary.expected_work_hours * units::MINUTES_PER_HOUR;
    if expected_minutes <= 0.0 {
        return 0.0;
    }
    summary.total_work_minutes / expected_minutes * 100.0
}

/// `outside / (work + outside) * 100`, 0 when nothing was tracked
pub fn outside_percentage(summary: &DailySummary) -> f64 {
    let tracked = summary.tracked_minutes();
    if tracked <= 0.0 {
        return 0.0;
    }
    summary.total_outside_area_minutes / tracked * 100.0
}

/// `work / (work + outside) * 100`, 0 when nothing was tracked
pub fn productivity_score(summary: &DailySummary) -> f64 {
    let tracked = summary.tracked_minutes();
    if tracked <= 0.0 {
        return 0.0;
    }
    summary.total_work_minutes / tracked * 100.0
}

/// Efficiency against a target scaled by a quality factor, capped at 100
pub fn work_efficiency_with_quality(actual_minutes: f64, expected_minutes: f64, quality: f64) -> f64 {
    if expected_minutes == 0.0 {
        return 0.0;
    }
    let base = actual_minutes / expected_minutes * 100.0;
    (base * quality).min(scoring::MAX_SCORE)
}

/// Unweighted component values of the overall score, rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub efficiency: u32,
    pub productivity: u32,
    pub consistency: u32,
    pub mobility: u32,
}

/// Weighted overall score (0-100) with its breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallScore {
    pub overall: u32,
    pub breakdown: ScoreBreakdown,
}

impl OverallScore {
    pub fn badge(&self) -> StatusBadge {
        StatusBadge::from_score(self.overall)
    }
}

/// Calculator for the weighted overall score
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoreWeights,
    pattern_fallback_score: f64,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}

impl ScoreCalculator {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            weights: config.score_weights.clone(),
            pattern_fallback_score: config.pattern_fallback_score,
        }
    }

    /// Weighted blend of capped efficiency, productivity, consistency and mobility
    ///
    /// A summary without an activity pattern scores consistency and mobility
    /// with the configured fallback.
    pub fn calculate(&self, summary: &DailySummary) -> OverallScore {
        let efficiency = work_efficiency_ratio(summary).min(scoring::MAX_SCORE);
        let productivity = productivity_score(summary);
        let (consistency, mobility) = summary
            .activity_pattern
            .as_ref()
            .map_or((self.pattern_fallback_score, self.pattern_fallback_score), |pattern| {
                (pattern.consistency_score, pattern.mobility_score)
            });

        let overall = efficiency * self.weights.efficiency
            + productivity * self.weights.productivity
            + consistency * self.weights.consistency
            + mobility * self.weights.mobility;

        OverallScore {
            overall: round_score(overall),
            breakdown: ScoreBreakdown {
                efficiency: round_score(efficiency),
                productivity: round_score(productivity),
                consistency: round_score(consistency),
                mobility: round_score(mobility),
            },
        }
    }
}

fn round_score(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

/// Qualitative band of an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBadge {
    Excellent,
    Good,
    Average,
    BelowAverage,
    NeedsImprovement,
}

impl StatusBadge {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::Excellent,
            80..=89 => Self::Good,
            70..=79 => Self::Average,
            60..=69 => Self::BelowAverage,
            _ => Self::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Excellent => "green",
            Self::Good => "blue",
            Self::Average => "yellow",
            Self::BelowAverage => "orange",
            Self::NeedsImprovement => "red",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Excellent => "🏆",
            Self::Good => "👍",
            Self::Average => "⚡",
            Self::BelowAverage => "⚠️",
            Self::NeedsImprovement => "🔴",
        }
    }
}
