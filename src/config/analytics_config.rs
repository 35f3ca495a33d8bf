// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Analytics parameters: daily target, score weights and recommendation thresholds

use crate::constants::{defaults, scoring, thresholds};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Main analytics configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Daily target used when a summary does not carry one
    pub expected_work_hours: f64,
    /// Mobility points lost per status switch
    pub switch_penalty: f64,
    /// Consistency/mobility value used when no activity pattern exists
    pub pattern_fallback_score: f64,
    pub score_weights: ScoreWeights,
    pub recommendation_thresholds: RecommendationThresholds,
}

/// Weights of the overall score components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub efficiency: f64,
    pub productivity: f64,
    pub consistency: f64,
    pub mobility: f64,
}

/// Thresholds of the recommendation rules (percentages unless noted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub low_efficiency: f64,
    pub high_efficiency: f64,
    pub high_outside_percentage: f64,
    /// Status switch count
    pub high_switch_count: usize,
    pub excellent_efficiency_min: f64,
    pub excellent_efficiency_max: f64,
    pub excellent_outside_max: f64,
}

impl AnalyticsConfig {
    /// Load analytics configuration from a standalone toml file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read analytics config file: {}", path))?;

        let config: AnalyticsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse analytics config file: {}", path))?;

        Ok(config)
    }

    /// Expected hours, falling back to the configured target when missing or non-positive
    pub fn resolve_expected_hours(&self, expected: Option<f64>) -> f64 {
        match expected {
            Some(hours) if hours > 0.0 => hours,
            _ => self.expected_work_hours,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            expected_work_hours: defaults::EXPECTED_WORK_HOURS,
            switch_penalty: defaults::SWITCH_PENALTY,
            pattern_fallback_score: defaults::PATTERN_FALLBACK_SCORE,
            score_weights: ScoreWeights::default(),
            recommendation_thresholds: RecommendationThresholds::default(),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            efficiency: scoring::EFFICIENCY_WEIGHT,
            productivity: scoring::PRODUCTIVITY_WEIGHT,
            consistency: scoring::CONSISTENCY_WEIGHT,
            mobility: scoring::MOBILITY_WEIGHT,
        }
    }
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            low_efficiency: thresholds::LOW_EFFICIENCY,
            high_efficiency: thresholds::HIGH_EFFICIENCY,
            high_outside_percentage: thresholds::HIGH_OUTSIDE_PERCENTAGE,
            high_switch_count: thresholds::HIGH_SWITCH_COUNT,
            excellent_efficiency_min: thresholds::EXCELLENT_EFFICIENCY_MIN,
            excellent_efficiency_max: thresholds::EXCELLENT_EFFICIENCY_MAX,
            excellent_outside_max: thresholds::EXCELLENT_OUTSIDE_MAX,
        }
    }
}
