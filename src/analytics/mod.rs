// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Analytics Module
//!
//! Daily activity analytics over an employee's track points.
//!
//! This module includes:
//! - Work / outside-area time integration and activity patterns
//! - Derived efficiency, productivity and overall scores
//! - Rule-based recommendations

pub mod analyzer;
pub mod metrics;
pub mod recommendation_engine;

pub use analyzer::{consistency_score, integrate_minutes, ActivityAnalyzer};
pub use metrics::{
    outside_percentage, productivity_score, work_efficiency_ratio, work_efficiency_with_quality,
    OverallScore, ScoreBreakdown, ScoreCalculator, StatusBadge, SummaryMetrics,
};
pub use recommendation_engine::{generate_recommendations, RecommendationEngine};
