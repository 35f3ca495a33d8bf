// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Recommendation engine producing advisory messages from a daily summary

use super::metrics::SummaryMetrics;
use crate::config::RecommendationThresholds;
use crate::models::{DailySummary, Recommendation, RecommendationType};

/// Rule-based recommendation engine
///
/// Rules are evaluated independently in a fixed order (efficiency, outside
/// area, switch count, positive case), so the output order is stable for a
/// given summary.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendationThresholds,
}

impl RecommendationEngine {
    /// Create an engine with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom thresholds
    pub fn with_thresholds(thresholds: RecommendationThresholds) -> Self {
        Self { thresholds }
    }

    /// Generate recommendations for one summary
    ///
    /// A day without any tracked data yields no advice.
    pub fn generate(&self, summary: &DailySummary) -> Vec<Recommendation> {
        if summary.total_data_points == 0 && summary.tracked_minutes() == 0.0 {
            return Vec::new();
        }

        let metrics = SummaryMetrics::from_summary(summary);
        let total_switches = summary
            .activity_pattern
            .as_ref()
            .map_or(0, |pattern| pattern.total_switches);

        let mut recommendations = Vec::new();
        recommendations.extend(self.efficiency_recommendation(metrics.work_efficiency_ratio));
        recommendations.extend(self.outside_area_recommendation(metrics.outside_percentage));
        recommendations.extend(self.pattern_recommendation(total_switches));
        recommendations.extend(self.positive_recommendation(&metrics));
        recommendations
    }

    fn efficiency_recommendation(&self, efficiency: f64) -> Option<Recommendation> {
        if efficiency < self.thresholds.low_efficiency {
            Some(recommendation(
                RecommendationType::Warning,
                "⚠️",
                "Tingkatkan Jam Kerja",
                "Jam kerja masih di bawah target. Pertimbangkan untuk memulai lebih awal atau mengurangi waktu istirahat.".to_string(),
            ))
        } else if efficiency > self.thresholds.high_efficiency {
            Some(recommendation(
                RecommendationType::Info,
                "💡",
                "Pertimbangkan Work-Life Balance",
                "Jam kerja melebihi target. Pastikan untuk menjaga keseimbangan kehidupan kerja.".to_string(),
            ))
        } else {
            None
        }
    }

    fn outside_area_recommendation(&self, outside_percentage: f64) -> Option<Recommendation> {
        (outside_percentage > self.thresholds.high_outside_percentage).then(|| {
            recommendation(
                RecommendationType::Warning,
                "📍",
                "Optimalkan Waktu di Area Kerja",
                format!(
                    "{:.1}% waktu dihabiskan di luar area kerja. Evaluasi kebutuhan mobilitas.",
                    outside_percentage
                ),
            )
        })
    }

    fn pattern_recommendation(&self, total_switches: usize) -> Option<Recommendation> {
        (total_switches > self.thresholds.high_switch_count).then(|| {
            recommendation(
                RecommendationType::Info,
                "🔄",
                "Stabilkan Pola Kerja",
                "Terlalu banyak perpindahan lokasi. Cobalah untuk lebih fokus di satu area.".to_string(),
            )
        })
    }

    // May co-occur with the switch-count advice; both are kept.
    fn positive_recommendation(&self, metrics: &SummaryMetrics) -> Option<Recommendation> {
        let efficiency = metrics.work_efficiency_ratio;
        let in_band = efficiency >= self.thresholds.excellent_efficiency_min
            && efficiency <= self.thresholds.excellent_efficiency_max;

        (in_band && metrics.outside_percentage < self.thresholds.excellent_outside_max).then(|| {
            recommendation(
                RecommendationType::Success,
                "🎉",
                "Performa Excellent!",
                "Anda menunjukkan pola kerja yang sangat baik dan konsisten.".to_string(),
            )
        })
    }
}

/// Generate recommendations with the default thresholds
pub fn generate_recommendations(summary: &DailySummary) -> Vec<Recommendation> {
    RecommendationEngine::new().generate(summary)
}

fn recommendation(kind: RecommendationType, icon: &str, title: &str, message: String) -> Recommendation {
    Recommendation {
        recommendation_type: kind,
        icon: icon.to_string(),
        title: title.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityPattern;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn summary(work: f64, outside: f64, switches: usize) -> DailySummary {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let mut summary = DailySummary::empty("emp-1", date, 8.0);
        summary.total_work_minutes = work;
        summary.total_outside_area_minutes = outside;
        summary.activity_pattern = Some(ActivityPattern {
            peak_activity_hour: 9,
            hourly_activity: BTreeMap::new(),
            total_switches: switches,
            consistency_score: 100.0,
            mobility_score: 100.0,
            work_streaks: Vec::new(),
        });
        summary
    }

    fn titles(recommendations: &[Recommendation]) -> Vec<&str> {
        recommendations.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_full_shift_is_excellent() {
        let recs = generate_recommendations(&summary(480.0, 0.0, 0));

        assert_eq!(titles(&recs), vec!["Performa Excellent!"]);
        assert_eq!(recs[0].recommendation_type, RecommendationType::Success);
    }

    #[test]
    fn test_low_efficiency_warning() {
        let recs = generate_recommendations(&summary(240.0, 0.0, 0));

        assert_eq!(titles(&recs), vec!["Tingkatkan Jam Kerja"]);
        assert_eq!(recs[0].recommendation_type, RecommendationType::Warning);
    }

    #[test]
    fn test_overtime_info() {
        let recs = generate_recommendations(&summary(600.0, 0.0, 0));

        assert_eq!(titles(&recs), vec!["Pertimbangkan Work-Life Balance"]);
    }

    #[test]
    fn test_outside_area_message_interpolates_percentage() {
        // 400 work, 200 outside: efficiency 83.3, outside 33.3%
        let recs = generate_recommendations(&summary(400.0, 200.0, 0));

        assert_eq!(titles(&recs), vec!["Optimalkan Waktu di Area Kerja"]);
        assert!(recs[0].message.starts_with("33.3% waktu"));
    }

    #[test]
    fn test_rule_order_with_all_warnings() {
        let recs = generate_recommendations(&summary(100.0, 200.0, 25));

        assert_eq!(
            titles(&recs),
            vec![
                "Tingkatkan Jam Kerja",
                "Optimalkan Waktu di Area Kerja",
                "Stabilkan Pola Kerja",
            ]
        );
    }

    #[test]
    fn test_excellent_and_unstable_pattern_overlap() {
        let recs = generate_recommendations(&summary(480.0, 30.0, 21));

        assert_eq!(titles(&recs), vec!["Stabilkan Pola Kerja", "Performa Excellent!"]);
    }

    #[test]
    fn test_neutral_band_yields_nothing() {
        // efficiency 80%, outside 10%
        let recs = generate_recommendations(&summary(384.0, 42.0, 3));

        assert!(recs.is_empty());
    }

    #[test]
    fn test_empty_day_yields_nothing() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        assert!(generate_recommendations(&DailySummary::empty("emp-1", date, 8.0)).is_empty());
    }

    #[test]
    fn test_deterministic_output() {
        let day = summary(100.0, 200.0, 25);
        let engine = RecommendationEngine::new();

        assert_eq!(engine.generate(&day), engine.generate(&day));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RecommendationThresholds {
            high_switch_count: 2,
            ..RecommendationThresholds::default()
        };
        let recs = RecommendationEngine::with_thresholds(thresholds).generate(&summary(480.0, 0.0, 3));

        assert_eq!(titles(&recs), vec!["Stabilkan Pola Kerja", "Performa Excellent!"]);
    }
}
