// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plain-text rendering of history reports (Indonesian labels)

use crate::history::HistoryReport;
use crate::playback::PlaybackSnapshot;
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Write;

/// Human-readable duration: `"45 menit"`, `"2 jam"`, `"2 jam 5 menit"`
///
/// Minutes are rounded before splitting so 119.7 reads as `"2 jam"`.
pub fn format_duration(minutes: f64) -> String {
    let total = if minutes.is_finite() { minutes.max(0.0).round() as u64 } else { 0 };

    if total < 60 {
        return format!("{total} menit");
    }

    let hours = total / 60;
    let remaining = total % 60;
    if remaining == 0 {
        format!("{hours} jam")
    } else {
        format!("{hours} jam {remaining} menit")
    }
}

fn format_time(timestamp: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    timestamp
        .map(|ts| ts.with_timezone(&offset).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render a report for a terminal
pub fn render_report(report: &HistoryReport, offset: FixedOffset) -> String {
    let summary = &report.summary;
    let badge = report.score.badge();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Riwayat {} - {}", summary.employee_id, summary.date);
    if let Some(geofence) = &report.geofence {
        let _ = writeln!(out, "Area kerja      : {}", geofence.name);
    }
    let _ = writeln!(
        out,
        "Pembaruan       : {} - {}",
        format_time(summary.first_update, offset),
        format_time(summary.last_update, offset)
    );
    let _ = writeln!(out, "Titik data      : {}", summary.total_data_points);
    let _ = writeln!(out, "Waktu kerja     : {}", format_duration(summary.total_work_minutes));
    let _ = writeln!(out, "Di luar area    : {}", format_duration(summary.total_outside_area_minutes));
    let _ = writeln!(out, "Target          : {} jam", summary.expected_work_hours);
    let _ = writeln!(out, "Efisiensi kerja : {:.1}%", report.metrics.work_efficiency_ratio);
    let _ = writeln!(out, "Produktivitas   : {:.1}%", report.metrics.productivity_score);
    let _ = writeln!(out, "Di luar area    : {:.1}%", report.metrics.outside_percentage);

    if let Some(pattern) = &summary.activity_pattern {
        let _ = writeln!(out, "Jam tersibuk    : {:02}:00", pattern.peak_activity_hour);
        let _ = writeln!(out, "Perpindahan     : {}", pattern.total_switches);
        let _ = writeln!(out, "Sesi kerja      : {}", pattern.work_streaks.len());
    }

    let breakdown = &report.score.breakdown;
    let _ = writeln!(
        out,
        "Skor keseluruhan: {} {} {}",
        report.score.overall,
        badge.icon(),
        badge.label()
    );
    let _ = writeln!(
        out,
        "  efisiensi {} | produktivitas {} | konsistensi {} | mobilitas {}",
        breakdown.efficiency, breakdown.productivity, breakdown.consistency, breakdown.mobility
    );

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "Rekomendasi:");
        for rec in &report.recommendations {
            let _ = writeln!(out, "  {} {}: {}", rec.icon, rec.title, rec.message);
        }
    }

    out
}

/// One playback frame as a single line
pub fn render_frame(snapshot: &PlaybackSnapshot, offset: FixedOffset) -> String {
    match &snapshot.current_marker {
        Some(point) => format!(
            "[{:>3}/{}] {:5.1}% {} {:.6},{:.6} {}",
            snapshot.index + 1,
            snapshot.point_count,
            snapshot.progress * 100.0,
            point.timestamp.with_timezone(&offset).format("%H:%M:%S"),
            point.lat,
            point.lng,
            if point.in_geofence { "di area" } else { "di luar area" }
        ),
        None => format!("[  -/{}] rute penuh", snapshot.point_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0 menit");
        assert_eq!(format_duration(45.4), "45 menit");
        assert_eq!(format_duration(60.0), "1 jam");
        assert_eq!(format_duration(125.0), "2 jam 5 menit");
        assert_eq!(format_duration(119.7), "2 jam");
        assert_eq!(format_duration(-3.0), "0 menit");
    }
}
