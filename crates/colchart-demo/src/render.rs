//! Terminal output for chart snapshots.

use crate::charts::DemoCharts;
use chrono::Local;
use colchart_layout::Side;
use std::fmt::Write;

const BAR_WIDTH: f64 = 40.0;

fn bar(height: f64, plot_height: f64) -> String {
    if plot_height <= 0.0 {
        return String::new();
    }
    let cells = (height / plot_height * BAR_WIDTH).round().max(0.0) as usize;
    "#".repeat(cells)
}

/// Text summary of every chart's latest snapshot
pub fn summary(charts: &DemoCharts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", Local::now().format("%H:%M:%S%.3f"));

    if let Some(snapshot) = charts.artists.snapshot() {
        let _ = writeln!(
            out,
            "artists (rev {}, {}x{})",
            snapshot.revision,
            snapshot.frame.width(),
            snapshot.frame.height()
        );
        for point in &snapshot.plot.points {
            let _ = writeln!(
                out,
                "  {:<22} {:>8} {}",
                point.datum.input.artist,
                point.datum.value,
                bar(point.height(), snapshot.plot.height)
            );
        }
    }

    if let Some(snapshot) = charts.provinces.snapshot() {
        let _ = writeln!(out, "provinces (rev {})", snapshot.revision);
        for group in &snapshot.plot.points {
            let _ = writeln!(
                out,
                "  {:<18} x {:>6.1}..{:<6.1} {} artists",
                group.datum.input.label(),
                group.x1,
                group.x2,
                group.column_points.len()
            );
        }
    }

    if let Some(snapshot) = charts.totals.snapshot() {
        let _ = writeln!(out, "totals (rev {})", snapshot.revision);
        for stack in &snapshot.plot.points {
            let _ = writeln!(
                out,
                "  {:<18} {:>8} {}",
                stack.datum.input.label(),
                stack.datum.total_value(),
                bar(stack.y2 - stack.y1, snapshot.plot.height)
            );
        }
        if let Some(left) = snapshot.axes.get(Side::Left) {
            let ticks: Vec<&str> = left.labels().map(|label| label.text.as_str()).collect();
            let _ = writeln!(out, "  scale: {}", ticks.join(" "));
        }
    }

    out
}

/// Every chart's latest snapshot as one JSON document
pub fn json(charts: &DemoCharts) -> serde_json::Result<String> {
    serde_json::to_string(&serde_json::json!({
        "timestamp": Local::now().to_rfc3339(),
        "artists": charts.artists.snapshot().as_deref(),
        "provinces": charts.provinces.snapshot().as_deref(),
        "totals": charts.totals.snapshot().as_deref(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{PlayCount, Province};

    fn charts_with_data() -> DemoCharts {
        let charts = DemoCharts::new(&crate::charts::default_config()).unwrap();
        let batch = vec![
            PlayCount {
                artist: "Arcade Fire".to_string(),
                count: 2172.0,
                province: Province::Quebec,
                updated_at: 0,
            },
            PlayCount {
                artist: "Metric".to_string(),
                count: 10067.0,
                province: Province::Ontario,
                updated_at: 0,
            },
        ];
        charts.artists.update(batch.clone());
        charts.provinces.update(batch.clone());
        charts.totals.update(batch);
        charts
    }

    #[test]
    fn test_bar_scales_to_width() {
        assert_eq!(bar(200.0, 200.0).len(), 40);
        assert_eq!(bar(50.0, 200.0).len(), 10);
        assert_eq!(bar(10.0, 0.0), "");
    }

    #[test]
    fn test_summary_lists_every_chart() {
        let text = summary(&charts_with_data());
        assert!(text.contains("artists (rev 1"));
        assert!(text.contains("Metric"));
        assert!(text.contains("provinces (rev 1)"));
        assert!(text.contains("Quebec"));
        assert!(text.contains("totals (rev 1)"));
    }

    #[test]
    fn test_json_has_snapshots() {
        let value: serde_json::Value = serde_json::from_str(&json(&charts_with_data()).unwrap()).unwrap();
        assert_eq!(value["artists"]["revision"], 1);
        assert_eq!(value["provinces"]["plot"]["points"].as_array().unwrap().len(), 2);
        assert!(value["totals"]["axes"]["left"].is_object());
    }

    #[test]
    fn test_empty_charts_render_header_only() {
        let charts = DemoCharts::new(&crate::charts::default_config()).unwrap();
        assert_eq!(summary(&charts).lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&json(&charts).unwrap()).unwrap();
        assert!(value["artists"].is_null());
    }
}
