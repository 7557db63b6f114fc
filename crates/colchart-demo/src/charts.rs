//! The three live charts the demo keeps over one play-count feed.

use crate::mock::{PlayCount, Province};
use colchart_core::{Column, CompactNumberFormatter, Result};
use colchart_feed::{
    BatchFeed, ChartConfig, ColumnChart, ColumnPipeline, DivisorKind, GroupedColumnChart, GroupedPipeline,
    StackedColumnChart, StackedPipeline,
};
use colchart_layout::{
    Anchor, Axes, AxisConfig, ChartMargin, GridLineConfig, GroupedColumn, LabelConfig, RangeConfig,
    StackedColumn, TickConfig,
};

const COUNT_STEP: f64 = 10_000.0;

/// Counts scaled against the busiest artist, so the tallest column fills the chart
pub fn default_config() -> ChartConfig {
    ChartConfig::default().divisor(DivisorKind::MaxAbs)
}

fn count(play: &PlayCount) -> f64 {
    play.count
}

fn province(play: &PlayCount) -> Province {
    play.province
}

fn count_axis<D>() -> AxisConfig<D> {
    AxisConfig::range(RangeConfig::new(COUNT_STEP).formatter(CompactNumberFormatter))
        .grid_lines(GridLineConfig::default())
        .ticks(TickConfig::new(5.0))
}

pub struct DemoCharts {
    /// One column per artist
    pub artists: ColumnChart<PlayCount>,
    /// Artists clustered by province
    pub provinces: GroupedColumnChart<PlayCount, Province>,
    /// Artists piled per province
    pub totals: StackedColumnChart<PlayCount, Province>,
}

impl DemoCharts {
    pub fn new(config: &ChartConfig) -> Result<Self> {
        let artists = ColumnPipeline::<PlayCount>::builder()
            .value_selector(count)
            .config(*config)
            .build_columns()?;
        let provinces = GroupedPipeline::<PlayCount, Province>::builder()
            .value_selector(count)
            .key_selector(province)
            .config(*config)
            .build_grouped()?;
        let totals = StackedPipeline::<PlayCount, Province>::builder()
            .value_selector(count)
            .key_selector(province)
            .config(*config)
            .build_stacked()?;

        let artist_axes = Axes::new()
            .bottom(
                AxisConfig::labelled_inputs(|column: &Column<PlayCount>| column.input.artist.clone())
                    .labels(LabelConfig::default().rotation(-45.0).text_anchor(Anchor::End)),
            )
            .left(count_axis());
        let province_axes = Axes::new()
            .bottom(AxisConfig::labelled_inputs(|group: &GroupedColumn<Province, PlayCount>| {
                group.input.label().to_string()
            }))
            .left(count_axis());
        let total_axes = Axes::new()
            .bottom(AxisConfig::labelled_inputs(|stack: &StackedColumn<Province, PlayCount>| {
                stack.input.label().to_string()
            }))
            .left(count_axis());

        Ok(Self {
            artists: ColumnChart::new(artists)
                .with_axes(artist_axes)
                .with_margin(ChartMargin::new(10.0, 10.0, 80.0, 50.0)),
            provinces: GroupedColumnChart::new(provinces)
                .with_axes(province_axes)
                .with_margin(ChartMargin::standard()),
            totals: StackedColumnChart::new(totals)
                .with_axes(total_axes)
                .with_margin(ChartMargin::standard()),
        })
    }

    pub fn observe(&mut self, feed: &BatchFeed<PlayCount>) {
        self.artists.observe(feed);
        self.provinces.observe(feed);
        self.totals.observe(feed);
    }

    pub fn detach(&mut self) {
        self.artists.detach();
        self.provinces.detach();
        self.totals.detach();
    }

    /// Snapshot revisions of every chart, in declaration order
    pub fn revisions(&self) -> [u64; 3] {
        [
            self.artists.revision(),
            self.provinces.revision(),
            self.totals.revision(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(artist: &str, count: f64, province: Province) -> PlayCount {
        PlayCount {
            artist: artist.to_string(),
            count,
            province,
            updated_at: 0,
        }
    }

    fn batch() -> Vec<PlayCount> {
        vec![
            play("Buck 65", 21192.0, Province::NovaScotia),
            play("Hawksley Workman", 31910.0, Province::Ontario),
            play("Metric", 10067.0, Province::Ontario),
        ]
    }

    #[test]
    fn test_all_charts_follow_feed() {
        let feed = BatchFeed::new();
        let mut charts = DemoCharts::new(&default_config()).unwrap();
        charts.observe(&feed);

        feed.publish(batch());
        assert_eq!(charts.revisions(), [1, 1, 1]);

        let provinces = charts.provinces.snapshot().unwrap();
        let groups: Vec<_> = provinces.plot.points.iter().map(|p| p.datum.input).collect();
        assert_eq!(groups, vec![Province::NovaScotia, Province::Ontario]);

        let totals = charts.totals.snapshot().unwrap();
        let ontario = &totals.plot.points[1];
        assert_eq!(ontario.datum.positive_value, 31910.0 + 10067.0);
        assert!(totals.axes.get(colchart_layout::Side::Left).is_some());
    }

    #[test]
    fn test_geometry_stays_inside_charts() {
        let charts = DemoCharts::new(&default_config()).unwrap();
        charts.artists.update(batch());
        charts.totals.update(batch());

        let artists = charts.artists.snapshot().unwrap();
        let tallest = &artists.plot.points[1];
        assert_eq!((tallest.y1, tallest.y2), (0.0, 200.0));

        let totals = charts.totals.snapshot().unwrap();
        for stack in &totals.plot.points {
            assert!(stack.y1 >= -1e-9 && stack.y2 <= totals.plot.height);
        }
    }

    #[test]
    fn test_detached_charts_ignore_feed() {
        let feed = BatchFeed::new();
        let mut charts = DemoCharts::new(&default_config()).unwrap();
        charts.observe(&feed);
        feed.publish(batch());
        charts.detach();
        feed.publish(batch());

        assert_eq!(charts.revisions(), [1, 1, 1]);
    }

    #[test]
    fn test_artist_axis_labels() {
        let charts = DemoCharts::new(&default_config()).unwrap();
        charts.artists.update(batch());

        let snapshot = charts.artists.snapshot().unwrap();
        let bottom = snapshot.axes.get(colchart_layout::Side::Bottom).unwrap();
        let labels: Vec<_> = bottom.labels().map(|l| l.text.as_str()).collect();
        assert_eq!(labels, vec!["Buck 65", "Hawksley Workman", "Metric"]);
    }
}
