//! Chart instances.
//!
//! A chart observes at most one feed at a time. Every batch it receives
//! recomputes the complete geometry (plot, axes, frame) and replaces the
//! previous snapshot.

use crate::{Batch, BatchFeed, ColumnPipeline, GroupedPipeline, Pipeline, StackedPipeline, Subscription};
use colchart_layout::{Axes, AxesLayout, AxisConfig, ChartFrame, ChartMargin, Plot, Side};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

pub type ColumnChart<T> = Chart<T, ColumnPipeline<T>>;
pub type GroupedColumnChart<T, G> = Chart<T, GroupedPipeline<T, G>>;
pub type StackedColumnChart<T, G> = Chart<T, StackedPipeline<T, G>>;

/// Geometry computed from one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSnapshot<P> {
    pub revision: u64,
    pub plot: Plot<P>,
    pub axes: AxesLayout,
    pub frame: ChartFrame,
}

struct ChartState<T, P> {
    batch: Option<Batch<T>>,
    snapshot: Option<Arc<ChartSnapshot<P>>>,
    revision: u64,
}

struct ChartShared<T, P: Pipeline<T>> {
    pipeline: P,
    axes: Mutex<Axes<P::Datum>>,
    margin: Mutex<ChartMargin>,
    state: Mutex<ChartState<T, P::Point>>,
    /// Bumped on every source change; deliveries from older sources are dropped
    generation: AtomicU64,
}

impl<T, P> ChartShared<T, P>
where
    T: Send + Sync + 'static,
    P: Pipeline<T>,
{
    fn receive(&self, generation: u64, batch: Batch<T>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::trace!(generation, "dropping batch from a replaced source");
            return;
        }
        self.recompute(&mut state, batch);
    }

    fn recompute(&self, state: &mut ChartState<T, P::Point>, batch: Batch<T>) {
        let plot = self.pipeline.plot(&batch);
        let axes = self
            .axes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .layout(&plot, self.pipeline.domain());
        let margin = *self.margin.lock().unwrap_or_else(PoisonError::into_inner);
        let frame = ChartFrame::new(&plot, &axes).with_margin(margin);

        state.revision += 1;
        tracing::trace!(
            revision = state.revision,
            records = batch.len(),
            points = plot.len(),
            "recomputed chart"
        );

        state.snapshot = Some(Arc::new(ChartSnapshot {
            revision: state.revision,
            plot,
            axes,
            frame,
        }));
        state.batch = Some(batch);
    }
}

/// A live chart over a swappable batch source
pub struct Chart<T, P: Pipeline<T>> {
    shared: Arc<ChartShared<T, P>>,
    subscription: Option<Subscription>,
}

impl<T, P> Chart<T, P>
where
    T: Send + Sync + 'static,
    P: Pipeline<T>,
{
    pub fn new(pipeline: P) -> Self {
        Self {
            shared: Arc::new(ChartShared {
                pipeline,
                axes: Mutex::new(Axes::new()),
                margin: Mutex::new(ChartMargin::default()),
                state: Mutex::new(ChartState {
                    batch: None,
                    snapshot: None,
                    revision: 0,
                }),
                generation: AtomicU64::new(0),
            }),
            subscription: None,
        }
    }

    pub fn with_axes(self, axes: Axes<P::Datum>) -> Self {
        *self.shared.axes.lock().unwrap_or_else(PoisonError::into_inner) = axes;
        self
    }

    pub fn with_margin(self, margin: ChartMargin) -> Self {
        *self.shared.margin.lock().unwrap_or_else(PoisonError::into_inner) = margin;
        self
    }

    pub fn pipeline(&self) -> &P {
        &self.shared.pipeline
    }

    /// Observe `feed`, replacing any current source.
    ///
    /// The previous subscription is cancelled before the new one is made, so
    /// batches from the old feed never reach this chart afterwards. A feed
    /// that already published delivers its latest batch immediately.
    pub fn observe(&mut self, feed: &BatchFeed<T>) {
        if let Some(previous) = self.subscription.take() {
            previous.cancel();
            tracing::debug!(previous = previous.id(), "swapping chart source");
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let shared: Weak<ChartShared<T, P>> = Arc::downgrade(&self.shared);
        let subscription = feed.subscribe(move |batch| {
            if let Some(shared) = shared.upgrade() {
                shared.receive(generation, batch);
            }
        });
        tracing::debug!(subscription = subscription.id(), "chart observing feed");
        self.subscription = Some(subscription);
    }

    /// Stop observing. Returns whether a subscription was cancelled.
    pub fn detach(&mut self) -> bool {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.subscription
            .take()
            .is_some_and(|subscription| subscription.cancel())
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Current subscription, if observing
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Recompute from a batch supplied directly rather than through a feed
    pub fn update(&self, batch: Vec<T>) {
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.shared.recompute(&mut state, Arc::new(batch));
    }

    /// Recompute from the last batch, e.g. after an axis change.
    /// Returns `false` when no batch arrived yet.
    pub fn refresh(&self) -> bool {
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.batch.clone() {
            Some(batch) => {
                self.shared.recompute(&mut state, batch);
                true
            }
            None => false,
        }
    }

    /// Replace or remove one axis and refresh
    pub fn set_axis(&self, side: Side, axis: Option<AxisConfig<P::Datum>>) {
        self.shared
            .axes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(side, axis);
        self.refresh();
    }

    /// Latest geometry, if any batch was received
    pub fn snapshot(&self) -> Option<Arc<ChartSnapshot<P::Point>>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// Number of recomputes so far
    pub fn revision(&self) -> u64 {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }
}

impl<T, P: Pipeline<T>> std::fmt::Debug for Chart<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartConfig, DivisorKind};
    use colchart_layout::{GroupedColumn, RangeConfig, TickConfig};

    #[derive(Debug, Clone, PartialEq)]
    struct Play {
        artist: &'static str,
        province: &'static str,
        count: f64,
    }

    fn play(artist: &'static str, province: &'static str, count: f64) -> Play {
        Play { artist, province, count }
    }

    fn config() -> ChartConfig {
        ChartConfig::new(100.0, 20.0, 5.0).divisor(DivisorKind::Sum)
    }

    fn column_chart() -> ColumnChart<Play> {
        let pipeline = ColumnPipeline::<Play>::builder()
            .value_selector(|p: &Play| p.count)
            .config(config())
            .build_columns()
            .unwrap();
        Chart::new(pipeline)
    }

    #[test]
    fn test_observe_recomputes_on_publish() {
        let feed = BatchFeed::new();
        let mut chart = column_chart();
        chart.observe(&feed);
        assert!(chart.snapshot().is_none());

        feed.publish(vec![play("Lorde", "ON", 10.0), play("Adele", "QC", 30.0)]);
        let snapshot = chart.snapshot().unwrap();

        assert_eq!(snapshot.revision, 1);
        let first = &snapshot.plot.points[0];
        assert_eq!((first.x1, first.x2, first.y1, first.y2), (0.0, 25.0, 75.0, 100.0));
        let second = &snapshot.plot.points[1];
        assert_eq!((second.x1, second.x2, second.y1, second.y2), (25.0, 50.0, 25.0, 100.0));
    }

    #[test]
    fn test_swapping_source_cancels_exactly_once() {
        let first = BatchFeed::new();
        let second = BatchFeed::new();
        let mut chart = column_chart();

        chart.observe(&first);
        first.publish(vec![play("Lorde", "ON", 10.0)]);
        assert_eq!(chart.revision(), 1);

        chart.observe(&second);
        assert_eq!(first.subscriber_count(), 0);
        assert_eq!(second.subscriber_count(), 1);
        assert!(second.is_subscribed(chart.subscription().unwrap()));

        // stale source no longer reaches the layout stage
        assert_eq!(first.publish(vec![play("Adele", "QC", 30.0)]), 0);
        assert_eq!(chart.revision(), 1);

        second.publish(vec![play("Drake", "ON", 5.0), play("Sia", "QC", 5.0)]);
        assert_eq!(chart.revision(), 2);
        assert_eq!(chart.snapshot().unwrap().plot.len(), 2);
    }

    #[test]
    fn test_observe_replays_latest_batch() {
        let feed = BatchFeed::new();
        feed.publish(vec![play("Lorde", "ON", 10.0)]);

        let mut chart = column_chart();
        chart.observe(&feed);
        assert_eq!(chart.revision(), 1);
        assert_eq!(chart.snapshot().unwrap().plot.len(), 1);
    }

    #[test]
    fn test_detach() {
        let feed = BatchFeed::new();
        let mut chart = column_chart();
        chart.observe(&feed);
        assert!(chart.is_observing());

        assert!(chart.detach());
        assert!(!chart.detach());
        assert!(!chart.is_observing());
        feed.publish(vec![play("Lorde", "ON", 10.0)]);
        assert_eq!(chart.revision(), 0);
    }

    #[test]
    fn test_dropping_chart_unsubscribes() {
        let feed = BatchFeed::new();
        {
            let mut chart = column_chart();
            chart.observe(&feed);
            assert_eq!(feed.subscriber_count(), 1);
        }
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn test_set_axis_refreshes() {
        let chart = column_chart();
        assert!(!chart.refresh());

        chart.update(vec![play("Lorde", "ON", 10.0), play("Adele", "QC", 30.0)]);
        assert!(chart.snapshot().unwrap().axes.left.is_none());

        chart.set_axis(
            Side::Left,
            Some(AxisConfig::range(RangeConfig::new(10.0)).ticks(TickConfig::new(4.0))),
        );
        let snapshot = chart.snapshot().unwrap();
        assert_eq!(snapshot.revision, 2);
        let left = snapshot.axes.left.as_ref().unwrap();
        let labels: Vec<_> = left.labels().map(|l| l.text.as_str()).collect();
        assert_eq!(labels, vec!["0", "10", "20", "30"]);
    }

    #[test]
    fn test_identical_batches_give_identical_geometry() {
        let batch = vec![play("Lorde", "ON", 3.0), play("Adele", "QC", -7.0), play("Sia", "ON", 11.0)];
        let a = column_chart();
        let b = column_chart();
        a.update(batch.clone());
        b.update(batch);

        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_grouped_chart() {
        let pipeline = GroupedPipeline::<Play, &str>::builder()
            .value_selector(|p: &Play| p.count)
            .key_selector(|p: &Play| p.province)
            .config(config().group_spacing(10.0))
            .build_grouped()
            .unwrap();
        let mut chart = Chart::new(pipeline)
            .with_axes(Axes::new().bottom(AxisConfig::labelled_inputs(
                |g: &GroupedColumn<&str, Play>| g.input.to_string(),
            )))
            .with_margin(ChartMargin::uniform(5.0));

        let feed = BatchFeed::new();
        chart.observe(&feed);
        feed.publish(vec![
            play("Lorde", "ON", 10.0),
            play("Adele", "QC", 20.0),
            play("Drake", "ON", 10.0),
        ]);

        let snapshot = chart.snapshot().unwrap();
        let keys: Vec<_> = snapshot.plot.points.iter().map(|g| g.datum.input).collect();
        assert_eq!(keys, vec!["ON", "QC"]);
        let artists: Vec<_> = snapshot.plot.points[0]
            .column_points
            .iter()
            .map(|p| p.datum.input.artist)
            .collect();
        assert_eq!(artists, vec!["Lorde", "Drake"]);

        let labels: Vec<_> = snapshot.axes.bottom.as_ref().unwrap().labels().map(|l| l.text.clone()).collect();
        assert_eq!(labels, vec!["ON", "QC"]);
        assert_eq!(snapshot.frame.width(), snapshot.plot.width + 10.0);
    }

    #[test]
    fn test_stacked_chart() {
        let pipeline = StackedPipeline::<Play, &str>::builder()
            .value_selector(|p: &Play| p.count)
            .key_selector(|_: &Play| "all")
            .config(config().stack_spacing(0.0))
            .build_stacked()
            .unwrap();
        let chart: StackedColumnChart<Play, &str> = Chart::new(pipeline);
        chart.update(vec![play("Lorde", "ON", 10.0), play("Adele", "QC", 30.0)]);

        let snapshot = chart.snapshot().unwrap();
        let stack = &snapshot.plot.points[0];
        assert_eq!(stack.y2 - stack.y1, 100.0);
        assert_eq!(stack.datum.positive_value, 40.0);
    }

    #[test]
    fn test_publishing_from_another_thread() {
        let feed = BatchFeed::new();
        let mut chart = column_chart();
        chart.observe(&feed);

        std::thread::scope(|scope| {
            let feed = feed.clone();
            scope.spawn(move || {
                for count in 1..=5 {
                    feed.publish(vec![play("Lorde", "ON", count as f64)]);
                }
            });
        });

        assert_eq!(chart.revision(), 5);
        assert_eq!(chart.snapshot().unwrap().plot.points[0].datum.value, 5.0);
    }

    proptest::proptest! {
        #[test]
        fn prop_snapshot_tracks_latest_batch(
            batches in proptest::collection::vec(
                proptest::collection::vec(-1e4f64..1e4, 0..12),
                1..8,
            )
        ) {
            let feed = BatchFeed::new();
            let mut chart = column_chart();
            chart.observe(&feed);

            let mut last = Vec::new();
            for counts in &batches {
                last = counts.iter().map(|&count| play("Lorde", "ON", count)).collect::<Vec<_>>();
                feed.publish(last.clone());
            }

            let snapshot = chart.snapshot().unwrap();
            proptest::prop_assert_eq!(chart.revision(), batches.len() as u64);
            proptest::prop_assert_eq!(&snapshot.plot, &chart.pipeline().plot(&last));
        }
    }
}
