//! Axis layout engine
//!
//! Computes ticks, grid lines and labels for up to four axes around a plot.
//! Coordinates are local to each axis: `x` runs along the plot width for
//! horizontal axes, `y` along the plot height for vertical ones, and the
//! perpendicular coordinate starts at the axis line.

use crate::axis::*;
use crate::{Plot, PlotPoint, ValueRange};
use colchart_core::{Domain, LabelFormatter, PlainNumberFormatter};

/// Upper bound on markings produced by a range axis
const MAX_RANGE_STEPS: usize = 10_000;

// ============================================================================
// AXES
// ============================================================================

/// Axis configuration for each side of a chart
pub struct Axes<D> {
    bottom: Option<AxisConfig<D>>,
    left: Option<AxisConfig<D>>,
    right: Option<AxisConfig<D>>,
    top: Option<AxisConfig<D>>,
}

impl<D> Default for Axes<D> {
    fn default() -> Self {
        Self {
            bottom: None,
            left: None,
            right: None,
            top: None,
        }
    }
}

impl<D> Clone for Axes<D> {
    fn clone(&self) -> Self {
        Self {
            bottom: self.bottom.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            top: self.top.clone(),
        }
    }
}

impl<D> std::fmt::Debug for Axes<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Axes")
            .field("bottom", &self.bottom)
            .field("left", &self.left)
            .field("right", &self.right)
            .field("top", &self.top)
            .finish()
    }
}

impl<D> Axes<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bottom(mut self, axis: AxisConfig<D>) -> Self {
        self.bottom = Some(axis);
        self
    }

    pub fn left(mut self, axis: AxisConfig<D>) -> Self {
        self.left = Some(axis);
        self
    }

    pub fn right(mut self, axis: AxisConfig<D>) -> Self {
        self.right = Some(axis);
        self
    }

    pub fn top(mut self, axis: AxisConfig<D>) -> Self {
        self.top = Some(axis);
        self
    }

    /// Replace or remove the axis on one side
    pub fn set(&mut self, side: Side, axis: Option<AxisConfig<D>>) {
        *self.slot(side) = axis;
    }

    pub fn get(&self, side: Side) -> Option<&AxisConfig<D>> {
        match side {
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Top => self.top.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Side::ALL.iter().all(|side| self.get(*side).is_none())
    }

    fn slot(&mut self, side: Side) -> &mut Option<AxisConfig<D>> {
        match side {
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Top => &mut self.top,
        }
    }

    /// Lay out every configured axis.
    ///
    /// Horizontal axes grow the chart width, vertical axes its height. Grid
    /// lines reaching past the plot grow the perpendicular dimension.
    pub fn layout<P>(&self, plot: &Plot<P>, domain: Domain) -> AxesLayout
    where
        P: PlotPoint<Datum = D>,
        D: ValueRange,
    {
        let mut layout = AxesLayout::default();

        for side in Side::ALL {
            let Some(config) = self.get(side) else {
                continue;
            };
            let axis = layout_axis(config, side, plot, domain);

            if side.is_horizontal() {
                layout.extra_width = layout.extra_width.max(axis.extra_space);
                layout.extra_height = layout.extra_height.max(axis.grid_line_overflow);
            } else {
                layout.extra_height = layout.extra_height.max(axis.extra_space);
                layout.extra_width = layout.extra_width.max(axis.grid_line_overflow);
            }

            match side {
                Side::Bottom => layout.bottom = Some(axis),
                Side::Left => layout.left = Some(axis),
                Side::Right => layout.right = Some(axis),
                Side::Top => layout.top = Some(axis),
            }
        }

        layout
    }
}

/// Lay out a single axis for `plot`.
///
/// `domain` bounds range-based markings; the unbounded domain scans the
/// plotted data instead.
pub fn layout_axis<P>(
    config: &AxisConfig<P::Datum>,
    side: Side,
    plot: &Plot<P>,
    domain: Domain,
) -> AxisLayout
where
    P: PlotPoint,
    P::Datum: ValueRange,
{
    let horizontal = side.is_horizontal();
    let perpendicular = if horizontal { plot.height } else { plot.width };
    let grid_line_length = config
        .grid_lines
        .map(|grid| grid.length.unwrap_or(perpendicular));

    let mut builder = AxisBuilder {
        side,
        ticks: config.ticks,
        labels: config.labels,
        grid_line_length,
        primitives: Vec::new(),
        zeroth_tick: None,
        zeroth_grid_line: None,
    };

    let zero = if horizontal { plot.zero.x } else { plot.zero.y };
    if let Some(ticks) = config.ticks.filter(|t| t.zeroth) {
        let line = builder.tick_line(&ticks, 0, zero, zero, false);
        builder.primitives.push(AxisPrimitive::Tick(line.clone()));
        builder.zeroth_tick = Some(line);
    }
    if let (Some(length), Some(true)) = (grid_line_length, config.grid_lines.map(|g| g.zeroth)) {
        let (x, y) = if horizontal { (zero, 0.0) } else { (0.0, zero) };
        let line = builder.grid_line(length, 0, x, y);
        builder.primitives.push(AxisPrimitive::GridLine(line.clone()));
        builder.zeroth_grid_line = Some(line);
    }

    let extra_space = match &config.markings {
        Markings::Hardcoded(markings) => {
            builder.hardcoded(markings, plot);
            0.0
        }
        Markings::Inputs(selector) => {
            builder.inputs(selector.as_ref(), plot);
            0.0
        }
        Markings::Range(range) => builder.range(range, plot, domain),
    };

    let grid_line_overflow = grid_line_length.map_or(0.0, |length| (length - perpendicular).max(0.0));

    tracing::trace!(
        side = side.as_str(),
        primitives = builder.primitives.len(),
        extra_space,
        "laid out axis"
    );

    AxisLayout {
        side,
        primitives: builder.primitives,
        extra_space,
        grid_line_overflow,
    }
}

// ============================================================================
// AXIS BUILDER
// ============================================================================

struct AxisBuilder {
    side: Side,
    ticks: Option<TickConfig>,
    labels: Option<LabelConfig>,
    grid_line_length: Option<f64>,
    primitives: Vec<AxisPrimitive>,
    zeroth_tick: Option<Line>,
    zeroth_grid_line: Option<Line>,
}

impl AxisBuilder {
    fn horizontal(&self) -> bool {
        self.side.is_horizontal()
    }

    fn key(&self, kind: &str, index: usize) -> String {
        format!("{}-axis-{}-{}", self.side, kind, index)
    }

    /// Position along the axis for a marking spanning `p1..p2`
    fn anchored(&self, anchor: Anchor, p1: f64, p2: f64, negative: bool) -> f64 {
        if self.horizontal() {
            match anchor {
                Anchor::Start => p1,
                Anchor::Middle => p1 + (p2 - p1) / 2.0,
                Anchor::End => p2,
            }
        } else {
            match anchor {
                Anchor::Start if negative => p1,
                Anchor::Start => p2,
                Anchor::Middle => p2 - (p2 - p1) / 2.0,
                Anchor::End if negative => p2,
                Anchor::End => p1,
            }
        }
    }

    fn tick_line(&self, ticks: &TickConfig, index: usize, p1: f64, p2: f64, negative: bool) -> Line {
        let position = self.anchored(ticks.anchor, p1, p2, negative) + ticks.offset;
        let (x1, y1) = if self.horizontal() { (position, 0.0) } else { (0.0, position) };
        let (mut x2, mut y2) = (x1, y1);
        match self.side {
            Side::Bottom => y2 += ticks.length,
            Side::Left => x2 -= ticks.length,
            Side::Right => x2 += ticks.length,
            Side::Top => y2 -= ticks.length,
        }
        Line {
            key: self.key("tick", index),
            x1,
            y1,
            x2,
            y2,
        }
    }

    fn grid_line(&self, length: f64, index: usize, x1: f64, y1: f64) -> Line {
        let (mut x2, mut y2) = (x1, y1);
        match self.side {
            Side::Bottom => y2 -= length,
            Side::Left => x2 += length,
            Side::Right => x2 -= length,
            Side::Top => y2 += length,
        }
        Line {
            key: self.key("grid", index),
            x1,
            y1,
            x2,
            y2,
        }
    }

    fn label(&self, labels: &LabelConfig, text: String, index: usize, p1: f64, p2: f64, negative: bool) -> Label {
        let position = self.anchored(labels.anchor, p1, p2, negative) + labels.offset;
        let tick_length = self.ticks.map_or(0.0, |t| t.length);

        let (x, y, text_anchor, dominant_baseline) = match self.side {
            Side::Bottom => (position, tick_length, Anchor::Middle, DominantBaseline::TextBeforeEdge),
            Side::Top => (position, -tick_length, Anchor::Middle, DominantBaseline::TextAfterEdge),
            Side::Left => (-tick_length, position, Anchor::End, DominantBaseline::Middle),
            Side::Right => (tick_length, position, Anchor::Start, DominantBaseline::Middle),
        };

        Label {
            key: self.key("label", index),
            text,
            x,
            y,
            rotation: labels.rotation,
            text_anchor: labels.text_anchor.unwrap_or(text_anchor),
            dominant_baseline: labels.dominant_baseline.unwrap_or(dominant_baseline),
        }
    }

    /// Tick and grid line for one marking, skipping repeats of the zeroth ones
    fn mark(&mut self, index: usize, p1: f64, p2: f64, negative: bool, grid_x: f64, grid_y: f64) {
        if let Some(ticks) = self.ticks {
            let line = self.tick_line(&ticks, index, p1, p2, negative);
            if !self.zeroth_tick.as_ref().is_some_and(|zeroth| zeroth.same_segment(&line)) {
                self.primitives.push(AxisPrimitive::Tick(line));
            }
        }
        if let Some(length) = self.grid_line_length {
            let line = self.grid_line(length, index, grid_x, grid_y);
            if !self.zeroth_grid_line.as_ref().is_some_and(|zeroth| zeroth.same_segment(&line)) {
                self.primitives.push(AxisPrimitive::GridLine(line));
            }
        }
    }

    fn push_label(&mut self, text: String, index: usize, p1: f64, p2: f64, negative: bool) {
        if text.is_empty() {
            return;
        }
        if let Some(labels) = self.labels {
            let label = self.label(&labels, text, index, p1, p2, negative);
            self.primitives.push(AxisPrimitive::Label(label));
        }
    }

    fn hardcoded<P>(&mut self, markings: &[HardcodedMarking], plot: &Plot<P>) {
        let horizontal = self.horizontal();
        let mut previous = if horizontal { 0.0 } else { plot.height };
        let mut index = 1;

        for marking in markings {
            if !(0.0..=1.0).contains(&marking.position) {
                continue;
            }

            let (x, y) = if horizontal {
                (marking.position * plot.width, 0.0)
            } else {
                (0.0, plot.height - marking.position * plot.height)
            };
            let position = if horizontal { x } else { y };

            self.mark(index, position, position, false, x, y);
            if let Some(text) = &marking.label {
                self.push_label(text.clone(), index, position, previous, false);
            }

            index += 1;
            previous = position;
        }
    }

    fn inputs<P: PlotPoint>(&mut self, selector: Option<&InputLabelSelector<P::Datum>>, plot: &Plot<P>) {
        let horizontal = self.horizontal();

        for (offset, point) in plot.points.iter().enumerate() {
            let index = offset + 1;
            let bounds = point.bounds();
            let (p1, p2) = if horizontal {
                (bounds.x1, bounds.x2)
            } else {
                (bounds.y1, bounds.y2)
            };
            let negative = !horizontal && bounds.y2 > plot.zero.y;

            // grid lines sit at the edge away from the zero line
            let (grid_x, grid_y) = if horizontal {
                (bounds.x2, 0.0)
            } else if negative {
                (0.0, bounds.y2)
            } else {
                (0.0, bounds.y1)
            };
            self.mark(index, p1, p2, negative, grid_x, grid_y);

            if let Some(selector) = selector {
                self.push_label(selector(point.datum()), index, p1, p2, negative);
            }
        }
    }

    /// Returns the extra space the range needs beyond the plot
    fn range<P>(&mut self, range: &RangeConfig, plot: &Plot<P>, domain: Domain) -> f64
    where
        P: PlotPoint,
        P::Datum: ValueRange,
    {
        let step_size = range.step_size;
        if !(step_size.is_finite() && step_size > 0.0) {
            tracing::warn!(step_size, side = self.side.as_str(), "ignoring range axis with invalid step size");
            return 0.0;
        }

        let (most_negative, most_positive) = if domain.is_unbounded() {
            plot.points.iter().fold((0.0_f64, 0.0_f64), |(min, max), point| {
                let (low, high) = point.datum().value_range();
                (min.min(low), max.max(high))
            })
        } else {
            (domain.min(), domain.max())
        };

        let end = (range.end.unwrap_or(most_positive) / step_size).ceil() * step_size;
        let start = (range.start.unwrap_or(most_negative) / step_size).floor() * step_size;
        let delta = end - start;
        if !(delta.is_finite() && delta > 0.0) {
            tracing::debug!(start, end, "range axis has nothing to mark");
            return 0.0;
        }

        let steps = (delta / step_size).round() as usize;
        if steps > MAX_RANGE_STEPS {
            tracing::warn!(steps, max = MAX_RANGE_STEPS, "range axis has too many steps, skipping");
            return 0.0;
        }

        let horizontal = self.horizontal();
        let flags = if horizontal {
            plot.horizontal_values
        } else {
            plot.vertical_values
        };
        let inflation = if flags.is_mixed() { 1.0 } else { 0.0 };
        let chart_size = (if horizontal { plot.width } else { plot.height }) - inflation;

        let mut size = chart_size;
        let mut extra_space = 0.0;
        let value_span = most_positive - most_negative;
        if !range.fixed && (end != most_positive || start != most_negative) && value_span > 0.0 {
            size = chart_size / value_span * delta;
            if size > chart_size {
                extra_space = size - chart_size;
            }
        }

        let formatter: &dyn LabelFormatter = match &range.formatter {
            Some(formatter) => formatter.as_ref(),
            None => &PlainNumberFormatter,
        };

        let mut previous = if horizontal { 0.0 } else { plot.height };
        for step in 0..=steps {
            let index = step + 1;
            let value = start + step as f64 * step_size;
            let negative = value < 0.0;
            let offset = value / delta * size;

            let (x, y) = if horizontal {
                (plot.zero.x + offset, 0.0)
            } else if negative {
                (0.0, plot.zero.y - offset + inflation)
            } else {
                (0.0, plot.zero.y - offset)
            };
            let position = if horizontal { x } else { y };

            self.mark(index, position, position, negative, x, y);

            let (p1, p2) = if negative {
                (previous, position)
            } else {
                (position, previous)
            };
            self.push_label(formatter.format(value), index, p1, p2, negative);

            previous = position;
        }

        extra_space
    }
}
