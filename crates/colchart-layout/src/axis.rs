//! Axis configuration and the primitives an axis lays out.

use colchart_core::LabelFormatter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// SIDES & ANCHORS
// ============================================================================

/// Side of the plot an axis is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bottom,
    Left,
    Right,
    Top,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Left, Side::Right, Side::Top];

    /// Bottom and top axes run along the x direction
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Bottom | Self::Top)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which edge of a marking's span something attaches to, following the
/// direction of the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Start,
    #[default]
    Middle,
    End,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Vertical alignment of label text relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DominantBaseline {
    Middle,
    TextAfterEdge,
    TextBeforeEdge,
}

impl DominantBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Middle => "middle",
            Self::TextAfterEdge => "text-after-edge",
            Self::TextBeforeEdge => "text-before-edge",
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub anchor: Anchor,
    pub length: f64,
    /// Shift along the axis direction
    pub offset: f64,
    /// Also draw a tick at the zero point
    pub zeroth: bool,
}

impl TickConfig {
    pub fn new(length: f64) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn zeroth(mut self, zeroth: bool) -> Self {
        self.zeroth = zeroth;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLineConfig {
    /// Fixed line length; spans the plot when unset
    pub length: Option<f64>,
    /// Also draw a line at the zero point
    pub zeroth: bool,
}

impl GridLineConfig {
    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn zeroth(mut self, zeroth: bool) -> Self {
        self.zeroth = zeroth;
        self
    }
}

/// Label placement. Unset alignment falls back to a per-side default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub anchor: Anchor,
    pub dominant_baseline: Option<DominantBaseline>,
    pub offset: f64,
    /// Degrees, around the label position
    pub rotation: f64,
    pub text_anchor: Option<Anchor>,
}

impl LabelConfig {
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn dominant_baseline(mut self, baseline: DominantBaseline) -> Self {
        self.dominant_baseline = Some(baseline);
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn text_anchor(mut self, anchor: Anchor) -> Self {
        self.text_anchor = Some(anchor);
        self
    }
}

/// A fixed marking at a fraction of the axis length, `0..=1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardcodedMarking {
    pub position: f64,
    pub label: Option<String>,
}

impl From<f64> for HardcodedMarking {
    fn from(position: f64) -> Self {
        Self { position, label: None }
    }
}

impl From<(f64, &str)> for HardcodedMarking {
    fn from((position, label): (f64, &str)) -> Self {
        Self {
            position,
            label: Some(label.to_string()),
        }
    }
}

/// Evenly spaced markings along a value range
#[derive(Clone)]
pub struct RangeConfig {
    pub step_size: f64,
    /// Defaults to the most negative value, rounded down to a step multiple
    pub start: Option<f64>,
    /// Defaults to the most positive value, rounded up to a step multiple
    pub end: Option<f64>,
    /// Squeeze the range into the plot instead of growing the chart
    pub fixed: bool,
    /// Label text per step; plain numbers when unset
    pub formatter: Option<Arc<dyn LabelFormatter>>,
}

impl RangeConfig {
    pub fn new(step_size: f64) -> Self {
        Self {
            step_size,
            start: None,
            end: None,
            fixed: false,
            formatter: None,
        }
    }

    pub fn start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: f64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn formatter(mut self, formatter: impl LabelFormatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }
}

impl std::fmt::Debug for RangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeConfig")
            .field("step_size", &self.step_size)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("fixed", &self.fixed)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Label text for a plotted datum
pub type InputLabelSelector<D> = Arc<dyn Fn(&D) -> String + Send + Sync>;

/// Where an axis places its markings
pub enum Markings<D> {
    Hardcoded(Vec<HardcodedMarking>),
    /// One marking per plotted point
    Inputs(Option<InputLabelSelector<D>>),
    Range(RangeConfig),
}

impl<D> Clone for Markings<D> {
    fn clone(&self) -> Self {
        match self {
            Self::Hardcoded(markings) => Self::Hardcoded(markings.clone()),
            Self::Inputs(selector) => Self::Inputs(selector.clone()),
            Self::Range(range) => Self::Range(range.clone()),
        }
    }
}

impl<D> std::fmt::Debug for Markings<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hardcoded(markings) => f.debug_tuple("Hardcoded").field(markings).finish(),
            Self::Inputs(selector) => f.debug_tuple("Inputs").field(&selector.is_some()).finish(),
            Self::Range(range) => f.debug_tuple("Range").field(range).finish(),
        }
    }
}

/// Configuration of one axis
pub struct AxisConfig<D> {
    pub markings: Markings<D>,
    pub grid_lines: Option<GridLineConfig>,
    /// `None` disables labels
    pub labels: Option<LabelConfig>,
    pub ticks: Option<TickConfig>,
}

impl<D> AxisConfig<D> {
    pub fn new(markings: Markings<D>) -> Self {
        Self {
            markings,
            grid_lines: None,
            labels: Some(LabelConfig::default()),
            ticks: None,
        }
    }

    pub fn hardcoded<M>(markings: impl IntoIterator<Item = M>) -> Self
    where
        M: Into<HardcodedMarking>,
    {
        Self::new(Markings::Hardcoded(markings.into_iter().map(Into::into).collect()))
    }

    /// Markings per plotted point, without labels
    pub fn inputs() -> Self {
        Self::new(Markings::Inputs(None))
    }

    /// Markings per plotted point, labelled by `selector`
    pub fn labelled_inputs(selector: impl Fn(&D) -> String + Send + Sync + 'static) -> Self {
        Self::new(Markings::Inputs(Some(Arc::new(selector))))
    }

    pub fn range(range: RangeConfig) -> Self {
        Self::new(Markings::Range(range))
    }

    pub fn grid_lines(mut self, grid_lines: GridLineConfig) -> Self {
        self.grid_lines = Some(grid_lines);
        self
    }

    pub fn labels(mut self, labels: LabelConfig) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn without_labels(mut self) -> Self {
        self.labels = None;
        self
    }

    pub fn ticks(mut self, ticks: TickConfig) -> Self {
        self.ticks = Some(ticks);
        self
    }
}

impl<D> Clone for AxisConfig<D> {
    fn clone(&self) -> Self {
        Self {
            markings: self.markings.clone(),
            grid_lines: self.grid_lines,
            labels: self.labels,
            ticks: self.ticks,
        }
    }
}

impl<D> std::fmt::Debug for AxisConfig<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisConfig")
            .field("markings", &self.markings)
            .field("grid_lines", &self.grid_lines)
            .field("labels", &self.labels)
            .field("ticks", &self.ticks)
            .finish()
    }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Line segment in axis-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub key: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Line {
    pub(crate) fn same_segment(&self, other: &Line) -> bool {
        const EPSILON: f64 = 1e-9;
        (self.x1 - other.x1).abs() < EPSILON
            && (self.y1 - other.y1).abs() < EPSILON
            && (self.x2 - other.x2).abs() < EPSILON
            && (self.y2 - other.y2).abs() < EPSILON
    }
}

/// Text label in axis-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub text_anchor: Anchor,
    pub dominant_baseline: DominantBaseline,
}

impl Label {
    /// Rotation around the label position, as an SVG transform
    pub fn transform(&self) -> String {
        format!("rotate({} {} {})", self.rotation, self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisPrimitive {
    Tick(Line),
    GridLine(Line),
    Label(Label),
}

impl AxisPrimitive {
    pub fn key(&self) -> &str {
        match self {
            Self::Tick(line) | Self::GridLine(line) => &line.key,
            Self::Label(label) => &label.key,
        }
    }
}

/// Everything one axis draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLayout {
    pub side: Side,
    pub primitives: Vec<AxisPrimitive>,
    /// Room the axis needs beyond the plot along its own direction
    pub extra_space: f64,
    /// How far grid lines reach past the plot, perpendicular to the axis
    pub grid_line_overflow: f64,
}

impl AxisLayout {
    pub fn ticks(&self) -> impl Iterator<Item = &Line> {
        self.primitives.iter().filter_map(|p| match p {
            AxisPrimitive::Tick(line) => Some(line),
            _ => None,
        })
    }

    pub fn grid_lines(&self) -> impl Iterator<Item = &Line> {
        self.primitives.iter().filter_map(|p| match p {
            AxisPrimitive::GridLine(line) => Some(line),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.primitives.iter().filter_map(|p| match p {
            AxisPrimitive::Label(label) => Some(label),
            _ => None,
        })
    }
}

/// Layouts for every configured axis plus the chart growth they require
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxesLayout {
    pub bottom: Option<AxisLayout>,
    pub left: Option<AxisLayout>,
    pub right: Option<AxisLayout>,
    pub top: Option<AxisLayout>,
    pub extra_width: f64,
    pub extra_height: f64,
}

impl AxesLayout {
    pub fn get(&self, side: Side) -> Option<&AxisLayout> {
        match side {
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Top => self.top.as_ref(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisLayout> {
        [&self.bottom, &self.left, &self.right, &self.top]
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_orientation() {
        assert!(Side::Bottom.is_horizontal());
        assert!(Side::Top.is_horizontal());
        assert!(!Side::Left.is_horizontal());
        assert_eq!(Side::Right.to_string(), "right");
    }

    #[test]
    fn test_axis_config_defaults() {
        let axis: AxisConfig<()> = AxisConfig::hardcoded([0.0, 0.5, 1.0]);
        assert!(axis.labels.is_some());
        assert!(axis.ticks.is_none());
        assert!(axis.grid_lines.is_none());
        assert!(matches!(&axis.markings, Markings::Hardcoded(m) if m.len() == 3));

        let axis = axis.without_labels();
        assert!(axis.labels.is_none());
    }

    #[test]
    fn test_hardcoded_marking_conversions() {
        let axis: AxisConfig<()> = AxisConfig::hardcoded([(0.5, "half"), (1.0, "all")]);
        let Markings::Hardcoded(markings) = &axis.markings else {
            panic!("expected hardcoded markings");
        };
        assert_eq!(markings[0].label.as_deref(), Some("half"));
        assert_eq!(markings[1].position, 1.0);
    }

    #[test]
    fn test_label_config_from_json() {
        let labels: LabelConfig =
            serde_json::from_str(r#"{"anchor": "start", "dominant_baseline": "text-after-edge"}"#).unwrap();
        assert_eq!(labels.anchor, Anchor::Start);
        assert_eq!(labels.dominant_baseline, Some(DominantBaseline::TextAfterEdge));
        assert_eq!(labels.text_anchor, None);
    }

    #[test]
    fn test_primitive_serializes_with_kind() {
        let tick = AxisPrimitive::Tick(Line {
            key: "left-axis-tick-0".into(),
            x1: 0.0,
            y1: 10.0,
            x2: -5.0,
            y2: 10.0,
        });
        let json = serde_json::to_value(&tick).unwrap();
        assert_eq!(json["kind"], "tick");
        assert_eq!(json["key"], "left-axis-tick-0");
        assert_eq!(tick.key(), "left-axis-tick-0");
    }
}
