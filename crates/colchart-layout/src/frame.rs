//! Chart frame: overall chart size once axes have claimed their room.
//!
//! Axes may need space beyond the plot. Extra height is added above the plot
//! (range axes extend upwards past the tallest column), extra width to its
//! right.

use crate::{AxesLayout, Plot, Side};
use serde::{Deserialize, Serialize};

/// Fixed room reserved around the plot for axis ticks and labels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ChartMargin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    pub const fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Room for a labelled left axis and a labelled bottom axis
    pub const fn standard() -> Self {
        Self::new(10.0, 10.0, 30.0, 50.0)
    }
}

/// Plot dimensions plus axis growth and margins
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartFrame {
    pub plot_width: f64,
    pub plot_height: f64,
    pub extra_width: f64,
    pub extra_height: f64,
    pub margin: ChartMargin,
}

impl ChartFrame {
    pub fn new<P>(plot: &Plot<P>, axes: &AxesLayout) -> Self {
        Self {
            plot_width: plot.width,
            plot_height: plot.height,
            extra_width: axes.extra_width,
            extra_height: axes.extra_height,
            margin: ChartMargin::default(),
        }
    }

    pub fn with_margin(mut self, margin: ChartMargin) -> Self {
        self.margin = margin;
        self
    }

    /// Total width including axis growth and margins
    pub fn width(&self) -> f64 {
        self.margin.left + self.plot_width + self.extra_width + self.margin.right
    }

    /// Total height including axis growth and margins
    pub fn height(&self) -> f64 {
        self.margin.top + self.extra_height + self.plot_height + self.margin.bottom
    }

    /// Top-left corner of the plot within the frame
    pub fn plot_origin(&self) -> (f64, f64) {
        (self.margin.left, self.margin.top + self.extra_height)
    }

    /// SVG transform for the plot area
    pub fn plot_transform(&self) -> String {
        let (x, y) = self.plot_origin();
        format!("translate({}, {})", x, y)
    }

    /// Origin of an axis' local coordinates within the frame
    pub fn axis_origin(&self, side: Side) -> (f64, f64) {
        let (x, y) = self.plot_origin();
        match side {
            Side::Bottom => (x, y + self.plot_height),
            Side::Right => (x + self.plot_width, y),
            Side::Left | Side::Top => (x, y),
        }
    }

    /// SVG transform for one axis
    pub fn axis_transform(&self, side: Side) -> String {
        let (x, y) = self.axis_origin(side);
        format!("translate({}, {})", x, y)
    }

    /// ViewBox string for SVG
    pub fn viewbox(&self) -> String {
        format!("0 0 {} {}", self.width(), self.height())
    }
}
