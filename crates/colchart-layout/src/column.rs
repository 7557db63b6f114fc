//! Column layout engine
//!
//! Maps normalized columns onto rectangles. The chart area is split at the
//! zero line: positive columns grow up from it, negative columns grow down
//! from it, and when both signs are present a 1px divider separates them.

use crate::{ColumnPoint, Plot, Point, SignFlags, Zero};
use colchart_core::{Column, Domain};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Column geometry configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// Total height available to columns, excluding the sign divider
    pub column_height: f64,
    /// Width of the drawn column
    pub column_width: f64,
    /// Horizontal gap included in each point after the column
    pub column_spacing: f64,
    pub domain: Domain,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            column_height: 200.0,
            column_width: 20.0,
            column_spacing: 4.0,
            domain: Domain::UNBOUNDED,
        }
    }
}

impl ColumnLayout {
    pub fn new(column_height: f64, column_width: f64, column_spacing: f64) -> Self {
        Self {
            column_height,
            column_width,
            column_spacing,
            domain: Domain::UNBOUNDED,
        }
    }

    pub fn column_height(mut self, height: f64) -> Self {
        self.column_height = height;
        self
    }

    pub fn column_width(mut self, width: f64) -> Self {
        self.column_width = width;
        self
    }

    pub fn column_spacing(mut self, spacing: f64) -> Self {
        self.column_spacing = spacing;
        self
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Horizontal extent of one point, column plus spacing
    pub fn step(&self) -> f64 {
        self.column_width + self.column_spacing
    }

    /// Lay out a batch of normalized columns.
    ///
    /// Points keep batch order. Point `i` spans `x1 = i * (width + spacing)`
    /// to `x1 + width + spacing`.
    pub fn plot<T>(&self, columns: Vec<Column<T>>) -> Plot<ColumnPoint<T>> {
        let mut extremes = Extremes::default();
        let mut flags = SignFlags::None;
        for column in &columns {
            extremes.observe(column.relative_value, column.value);
            flags |= SignFlags::of(column.relative_value);
        }

        let scale = HeightScale::new(&extremes, flags, self.column_height, self.domain);
        let step = self.step();

        let points: Vec<ColumnPoint<T>> = columns
            .into_iter()
            .enumerate()
            .map(|(index, column)| {
                let x1 = index as f64 * step;
                let height = scale.display_height(column.relative_value);
                let (y1, y2) = scale.place(column.relative_value, height);
                Point {
                    datum: column,
                    x1,
                    x2: x1 + step,
                    y1,
                    y2,
                }
            })
            .collect();

        let width = points.last().map_or(0.0, |point| point.x2);
        let horizontal_values = if points.is_empty() {
            SignFlags::None
        } else {
            SignFlags::Positive
        };

        tracing::trace!(
            columns = points.len(),
            positive_height = scale.positive_height,
            "laid out columns"
        );

        Plot {
            height: scale.plot_height(),
            width,
            points,
            zero: Zero {
                x: 0.0,
                y: scale.positive_height,
            },
            horizontal_values,
            vertical_values: flags,
        }
    }
}

// ============================================================================
// HEIGHT CORRECTION
// ============================================================================

/// Extreme relative values of a batch, with the absolute values they stand for
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Extremes {
    pub min_relative: f64,
    pub max_relative: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl Extremes {
    pub(crate) fn observe(&mut self, relative_value: f64, value: f64) {
        if relative_value < self.min_relative {
            self.min_relative = relative_value;
            self.min_value = value;
        }
        if relative_value > self.max_relative {
            self.max_relative = relative_value;
            self.max_value = value;
        }
    }
}

/// Scale from relative values to pixel heights for one batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HeightScale {
    pub column_height: f64,
    /// Height above the zero line
    pub positive_height: f64,
    pub positive_correction: f64,
    pub negative_correction: f64,
    /// Divider between positive and negative columns
    pub gap: f64,
}

impl HeightScale {
    pub(crate) fn new(
        extremes: &Extremes,
        flags: SignFlags,
        column_height: f64,
        domain: Domain,
    ) -> Self {
        let Extremes {
            min_relative,
            max_relative,
            min_value,
            max_value,
        } = *extremes;

        let (positive_height, positive_correction, negative_correction) = if domain.is_unbounded() {
            if min_relative < 0.0 && max_relative > 0.0 {
                let span = max_relative - min_relative;
                (
                    column_height * max_relative / span,
                    1.0 / max_relative,
                    1.0 / -min_relative,
                )
            } else if min_relative < 0.0 {
                (0.0, 1.0, 1.0)
            } else {
                (column_height, 1.0, 1.0)
            }
        } else {
            let (min, max) = (domain.min(), domain.max());
            let positive_height = if max == 0.0 {
                0.0
            } else if min == 0.0 {
                column_height
            } else {
                column_height * max / (max - min)
            };
            (
                positive_height,
                domain_correction(max_value, max_relative, max),
                domain_correction(min_value, min_relative, min),
            )
        };

        Self {
            column_height,
            positive_height,
            positive_correction,
            negative_correction,
            gap: if flags.is_mixed() { 1.0 } else { 0.0 },
        }
    }

    /// Shrink an unbounded scale so neither side's extreme exceeds its height.
    ///
    /// Stack totals can pass 1 even when every member is at most 1.
    pub(crate) fn fit_extremes(mut self, extremes: &Extremes, domain: Domain) -> Self {
        if !domain.is_unbounded() {
            return self;
        }
        if extremes.max_relative > 1.0 {
            self.positive_correction = self.positive_correction.min(1.0 / extremes.max_relative);
        }
        if extremes.min_relative < -1.0 {
            self.negative_correction = self.negative_correction.min(1.0 / -extremes.min_relative);
        }
        self
    }

    /// Non-negative pixel height for a relative value
    pub(crate) fn display_height(&self, relative_value: f64) -> f64 {
        let height = if relative_value < 0.0 {
            (self.column_height - self.positive_height) * -relative_value * self.negative_correction
        } else {
            self.positive_height * relative_value * self.positive_correction
        };
        if height.is_finite() { height.max(0.0) } else { 0.0 }
    }

    /// Vertical extent of a column of the given height starting at the zero line
    pub(crate) fn place(&self, relative_value: f64, height: f64) -> (f64, f64) {
        if relative_value < 0.0 {
            let y1 = self.negative_origin();
            (y1, y1 + height)
        } else {
            (self.positive_height - height, self.positive_height)
        }
    }

    /// Top edge of the negative region, just below the divider
    pub(crate) fn negative_origin(&self) -> f64 {
        self.positive_height + self.gap
    }

    pub(crate) fn plot_height(&self) -> f64 {
        self.column_height + self.gap
    }
}

/// Rescale one side so that a value equal to `bound` fills that side exactly.
///
/// `value / relative` recovers the batch divisor.
fn domain_correction(value: f64, relative: f64, bound: f64) -> f64 {
    if relative == 0.0 || bound == 0.0 {
        return 1.0;
    }
    let correction = (value / relative) / bound.abs();
    if correction.is_finite() { correction } else { 1.0 }
}
