//! # colchart-layout
//!
//! Geometry for column charts. Turns normalized columns into rectangles
//! ("points") and computes axis markings consistent with them.
//!
//! ## Architecture
//!
//! Every stage is a pure function of its input plot and configuration:
//!
//! - `column` - Column layout engine (zero line, correction factors)
//! - `grouped` - Side-by-side clusters sharing a group key
//! - `stacked` - Vertical clusters sharing a stack key, split by sign
//! - `axis` / `axes` - Tick, grid-line and label placement
//! - `frame` - Overall chart size once axes claimed their extra space
//!
//! All coordinates assume `(0, 0)` is the top-left corner.

pub mod axes;
pub mod axis;
pub mod column;
pub mod frame;
pub mod grouped;
pub mod stacked;

pub use axes::*;
pub use axis::*;
pub use column::*;
pub use frame::*;
pub use grouped::*;
pub use stacked::*;

use colchart_core::Column;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

// ============================================================================
// SIGN FLAGS
// ============================================================================

/// Which signs occur among the plotted values along one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignFlags {
    #[default]
    None,
    Positive,
    Negative,
    Both,
}

impl SignFlags {
    /// Flag for a single value. Zero counts as positive.
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    pub fn has_negative(&self) -> bool {
        matches!(self, Self::Negative | Self::Both)
    }

    pub fn has_positive(&self) -> bool {
        matches!(self, Self::Positive | Self::Both)
    }

    /// Both signs present; a 1px divider separates them at the zero line
    pub fn is_mixed(&self) -> bool {
        matches!(self, Self::Both)
    }

    fn bits(self) -> u8 {
        match self {
            Self::None => 0b00,
            Self::Positive => 0b01,
            Self::Negative => 0b10,
            Self::Both => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::None,
            0b01 => Self::Positive,
            0b10 => Self::Negative,
            _ => Self::Both,
        }
    }
}

impl BitOr for SignFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.bits() | rhs.bits())
    }
}

impl BitOrAssign for SignFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

// ============================================================================
// POINTS & PLOTS
// ============================================================================

/// Rectangle bounds of a plotted point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

/// A plotted datum.
///
/// The rendered shape may occupy only part of the area; the area includes any
/// spacing up to the next point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point<D> {
    pub datum: D,
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

/// Point for a single column
pub type ColumnPoint<T> = Point<Column<T>>;

impl<D> Point<D> {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// Access to plotted points regardless of their datum shape
pub trait PlotPoint {
    type Datum;

    fn datum(&self) -> &Self::Datum;

    fn bounds(&self) -> Bounds;
}

impl<D> PlotPoint for Point<D> {
    type Datum = D;

    fn datum(&self) -> &D {
        &self.datum
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            x1: self.x1,
            x2: self.x2,
            y1: self.y1,
            y2: self.y2,
        }
    }
}

/// Most negative (<= 0) and most positive (>= 0) value a datum stands for.
/// Range-based axes derive their default extent from it.
pub trait ValueRange {
    fn value_range(&self) -> (f64, f64);
}

impl<T> ValueRange for Column<T> {
    fn value_range(&self) -> (f64, f64) {
        (self.value.min(0.0), self.value.max(0.0))
    }
}

/// Position of the zero line
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Zero {
    pub x: f64,
    pub y: f64,
}

/// Complete geometry for one batch. Each recompute produces a new plot that
/// replaces the previous one entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot<P> {
    pub height: f64,
    pub width: f64,
    pub points: Vec<P>,
    pub zero: Zero,
    pub horizontal_values: SignFlags,
    pub vertical_values: SignFlags,
}

impl<P> Plot<P> {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_flags_union() {
        let mut flags = SignFlags::None;
        flags |= SignFlags::of(3.0);
        assert_eq!(flags, SignFlags::Positive);
        assert!(!flags.is_mixed());

        flags |= SignFlags::of(-1.0);
        assert_eq!(flags, SignFlags::Both);
        assert!(flags.has_negative() && flags.has_positive());
    }

    #[test]
    fn test_zero_counts_as_positive() {
        assert_eq!(SignFlags::of(0.0), SignFlags::Positive);
        assert_eq!(SignFlags::None | SignFlags::None, SignFlags::None);
    }

    #[test]
    fn test_point_extent() {
        let point = Point { datum: (), x1: 25.0, x2: 50.0, y1: 25.0, y2: 100.0 };
        assert_eq!(point.width(), 25.0);
        assert_eq!(point.height(), 75.0);
        assert_eq!(point.bounds().y1, 25.0);
    }
}
