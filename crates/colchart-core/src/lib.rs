//! # colchart-core
//!
//! Core data types for column chart geometry.
//! Implements Strategy pattern for value selection, divisors and label formatting.
//!
//! ## Modules
//!
//! - `selector` - Value and key selectors (record -> number / record -> key)
//! - `divisor` - Divisor operators (sum, max-of-absolute-value, unit)
//! - `normalize` - Batch normalization into relative values
//! - `domain` - Value domains that map onto the full chart height
//! - `sort` / `accumulate` - Stream utilities used upstream of normalization

pub mod accumulate;
pub mod column;
pub mod divisor;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod selector;
pub mod sort;

pub use accumulate::*;
pub use column::*;
pub use divisor::*;
pub use domain::*;
pub use error::{ChartError, Result};
pub use normalize::*;
pub use selector::*;
pub use sort::*;

/// Coerce a selector result into a usable number.
///
/// `NaN` and `±Infinity` become `0` so non-finite values never reach geometry.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// ============================================================================
// STRATEGY PATTERN: Label Formatters
// ============================================================================

/// Strategy trait for turning axis values into label text
pub trait LabelFormatter: Send + Sync {
    fn format(&self, value: f64) -> String;
}

impl<F> LabelFormatter for F
where
    F: Fn(f64) -> String + Send + Sync,
{
    fn format(&self, value: f64) -> String {
        self(value)
    }
}

/// Shortest plain representation (`5`, `-2.5`, `0.1`)
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNumberFormatter;

impl LabelFormatter for PlainNumberFormatter {
    fn format(&self, value: f64) -> String {
        // Steps are computed as start + i * step, trim the float noise.
        let rounded = (value * 1e9).round() / 1e9;
        if rounded == 0.0 {
            "0".to_string()
        } else {
            format!("{}", rounded)
        }
    }
}

/// Compact formatter for large numbers (K, M, B suffixes)
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactNumberFormatter;

impl LabelFormatter for CompactNumberFormatter {
    fn format(&self, num: f64) -> String {
        let abs = num.abs();
        let sign = if num < 0.0 { "-" } else { "" };

        if abs >= 1_000_000_000.0 {
            format!("{}{:.1}B", sign, abs / 1_000_000_000.0)
        } else if abs >= 1_000_000.0 {
            format!("{}{:.1}M", sign, abs / 1_000_000.0)
        } else if abs >= 1_000.0 {
            format!("{}{:.1}K", sign, abs / 1_000.0)
        } else {
            PlainNumberFormatter.format(num)
        }
    }
}
