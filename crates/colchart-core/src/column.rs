use serde::{Deserialize, Serialize};

/// A record together with its selected value and its value relative to the
/// batch divisor.
///
/// `relative_value` is `value / |divisor|` and always has the sign of `value`.
/// It is `0` when the divisor is `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column<T> {
    pub input: T,
    pub value: f64,
    pub relative_value: f64,
}

impl<T> Column<T> {
    pub fn new(input: T, value: f64, relative_value: f64) -> Self {
        Self {
            input,
            value,
            relative_value,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.relative_value < 0.0
    }
}
