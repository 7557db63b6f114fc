//! Value domains.
//!
//! A domain is the `[min, max]` value range that maps onto the full chart
//! height. Values equal to a bound fill their side of the chart exactly;
//! values beyond it overflow proportionally.

use crate::{ChartError, Result};
use serde::{Deserialize, Serialize};

/// How a domain may be configured: a single number or an explicit pair
///
/// A scalar `d` implies `[d, 0]` when negative, `[0, d]` when positive and the
/// unbounded `[0, 0]` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainOption {
    Scalar(f64),
    Pair(f64, f64),
}

/// Validated `[min, max]` domain with `min <= 0 <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DomainOption", into = "DomainOption")]
pub struct Domain {
    min: f64,
    max: f64,
}

impl Domain {
    /// `[0, 0]`: no bounds apply, columns scale to the data
    pub const UNBOUNDED: Domain = Domain { min: 0.0, max: 0.0 };

    /// Create a domain, rejecting pairs that do not straddle zero
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min <= 0.0 && max >= 0.0 {
            Ok(Self { min, max })
        } else {
            tracing::warn!(min, max, "rejecting domain that does not contain zero");
            Err(ChartError::InvalidDomain { min, max })
        }
    }

    /// Normalize a scalar domain option. Never fails.
    pub fn from_scalar(value: f64) -> Self {
        if value < 0.0 {
            Self { min: value, max: 0.0 }
        } else if value > 0.0 {
            Self { min: 0.0, max: value }
        } else {
            Self::UNBOUNDED
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether this is the `[0, 0]` domain
    pub fn is_unbounded(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl TryFrom<DomainOption> for Domain {
    type Error = ChartError;

    fn try_from(option: DomainOption) -> Result<Self> {
        match option {
            DomainOption::Scalar(value) => Ok(Self::from_scalar(value)),
            DomainOption::Pair(min, max) => Self::new(min, max),
        }
    }
}

impl From<Domain> for DomainOption {
    fn from(domain: Domain) -> Self {
        DomainOption::Pair(domain.min, domain.max)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
