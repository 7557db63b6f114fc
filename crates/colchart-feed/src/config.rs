//! Chart configuration

use colchart_core::{ChartError, DivisorOperator, Domain, MaxAbs, Result, Sum, Unit};
use colchart_layout::ColumnLayout;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Divisor operators selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisorKind {
    Sum,
    MaxAbs,
    #[default]
    Unit,
}

impl DivisorKind {
    pub fn operator<T>(&self) -> Arc<dyn DivisorOperator<T>> {
        match self {
            Self::Sum => Arc::new(Sum),
            Self::MaxAbs => Arc::new(MaxAbs),
            Self::Unit => Arc::new(Unit),
        }
    }
}

/// Geometry configuration shared by plain, grouped and stacked charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub column_height: f64,
    pub column_width: f64,
    pub column_spacing: f64,
    /// Scalar or `[min, max]` pair; `0` / `[0, 0]` scales to the data
    pub domain: Domain,
    /// Padding around each group, split evenly on both sides
    pub group_spacing: f64,
    /// Gap between stacked members
    pub stack_spacing: f64,
    pub divisor: DivisorKind,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            column_height: 200.0,
            column_width: 20.0,
            column_spacing: 4.0,
            domain: Domain::UNBOUNDED,
            group_spacing: 10.0,
            stack_spacing: 1.0,
            divisor: DivisorKind::Unit,
        }
    }
}

impl ChartConfig {
    pub fn new(column_height: f64, column_width: f64, column_spacing: f64) -> Self {
        Self {
            column_height,
            column_width,
            column_spacing,
            ..Default::default()
        }
    }

    /// Small multiples for dashboards
    pub fn compact() -> Self {
        Self {
            column_height: 60.0,
            column_width: 6.0,
            column_spacing: 1.0,
            group_spacing: 4.0,
            ..Default::default()
        }
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn group_spacing(mut self, spacing: f64) -> Self {
        self.group_spacing = spacing;
        self
    }

    pub fn stack_spacing(mut self, spacing: f64) -> Self {
        self.stack_spacing = spacing;
        self
    }

    pub fn divisor(mut self, divisor: DivisorKind) -> Self {
        self.divisor = divisor;
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            tracing::warn!("Failed to parse chart configuration: {}", e);
            ChartError::InvalidConfig(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ChartError::InvalidConfig(e.to_string()))
    }

    /// Reject negative or non-finite dimensions
    pub fn validate(&self) -> Result<()> {
        let dimensions = [
            ("column_height", self.column_height),
            ("column_width", self.column_width),
            ("column_spacing", self.column_spacing),
            ("group_spacing", self.group_spacing),
            ("stack_spacing", self.stack_spacing),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() || value < 0.0 {
                tracing::warn!(name, value, "rejecting chart configuration");
                return Err(ChartError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        Ok(())
    }

    /// Column geometry part of the configuration
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.column_height, self.column_width, self.column_spacing).domain(self.domain)
    }
}
