//! Geometry pipelines: batch -> normalized columns -> plot.

use crate::ChartConfig;
use colchart_core::{
    ChartError, Column, DivisorOperator, Domain, KeySelector, Normalizer, Result, SharedValueSelector, ValueSelector,
};
use colchart_layout::{
    ColumnLayout, ColumnPoint, GroupedColumn, GroupedColumnPoint, Grouping, Plot, PlotPoint, StackedColumn,
    StackedColumnPoint, Stacking, ValueRange,
};
use std::hash::Hash;
use std::sync::Arc;

// ============================================================================
// STRATEGY PATTERN: Pipeline
// ============================================================================

/// Strategy trait turning a batch into a complete plot
pub trait Pipeline<T>: Send + Sync + 'static {
    type Point: PlotPoint<Datum = Self::Datum> + Clone + Send + Sync + 'static;
    type Datum: ValueRange;

    fn plot(&self, batch: &[T]) -> Plot<Self::Point>;

    /// Domain range-based axes are measured against
    fn domain(&self) -> Domain;
}

/// Plain columns
pub struct ColumnPipeline<T> {
    normalizer: Normalizer<T>,
    layout: ColumnLayout,
}

impl<T> ColumnPipeline<T> {
    pub fn new(normalizer: Normalizer<T>, layout: ColumnLayout) -> Self {
        Self { normalizer, layout }
    }

    pub fn builder() -> PipelineBuilder<T, ()> {
        PipelineBuilder::default()
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn normalizer(&self) -> &Normalizer<T> {
        &self.normalizer
    }
}

impl<T> Pipeline<T> for ColumnPipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Point = ColumnPoint<T>;
    type Datum = Column<T>;

    fn plot(&self, batch: &[T]) -> Plot<Self::Point> {
        self.layout.plot(self.normalizer.normalize(batch))
    }

    fn domain(&self) -> Domain {
        self.layout.domain
    }
}

/// Columns clustered side by side per group key
pub struct GroupedPipeline<T, G> {
    columns: ColumnPipeline<T>,
    grouping: Grouping<T, G>,
}

impl<T, G> GroupedPipeline<T, G> {
    pub fn builder() -> PipelineBuilder<T, G> {
        PipelineBuilder::default()
    }
}

impl<T, G> Pipeline<T> for GroupedPipeline<T, G>
where
    T: Clone + Send + Sync + 'static,
    G: Eq + Hash + Clone + Send + Sync + 'static,
{
    type Point = GroupedColumnPoint<G, T>;
    type Datum = GroupedColumn<G, T>;

    fn plot(&self, batch: &[T]) -> Plot<Self::Point> {
        self.grouping.apply(&self.columns.plot(batch))
    }

    fn domain(&self) -> Domain {
        self.columns.domain()
    }
}

/// Columns piled per stack key
pub struct StackedPipeline<T, G> {
    columns: ColumnPipeline<T>,
    stacking: Stacking<T, G>,
}

impl<T, G> StackedPipeline<T, G> {
    pub fn builder() -> PipelineBuilder<T, G> {
        PipelineBuilder::default()
    }
}

impl<T, G> Pipeline<T> for StackedPipeline<T, G>
where
    T: Clone + Send + Sync + 'static,
    G: Eq + Hash + Clone + Send + Sync + 'static,
{
    type Point = StackedColumnPoint<G, T>;
    type Datum = StackedColumn<G, T>;

    fn plot(&self, batch: &[T]) -> Plot<Self::Point> {
        self.stacking.apply(&self.columns.plot(batch), &self.columns.layout)
    }

    fn domain(&self) -> Domain {
        self.columns.domain()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects selectors, divisor and configuration for any pipeline.
///
/// The divisor falls back to the one named in the configuration.
pub struct PipelineBuilder<T, G> {
    value_selector: Option<SharedValueSelector<T>>,
    divisor_operator: Option<Arc<dyn DivisorOperator<T>>>,
    key_selector: Option<Arc<dyn KeySelector<T, G>>>,
    config: ChartConfig,
}

impl<T, G> Default for PipelineBuilder<T, G> {
    fn default() -> Self {
        Self {
            value_selector: None,
            divisor_operator: None,
            key_selector: None,
            config: ChartConfig::default(),
        }
    }
}

impl<T, G> PipelineBuilder<T, G> {
    pub fn value_selector(mut self, selector: impl ValueSelector<T> + 'static) -> Self {
        self.value_selector = Some(Arc::new(selector));
        self
    }

    pub fn divisor_operator(mut self, operator: impl DivisorOperator<T> + 'static) -> Self {
        self.divisor_operator = Some(Arc::new(operator));
        self
    }

    /// Group key for grouped charts, stack key for stacked charts
    pub fn key_selector(mut self, selector: impl KeySelector<T, G> + 'static) -> Self {
        self.key_selector = Some(Arc::new(selector));
        self
    }

    pub fn config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    fn columns(&self) -> Result<ColumnPipeline<T>> {
        self.config.validate()?;
        let value_selector = self
            .value_selector
            .clone()
            .ok_or(ChartError::MissingSelector("value"))?;
        let divisor_operator = self
            .divisor_operator
            .clone()
            .unwrap_or_else(|| self.config.divisor.operator());
        let normalizer = Normalizer::builder()
            .shared_value_selector(value_selector)
            .shared_divisor_operator(divisor_operator)
            .build()?;
        Ok(ColumnPipeline::new(normalizer, self.config.layout()))
    }

    pub fn build_columns(self) -> Result<ColumnPipeline<T>> {
        self.columns()
    }
}

impl<T, G> PipelineBuilder<T, G>
where
    T: Clone,
    G: Eq + Hash + Clone,
{
    pub fn build_grouped(self) -> Result<GroupedPipeline<T, G>> {
        let columns = self.columns()?;
        let selector = self.key_selector.ok_or(ChartError::MissingSelector("group"))?;
        Ok(GroupedPipeline {
            columns,
            grouping: Grouping::shared(selector, self.config.group_spacing),
        })
    }

    pub fn build_stacked(self) -> Result<StackedPipeline<T, G>> {
        let columns = self.columns()?;
        let selector = self.key_selector.ok_or(ChartError::MissingSelector("stack"))?;
        Ok(StackedPipeline {
            columns,
            stacking: Stacking::shared(selector, self.config.stack_spacing),
        })
    }
}
