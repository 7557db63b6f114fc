//! Batch normalization: records -> `(input, value, relative_value)` columns.

use std::sync::Arc;

use crate::{ChartError, Column, DivisorOperator, Result, Unit, ValueSelector, finite_or_zero};

/// Converts a batch of records into [`Column`]s relative to a per-batch divisor
///
/// The output preserves batch order; later stages derive column, group and
/// stack ordering from it.
pub struct Normalizer<T> {
    value_selector: Arc<dyn ValueSelector<T>>,
    divisor_operator: Arc<dyn DivisorOperator<T>>,
}

impl<T> Normalizer<T> {
    pub fn new(
        value_selector: Arc<dyn ValueSelector<T>>,
        divisor_operator: Arc<dyn DivisorOperator<T>>,
    ) -> Self {
        Self {
            value_selector,
            divisor_operator,
        }
    }

    pub fn builder() -> NormalizerBuilder<T> {
        NormalizerBuilder::default()
    }

    pub fn value_selector(&self) -> &Arc<dyn ValueSelector<T>> {
        &self.value_selector
    }

    /// Compute the divisor the next [`normalize`](Self::normalize) call would use
    pub fn divisor(&self, batch: &[T]) -> f64 {
        finite_or_zero(
            self.divisor_operator
                .divisor(batch, self.value_selector.as_ref()),
        )
    }
}

impl<T: Clone> Normalizer<T> {
    /// Normalize a whole batch
    pub fn normalize(&self, batch: &[T]) -> Vec<Column<T>> {
        let divisor = self.divisor(batch);

        batch
            .iter()
            .map(|input| {
                let value = finite_or_zero(self.value_selector.select(input));
                let relative_value = if divisor == 0.0 {
                    0.0
                } else {
                    // magnitude only, a negative total must not flip columns
                    finite_or_zero(value / divisor.abs())
                };
                Column::new(input.clone(), value, relative_value)
            })
            .collect()
    }
}

impl<T> Clone for Normalizer<T> {
    fn clone(&self) -> Self {
        Self {
            value_selector: Arc::clone(&self.value_selector),
            divisor_operator: Arc::clone(&self.divisor_operator),
        }
    }
}

impl<T> std::fmt::Debug for Normalizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

/// Builder validating that a value selector was supplied
pub struct NormalizerBuilder<T> {
    value_selector: Option<Arc<dyn ValueSelector<T>>>,
    divisor_operator: Option<Arc<dyn DivisorOperator<T>>>,
}

impl<T> Default for NormalizerBuilder<T> {
    fn default() -> Self {
        Self {
            value_selector: None,
            divisor_operator: None,
        }
    }
}

impl<T> NormalizerBuilder<T> {
    pub fn value_selector(mut self, selector: impl ValueSelector<T> + 'static) -> Self {
        self.value_selector = Some(Arc::new(selector));
        self
    }

    pub fn shared_value_selector(mut self, selector: Arc<dyn ValueSelector<T>>) -> Self {
        self.value_selector = Some(selector);
        self
    }

    pub fn divisor_operator(mut self, operator: impl DivisorOperator<T> + 'static) -> Self {
        self.divisor_operator = Some(Arc::new(operator));
        self
    }

    pub fn shared_divisor_operator(mut self, operator: Arc<dyn DivisorOperator<T>>) -> Self {
        self.divisor_operator = Some(operator);
        self
    }

    /// Fails with [`ChartError::MissingSelector`] when no value selector was set.
    /// The divisor defaults to [`Unit`].
    pub fn build(self) -> Result<Normalizer<T>> {
        let value_selector = self
            .value_selector
            .ok_or(ChartError::MissingSelector("value"))?;
        let divisor_operator = self.divisor_operator.unwrap_or_else(|| Arc::new(Unit));
        Ok(Normalizer::new(value_selector, divisor_operator))
    }
}
