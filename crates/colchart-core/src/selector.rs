//! Selector strategies: how the pipeline reads application records.

use std::sync::Arc;

/// Strategy trait selecting the plotted number from a record
pub trait ValueSelector<T>: Send + Sync {
    fn select(&self, input: &T) -> f64;
}

impl<T, F> ValueSelector<T> for F
where
    F: Fn(&T) -> f64 + Send + Sync,
{
    fn select(&self, input: &T) -> f64 {
        self(input)
    }
}

/// Strategy trait selecting a grouping or stacking key from a record
pub trait KeySelector<T, K>: Send + Sync {
    fn key(&self, input: &T) -> K;
}

impl<T, K, F> KeySelector<T, K> for F
where
    F: Fn(&T) -> K + Send + Sync,
{
    fn key(&self, input: &T) -> K {
        self(input)
    }
}

/// Shared value selector, cloned into every pipeline stage that needs it
pub type SharedValueSelector<T> = Arc<dyn ValueSelector<T>>;

/// Selects the group a column belongs to (grouped charts)
pub type GroupSelector<T, G> = Arc<dyn KeySelector<T, G>>;

/// Selects the stack a column belongs to (stacked charts)
pub type StackSelector<T, G> = Arc<dyn KeySelector<T, G>>;

/// Value selector for records that already are numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ValueSelector<f64> for Identity {
    fn select(&self, input: &f64) -> f64 {
        *input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlayCount {
        count: u32,
        province: &'static str,
    }

    #[test]
    fn test_closure_selectors() {
        let record = PlayCount { count: 42, province: "Ontario" };

        let value: SharedValueSelector<PlayCount> = Arc::new(|p: &PlayCount| p.count as f64);
        let group: GroupSelector<PlayCount, &'static str> = Arc::new(|p: &PlayCount| p.province);

        assert_eq!(value.select(&record), 42.0);
        assert_eq!(group.key(&record), "Ontario");
    }

    #[test]
    fn test_identity_selector() {
        assert_eq!(Identity.select(&-3.5), -3.5);
    }
}
