//! Stable ordering of a batch before it is normalized.
//!
//! Sort keys are selected once per record, then records are ordered by the
//! keys. Records with equal keys keep their batch order.

use std::cmp::Ordering;
use std::fmt::Display;

/// Stable sort using a caller supplied comparison of the selected keys
pub fn sort_with<T, K, S, C>(batch: &[T], key_selector: S, compare: C) -> Vec<T>
where
    T: Clone,
    S: Fn(&T) -> K,
    C: Fn(&K, &K) -> Ordering,
{
    let mut keyed: Vec<(K, &T)> = batch
        .iter()
        .map(|input| (key_selector(input), input))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare(a, b));
    keyed.into_iter().map(|(_, input)| input.clone()).collect()
}

/// Stable sort by an `Ord` key
pub fn sort_by_key<T, K, S>(batch: &[T], key_selector: S) -> Vec<T>
where
    T: Clone,
    K: Ord,
    S: Fn(&T) -> K,
{
    sort_with(batch, key_selector, K::cmp)
}

/// Stable sort comparing the keys' display form, the default ordering when
/// keys have no natural order of their own
pub fn sort_by_display<T, K, S>(batch: &[T], key_selector: S) -> Vec<T>
where
    T: Clone,
    K: Display,
    S: Fn(&T) -> K,
{
    sort_with(batch, |input| key_selector(input).to_string(), String::cmp)
}
