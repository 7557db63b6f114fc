//! Stacked columns: columns sharing a stack key, piled vertically.
//!
//! Each stack splits into a positive pile growing up from the zero line and a
//! negative pile growing down from it. Heights are corrected against the
//! extreme stack totals rather than individual columns.

use crate::column::{Extremes, HeightScale};
use crate::{Bounds, ColumnLayout, ColumnPoint, Plot, PlotPoint, Point, SignFlags, ValueRange, Zero};
use colchart_core::{Column, KeySelector, StackSelector};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::Arc;

/// Columns sharing a stack key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedColumn<G, T> {
    /// The stack key
    pub input: G,
    pub columns: Vec<Column<T>>,
    /// Sum of negative member values
    pub negative_value: f64,
    /// Sum of non-negative member values
    pub positive_value: f64,
}

impl<G, T> StackedColumn<G, T> {
    pub fn total_value(&self) -> f64 {
        self.negative_value + self.positive_value
    }
}

impl<G, T> ValueRange for StackedColumn<G, T> {
    fn value_range(&self) -> (f64, f64) {
        (self.negative_value, self.positive_value)
    }
}

/// Stack point owning re-flowed copies of its member points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedColumnPoint<G, T> {
    pub datum: StackedColumn<G, T>,
    pub column_points: Vec<ColumnPoint<T>>,
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl<G, T> PlotPoint for StackedColumnPoint<G, T> {
    type Datum = StackedColumn<G, T>;

    fn datum(&self) -> &Self::Datum {
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

// ============================================================================
// STACKING
// ============================================================================

/// Running totals of one sign within a stack
#[derive(Debug, Default)]
struct Pile {
    relative_value: f64,
    value: f64,
}

struct Stack<'a, T> {
    members: Vec<&'a Column<T>>,
    negative: Pile,
    positive: Pile,
}

impl<T> Default for Stack<'_, T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            negative: Pile::default(),
            positive: Pile::default(),
        }
    }
}

/// Stacks a column plot by key.
///
/// Stacks appear in first-seen order. Within a pile, members are placed in
/// their original order moving away from the zero line, and every member but
/// the one touching zero gives up `stack_spacing` on its zero-facing edge.
pub struct Stacking<T, G> {
    selector: StackSelector<T, G>,
    stack_spacing: f64,
}

impl<T, G> Clone for Stacking<T, G> {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
            stack_spacing: self.stack_spacing,
        }
    }
}

impl<T, G> std::fmt::Debug for Stacking<T, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stacking")
            .field("stack_spacing", &self.stack_spacing)
            .finish_non_exhaustive()
    }
}

impl<T, G> Stacking<T, G>
where
    T: Clone,
    G: Eq + Hash + Clone,
{
    pub fn new(selector: impl KeySelector<T, G> + 'static, stack_spacing: f64) -> Self {
        Self::shared(Arc::new(selector), stack_spacing)
    }

    pub fn shared(selector: StackSelector<T, G>, stack_spacing: f64) -> Self {
        Self {
            selector,
            stack_spacing,
        }
    }

    pub fn stack_spacing(&self) -> f64 {
        self.stack_spacing
    }

    /// Stack the points of a column plot using the column geometry in `layout`.
    /// The source plot is left untouched.
    pub fn apply(
        &self,
        plot: &Plot<ColumnPoint<T>>,
        layout: &ColumnLayout,
    ) -> Plot<StackedColumnPoint<G, T>> {
        let mut stacks: IndexMap<G, Stack<'_, T>> = IndexMap::new();
        let mut flags = SignFlags::None;

        for point in &plot.points {
            let column = &point.datum;
            let stack = stacks.entry(self.selector.key(&column.input)).or_default();
            let pile = if column.is_negative() {
                &mut stack.negative
            } else {
                &mut stack.positive
            };
            pile.relative_value += column.relative_value;
            pile.value += column.value;
            stack.members.push(column);
            flags |= SignFlags::of(column.relative_value);
        }

        let mut extremes = Extremes::default();
        for stack in stacks.values() {
            extremes.observe(stack.negative.relative_value, stack.negative.value);
            extremes.observe(stack.positive.relative_value, stack.positive.value);
        }

        let scale = HeightScale::new(&extremes, flags, layout.column_height, layout.domain)
            .fit_extremes(&extremes, layout.domain);
        let step = layout.step();

        let points: Vec<StackedColumnPoint<G, T>> = stacks
            .into_iter()
            .enumerate()
            .map(|(index, (key, stack))| {
                let x1 = index as f64 * step;
                self.place_stack(key, stack, &scale, x1, x1 + step)
            })
            .collect();

        let width = points.last().map_or(0.0, |point| point.x2);
        let horizontal_values = if points.is_empty() {
            SignFlags::None
        } else {
            SignFlags::Positive
        };

        tracing::trace!(stacks = points.len(), "stacked columns");

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

    fn place_stack(
        &self,
        key: G,
        stack: Stack<'_, T>,
        scale: &HeightScale,
        x1: f64,
        x2: f64,
    ) -> StackedColumnPoint<G, T> {
        let positive_height = scale.display_height(stack.positive.relative_value);
        let negative_height = scale.display_height(stack.negative.relative_value);

        let mut top = scale.positive_height;
        let mut bottom = scale.negative_origin();
        let mut first_positive = true;
        let mut first_negative = true;
        let mut extent: Option<(f64, f64)> = None;

        let mut column_points = Vec::with_capacity(stack.members.len());
        for column in &stack.members {
            let (mut member_y1, mut member_y2);
            if column.is_negative() {
                let height = share(negative_height, column.relative_value, stack.negative.relative_value);
                member_y1 = bottom;
                member_y2 = bottom + height;
                bottom = member_y2;
                if !first_negative {
                    member_y1 = (member_y1 + self.stack_spacing).min(member_y2);
                }
                first_negative = false;
            } else {
                let height = share(positive_height, column.relative_value, stack.positive.relative_value);
                member_y2 = top;
                member_y1 = top - height;
                top = member_y1;
                if !first_positive {
                    member_y2 = (member_y2 - self.stack_spacing).max(member_y1);
                }
                first_positive = false;
            }

            extent = Some(match extent {
                Some((y1, y2)) => (y1.min(member_y1), y2.max(member_y2)),
                None => (member_y1, member_y2),
            });
            column_points.push(Point {
                datum: (*column).clone(),
                x1,
                x2,
                y1: member_y1,
                y2: member_y2,
            });
        }

        let (y1, y2) = extent.unwrap_or((scale.positive_height, scale.positive_height));
        StackedColumnPoint {
            datum: StackedColumn {
                input: key,
                columns: stack.members.into_iter().cloned().collect(),
                negative_value: stack.negative.value,
                positive_value: stack.positive.value,
            },
            column_points,
            x1,
            x2,
            y1,
            y2,
        }
    }
}

/// A member's part of its pile height, in proportion to its relative value
fn share(pile_height: f64, relative_value: f64, pile_relative_value: f64) -> f64 {
    if pile_relative_value == 0.0 {
        0.0
    } else {
        pile_height * relative_value / pile_relative_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colchart_core::{MaxAbs, Normalizer, Sum};

    #[derive(Debug, Clone, PartialEq)]
    struct Play {
        artist: &'static str,
        province: &'static str,
        count: f64,
    }

    fn play(artist: &'static str, province: &'static str, count: f64) -> Play {
        Play { artist, province, count }
    }

    fn normalized(batch: &[Play], max_abs: bool) -> Vec<Column<Play>> {
        let builder = Normalizer::builder().value_selector(|p: &Play| p.count);
        let normalizer = if max_abs {
            builder.divisor_operator(MaxAbs).build().unwrap()
        } else {
            builder.divisor_operator(Sum).build().unwrap()
        };
        normalizer.normalize(batch)
    }

    fn by_province(spacing: f64) -> Stacking<Play, &'static str> {
        Stacking::new(|p: &Play| p.province, spacing)
    }

    #[test]
    fn test_single_stack_keeps_total_height() {
        let layout = ColumnLayout::new(100.0, 20.0, 5.0);
        let batch = vec![play("Lorde", "A", 10.0), play("Adele", "A", 30.0)];
        let plain = layout.plot(normalized(&batch, false));
        let stacked = by_province(0.0).apply(&plain, &layout);

        let plain_total: f64 = plain.points.iter().map(|p| p.height()).sum();
        let stack = &stacked.points[0];
        assert_eq!(plain_total, 100.0);
        assert_eq!(stack.y2 - stack.y1, plain_total);

        assert_eq!((stack.column_points[0].y1, stack.column_points[0].y2), (75.0, 100.0));
        assert_eq!((stack.column_points[1].y1, stack.column_points[1].y2), (0.0, 75.0));
        assert_eq!((stack.x1, stack.x2), (0.0, 25.0));
    }

    #[test]
    fn test_stacks_keep_first_seen_order() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![
            play("Lorde", "B", 10.0),
            play("Drake", "A", 20.0),
            play("Adele", "B", 30.0),
        ];
        let stacked = by_province(0.0).apply(&layout.plot(normalized(&batch, false)), &layout);

        let keys: Vec<_> = stacked.points.iter().map(|s| s.datum.input).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(stacked.points[1].x1, 20.0);
        assert_eq!(stacked.width, 40.0);
    }

    #[test]
    fn test_stack_spacing_trims_zero_facing_edge() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "A", 10.0),
            play("Adele", "A", 20.0),
        ];
        let stacked = by_province(2.0).apply(&layout.plot(normalized(&batch, false)), &layout);
        let members = &stacked.points[0].column_points;

        assert_eq!((members[0].y1, members[0].y2), (75.0, 100.0));
        assert_eq!((members[1].y1, members[1].y2), (50.0, 73.0));
        assert_eq!((members[2].y1, members[2].y2), (0.0, 48.0));
    }

    #[test]
    fn test_stack_spacing_never_inverts() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![play("Lorde", "A", 99.0), play("Drake", "A", 1.0)];
        let stacked = by_province(5.0).apply(&layout.plot(normalized(&batch, false)), &layout);
        let thin = &stacked.points[0].column_points[1];

        assert_eq!(thin.y1, thin.y2);
    }

    #[test]
    fn test_mixed_sign_stacks() {
        let layout = ColumnLayout::new(150.0, 20.0, 0.0);
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "A", -5.0),
            play("Sia", "B", -5.0),
        ];
        let stacked = by_province(0.0).apply(&layout.plot(normalized(&batch, true)), &layout);

        assert_eq!(stacked.vertical_values, SignFlags::Both);
        assert_eq!(stacked.height, 151.0);
        // piles: A +10 / -5, B -5; extremes 1.0 and -0.5
        assert_eq!(stacked.zero.y, 100.0);

        let a = &stacked.points[0];
        assert_eq!(a.datum.positive_value, 10.0);
        assert_eq!(a.datum.negative_value, -5.0);
        assert_eq!(a.datum.total_value(), 5.0);
        assert_eq!(a.datum.value_range(), (-5.0, 10.0));
        assert_eq!(a.y1, 0.0);
        assert_eq!(a.y2, 151.0);

        let drake = &a.column_points[1];
        assert_eq!((drake.y1, drake.y2), (101.0, 151.0));

        let b = &stacked.points[1];
        assert_eq!((b.y1, b.y2), (101.0, 151.0));
    }

    #[test]
    fn test_negative_only_stack_excludes_divider() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "B", -4.0),
            play("Sia", "B", -6.0),
        ];
        let stacked = by_province(0.0).apply(&layout.plot(normalized(&batch, true)), &layout);
        let b = &stacked.points[1];

        assert_eq!(stacked.zero.y, 50.0);
        assert_eq!(b.y1, 51.0);
        assert_eq!(b.y1, b.column_points[0].y1);
        assert_eq!(b.y2, 101.0);
    }

    #[test]
    fn test_tallest_stack_fills_column_height() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "A", 10.0),
            play("Sia", "A", 5.0),
            play("Adele", "B", 5.0),
        ];
        let stacked = by_province(0.0).apply(&layout.plot(normalized(&batch, true)), &layout);

        let a = &stacked.points[0];
        assert_eq!(stacked.height, 100.0);
        assert!(a.y1.abs() < 1e-9);
        assert_eq!(a.y2, 100.0);
        assert!((a.column_points[0].height() - 40.0).abs() < 1e-9);

        let b = &stacked.points[1];
        assert!((b.y2 - b.y1 - 20.0).abs() < 1e-9);
        assert!(stacked.points.iter().all(|stack| stack.y1 >= -1e-9));
    }

    #[test]
    fn test_negative_stack_beyond_unit_fits() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![play("Lorde", "A", -10.0), play("Drake", "A", -10.0)];
        let stacked = by_province(0.0).apply(&layout.plot(normalized(&batch, true)), &layout);
        let a = &stacked.points[0];

        assert_eq!(stacked.zero.y, 0.0);
        assert_eq!((a.y1, a.y2), (0.0, 100.0));
    }

    #[test]
    fn test_source_plot_untouched() {
        let layout = ColumnLayout::new(100.0, 20.0, 0.0);
        let batch = vec![play("Lorde", "A", 10.0), play("Adele", "A", 30.0)];
        let plain = layout.plot(normalized(&batch, false));
        let before = plain.clone();

        let _ = by_province(1.0).apply(&plain, &layout);
        assert_eq!(plain, before);
    }
}
