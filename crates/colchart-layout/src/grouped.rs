//! Grouped columns: clusters of columns sharing a group key, laid side by side.

use crate::{Bounds, ColumnPoint, Plot, PlotPoint, Point, ValueRange};
use colchart_core::{Column, GroupSelector, KeySelector};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::Arc;

/// Columns sharing a group key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedColumn<G, T> {
    /// The group key
    pub input: G,
    pub columns: Vec<Column<T>>,
    /// Signed sum of member values
    pub total_value: f64,
    /// Member value with the largest magnitude, sign kept
    pub value: f64,
}

impl<G, T> ValueRange for GroupedColumn<G, T> {
    fn value_range(&self) -> (f64, f64) {
        self.columns.iter().fold((0.0, 0.0), |(min, max), column| {
            (min.min(column.value), max.max(column.value))
        })
    }
}

/// Group point owning re-flowed copies of its member points
///
/// `y1` is the top of the highest member. `y2` is the plot height: the column
/// height, plus the 1px sign divider when the plot holds both signs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedColumnPoint<G, T> {
    pub datum: GroupedColumn<G, T>,
    pub column_points: Vec<ColumnPoint<T>>,
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl<G, T> PlotPoint for GroupedColumnPoint<G, T> {
    type Datum = GroupedColumn<G, T>;

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
// GROUPING
// ============================================================================

/// Groups a column plot by key.
///
/// Groups appear in first-seen order and members keep their relative order.
/// Each group is padded by half the group spacing on both sides.
pub struct Grouping<T, G> {
    selector: GroupSelector<T, G>,
    group_spacing: f64,
}

impl<T, G> Clone for Grouping<T, G> {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
            group_spacing: self.group_spacing,
        }
    }
}

impl<T, G> std::fmt::Debug for Grouping<T, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grouping")
            .field("group_spacing", &self.group_spacing)
            .finish_non_exhaustive()
    }
}

impl<T, G> Grouping<T, G>
where
    T: Clone,
    G: Eq + Hash + Clone,
{
    pub fn new(selector: impl KeySelector<T, G> + 'static, group_spacing: f64) -> Self {
        Self::shared(Arc::new(selector), group_spacing)
    }

    pub fn shared(selector: GroupSelector<T, G>, group_spacing: f64) -> Self {
        Self {
            selector,
            group_spacing,
        }
    }

    pub fn group_spacing(&self) -> f64 {
        self.group_spacing
    }

    /// Group the points of a column plot. The source plot is left untouched.
    pub fn apply(&self, plot: &Plot<ColumnPoint<T>>) -> Plot<GroupedColumnPoint<G, T>> {
        let mut groups: IndexMap<G, Vec<&ColumnPoint<T>>> = IndexMap::new();
        for point in &plot.points {
            let key = self.selector.key(&point.datum.input);
            groups.entry(key).or_default().push(point);
        }

        let half_spacing = self.group_spacing / 2.0;
        let mut offset = 0.0;
        let mut points = Vec::with_capacity(groups.len());

        for (key, members) in groups {
            let x1 = offset;
            let mut cursor = x1 + half_spacing;
            let mut y1 = f64::INFINITY;
            let mut total_value = 0.0;
            let mut value: f64 = 0.0;
            let mut columns = Vec::with_capacity(members.len());
            let mut column_points = Vec::with_capacity(members.len());

            for member in members {
                let width = member.width();
                y1 = y1.min(member.y1);
                total_value += member.datum.value;
                if member.datum.value.abs() > value.abs() {
                    value = member.datum.value;
                }
                columns.push(member.datum.clone());
                column_points.push(Point {
                    datum: member.datum.clone(),
                    x1: cursor,
                    x2: cursor + width,
                    y1: member.y1,
                    y2: member.y2,
                });
                cursor += width;
            }

            let x2 = cursor + half_spacing;
            offset = x2;

            points.push(GroupedColumnPoint {
                datum: GroupedColumn {
                    input: key,
                    columns,
                    total_value,
                    value,
                },
                column_points,
                x1,
                x2,
                y1,
                y2: plot.height,
            });
        }

        tracing::trace!(groups = points.len(), "grouped columns");

        Plot {
            height: plot.height,
            width: offset,
            points,
            zero: plot.zero,
            horizontal_values: plot.horizontal_values,
            vertical_values: plot.vertical_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnLayout;
    use colchart_core::{Normalizer, Sum};

    #[derive(Debug, Clone, PartialEq)]
    struct Play {
        artist: &'static str,
        province: &'static str,
        count: f64,
    }

    fn play(artist: &'static str, province: &'static str, count: f64) -> Play {
        Play { artist, province, count }
    }

    fn plot(batch: &[Play]) -> Plot<ColumnPoint<Play>> {
        let normalizer = Normalizer::builder()
            .value_selector(|p: &Play| p.count)
            .divisor_operator(Sum)
            .build()
            .unwrap();
        ColumnLayout::new(100.0, 20.0, 0.0).plot(normalizer.normalize(batch))
    }

    fn by_province() -> Grouping<Play, &'static str> {
        Grouping::new(|p: &Play| p.province, 10.0)
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "B", 20.0),
            play("Adele", "A", 30.0),
        ];
        let grouped = by_province().apply(&plot(&batch));

        let keys: Vec<_> = grouped.points.iter().map(|g| g.datum.input).collect();
        assert_eq!(keys, vec!["A", "B"]);

        let members: Vec<_> = grouped.points[0]
            .column_points
            .iter()
            .map(|p| p.datum.input.artist)
            .collect();
        assert_eq!(members, vec!["Lorde", "Adele"]);
    }

    #[test]
    fn test_group_geometry() {
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "B", 20.0),
            play("Adele", "A", 30.0),
        ];
        let source = plot(&batch);
        let grouped = by_province().apply(&source);

        let first = &grouped.points[0];
        assert_eq!((first.x1, first.x2), (0.0, 50.0));
        assert_eq!(first.column_points[0].x1, 5.0);
        assert_eq!(first.column_points[1].x1, 25.0);
        assert_eq!(first.column_points[1].x2, 45.0);
        assert_eq!(first.y1, source.points[2].y1);
        assert_eq!(first.y2, 100.0);

        let second = &grouped.points[1];
        assert_eq!((second.x1, second.x2), (50.0, 80.0));
        assert_eq!(second.column_points[0].x1, 55.0);
        assert_eq!(grouped.width, 80.0);

        // source points keep their positions
        assert_eq!(source.points[2].x1, 40.0);
    }

    #[test]
    fn test_group_values() {
        let batch = vec![
            play("Lorde", "A", 10.0),
            play("Drake", "A", -30.0),
            play("Adele", "A", 25.0),
        ];
        let grouped = by_province().apply(&plot(&batch));
        let datum = &grouped.points[0].datum;

        assert_eq!(datum.total_value, 5.0);
        assert_eq!(datum.value, -30.0);
        assert_eq!(datum.value_range(), (-30.0, 25.0));
        assert_eq!(datum.columns.len(), 3);
    }

    #[test]
    fn test_group_spans_divider_with_mixed_signs() {
        let batch = vec![play("Lorde", "A", 10.0), play("Drake", "B", -30.0)];
        let grouped = by_province().apply(&plot(&batch));

        assert_eq!(grouped.height, 101.0);
        assert!(grouped.points.iter().all(|group| group.y2 == 101.0));
        assert_eq!(grouped.points[1].y1, 26.0);

        let single_sign = by_province().apply(&plot(&[play("Lorde", "A", 10.0)]));
        assert_eq!(single_sign.points[0].y2, 100.0);
    }

    #[test]
    fn test_empty_plot() {
        let grouped = by_province().apply(&plot(&[]));
        assert!(grouped.is_empty());
        assert_eq!(grouped.width, 0.0);
        assert_eq!(grouped.height, 100.0);
    }
}
