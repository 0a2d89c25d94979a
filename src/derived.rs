//! Per-render indices shared by every controller.
use std::cmp::Ordering;

use iced::{Point, Rectangle};
use indexmap::IndexMap;

use crate::geometry::{self, along_x, rect_span_along_x};
use crate::scene::{NodeId, PointRef, Scene};

/// Points sharing one x coordinate across the navigable series.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub x: f64,
    /// Points in series order.
    pub points: Vec<PointRef>,
    /// Enclosing rect, stretched across the plot.
    pub rect: Rectangle,
}

/// Indices rebuilt on every render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedState {
    /// Sorted by x.
    groups: Vec<Group>,
    /// Navigable points per series, sorted by x (data order for pies).
    series_points: IndexMap<NodeId, Vec<PointRef>>,
    series_x: IndexMap<NodeId, Vec<f64>>,
}

impl DerivedState {
    /// Scan the scene. O(total points).
    pub fn compute(scene: &Scene) -> Self {
        let mut by_x: Vec<(f64, PointRef)> = Vec::new();
        let mut series_points = IndexMap::new();
        let mut series_x = IndexMap::new();

        for (series_ref, series) in scene.series_refs() {
            if !series.visible || !series.kind.is_navigable() {
                continue;
            }
            let mut points: Vec<(f64, PointRef)> = scene
                .point_refs(series_ref)
                .filter(|(_, p)| p.visible && p.y.is_some())
                .map(|(r, p)| (p.x, r))
                .collect();
            if !series.kind.is_pie() {
                points.sort_by(|a, b| a.0.total_cmp(&b.0));
                by_x.extend(points.iter().copied());
            }
            series_x.insert(series.node, points.iter().map(|(x, _)| *x).collect());
            series_points.insert(series.node, points.into_iter().map(|(_, r)| r).collect());
        }

        // Stable sort keeps series order inside a group.
        by_x.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut groups: Vec<Group> = Vec::new();
        for (x, point) in by_x {
            match groups.last_mut() {
                Some(group) if group.x.total_cmp(&x) == Ordering::Equal => group.points.push(point),
                _ => groups.push(Group {
                    x,
                    points: vec![point],
                    rect: Rectangle::default(),
                }),
            }
        }
        for group in &mut groups {
            let rects = group.points.iter().filter_map(|p| point_rect(scene, *p));
            if let Some(rect) = geometry::group_rect(scene, rects) {
                group.rect = rect;
            }
        }

        log::trace!(
            "derived state: {} groups over {} series",
            groups.len(),
            series_points.len()
        );
        Self {
            groups,
            series_points,
            series_x,
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Distinct x values in ascending order.
    pub fn all_x(&self) -> impl Iterator<Item = f64> + '_ {
        self.groups.iter().map(|g| g.x)
    }

    /// Sorted x values of one series.
    pub fn series_x(&self, series: NodeId) -> &[f64] {
        self.series_x
            .get(&series)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Navigable points of a series in navigation order.
    pub fn series_points(&self, series: NodeId) -> &[PointRef] {
        self.series_points
            .get(&series)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn group_index(&self, x: f64) -> Option<usize> {
        self.groups
            .binary_search_by(|g| g.x.total_cmp(&x))
            .ok()
    }

    pub fn group_at(&self, x: f64) -> Option<&Group> {
        self.group_index(x).map(|i| &self.groups[i])
    }

    /// Group a point belongs to, if any.
    pub fn group_of(&self, scene: &Scene, point: PointRef) -> Option<&Group> {
        let x = scene.point_node(point)?.x;
        self.group_at(x).filter(|g| g.points.contains(&point))
    }

    /// Hit-test the cursor against the group rects along the x axis.
    ///
    /// A rect containing the cursor wins; otherwise the rect with the closest edge.
    pub fn nearest_group(&self, scene: &Scene, cursor: Point) -> Option<usize> {
        let position = along_x(scene, cursor);
        let mut best: Option<(usize, f32)> = None;
        for (index, group) in self.groups.iter().enumerate() {
            let (start, end) = rect_span_along_x(scene, &group.rect);
            if position >= start && position <= end {
                return Some(index);
            }
            let distance = (position - start).abs().min((position - end).abs());
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Chart-space rect of a point handle.
pub fn point_rect(scene: &Scene, point: PointRef) -> Option<Rectangle> {
    let series = scene.series_node(point.series)?;
    let node = scene.point_node(point)?;
    Some(geometry::point_rect(scene, series, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChartEngine;
    use crate::headless::HeadlessEngine;
    use crate::options::{ChartOptions, DataPoint, SeriesOptions};

    fn engine(series: Vec<SeriesOptions>, inverted: bool) -> HeadlessEngine {
        HeadlessEngine::new(&ChartOptions {
            series,
            inverted,
            ..ChartOptions::default()
        })
    }

    #[test]
    fn gaps_and_thresholds_stay_out_of_groups() {
        let engine = engine(
            vec![
                SeriesOptions::line([DataPoint::new(3.0, 1.0), DataPoint::gap(2.0)]),
                SeriesOptions::line([[1.0, 2.0], [3.0, 4.0]]),
                SeriesOptions::x_threshold(2.0),
            ],
            false,
        );
        let derived = DerivedState::compute(engine.scene());
        assert_eq!(derived.all_x().collect::<Vec<_>>(), [1.0, 3.0]);
        assert_eq!(derived.group_at(3.0).unwrap().points.len(), 2);
        assert!(derived.group_at(2.0).is_none());

        let first = engine.scene().series[0].node;
        assert_eq!(derived.series_x(first), [3.0]);
    }

    #[test]
    fn group_rects_contain_their_points() {
        for inverted in [false, true] {
            let engine = engine(
                vec![
                    SeriesOptions::line([[1.0, 2.0], [2.0, 8.0]]),
                    SeriesOptions::column([[1.0, 5.0], [2.0, 1.0]]),
                ],
                inverted,
            );
            let scene = engine.scene();
            let derived = DerivedState::compute(scene);
            for group in derived.groups() {
                for point in &group.points {
                    let rect = point_rect(scene, *point).unwrap();
                    let outer = group.rect;
                    assert!(rect.x >= outer.x && rect.y >= outer.y, "{inverted}");
                    assert!(
                        rect.x + rect.width <= outer.x + outer.width
                            && rect.y + rect.height <= outer.y + outer.height,
                        "{inverted}"
                    );
                }
            }
        }
    }

    #[test]
    fn nearest_group_prefers_containing_rect_then_closest_edge() {
        let engine = engine(
            vec![SeriesOptions::scatter([[1.0, 1.0], [2.0, 1.0], [10.0, 1.0]])],
            false,
        );
        let scene = engine.scene();
        let derived = DerivedState::compute(scene);
        let [a, b, c] = [0, 1, 2].map(|i| derived.groups()[i].rect);

        assert_eq!(derived.nearest_group(scene, a.center()), Some(0));
        let right_of_b = Point::new(b.x + b.width + 1.0, b.center_y());
        assert_eq!(derived.nearest_group(scene, right_of_b), Some(1));
        let left_of_c = Point::new(c.x - 1.0, c.center_y());
        assert_eq!(derived.nearest_group(scene, left_of_c), Some(2));
    }
}
