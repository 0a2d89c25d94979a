//! An in-memory engine for hosts without a renderer and for tests.
//!
//! The layout is a plain linear data-to-pixel mapping. It exists so the coordination
//! layer has realistic geometry to work with, not to mimic any real engine's layout.
use std::f32::consts::TAU;

use iced::{Point, Rectangle, Size};
use indexmap::IndexMap;

use crate::engine::{ChartEngine, OverlayId, OverlayShape, StateAuthority};
use crate::error::ChartWarning;
use crate::options::{ChartOptions, resolve_series};
use crate::scene::{
    AxisKind, AxisNode, NodeId, PieGeometry, PieSlice, PlotLineNode, PointNode, PointRef, Scene,
    SeriesKind, SeriesNode, SeriesRef, VisualState, item_id,
};

/// Share of a column slot taken by the bars.
const COLUMN_SLOT_FILL: f32 = 0.6;
/// Pie radius relative to half the smaller plot side.
const PIE_RADIUS_FACTOR: f32 = 0.8;

/// A complete [`ChartEngine`] backed by a [`Scene`] in memory.
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    scene: Scene,
    thresholds: IndexMap<NodeId, f64>,
    overlays: IndexMap<OverlayId, OverlayShape>,
    warnings: Vec<ChartWarning>,
    redraws: usize,
}

impl HeadlessEngine {
    /// Build a scene from options in a 600x400 plot area offset by the axes.
    pub fn new(options: &ChartOptions) -> Self {
        Self::with_plot(
            options,
            Rectangle::new(Point::new(50.0, 20.0), Size::new(600.0, 400.0)),
        )
    }

    pub fn with_plot(options: &ChartOptions, plot: Rectangle) -> Self {
        let (resolved, warnings) = resolve_series(options);
        let mut thresholds = IndexMap::new();
        let series = resolved
            .iter()
            .map(|resolved| {
                let options = resolved.options;
                let mut node = SeriesNode::new(options.kind);
                node.id = options.id.clone();
                node.name = options.name.clone();
                node.color = options.color;
                node.visible = options.visible;
                node.linked_to = resolved.linked_to;
                node.points = options
                    .data
                    .iter()
                    .map(|data| {
                        let mut point = PointNode::new(data.x, data.y);
                        point.range = data.range;
                        point.id = data.id.clone();
                        point.name = data.name.clone();
                        point.visible = data.visible;
                        point
                    })
                    .collect();
                if let Some(value) = options.value {
                    thresholds.insert(node.node, value);
                }
                node
            })
            .collect();

        let axes = vec![
            AxisNode {
                kind: AxisKind::X,
                title: options.x_title.clone(),
                visible: true,
            },
            AxisNode {
                kind: AxisKind::Y,
                title: options.y_title.clone(),
                visible: true,
            },
        ];

        let mut engine = Self {
            scene: Scene {
                series,
                plot,
                inverted: options.inverted,
                axes,
                plot_lines: Vec::new(),
            },
            thresholds,
            overlays: IndexMap::new(),
            warnings,
            redraws: 0,
        };
        engine.layout();
        engine
    }

    /// Warnings produced while preprocessing the options.
    pub fn warnings(&self) -> &[ChartWarning] {
        &self.warnings
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&OverlayShape> {
        self.overlays.get(&id)
    }

    pub fn overlays(&self) -> impl Iterator<Item = (&OverlayId, &OverlayShape)> {
        self.overlays.iter()
    }

    /// Direct access for simulating engine-side changes.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Handle of the `index`-th point of the `series`-th series.
    pub fn point(&self, series: usize, index: usize) -> Option<PointRef> {
        let series = self.scene.series_ref(series)?;
        self.scene
            .point_refs(series)
            .find(|(r, _)| r.index == index)
            .map(|(r, _)| r)
    }

    pub fn series(&self, index: usize) -> Option<SeriesRef> {
        self.scene.series_ref(index)
    }

    /// Re-render the way an engine does internally: visual elements are rebuilt
    /// and every visual state falls back to normal.
    pub fn simulate_internal_redraw(&mut self) {
        for series in &mut self.scene.series {
            series.state = VisualState::Normal;
            for point in &mut series.points {
                point.state = VisualState::Normal;
            }
        }
        for line in &mut self.scene.plot_lines {
            line.opacity = 1.0;
        }
        self.layout();
    }

    /// Replace a point with an equal copy under a fresh identity.
    pub fn replace_point(&mut self, series: usize, index: usize) -> Option<PointRef> {
        let node = self.scene.series.get_mut(series)?;
        let point = node.points.get_mut(index)?;
        let mut replacement = point.clone();
        replacement.node = NodeId::new();
        replacement.state = VisualState::Normal;
        *point = replacement;
        self.point(series, index)
    }

    pub fn set_tooltip_hint(&mut self, point: PointRef, hint: Point) {
        if let Some(node) = self.point_mut(point) {
            node.tooltip_hint = Some(hint);
        }
    }

    /// Recompute pixel positions, column shapes, pie slices and plot lines.
    pub fn layout(&mut self) {
        let scene = &mut self.scene;
        let plot = scene.plot;
        let (len_x, len_y) = if scene.inverted {
            (plot.height, plot.width)
        } else {
            (plot.width, plot.height)
        };

        let cartesian = |s: &&SeriesNode| s.visible && !s.kind.is_pie() && !s.destroyed;
        let mut x_values: Vec<f64> = Vec::new();
        let mut y_values: Vec<f64> = Vec::new();
        for series in scene.series.iter().filter(cartesian) {
            for point in series.points.iter().filter(|p| p.visible) {
                x_values.push(point.x);
                y_values.extend(point.y);
                if let Some((low, high)) = point.range {
                    y_values.extend([low, high]);
                }
            }
            if let Some(value) = self.thresholds.get(&series.node) {
                match series.kind {
                    SeriesKind::XThreshold => x_values.push(*value),
                    _ => y_values.push(*value),
                }
            }
            if series.kind.is_column() {
                y_values.push(0.0);
            }
        }
        let x_range = padded_range(&x_values);
        let y_range = padded_range(&y_values);
        let to_px_x = |x: f64| ((x - x_range.0) / (x_range.1 - x_range.0)) as f32 * len_x;
        let to_px_y = |y: f64| len_y - ((y - y_range.0) / (y_range.1 - y_range.0)) as f32 * len_y;

        let mut distinct_x = x_values.clone();
        distinct_x.sort_by(f64::total_cmp);
        distinct_x.dedup();
        let column_series: Vec<NodeId> = scene
            .series
            .iter()
            .filter(cartesian)
            .filter(|s| s.kind.is_column())
            .map(|s| s.node)
            .collect();
        let slot = len_x / distinct_x.len().max(1) as f32 * COLUMN_SLOT_FILL;
        let bar = slot / column_series.len().max(1) as f32;
        let base = to_px_y(0.0_f64.clamp(y_range.0, y_range.1));

        let mut plot_lines = Vec::new();
        for series in &mut scene.series {
            if series.kind.is_pie() {
                layout_pie(series, plot);
                continue;
            }
            let column = column_series.iter().position(|n| *n == series.node);
            for point in &mut series.points {
                point.plot_x = to_px_x(point.x);
                point.plot_y = match (point.range, point.y) {
                    (Some((_, high)), _) => to_px_y(high),
                    (None, Some(y)) => to_px_y(y),
                    (None, None) => len_y,
                };
                point.shape = column.map(|k| {
                    let top = point.plot_y.min(base);
                    Rectangle {
                        x: point.plot_x - slot * 0.5 + k as f32 * bar,
                        y: top,
                        width: bar,
                        height: (point.plot_y - base).abs(),
                    }
                });
            }
            if series.visible
                && let Some(value) = self.thresholds.get(&series.node)
            {
                plot_lines.push(PlotLineNode {
                    id: item_id(series.id.as_deref(), series.name.as_deref(), series.node),
                    axis: if series.kind == SeriesKind::XThreshold {
                        AxisKind::X
                    } else {
                        AxisKind::Y
                    },
                    value: *value,
                    color: series.color,
                    opacity: 1.0,
                });
            }
        }
        scene.plot_lines = plot_lines;
    }

    fn point_mut(&mut self, point: PointRef) -> Option<&mut PointNode> {
        self.scene
            .series
            .get_mut(point.series.index)
            .filter(|s| s.node == point.series.node)?
            .points
            .get_mut(point.index)
            .filter(|p| p.node == point.node)
    }
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

fn layout_pie(series: &mut SeriesNode, plot: Rectangle) {
    let radius = plot.width.min(plot.height) * 0.5 * PIE_RADIUS_FACTOR;
    series.pie = Some(PieGeometry {
        center: Point::new(plot.width * 0.5, plot.height * 0.5),
        radius,
    });
    let total: f64 = series
        .points
        .iter()
        .filter(|p| p.visible)
        .filter_map(|p| p.y)
        .sum();
    let mut angle = 0.0;
    for point in &mut series.points {
        let value = point.y.filter(|_| point.visible).unwrap_or(0.0);
        if value <= 0.0 || total <= 0.0 {
            point.slice = None;
            continue;
        }
        let sweep = (value / total) as f32 * TAU;
        point.slice = Some(PieSlice {
            start_angle: angle,
            end_angle: angle + sweep,
        });
        angle += sweep;
    }
}

impl ChartEngine for HeadlessEngine {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn set_series_state(&mut self, _: &StateAuthority, series: SeriesRef, state: VisualState) {
        if let Some(node) = self
            .scene
            .series
            .get_mut(series.index)
            .filter(|s| s.node == series.node)
        {
            node.state = state;
        }
    }

    fn set_point_state(&mut self, _: &StateAuthority, point: PointRef, state: VisualState) {
        if let Some(node) = self.point_mut(point) {
            node.state = state;
        }
    }

    fn set_plot_line_opacity(&mut self, _: &StateAuthority, id: &str, opacity: f32) {
        for line in self.scene.plot_lines.iter_mut().filter(|l| l.id == id) {
            line.opacity = opacity;
        }
    }

    fn set_series_visible(&mut self, series: SeriesRef, visible: bool) {
        if let Some(node) = self
            .scene
            .series
            .get_mut(series.index)
            .filter(|s| s.node == series.node)
        {
            node.visible = visible;
        }
    }

    fn set_point_visible(&mut self, point: PointRef, visible: bool) {
        if let Some(node) = self.point_mut(point) {
            node.visible = visible;
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
        self.layout();
    }

    fn draw_overlay(&mut self, id: OverlayId, shape: OverlayShape) {
        self.overlays.insert(id, shape);
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.shift_remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SeriesOptions;

    #[test]
    fn layout_maps_data_into_the_plot() {
        let options = ChartOptions {
            series: vec![SeriesOptions::line([[0.0, 0.0], [10.0, 10.0]])],
            ..ChartOptions::default()
        };
        let engine = HeadlessEngine::new(&options);
        let points = &engine.scene().series[0].points;
        assert_eq!(points[0].plot_x, 0.0);
        assert_eq!(points[0].plot_y, 400.0);
        assert_eq!(points[1].plot_x, 600.0);
        assert_eq!(points[1].plot_y, 0.0);
    }

    #[test]
    fn thresholds_become_plot_lines() {
        let options = ChartOptions {
            series: vec![
                SeriesOptions::line([[0.0, 0.0], [10.0, 10.0]]),
                SeriesOptions::y_threshold(5.0).with_id("limit"),
            ],
            ..ChartOptions::default()
        };
        let engine = HeadlessEngine::new(&options);
        assert_eq!(engine.scene().plot_lines.len(), 1);
        assert_eq!(engine.scene().plot_lines[0].id, "limit");
        assert_eq!(engine.scene().plot_lines[0].axis, AxisKind::Y);
    }

    #[test]
    fn pie_slices_cover_the_circle() {
        let options = ChartOptions {
            series: vec![SeriesOptions::pie([("a", 1.0), ("b", 3.0)])],
            ..ChartOptions::default()
        };
        let engine = HeadlessEngine::new(&options);
        let points = &engine.scene().series[0].points;
        let last = points[1].slice.unwrap();
        assert!((last.end_angle - TAU).abs() < 1e-4);
        assert!((points[0].slice.unwrap().end_angle - TAU * 0.25).abs() < 1e-4);
    }
}
