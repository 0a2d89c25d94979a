//! Conversions from the engine's un-inverted plot frame into chart space.
//!
//! Every rectangle leaving this module is orientation-normalized: consumers never
//! need to look at the inverted flag again.
use glam::Vec2;
use iced::{Point, Rectangle, Size};

use crate::scene::{PointNode, Scene, SeriesNode};

/// Side length of the hit/anchor square around a marker point.
pub(crate) const MARKER_RECT_SIZE: f32 = 8.0;

/// Chart-space position of a point.
pub fn point_position(scene: &Scene, point: &PointNode) -> Point {
    let plot = scene.plot;
    if scene.inverted {
        Point::new(
            plot.x + plot.width - point.plot_y,
            plot.y + point.plot_x,
        )
    } else {
        Point::new(plot.x + point.plot_x, plot.y + point.plot_y)
    }
}

/// Chart-space rectangle occupied by a point.
///
/// Columns use their bar shape, pie segments collapse to the segment's outer
/// mid-point, everything else gets a small square around the marker.
pub fn point_rect(scene: &Scene, series: &SeriesNode, point: &PointNode) -> Rectangle {
    if let Some(shape) = point.shape {
        return shape_rect(scene, shape);
    }
    if let (Some(pie), Some(slice)) = (series.pie, point.slice) {
        let anchor = pie_anchor(scene, pie.center, pie.radius, slice.mid_angle());
        return Rectangle::new(anchor, Size::ZERO);
    }
    let center = point_position(scene, point);
    let half = MARKER_RECT_SIZE * 0.5;
    Rectangle::new(
        Point::new(center.x - half, center.y - half),
        Size::new(MARKER_RECT_SIZE, MARKER_RECT_SIZE),
    )
}

fn shape_rect(scene: &Scene, shape: Rectangle) -> Rectangle {
    let plot = scene.plot;
    if scene.inverted {
        Rectangle {
            x: plot.x + plot.width - (shape.y + shape.height),
            y: plot.y + shape.x,
            width: shape.height,
            height: shape.width,
        }
    } else {
        Rectangle {
            x: plot.x + shape.x,
            y: plot.y + shape.y,
            width: shape.width,
            height: shape.height,
        }
    }
}

/// Outer mid-point of a pie segment, in chart space.
pub(crate) fn pie_anchor(scene: &Scene, center: Point, radius: f32, angle: f32) -> Point {
    // Angles run clockwise from 12 o'clock; screen y grows downwards.
    let direction = Vec2::new(angle.sin(), -angle.cos());
    let offset = direction * radius;
    Point::new(
        scene.plot.x + center.x + offset.x,
        scene.plot.y + center.y + offset.y,
    )
}

/// Enclosing rectangle of a set of point rects, stretched over the whole plot along
/// the axis orthogonal to x.
pub fn group_rect(scene: &Scene, rects: impl IntoIterator<Item = Rectangle>) -> Option<Rectangle> {
    let bounds = rects.into_iter().reduce(|a, b| a.union(&b))?;
    let plot = scene.plot;
    let stretched = if scene.inverted {
        Rectangle {
            x: plot.x,
            y: bounds.y,
            width: plot.width,
            height: bounds.height,
        }
    } else {
        Rectangle {
            x: bounds.x,
            y: plot.y,
            width: bounds.width,
            height: plot.height,
        }
    };
    Some(stretched.union(&bounds))
}

/// Position of `point` along the x axis, in chart pixels.
pub(crate) fn along_x(scene: &Scene, point: Point) -> f32 {
    if scene.inverted { point.y } else { point.x }
}

/// Extent of `rect` along the x axis as `(start, end)`.
pub(crate) fn rect_span_along_x(scene: &Scene, rect: &Rectangle) -> (f32, f32) {
    if scene.inverted {
        (rect.y, rect.y + rect.height)
    } else {
        (rect.x, rect.x + rect.width)
    }
}

pub(crate) fn plot_contains(scene: &Scene, point: Point) -> bool {
    let plot = scene.plot;
    point.x >= plot.x
        && point.y >= plot.y
        && point.x <= plot.x + plot.width
        && point.y <= plot.y + plot.height
}
