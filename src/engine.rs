//! The contract with the rendering engine.
use iced::{Color, Point, Rectangle};

use crate::scene::{PointRef, Scene, SeriesRef, VisualState};

/// Proof that a visual-state write comes from the highlight controller.
///
/// Only this crate can construct one, so an engine integration that routes its own
/// internal state writes anywhere else cannot fight the controller.
#[derive(Debug)]
pub struct StateAuthority(());

impl StateAuthority {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

/// Pooled overlay graphics drawn on top of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayId {
    /// Keyboard focus outline.
    FocusOutline,
    /// Line across the plot at the hovered group.
    CursorLine,
    /// Marker on the n-th cursor point.
    CursorMarker(usize),
}

/// Drawing primitive for an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayShape {
    Rect {
        bounds: Rectangle,
        stroke: Color,
        stroke_width: f32,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Color,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Color,
    },
}

/// The rendering engine as seen by the coordination layer.
///
/// Implementations own the [`Scene`]. Visibility setters must not redraw; the caller
/// issues a single [`ChartEngine::redraw`] after a batch. `redraw` is synchronous and must
/// not call back into the chart api; the api runs its render hook right after it.
pub trait ChartEngine {
    /// Current scene graph.
    fn scene(&self) -> &Scene;

    fn set_series_state(
        &mut self,
        authority: &StateAuthority,
        series: SeriesRef,
        state: VisualState,
    );

    fn set_point_state(&mut self, authority: &StateAuthority, point: PointRef, state: VisualState);

    fn set_plot_line_opacity(&mut self, authority: &StateAuthority, id: &str, opacity: f32);

    fn set_series_visible(&mut self, series: SeriesRef, visible: bool);

    fn set_point_visible(&mut self, point: PointRef, visible: bool);

    fn redraw(&mut self);

    /// Native tooltip position for a pie segment, when the engine computes one.
    fn tooltip_hint(&self, point: PointRef) -> Option<Point> {
        self.scene().point_node(point).and_then(|p| p.tooltip_hint)
    }

    fn draw_overlay(&mut self, id: OverlayId, shape: OverlayShape);

    fn remove_overlay(&mut self, id: OverlayId);
}
