//! Pointer hover/click disambiguation.
//!
//! Engine point events and raw cursor moves are folded into one hover target: a
//! point, a group (by x), or nothing. A point always wins over a group.
use iced::Point;
use iced::mouse::Interaction;
use iced::time::Instant;

use crate::context::ChartContext;
use crate::deferred::Debounce;
use crate::geometry::plot_contains;
use crate::scene::{PointRef, Scene};

/// What the orchestrator should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    PointHover(PointRef),
    /// Hover over the group at this x.
    GroupHover(f64),
    HoverLost,
    PointClick(PointRef),
    GroupClick(f64),
}

/// The current hover target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HoverTarget {
    #[default]
    None,
    Point(PointRef),
    Group(f64),
}

#[derive(Debug, Clone, Default)]
pub struct PointerController {
    hovered_point: Option<PointRef>,
    hovered_group: Option<f64>,
    tooltip_hovered: bool,
    hover_lost: Debounce,
}

impl PointerController {
    pub fn target(&self) -> HoverTarget {
        match (self.hovered_point, self.hovered_group) {
            (Some(point), _) => HoverTarget::Point(point),
            (None, Some(x)) => HoverTarget::Group(x),
            (None, None) => HoverTarget::None,
        }
    }

    pub fn is_tooltip_hovered(&self) -> bool {
        self.tooltip_hovered
    }

    /// Cursor affordance for the chart surface.
    pub fn interaction(&self) -> Interaction {
        if self.target() == HoverTarget::None {
            Interaction::None
        } else {
            Interaction::Pointer
        }
    }

    /// The engine reported the cursor entering a point.
    pub fn on_point_hover(&mut self, point: PointRef) -> Option<PointerAction> {
        self.hover_lost.cancel();
        self.hovered_group = None;
        if self.hovered_point == Some(point) {
            return None;
        }
        self.hovered_point = Some(point);
        Some(PointerAction::PointHover(point))
    }

    /// The engine reported the cursor leaving a point.
    pub fn on_point_leave(&mut self, ctx: &ChartContext, point: PointRef, now: Instant) {
        if self.hovered_point == Some(point) {
            self.hovered_point = None;
            self.schedule_hover_lost(ctx, now);
        }
    }

    /// A raw cursor move over the chart, in chart coordinates.
    pub fn on_pointer_move(
        &mut self,
        ctx: &ChartContext,
        scene: &Scene,
        cursor: Point,
        now: Instant,
    ) -> Option<PointerAction> {
        if !plot_contains(scene, cursor) {
            let had_point = self.hovered_point.take().is_some();
            let had_group = self.hovered_group.take().is_some();
            if had_point || had_group {
                self.schedule_hover_lost(ctx, now);
            }
            return None;
        }
        if self.hovered_point.is_some() || ctx.is_pie {
            return None;
        }
        let index = ctx.derived.nearest_group(scene, cursor)?;
        let x = ctx.derived.groups()[index].x;
        self.hover_lost.cancel();
        if self.hovered_group.is_some_and(|current| current.total_cmp(&x).is_eq()) {
            return None;
        }
        self.hovered_group = Some(x);
        Some(PointerAction::GroupHover(x))
    }

    /// The cursor left the chart container.
    pub fn on_pointer_leave(&mut self, ctx: &ChartContext, now: Instant) {
        self.hovered_point = None;
        self.hovered_group = None;
        self.schedule_hover_lost(ctx, now);
    }

    /// The cursor entered or left the tooltip surface.
    pub fn on_tooltip_hover(&mut self, ctx: &ChartContext, hovered: bool, now: Instant) {
        self.tooltip_hovered = hovered;
        if hovered {
            self.hover_lost.cancel();
        } else if self.target() == HoverTarget::None {
            self.schedule_hover_lost(ctx, now);
        }
    }

    /// A click on the chart, with the point under the cursor if there is one.
    pub fn on_click(&mut self, point: Option<PointRef>) -> Option<PointerAction> {
        match (point, self.hovered_group) {
            (Some(point), _) => Some(PointerAction::PointClick(point)),
            (None, Some(x)) => Some(PointerAction::GroupClick(x)),
            (None, None) => None,
        }
    }

    /// Fire the hover-loss slot if it is due.
    pub fn tick(&mut self, now: Instant) -> Option<PointerAction> {
        if !self.hover_lost.fire_if_due(now) {
            return None;
        }
        if self.tooltip_hovered || self.target() != HoverTarget::None {
            return None;
        }
        log::debug!("pointer hover lost");
        Some(PointerAction::HoverLost)
    }

    /// Drop hover targets that no longer resolve after a render.
    pub fn validate(&mut self, ctx: &ChartContext, scene: &Scene) {
        if self
            .hovered_point
            .is_some_and(|point| !scene.is_valid_point(point))
        {
            self.hovered_point = None;
        }
        if self
            .hovered_group
            .is_some_and(|x| ctx.derived.group_at(x).is_none())
        {
            self.hovered_group = None;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn schedule_hover_lost(&mut self, ctx: &ChartContext, now: Instant) {
        if !self.tooltip_hovered {
            self.hover_lost
                .schedule(now, ctx.settings.pointer.hover_lost_delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::deferred::{Clock, ManualClock};
    use crate::engine::ChartEngine;
    use crate::headless::HeadlessEngine;
    use crate::options::{ChartOptions, SeriesOptions};
    use crate::settings::{ChartHandlers, ChartSettings};

    fn setup() -> (HeadlessEngine, ChartContext, ManualClock) {
        let engine = HeadlessEngine::new(&ChartOptions {
            series: vec![
                SeriesOptions::line([[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]),
                SeriesOptions::line([[1.0, 2.0], [2.0, 3.0], [3.0, 4.0]]),
            ],
            ..ChartOptions::default()
        });
        let mut ctx = ChartContext::new(ChartSettings::default(), ChartHandlers::default());
        ctx.refresh(engine.scene());
        (engine, ctx, ManualClock::default())
    }

    fn group_center(ctx: &ChartContext, index: usize) -> Point {
        ctx.derived.groups()[index].rect.center()
    }

    #[test]
    fn point_hover_wins_over_group() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        let point = engine.point(0, 0).unwrap();

        assert_eq!(
            pointer.on_pointer_move(&ctx, engine.scene(), group_center(&ctx, 1), clock.now()),
            Some(PointerAction::GroupHover(2.0))
        );
        assert_eq!(
            pointer.on_point_hover(point),
            Some(PointerAction::PointHover(point))
        );
        assert_eq!(pointer.target(), HoverTarget::Point(point));
        assert_eq!(
            pointer.on_pointer_move(&ctx, engine.scene(), group_center(&ctx, 2), clock.now()),
            None
        );
        assert_eq!(pointer.interaction(), Interaction::Pointer);
    }

    #[test]
    fn cursor_between_groups_picks_closest_edge() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        let first = ctx.derived.groups()[0].rect;
        let second = ctx.derived.groups()[1].rect;
        let near_second = Point::new(second.x - 1.0, first.center_y());
        assert!(near_second.x > first.x + first.width);
        assert_eq!(
            pointer.on_pointer_move(&ctx, engine.scene(), near_second, clock.now()),
            Some(PointerAction::GroupHover(2.0))
        );
    }

    #[test]
    fn hover_loss_is_debounced_and_cancellable() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        let point = engine.point(0, 0).unwrap();
        pointer.on_point_hover(point);
        pointer.on_point_leave(&ctx, point, clock.now());
        clock.advance(Duration::from_millis(10));
        assert_eq!(pointer.tick(clock.now()), None);
        pointer.on_point_hover(point);
        clock.advance(Duration::from_millis(50));
        assert_eq!(pointer.tick(clock.now()), None);

        pointer.on_pointer_leave(&ctx, clock.now());
        clock.advance(Duration::from_millis(25));
        assert_eq!(pointer.tick(clock.now()), Some(PointerAction::HoverLost));
        assert_eq!(pointer.interaction(), Interaction::None);
    }

    #[test]
    fn tooltip_hover_suppresses_hover_loss() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        let point = engine.point(1, 1).unwrap();
        pointer.on_point_hover(point);
        pointer.on_point_leave(&ctx, point, clock.now());
        pointer.on_tooltip_hover(&ctx, true, clock.now());
        clock.advance(Duration::from_millis(100));
        assert_eq!(pointer.tick(clock.now()), None);

        pointer.on_tooltip_hover(&ctx, false, clock.now());
        clock.advance(Duration::from_millis(30));
        assert_eq!(pointer.tick(clock.now()), Some(PointerAction::HoverLost));
    }

    #[test]
    fn click_falls_back_to_hovered_group() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        assert_eq!(pointer.on_click(None), None);
        pointer.on_pointer_move(&ctx, engine.scene(), group_center(&ctx, 0), clock.now());
        assert_eq!(pointer.on_click(None), Some(PointerAction::GroupClick(1.0)));
        let point = engine.point(0, 2).unwrap();
        assert_eq!(
            pointer.on_click(Some(point)),
            Some(PointerAction::PointClick(point))
        );
    }

    #[test]
    fn leaving_the_plot_clears_the_point() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        let point = engine.point(0, 1).unwrap();
        pointer.on_point_hover(point);
        pointer.on_pointer_move(&ctx, engine.scene(), Point::new(0.0, 0.0), clock.now());
        assert_eq!(pointer.target(), HoverTarget::None);
        clock.advance(Duration::from_millis(25));
        assert_eq!(pointer.tick(clock.now()), Some(PointerAction::HoverLost));
    }

    #[test]
    fn leaving_the_plot_clears_the_group() {
        let (engine, ctx, clock) = setup();
        let mut pointer = PointerController::default();
        pointer.on_pointer_move(&ctx, engine.scene(), group_center(&ctx, 0), clock.now());
        pointer.on_pointer_move(&ctx, engine.scene(), Point::new(0.0, 0.0), clock.now());
        assert_eq!(pointer.target(), HoverTarget::None);
        clock.advance(Duration::from_millis(25));
        assert_eq!(pointer.tick(clock.now()), Some(PointerAction::HoverLost));
    }
}
