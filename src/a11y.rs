//! The focusable application region announced to assistive technology.
use iced::{Color, Rectangle};

use crate::context::ChartContext;
use crate::derived::point_rect;
use crate::engine::{ChartEngine, OverlayId, OverlayShape};
use crate::geometry::MARKER_RECT_SIZE;
use crate::keyboard::FocusedState;
use crate::scene::Scene;
use crate::store::Store;

const FOCUS_OUTLINE_COLOR: Color = Color::from_rgb(0.0, 0.45, 0.73);
const FOCUS_OUTLINE_WIDTH: f32 = 2.0;
const FOCUS_OUTLINE_GAP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Application,
    Button,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplicationState {
    pub role: Role,
    pub label: String,
    pub has_popup: bool,
    /// The target's tooltip is pinned open.
    pub expanded: bool,
    pub focused: bool,
    /// Bumped on every focus move so the host re-focuses the region, which makes
    /// screen readers read the label again even when it did not change.
    pub announcements: u64,
}

#[derive(Debug, Default)]
pub struct A11yCoordinator {
    state: Store<ApplicationState>,
}

impl A11yCoordinator {
    pub fn store(&self) -> &Store<ApplicationState> {
        &self.state
    }

    pub fn state(&self) -> ApplicationState {
        self.state.get()
    }

    /// Publish the label for the new focus target and move the focus outline.
    pub fn announce(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        focused: FocusedState,
        expanded: bool,
    ) {
        let scene = engine.scene();
        let label = label(ctx, scene, focused);
        let outline = if self.state.get().focused {
            outline_rect(ctx, scene, focused)
        } else {
            None
        };
        let is_chart = focused == FocusedState::Chart;
        self.state.update(|state| {
            state.role = if is_chart { Role::Application } else { Role::Button };
            state.label = label;
            state.has_popup = !is_chart;
            state.expanded = expanded && !is_chart;
            state.announcements = state.announcements.wrapping_add(1);
        });
        match outline {
            Some(bounds) => engine.draw_overlay(
                OverlayId::FocusOutline,
                OverlayShape::Rect {
                    bounds,
                    stroke: FOCUS_OUTLINE_COLOR,
                    stroke_width: FOCUS_OUTLINE_WIDTH,
                },
            ),
            None => engine.remove_overlay(OverlayId::FocusOutline),
        }
    }

    /// Track whether the region holds keyboard focus. Losing it removes the outline.
    pub fn set_focused(&mut self, engine: &mut dyn ChartEngine, focused: bool) {
        self.state.update(|state| state.focused = focused);
        if !focused {
            engine.remove_overlay(OverlayId::FocusOutline);
        }
    }

    pub fn reset(&mut self) {
        self.state.set(ApplicationState::default());
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.state
            .update(|state| state.expanded = expanded && state.role == Role::Button);
    }
}

fn label(ctx: &ChartContext, scene: &Scene, focused: FocusedState) -> String {
    let labels = &ctx.settings.labels;
    match focused {
        FocusedState::Chart => labels.chart.clone(),
        FocusedState::Group { x } => {
            let count = ctx.derived.group_at(x).map_or(0, |g| g.points.len());
            format!("{}, {count} items", (labels.x_formatter)(x))
        }
        FocusedState::Point { point, .. } => {
            let (Some(series), Some(node)) =
                (scene.series_node(point.series), scene.point_node(point))
            else {
                return labels.chart.clone();
            };
            let value = node.y.map(|y| (labels.y_formatter)(y)).unwrap_or_default();
            if series.kind.is_pie() {
                let name = node
                    .name
                    .clone()
                    .unwrap_or_else(|| (labels.x_formatter)(node.x));
                format!("{name}: {value}")
            } else {
                format!(
                    "{}, {}: {value}",
                    (labels.x_formatter)(node.x),
                    series.display_name()
                )
            }
        }
    }
}

fn outline_rect(ctx: &ChartContext, scene: &Scene, focused: FocusedState) -> Option<Rectangle> {
    let rect = match focused {
        FocusedState::Chart => scene.plot,
        FocusedState::Group { x } => ctx.derived.group_at(x)?.rect,
        FocusedState::Point { point, .. } => {
            let rect = point_rect(scene, point)?;
            if rect.width == 0.0 && rect.height == 0.0 {
                inflate(rect, MARKER_RECT_SIZE * 0.5)
            } else {
                rect
            }
        }
    };
    Some(inflate(rect, FOCUS_OUTLINE_GAP))
}

fn inflate(rect: Rectangle, by: f32) -> Rectangle {
    Rectangle {
        x: rect.x - by,
        y: rect.y - by,
        width: rect.width + by * 2.0,
        height: rect.height + by * 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessEngine;
    use crate::options::{ChartOptions, SeriesOptions};
    use crate::settings::{ChartHandlers, ChartSettings};

    fn setup() -> (HeadlessEngine, ChartContext) {
        let engine = HeadlessEngine::new(&ChartOptions {
            series: vec![
                SeriesOptions::line([[1.0, 11.0], [2.0, 12.0]]).with_name("a"),
                SeriesOptions::line([[1.0, 21.0]]).with_name("b"),
            ],
            ..ChartOptions::default()
        });
        let mut ctx = ChartContext::new(ChartSettings::default(), ChartHandlers::default());
        ctx.refresh(engine.scene());
        (engine, ctx)
    }

    #[test]
    fn repeated_announcements_are_counted() {
        let (mut engine, ctx) = setup();
        let mut a11y = A11yCoordinator::default();
        let focus = FocusedState::Group { x: 1.0 };
        a11y.announce(&ctx, &mut engine, focus, false);
        a11y.announce(&ctx, &mut engine, focus, false);
        let state = a11y.state();
        assert_eq!(state.announcements, 2);
        assert_eq!(state.label, "1, 2 items");
        assert_eq!(state.role, Role::Button);
    }

    #[test]
    fn point_label_names_series_and_value() {
        let (mut engine, ctx) = setup();
        let mut a11y = A11yCoordinator::default();
        let point = engine.point(1, 0).unwrap();
        a11y.announce(
            &ctx,
            &mut engine,
            FocusedState::Point {
                point,
                group: Some(1.0),
            },
            true,
        );
        assert_eq!(a11y.state().label, "1, b: 21");
        assert!(a11y.state().expanded);
    }

    #[test]
    fn outline_follows_focus_only_while_focused() {
        let (mut engine, ctx) = setup();
        let mut a11y = A11yCoordinator::default();
        a11y.announce(&ctx, &mut engine, FocusedState::Group { x: 2.0 }, false);
        assert!(engine.overlay(OverlayId::FocusOutline).is_none());

        a11y.set_focused(&mut engine, true);
        a11y.announce(&ctx, &mut engine, FocusedState::Group { x: 2.0 }, false);
        let group = ctx.derived.group_at(2.0).unwrap().rect;
        let Some(OverlayShape::Rect { bounds, .. }) = engine.overlay(OverlayId::FocusOutline)
        else {
            panic!("focus outline missing");
        };
        assert!(bounds.contains(group.center()));
        assert!(bounds.width > group.width);

        a11y.set_focused(&mut engine, false);
        assert!(engine.overlay(OverlayId::FocusOutline).is_none());
    }
}
