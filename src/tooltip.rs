//! Tooltip visibility, pinning and placement anchors.
use iced::time::Instant;
use iced::{Color, Point, Rectangle, Size};

use crate::context::ChartContext;
use crate::derived::point_rect;
use crate::deferred::Debounce;
use crate::engine::{ChartEngine, OverlayId, OverlayShape};
use crate::geometry::point_position;
use crate::scene::{PointRef, Scene};
use crate::settings::TooltipPlacement;
use crate::store::Store;

const CURSOR_MARKER_RADIUS: f32 = 4.0;
const CURSOR_LINE_COLOR: Color = Color::from_rgba(0.4, 0.4, 0.4, 0.8);

/// Invisible rectangles the floating tooltip positions itself against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TooltipAnchors {
    /// The exact target: the point, or the first point of the group.
    pub target: Option<Rectangle>,
    /// The whole group rect. Unset for pie charts.
    pub group: Option<Rectangle>,
}

impl TooltipAnchors {
    /// The anchor to use for a placement mode.
    pub fn for_placement(&self, placement: TooltipPlacement) -> Option<Rectangle> {
        match placement {
            TooltipPlacement::Target => self.target,
            TooltipPlacement::Middle | TooltipPlacement::Outside => self.group.or(self.target),
        }
    }
}

/// One row of the tooltip body.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipItem {
    pub point: PointRef,
    pub name: String,
    pub color: Color,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipContent {
    pub header: String,
    pub items: Vec<TooltipItem>,
}

impl TooltipContent {
    /// Header followed by every item's name and value, without separators.
    pub fn text(&self) -> String {
        let mut text = self.header.clone();
        for item in &self.items {
            text.push_str(&item.name);
            text.push_str(&item.value);
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipState {
    pub visible: bool,
    pub pinned: bool,
    /// The point the tooltip was opened for; always a member of `group`.
    pub point: Option<PointRef>,
    pub group: Vec<PointRef>,
    /// X of the group, unset for pie charts.
    pub x: Option<f64>,
    pub anchors: TooltipAnchors,
    pub placement: TooltipPlacement,
    pub content: TooltipContent,
}

#[derive(Debug, Default)]
pub struct TooltipCoordinator {
    state: Store<TooltipState>,
    lockout: Debounce,
    markers: usize,
}

impl TooltipCoordinator {
    pub fn store(&self) -> &Store<TooltipState> {
        &self.state
    }

    pub fn state(&self) -> TooltipState {
        self.state.get()
    }

    /// True while a dismissed pinned tooltip refuses to reappear.
    pub fn is_locked(&self, now: Instant) -> bool {
        self.lockout.is_active(now)
    }

    /// Show for one point. Cartesian points list their whole group.
    ///
    /// Ignored while pinned or locked out unless `force` is set.
    pub fn show_on_point(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        point: PointRef,
        force: bool,
        now: Instant,
    ) -> bool {
        if !self.may_show(ctx, force, now) || !engine.scene().is_valid_point(point) {
            return false;
        }
        let next = if ctx.is_pie {
            pie_state(ctx, engine, point)
        } else {
            let scene = engine.scene();
            let Some(group) = ctx.derived.group_of(scene, point) else {
                return false;
            };
            let x = group.x;
            cartesian_state(ctx, scene, x, Some(point))
        };
        self.show(ctx, engine, next)
    }

    /// Show for the group at `x`.
    pub fn show_on_group(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        x: f64,
        force: bool,
        now: Instant,
    ) -> bool {
        if ctx.is_pie || !self.may_show(ctx, force, now) || ctx.derived.group_at(x).is_none() {
            return false;
        }
        let next = cartesian_state(ctx, engine.scene(), x, None);
        self.show(ctx, engine, next)
    }

    /// Hide the tooltip. Hiding a pinned tooltip starts the lockout window.
    pub fn hide(&mut self, ctx: &ChartContext, engine: &mut dyn ChartEngine, now: Instant) {
        let was_pinned = self.state.get().pinned;
        if was_pinned {
            log::debug!("tooltip dismissed, locked for {:?}", ctx.settings.tooltip.lockout);
            self.lockout.schedule(now, ctx.settings.tooltip.lockout);
        }
        self.state.set(TooltipState {
            placement: ctx.settings.tooltip.placement,
            ..TooltipState::default()
        });
        self.clear_cursor(engine);
    }

    /// Promote the visible tooltip to pinned.
    pub fn pin(&mut self) -> bool {
        let state = self.state.get();
        if !state.visible || state.pinned {
            return false;
        }
        log::debug!("tooltip pinned");
        self.state.update(|s| s.pinned = true)
    }

    pub fn unpin(&mut self) -> bool {
        self.state.update(|s| s.pinned = false)
    }

    /// Re-resolve the tooltip against a fresh render; hides it if its target is gone.
    pub fn validate(&mut self, ctx: &ChartContext, engine: &mut dyn ChartEngine) {
        let state = self.state.get();
        if !state.visible {
            return;
        }
        let scene = engine.scene();
        let next = match (state.point, state.x) {
            (Some(point), _) if ctx.is_pie && scene.is_valid_point(point) => {
                Some(pie_state(ctx, engine, point))
            }
            (Some(point), Some(x))
                if scene.is_valid_point(point) && ctx.derived.group_at(x).is_some() =>
            {
                Some(cartesian_state(ctx, scene, x, Some(point)))
            }
            (None, Some(x)) if ctx.derived.group_at(x).is_some() => {
                Some(cartesian_state(ctx, scene, x, None))
            }
            _ => None,
        };
        match next {
            Some(next) => {
                let next = TooltipState {
                    pinned: state.pinned,
                    ..next
                };
                self.show(ctx, engine, next);
            }
            None => {
                log::debug!("tooltip target vanished");
                self.state.set(TooltipState::default());
                self.clear_cursor(engine);
            }
        }
    }

    /// Expire the lockout window.
    pub fn tick(&mut self, now: Instant) {
        self.lockout.fire_if_due(now);
    }

    /// Forget the tooltip and any lockout, removing its overlays.
    pub fn reset(&mut self, engine: &mut dyn ChartEngine) {
        self.lockout.cancel();
        self.state.set(TooltipState::default());
        self.clear_cursor(engine);
    }

    /// Remove every overlay this coordinator drew.
    pub fn clear_cursor(&mut self, engine: &mut dyn ChartEngine) {
        engine.remove_overlay(OverlayId::CursorLine);
        for index in 0..self.markers {
            engine.remove_overlay(OverlayId::CursorMarker(index));
        }
        self.markers = 0;
    }

    fn may_show(&self, ctx: &ChartContext, force: bool, now: Instant) -> bool {
        if !ctx.settings.tooltip.enabled {
            return false;
        }
        force || !(self.state.get().pinned || self.lockout.is_active(now))
    }

    fn show(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        next: TooltipState,
    ) -> bool {
        if next.group.is_empty() {
            return false;
        }
        self.lockout.cancel();
        self.draw_cursor(ctx, engine, &next);
        self.state.set(next);
        true
    }

    /// Cursor line across the plot plus markers on the group's points.
    fn draw_cursor(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        state: &TooltipState,
    ) {
        self.clear_cursor(engine);
        if ctx.has_columns || ctx.is_pie {
            return;
        }
        let Some(rect) = state.anchors.group else {
            return;
        };
        let scene = engine.scene();
        let plot = scene.plot;
        let center = rect.center();
        let (from, to) = if scene.inverted {
            (
                Point::new(plot.x, center.y),
                Point::new(plot.x + plot.width, center.y),
            )
        } else {
            (
                Point::new(center.x, plot.y),
                Point::new(center.x, plot.y + plot.height),
            )
        };
        let markers: Vec<OverlayShape> = state
            .group
            .iter()
            .filter_map(|point| {
                let series = scene.series_node(point.series)?;
                let node = scene.point_node(*point)?;
                series.kind.has_cursor_marker().then(|| OverlayShape::Circle {
                    center: point_position(scene, node),
                    radius: CURSOR_MARKER_RADIUS,
                    fill: series.color,
                })
            })
            .collect();

        engine.draw_overlay(
            OverlayId::CursorLine,
            OverlayShape::Line {
                from,
                to,
                stroke: CURSOR_LINE_COLOR,
            },
        );
        self.markers = markers.len();
        for (index, marker) in markers.into_iter().enumerate() {
            engine.draw_overlay(OverlayId::CursorMarker(index), marker);
        }
    }
}

fn cartesian_state(
    ctx: &ChartContext,
    scene: &Scene,
    x: f64,
    point: Option<PointRef>,
) -> TooltipState {
    let Some(group) = ctx.derived.group_at(x) else {
        return TooltipState::default();
    };
    let target = point.or_else(|| group.points.first().copied());
    TooltipState {
        visible: true,
        pinned: false,
        point,
        group: group.points.clone(),
        x: Some(x),
        anchors: TooltipAnchors {
            target: target.and_then(|p| point_rect(scene, p)),
            group: Some(group.rect),
        },
        placement: ctx.settings.tooltip.placement,
        content: group_content(ctx, scene, x, &group.points),
    }
}

fn pie_state(ctx: &ChartContext, engine: &dyn ChartEngine, point: PointRef) -> TooltipState {
    let scene = engine.scene();
    let target = engine
        .tooltip_hint(point)
        .map(|hint| Rectangle::new(hint, Size::ZERO))
        .or_else(|| point_rect(scene, point));
    let labels = &ctx.settings.labels;
    let content = match (scene.series_node(point.series), scene.point_node(point)) {
        (Some(series), Some(node)) => TooltipContent {
            header: series.display_name(),
            items: vec![TooltipItem {
                point,
                name: node
                    .name
                    .clone()
                    .unwrap_or_else(|| (labels.x_formatter)(node.x)),
                color: series.color,
                value: node.y.map(|y| (labels.y_formatter)(y)).unwrap_or_default(),
            }],
        },
        _ => TooltipContent::default(),
    };
    TooltipState {
        visible: true,
        pinned: false,
        point: Some(point),
        group: vec![point],
        x: None,
        anchors: TooltipAnchors {
            target,
            group: None,
        },
        placement: ctx.settings.tooltip.placement,
        content,
    }
}

/// Header is the formatted x; one item per point, followed by error ranges attached
/// to its series at the same x.
fn group_content(ctx: &ChartContext, scene: &Scene, x: f64, points: &[PointRef]) -> TooltipContent {
    let labels = &ctx.settings.labels;
    let mut items = Vec::new();
    for point in points {
        let (Some(series), Some(node)) = (scene.series_node(point.series), scene.point_node(*point))
        else {
            continue;
        };
        items.push(TooltipItem {
            point: *point,
            name: series.display_name(),
            color: series.color,
            value: node.y.map(|y| (labels.y_formatter)(y)).unwrap_or_default(),
        });
        for linked in scene.linked_series(point.series) {
            let Some(linked_node) = scene.series_node(linked) else {
                continue;
            };
            if !linked_node.visible {
                continue;
            }
            for (range_ref, range_point) in scene.point_refs(linked) {
                let Some((low, high)) = range_point.range else {
                    continue;
                };
                if range_point.visible && range_point.x.total_cmp(&x).is_eq() {
                    items.push(TooltipItem {
                        point: range_ref,
                        name: linked_node.display_name(),
                        color: linked_node.color,
                        value: format!(
                            "{} - {}",
                            (labels.y_formatter)(low),
                            (labels.y_formatter)(high)
                        ),
                    });
                }
            }
        }
    }
    TooltipContent {
        header: (labels.x_formatter)(x),
        items,
    }
}
