//! Keyboard focus state machine: chart, group, point.
use iced::keyboard::key::Named;
use iced::keyboard::{Key, Modifiers};

use crate::context::ChartContext;
use crate::scene::{PointRef, Scene};

/// The single keyboard focus target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FocusedState {
    #[default]
    Chart,
    /// The group at this x.
    Group { x: f64 },
    /// A point, with the x of its group. Pie points have no group.
    Point { point: PointRef, group: Option<f64> },
}

/// Result of a key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyOutcome {
    /// Focus moved; the new target must be announced.
    Moved(FocusedState),
    /// Enter/space on the current target.
    Activated(FocusedState),
    Ignored,
}

/// Physical navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
}

impl NavKey {
    pub fn from_key(key: &Key) -> Option<Self> {
        let Key::Named(named) = key else {
            return None;
        };
        Some(match named {
            Named::ArrowLeft => Self::Left,
            Named::ArrowRight => Self::Right,
            Named::ArrowUp => Self::Up,
            Named::ArrowDown => Self::Down,
            Named::Home => Self::Home,
            Named::End => Self::End,
            Named::PageUp => Self::PageUp,
            Named::PageDown => Self::PageDown,
            Named::Enter => Self::Enter,
            Named::Space => Self::Space,
            Named::Escape => Self::Escape,
            _ => return None,
        })
    }
}

/// Orientation-free navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    /// Along the x axis.
    PrevX,
    NextX,
    /// Across the x axis, through the points sharing one x.
    PrevAcross,
    NextAcross,
    First,
    Last,
    PageBack,
    PageForward,
    Activate,
    Escape,
}

/// Map a physical key to an intent for the given text direction and orientation.
pub fn resolve(key: NavKey, rtl: bool, inverted: bool) -> Nav {
    let key = match (key, rtl) {
        (NavKey::Left, true) => NavKey::Right,
        (NavKey::Right, true) => NavKey::Left,
        (key, _) => key,
    };
    match (key, inverted) {
        (NavKey::Left, false) | (NavKey::Up, true) => Nav::PrevX,
        (NavKey::Right, false) | (NavKey::Down, true) => Nav::NextX,
        (NavKey::Up, false) | (NavKey::Left, true) => Nav::PrevAcross,
        (NavKey::Down, false) | (NavKey::Right, true) => Nav::NextAcross,
        (NavKey::Home, _) => Nav::First,
        (NavKey::End, _) => Nav::Last,
        (NavKey::PageUp, _) => Nav::PageBack,
        (NavKey::PageDown, _) => Nav::PageForward,
        (NavKey::Enter | NavKey::Space, _) => Nav::Activate,
        (NavKey::Escape, _) => Nav::Escape,
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardController {
    focused: FocusedState,
}

impl KeyboardController {
    pub fn focused(&self) -> FocusedState {
        self.focused
    }

    pub fn reset(&mut self) {
        self.focused = FocusedState::Chart;
    }

    /// Handle a key press. Keys with command modifiers are left to the host.
    pub fn on_key(
        &mut self,
        ctx: &ChartContext,
        scene: &Scene,
        key: &Key,
        modifiers: Modifiers,
    ) -> KeyOutcome {
        if !ctx.settings.keyboard.enabled
            || modifiers.command()
            || modifiers.control()
            || modifiers.alt()
        {
            return KeyOutcome::Ignored;
        }
        let Some(key) = NavKey::from_key(key) else {
            return KeyOutcome::Ignored;
        };
        let nav = if ctx.is_pie {
            resolve(key, ctx.settings.keyboard.rtl, false)
        } else {
            resolve(key, ctx.settings.keyboard.rtl, ctx.inverted)
        };
        self.navigate(ctx, scene, nav)
    }

    /// Apply a navigation intent.
    pub fn navigate(&mut self, ctx: &ChartContext, scene: &Scene, nav: Nav) -> KeyOutcome {
        if nav == Nav::Activate && self.focused != FocusedState::Chart {
            return KeyOutcome::Activated(self.focused);
        }
        let next = match self.focused {
            FocusedState::Chart if ctx.is_pie => from_pie_chart(ctx, scene, nav),
            FocusedState::Chart => from_chart(ctx, nav),
            FocusedState::Group { x } => from_group(ctx, x, nav),
            FocusedState::Point { point, .. } if ctx.is_pie => {
                from_pie_point(ctx, scene, point, nav)
            }
            FocusedState::Point { point, group } => from_point(ctx, scene, point, group, nav),
        };
        match next {
            Some(next) => {
                log::debug!("keyboard focus {:?} -> {next:?}", self.focused);
                self.focused = next;
                KeyOutcome::Moved(next)
            }
            None => KeyOutcome::Ignored,
        }
    }

    /// Point focus at `point`, resolving its group.
    pub fn focus_point(&mut self, ctx: &ChartContext, scene: &Scene, point: PointRef) {
        self.focused = point_state(ctx, scene, point);
    }

    pub fn focus_group(&mut self, x: f64) {
        self.focused = FocusedState::Group { x };
    }

    /// Fall back to the nearest valid level after a render. Returns true if focus moved.
    pub fn validate(&mut self, ctx: &ChartContext, scene: &Scene) -> bool {
        let group_alive = |x: f64| ctx.derived.group_at(x).is_some();
        let next = match self.focused {
            FocusedState::Chart => FocusedState::Chart,
            FocusedState::Group { x } if group_alive(x) => self.focused,
            FocusedState::Group { .. } => FocusedState::Chart,
            FocusedState::Point { point, .. } if scene.is_valid_point(point) => {
                point_state(ctx, scene, point)
            }
            FocusedState::Point {
                group: Some(x), ..
            } if group_alive(x) => FocusedState::Group { x },
            FocusedState::Point { .. } => FocusedState::Chart,
        };
        let moved = next != self.focused;
        if moved {
            log::debug!("keyboard focus {:?} fell back to {next:?}", self.focused);
        }
        self.focused = next;
        moved
    }
}

fn point_state(ctx: &ChartContext, scene: &Scene, point: PointRef) -> FocusedState {
    let group = if ctx.is_pie {
        None
    } else {
        ctx.derived.group_of(scene, point).map(|g| g.x)
    };
    FocusedState::Point { point, group }
}

/// Segments of the first visible pie, in navigation order.
fn pie_points<'a>(ctx: &'a ChartContext, scene: &Scene) -> &'a [PointRef] {
    scene
        .series_refs()
        .filter(|(_, s)| s.kind.is_pie() && s.visible)
        .map(|(_, s)| ctx.derived.series_points(s.node))
        .find(|points| !points.is_empty())
        .unwrap_or_default()
}

/// Whether entering from the chart lands on the first item rather than the last.
fn enters_first(nav: Nav) -> Option<bool> {
    match nav {
        Nav::NextX | Nav::NextAcross | Nav::First | Nav::Activate | Nav::PageForward => Some(true),
        Nav::PrevX | Nav::PrevAcross | Nav::Last | Nav::PageBack => Some(false),
        Nav::Escape => None,
    }
}

fn from_chart(ctx: &ChartContext, nav: Nav) -> Option<FocusedState> {
    let groups = ctx.derived.groups();
    let group = if enters_first(nav)? {
        groups.first()
    } else {
        groups.last()
    }?;
    Some(FocusedState::Group { x: group.x })
}

fn from_pie_chart(ctx: &ChartContext, scene: &Scene, nav: Nav) -> Option<FocusedState> {
    let points = pie_points(ctx, scene);
    let point = if enters_first(nav)? {
        points.first()
    } else {
        points.last()
    }?;
    Some(FocusedState::Point {
        point: *point,
        group: None,
    })
}

fn from_group(ctx: &ChartContext, x: f64, nav: Nav) -> Option<FocusedState> {
    let groups = ctx.derived.groups();
    let Some(index) = ctx.derived.group_index(x) else {
        return Some(FocusedState::Chart);
    };
    let count = groups.len();
    let step = ctx.page_step(count);
    let target = match nav {
        Nav::PrevX => (index + count - 1) % count,
        Nav::NextX => (index + 1) % count,
        Nav::First => 0,
        Nav::Last => count - 1,
        Nav::PageBack => index.saturating_sub(step),
        Nav::PageForward => (index + step).min(count - 1),
        Nav::PrevAcross | Nav::NextAcross => {
            let points = &groups[index].points;
            let point = if nav == Nav::PrevAcross {
                points.last()
            } else {
                points.first()
            }?;
            return Some(FocusedState::Point {
                point: *point,
                group: Some(x),
            });
        }
        Nav::Escape => return Some(FocusedState::Chart),
        Nav::Activate => return None,
    };
    Some(FocusedState::Group {
        x: groups[target].x,
    })
}

fn from_point(
    ctx: &ChartContext,
    scene: &Scene,
    point: PointRef,
    group: Option<f64>,
    nav: Nav,
) -> Option<FocusedState> {
    let series = ctx.derived.series_points(point.series.node);
    let Some(index) = series.iter().position(|p| *p == point) else {
        return Some(FocusedState::Chart);
    };
    let count = series.len();
    let step = ctx.page_step(count);
    let target = match nav {
        Nav::PrevX => match index.checked_sub(1) {
            Some(target) => target,
            None => return Some(FocusedState::Chart),
        },
        Nav::NextX if index + 1 >= count => return Some(FocusedState::Chart),
        Nav::NextX => index + 1,
        Nav::First => 0,
        Nav::Last => count - 1,
        Nav::PageBack => index.saturating_sub(step),
        Nav::PageForward => (index + step).min(count - 1),
        Nav::PrevAcross | Nav::NextAcross => {
            let members = &ctx.derived.group_of(scene, point)?.points;
            let len = members.len();
            let at = members.iter().position(|p| *p == point)?;
            let next = if nav == Nav::NextAcross {
                (at + 1) % len
            } else {
                (at + len - 1) % len
            };
            return Some(point_state(ctx, scene, members[next]));
        }
        Nav::Escape => {
            return Some(match group {
                Some(x) if ctx.derived.group_at(x).is_some() => FocusedState::Group { x },
                _ => FocusedState::Chart,
            });
        }
        Nav::Activate => return None,
    };
    Some(point_state(ctx, scene, series[target]))
}

fn from_pie_point(
    ctx: &ChartContext,
    scene: &Scene,
    point: PointRef,
    nav: Nav,
) -> Option<FocusedState> {
    let points = pie_points(ctx, scene);
    let Some(index) = points.iter().position(|p| *p == point) else {
        return Some(FocusedState::Chart);
    };
    let count = points.len();
    let step = ctx.page_step(count);
    let target = match nav {
        Nav::PrevX | Nav::PrevAcross => (index + count - 1) % count,
        Nav::NextX | Nav::NextAcross => (index + 1) % count,
        Nav::First => 0,
        Nav::Last => count - 1,
        Nav::PageBack => index.saturating_sub(step),
        Nav::PageForward => (index + step).min(count - 1),
        Nav::Escape => return Some(FocusedState::Chart),
        Nav::Activate => return None,
    };
    Some(FocusedState::Point {
        point: points[target],
        group: None,
    })
}
