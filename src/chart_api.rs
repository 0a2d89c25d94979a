//! The per-chart orchestrator tying the controllers to the engine and the view.
use std::sync::Arc;

use iced::keyboard::Modifiers;
use iced::mouse::Interaction;
use iced::time::Instant;

use crate::a11y::{A11yCoordinator, ApplicationState};
use crate::axis_titles::{AxisTitles, AxisTitlesCoordinator};
use crate::context::ChartContext;
use crate::deferred::{Clock, SystemClock};
use crate::engine::{ChartEngine, OverlayId};
use crate::error::ChartError;
use crate::highlight::HighlightController;
use crate::keyboard::{FocusedState, KeyOutcome, KeyboardController};
use crate::legend::{LegendCoordinator, LegendItem};
use crate::message::ChartEvent;
use crate::no_data::{NoDataCoordinator, NoDataState};
use crate::pointer::{HoverTarget, PointerAction, PointerController};
use crate::scene::PointRef;
use crate::settings::{ChartHandlers, ChartSettings};
use crate::store::Store;
use crate::tooltip::{TooltipCoordinator, TooltipState};

/// Interaction and state coordination for one chart.
///
/// The host forwards the engine's load and render hooks to [`ChartApi::on_load`] and
/// [`ChartApi::on_render`], user input through [`ChartApi::update`], and calls
/// [`ChartApi::tick`] regularly so deferred work can fire. The view layer reads the
/// stores.
///
/// # Example
///
/// ```ignore
/// let options = ChartOptions::builder()
///     .add_series(SeriesOptions::line([[1.0, 11.0], [2.0, 12.0]]).with_name("Line series 1"))
///     .build()?;
/// let mut api = ChartApi::new(HeadlessEngine::new(&options), ChartSettings::default());
/// api.on_load();
/// api.update(ChartEvent::PointerMoved(Point::new(60.0, 100.0)));
/// println!("{}", api.tooltip().content.text());
/// ```
pub struct ChartApi<E: ChartEngine> {
    engine: E,
    clock: Arc<dyn Clock>,
    ctx: ChartContext,
    highlight: HighlightController,
    pointer: PointerController,
    keyboard: KeyboardController,
    tooltip: TooltipCoordinator,
    legend: LegendCoordinator,
    no_data: NoDataCoordinator,
    axis_titles: AxisTitlesCoordinator,
    a11y: A11yCoordinator,
    modifiers: Modifiers,
}

impl<E: ChartEngine> std::fmt::Debug for ChartApi<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartApi")
            .field("ctx", &self.ctx)
            .field("highlight", &self.highlight)
            .field("pointer", &self.pointer)
            .field("keyboard", &self.keyboard)
            .finish_non_exhaustive()
    }
}

impl<E: ChartEngine> ChartApi<E> {
    pub fn new(engine: E, settings: ChartSettings) -> Self {
        Self::with_clock(engine, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(engine: E, settings: ChartSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            clock,
            ctx: ChartContext::new(settings, ChartHandlers::default()),
            highlight: HighlightController::default(),
            pointer: PointerController::default(),
            keyboard: KeyboardController::default(),
            tooltip: TooltipCoordinator::default(),
            legend: LegendCoordinator::default(),
            no_data: NoDataCoordinator::default(),
            axis_titles: AxisTitlesCoordinator::default(),
            a11y: A11yCoordinator::default(),
            modifiers: Modifiers::default(),
        }
    }

    /// Install consumer callbacks.
    pub fn with_handlers(mut self, handlers: ChartHandlers) -> Self {
        self.ctx.handlers = handlers;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access. Call [`ChartApi::on_render`] after changing the scene.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.ctx.settings
    }

    /// Replace the settings and refresh the views that depend on them.
    pub fn set_settings(&mut self, settings: ChartSettings) {
        self.ctx.settings = settings;
        if self.ctx.is_rendered() {
            self.on_render();
        }
    }

    pub fn context(&self) -> &ChartContext {
        &self.ctx
    }

    /// The engine finished its first render.
    pub fn on_load(&mut self) {
        log::debug!("chart loaded");
        self.on_render();
        let focused = self.keyboard.focused();
        self.a11y.announce(&self.ctx, &mut self.engine, focused, false);
    }

    /// The engine finished a render pass.
    pub fn on_render(&mut self) {
        self.ctx.refresh(self.engine.scene());
        self.highlight.restore(&mut self.engine);

        if self.keyboard.validate(&self.ctx, self.engine.scene()) {
            let expanded = self.tooltip.state().pinned;
            self.a11y
                .announce(&self.ctx, &mut self.engine, self.keyboard.focused(), expanded);
        }
        self.pointer.validate(&self.ctx, self.engine.scene());

        let had_tooltip = self.tooltip.state().visible;
        self.tooltip.validate(&self.ctx, &mut self.engine);
        if had_tooltip && !self.tooltip.state().visible {
            self.clear_highlight_and_notify();
        }

        self.legend
            .refresh(&self.ctx, self.engine.scene(), self.highlight.highlighted());
        self.no_data.refresh(&self.ctx, self.engine.scene());
        self.axis_titles.refresh(self.engine.scene());
    }

    /// Redraw the engine and run the render hook.
    pub fn redraw(&mut self) {
        self.engine.redraw();
        self.on_render();
    }

    /// Handle one user or engine event. Events before the first render are dropped.
    pub fn update(&mut self, event: ChartEvent) {
        if !self.ctx.is_rendered() {
            log::trace!("dropping {event:?} before the first render");
            return;
        }
        let now = self.clock.now();
        let pointer_enabled = self.ctx.settings.pointer.enabled;
        match event {
            ChartEvent::PointHover(point) if pointer_enabled => {
                let action = self.pointer.on_point_hover(point);
                self.pointer_action(action, now);
            }
            ChartEvent::PointLeave(point) if pointer_enabled => {
                self.pointer.on_point_leave(&self.ctx, point, now);
            }
            ChartEvent::ChartClick(point) if pointer_enabled => {
                let action = self.pointer.on_click(point);
                self.pointer_action(action, now);
            }
            ChartEvent::PointerMoved(cursor) if pointer_enabled => {
                let action =
                    self.pointer
                        .on_pointer_move(&self.ctx, self.engine.scene(), cursor, now);
                self.pointer_action(action, now);
            }
            ChartEvent::PointerLeft if pointer_enabled => {
                self.pointer.on_pointer_leave(&self.ctx, now);
            }
            ChartEvent::TooltipHover(hovered) => {
                self.pointer.on_tooltip_hover(&self.ctx, hovered, now);
            }
            ChartEvent::DismissTooltip => self.dismiss(now),
            ChartEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers,
            ChartEvent::KeyPressed { key, modifiers } => {
                let outcome = self
                    .keyboard
                    .on_key(&self.ctx, self.engine.scene(), &key, modifiers);
                self.key_outcome(outcome, now);
            }
            ChartEvent::FocusGained => {
                self.a11y.set_focused(&mut self.engine, true);
                match self.keyboard.focused() {
                    FocusedState::Chart => {
                        let expanded = self.tooltip.state().pinned;
                        self.a11y
                            .announce(&self.ctx, &mut self.engine, FocusedState::Chart, expanded);
                    }
                    focused => self.show_focused(focused, now),
                }
            }
            ChartEvent::FocusLost => {
                self.a11y.set_focused(&mut self.engine, false);
                if !self.tooltip.state().pinned {
                    self.tooltip.hide(&self.ctx, &mut self.engine, now);
                    self.clear_highlight_and_notify();
                }
            }
            ChartEvent::LegendSelect { id, multi } => {
                let multi = multi || self.modifiers.shift() || self.modifiers.command();
                if self.legend.select(&self.ctx, &mut self.engine, &id, multi) {
                    self.on_render();
                }
            }
            ChartEvent::LegendHover(id) => {
                self.legend.on_item_hover(&self.ctx, &id, now);
                if !self.tooltip.state().pinned {
                    self.highlight.highlight_items(&mut self.engine, &[id]);
                    self.notify_highlight();
                    self.refresh_legend();
                }
            }
            ChartEvent::LegendLeave => {
                self.legend.on_item_leave(&self.ctx, now);
                if !self.tooltip.state().pinned {
                    self.clear_highlight_and_notify();
                    self.refresh_legend();
                }
            }
            ChartEvent::PointHover(_)
            | ChartEvent::PointLeave(_)
            | ChartEvent::ChartClick(_)
            | ChartEvent::PointerMoved(_)
            | ChartEvent::PointerLeft => {}
        }
    }

    /// Fire deferred work whose time has come.
    pub fn tick(&mut self) {
        if !self.ctx.is_rendered() {
            return;
        }
        let now = self.clock.now();
        let action = self.pointer.tick(now);
        self.pointer_action(action, now);
        self.tooltip.tick(now);
        self.legend.tick(now);
    }

    /// Cursor to show over the chart surface.
    pub fn mouse_interaction(&self) -> Interaction {
        if self.ctx.settings.pointer.enabled {
            self.pointer.interaction()
        } else {
            Interaction::None
        }
    }

    /// Tear down overlays and per-chart state. The api drops events until the next load.
    pub fn destroy(&mut self) {
        log::debug!("chart destroyed");
        self.tooltip.reset(&mut self.engine);
        self.engine.remove_overlay(OverlayId::FocusOutline);
        self.highlight = HighlightController::default();
        self.pointer.reset();
        self.keyboard.reset();
        self.legend.reset();
        self.a11y.reset();
        self.modifiers = Modifiers::default();
        self.ctx = ChartContext::new(
            std::mem::take(&mut self.ctx.settings),
            std::mem::take(&mut self.ctx.handlers),
        );
    }

    /// Show exactly the legend items named in `ids`.
    pub fn set_visible_items(&mut self, ids: &[String]) -> Result<(), ChartError> {
        self.ctx.ensure_rendered()?;
        if let Some(unknown) = ids.iter().find(|id| !self.legend.contains(id)) {
            return Err(ChartError::UnknownItem(unknown.clone()));
        }
        if self.legend.apply_visibility(&self.ctx, &mut self.engine, ids) {
            self.on_render();
        }
        Ok(())
    }

    /// Highlight a point and show its tooltip.
    pub fn highlight_point(&mut self, point: PointRef) -> Result<(), ChartError> {
        self.ctx.ensure_rendered()?;
        if !self.engine.scene().is_valid_point(point) {
            return Err(ChartError::UnknownItem(point.node.to_string()));
        }
        let now = self.clock.now();
        self.highlight.highlight_point(&mut self.engine, point);
        self.tooltip
            .show_on_point(&self.ctx, &mut self.engine, point, true, now);
        self.notify_highlight();
        self.refresh_legend();
        Ok(())
    }

    /// Highlight the group at `x` and show its tooltip.
    pub fn highlight_group(&mut self, x: f64) -> Result<(), ChartError> {
        self.ctx.ensure_rendered()?;
        if self.ctx.derived.group_at(x).is_none() {
            return Err(ChartError::UnknownItem(x.to_string()));
        }
        let now = self.clock.now();
        self.highlight_group_at(x);
        self.tooltip
            .show_on_group(&self.ctx, &mut self.engine, x, true, now);
        self.refresh_legend();
        Ok(())
    }

    /// Highlight legend items by id.
    pub fn highlight_items(&mut self, ids: &[String]) -> Result<(), ChartError> {
        self.ctx.ensure_rendered()?;
        if let Some(unknown) = ids.iter().find(|id| !self.legend.contains(id)) {
            return Err(ChartError::UnknownItem(unknown.clone()));
        }
        self.highlight.highlight_items(&mut self.engine, ids);
        self.notify_highlight();
        self.refresh_legend();
        Ok(())
    }

    pub fn clear_highlight(&mut self) -> Result<(), ChartError> {
        self.ctx.ensure_rendered()?;
        let now = self.clock.now();
        self.tooltip.hide(&self.ctx, &mut self.engine, now);
        self.clear_highlight_and_notify();
        self.refresh_legend();
        Ok(())
    }

    /// Hide the tooltip, starting the lockout window if it was pinned.
    pub fn dismiss_tooltip(&mut self) -> Result<(), ChartError> {
        self.ctx.ensure_rendered()?;
        let now = self.clock.now();
        self.dismiss(now);
        Ok(())
    }

    pub fn pin_tooltip(&mut self) -> Result<bool, ChartError> {
        self.ctx.ensure_rendered()?;
        let pinned = self.tooltip.pin();
        self.a11y.set_expanded(self.tooltip.state().pinned);
        Ok(pinned)
    }

    pub fn unpin_tooltip(&mut self) -> Result<bool, ChartError> {
        self.ctx.ensure_rendered()?;
        let unpinned = self.tooltip.unpin();
        self.a11y.set_expanded(false);
        Ok(unpinned)
    }

    pub fn tooltip_store(&self) -> &Store<TooltipState> {
        self.tooltip.store()
    }

    pub fn tooltip(&self) -> TooltipState {
        self.tooltip.state()
    }

    pub fn legend_store(&self) -> &Store<Vec<LegendItem>> {
        self.legend.store()
    }

    pub fn legend_items(&self) -> Vec<LegendItem> {
        self.legend.items()
    }

    /// Id of the legend item whose tooltip is open.
    pub fn legend_tooltip_store(&self) -> &Store<Option<String>> {
        self.legend.tooltip_store()
    }

    pub fn no_data_store(&self) -> &Store<NoDataState> {
        self.no_data.store()
    }

    pub fn no_data(&self) -> NoDataState {
        self.no_data.state()
    }

    pub fn axis_titles_store(&self) -> &Store<AxisTitles> {
        self.axis_titles.store()
    }

    pub fn axis_titles(&self) -> AxisTitles {
        self.axis_titles.titles()
    }

    pub fn application_store(&self) -> &Store<ApplicationState> {
        self.a11y.store()
    }

    pub fn application(&self) -> ApplicationState {
        self.a11y.state()
    }

    pub fn focused(&self) -> FocusedState {
        self.keyboard.focused()
    }

    pub fn hover_target(&self) -> HoverTarget {
        self.pointer.target()
    }

    /// Ids of the currently highlighted legend items.
    pub fn highlighted(&self) -> &[String] {
        self.highlight.highlighted()
    }

    fn pointer_action(&mut self, action: Option<PointerAction>, now: Instant) {
        let Some(action) = action else {
            return;
        };
        let pinned = self.tooltip.state().pinned;
        match action {
            PointerAction::PointHover(point) if !pinned => {
                self.highlight.highlight_point(&mut self.engine, point);
                self.tooltip
                    .show_on_point(&self.ctx, &mut self.engine, point, false, now);
                self.notify_highlight();
            }
            PointerAction::GroupHover(x) if !pinned => {
                self.highlight_group_at(x);
                self.tooltip
                    .show_on_group(&self.ctx, &mut self.engine, x, false, now);
            }
            PointerAction::HoverLost if !pinned => {
                self.tooltip.hide(&self.ctx, &mut self.engine, now);
                self.clear_highlight_and_notify();
            }
            PointerAction::PointClick(_) | PointerAction::GroupClick(_) if pinned => {
                self.dismiss(now);
            }
            PointerAction::PointClick(point) => {
                self.highlight.highlight_point(&mut self.engine, point);
                if self
                    .tooltip
                    .show_on_point(&self.ctx, &mut self.engine, point, true, now)
                {
                    self.tooltip.pin();
                }
                self.notify_highlight();
            }
            PointerAction::GroupClick(x) => {
                self.highlight_group_at(x);
                if self
                    .tooltip
                    .show_on_group(&self.ctx, &mut self.engine, x, true, now)
                {
                    self.tooltip.pin();
                }
            }
            PointerAction::PointHover(_)
            | PointerAction::GroupHover(_)
            | PointerAction::HoverLost => return,
        }
        self.refresh_legend();
    }

    fn key_outcome(&mut self, outcome: KeyOutcome, now: Instant) {
        match outcome {
            KeyOutcome::Moved(focused) => self.show_focused(focused, now),
            KeyOutcome::Activated(focused) => self.activate(focused, now),
            KeyOutcome::Ignored => {}
        }
    }

    /// Enter/space: pin the tooltip at the focus target, or unpin it when it is
    /// already pinned there.
    fn activate(&mut self, focused: FocusedState, now: Instant) {
        let state = self.tooltip.state();
        let at_target = match focused {
            FocusedState::Chart => return,
            FocusedState::Group { x } => {
                state.point.is_none() && state.x.is_some_and(|t| t.total_cmp(&x).is_eq())
            }
            FocusedState::Point { point, .. } => state.point == Some(point),
        };
        if state.pinned && at_target {
            self.tooltip.unpin();
        } else {
            if !(state.visible && at_target) {
                self.show_target(focused, now);
                self.refresh_legend();
            }
            self.tooltip.pin();
        }
        self.a11y.set_expanded(self.tooltip.state().pinned);
    }

    /// Highlight and show the tooltip for a focus target, then announce it.
    fn show_focused(&mut self, focused: FocusedState, now: Instant) {
        self.show_target(focused, now);
        let expanded = self.tooltip.state().pinned;
        self.a11y
            .announce(&self.ctx, &mut self.engine, focused, expanded);
        self.refresh_legend();
    }

    fn show_target(&mut self, focused: FocusedState, now: Instant) {
        match focused {
            FocusedState::Chart => {
                self.tooltip.hide(&self.ctx, &mut self.engine, now);
                self.clear_highlight_and_notify();
            }
            FocusedState::Group { x } => {
                self.highlight_group_at(x);
                self.tooltip
                    .show_on_group(&self.ctx, &mut self.engine, x, true, now);
            }
            FocusedState::Point { point, .. } => {
                self.highlight.highlight_point(&mut self.engine, point);
                self.tooltip
                    .show_on_point(&self.ctx, &mut self.engine, point, true, now);
                self.notify_highlight();
            }
        }
    }

    fn dismiss(&mut self, now: Instant) {
        self.tooltip.hide(&self.ctx, &mut self.engine, now);
        self.a11y.set_expanded(false);
        if self.pointer.target() == HoverTarget::None
            && self.keyboard.focused() == FocusedState::Chart
        {
            self.clear_highlight_and_notify();
        }
        self.refresh_legend();
    }

    fn highlight_group_at(&mut self, x: f64) {
        let Some(points) = self.ctx.derived.group_at(x).map(|g| g.points.clone()) else {
            return;
        };
        self.highlight.highlight_group(&mut self.engine, &points);
        self.notify_highlight();
    }

    fn clear_highlight_and_notify(&mut self) {
        let was_active = self.highlight.is_active();
        self.highlight.clear_highlight(&mut self.engine);
        if was_active && let Some(handler) = &self.ctx.handlers.on_clear_highlight {
            handler();
        }
    }

    fn notify_highlight(&self) {
        if let Some(handler) = &self.ctx.handlers.on_highlight {
            handler(self.highlight.highlighted());
        }
    }

    fn refresh_legend(&mut self) {
        self.legend
            .refresh(&self.ctx, self.engine.scene(), self.highlight.highlighted());
    }
}
