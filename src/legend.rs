//! Legend entries and series/segment visibility.
use std::collections::HashSet;

use iced::Color;
use iced::time::Instant;

use crate::context::ChartContext;
use crate::deferred::Debounce;
use crate::engine::ChartEngine;
use crate::scene::{PointRef, Scene, SeriesKind, SeriesRef, item_id};
use crate::settings::VisibilityMode;
use crate::store::Store;

/// How an entry's swatch is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendMarker {
    pub color: Color,
    pub kind: SeriesKind,
}

#[derive(Debug, Clone, PartialEq)]
/// An entry in the chart legend.
pub struct LegendItem {
    pub id: String,
    pub name: String,
    pub marker: LegendMarker,
    pub visible: bool,
    pub highlighted: bool,
}

#[derive(Debug, Default)]
pub struct LegendCoordinator {
    items: Store<Vec<LegendItem>>,
    /// Id of the item whose legend tooltip is open.
    tooltip: Store<Option<String>>,
    pending_tooltip: Option<String>,
    show_tooltip: Debounce,
    hide_tooltip: Debounce,
}

/// One engine write needed to reach a visibility target.
enum VisibilityChange {
    Series(SeriesRef, bool),
    Point(PointRef, bool),
}

impl LegendCoordinator {
    pub fn store(&self) -> &Store<Vec<LegendItem>> {
        &self.items
    }

    pub fn tooltip_store(&self) -> &Store<Option<String>> {
        &self.tooltip
    }

    pub fn items(&self) -> Vec<LegendItem> {
        self.items.get()
    }

    /// Rebuild the entries from the scene. Pie charts list segments, other charts
    /// list every series that is not attached to another one.
    pub fn refresh(&mut self, ctx: &ChartContext, scene: &Scene, highlighted: &[String]) {
        let highlighted: HashSet<&str> = highlighted.iter().map(String::as_str).collect();
        let mut items = Vec::new();
        for (series_ref, series) in scene.series_refs() {
            if ctx.is_pie {
                if !series.kind.is_pie() {
                    continue;
                }
                for (_, point) in scene.point_refs(series_ref) {
                    let id = item_id(point.id.as_deref(), point.name.as_deref(), point.node);
                    items.push(LegendItem {
                        name: point.name.clone().unwrap_or_else(|| id.clone()),
                        highlighted: highlighted.contains(id.as_str()),
                        id,
                        marker: LegendMarker {
                            color: series.color,
                            kind: series.kind,
                        },
                        visible: point.visible,
                    });
                }
            } else if series.linked_to.is_none() {
                let id = item_id(series.id.as_deref(), series.name.as_deref(), series.node);
                items.push(LegendItem {
                    name: series.display_name(),
                    highlighted: highlighted.contains(id.as_str()),
                    id,
                    marker: LegendMarker {
                        color: series.color,
                        kind: series.kind,
                    },
                    visible: series.visible,
                });
            }
        }
        self.items.set(items);
    }

    /// Ids of the visible entries.
    pub fn visible_ids(&self) -> Vec<String> {
        self.items
            .get()
            .into_iter()
            .filter(|item| item.visible)
            .map(|item| item.id)
            .collect()
    }

    /// Whether `id` names a legend entry.
    pub fn contains(&self, id: &str) -> bool {
        self.items.get().iter().any(|item| item.id == id)
    }

    /// Show exactly the items in `visible`. Series attached to an item follow it.
    ///
    /// Visibility is written without redrawing; one redraw follows if anything changed.
    pub fn apply_visibility(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        visible: &[String],
    ) -> bool {
        let wanted: HashSet<&str> = visible.iter().map(String::as_str).collect();
        let scene = engine.scene();
        let mut changes = Vec::new();
        for (series_ref, series) in scene.series_refs() {
            if ctx.is_pie {
                if !series.kind.is_pie() {
                    continue;
                }
                for (point_ref, point) in scene.point_refs(series_ref) {
                    let id = item_id(point.id.as_deref(), point.name.as_deref(), point.node);
                    let show = wanted.contains(id.as_str());
                    if point.visible != show {
                        changes.push(VisibilityChange::Point(point_ref, show));
                    }
                }
                continue;
            }
            let owner = match series.linked_to {
                Some(parent) => scene.series_ref(parent).and_then(|r| scene.series_node(r)),
                None => Some(series),
            };
            let Some(owner) = owner else {
                continue;
            };
            let id = item_id(owner.id.as_deref(), owner.name.as_deref(), owner.node);
            let show = wanted.contains(id.as_str());
            if series.visible != show {
                changes.push(VisibilityChange::Series(series_ref, show));
            }
        }
        if changes.is_empty() {
            return false;
        }
        log::debug!("applying {} visibility changes", changes.len());
        for change in changes {
            match change {
                VisibilityChange::Series(series, show) => engine.set_series_visible(series, show),
                VisibilityChange::Point(point, show) => engine.set_point_visible(point, show),
            }
        }
        engine.redraw();
        true
    }

    /// The visible list a legend press asks for.
    ///
    /// A plain press isolates the item, or shows everything again when the item is
    /// already the only one visible. A multi press flips the item alone.
    pub fn proposed_visibility(&self, id: &str, multi: bool) -> Vec<String> {
        let items = self.items.get();
        let visible: Vec<&str> = items
            .iter()
            .filter(|item| item.visible)
            .map(|item| item.id.as_str())
            .collect();
        if multi {
            items
                .iter()
                .filter(|item| (item.id == id) != item.visible)
                .map(|item| item.id.clone())
                .collect()
        } else if visible == [id] {
            items.iter().map(|item| item.id.clone()).collect()
        } else {
            vec![id.to_owned()]
        }
    }

    /// Handle a legend press: report the proposal and apply it when the chart owns
    /// visibility. Returns whether the engine redrew.
    pub fn select(
        &mut self,
        ctx: &ChartContext,
        engine: &mut dyn ChartEngine,
        id: &str,
        multi: bool,
    ) -> bool {
        if !self.contains(id) {
            log::warn!("legend press on unknown item `{id}`");
            return false;
        }
        let proposed = self.proposed_visibility(id, multi);
        if let Some(handler) = &ctx.handlers.on_visible_items_change {
            handler(&proposed);
        }
        match ctx.settings.legend.visibility_mode {
            VisibilityMode::Uncontrolled => self.apply_visibility(ctx, engine, &proposed),
            VisibilityMode::Controlled => false,
        }
    }

    /// Open the legend tooltip for `id` after the show delay.
    pub fn on_item_hover(&mut self, ctx: &ChartContext, id: &str, now: Instant) {
        self.hide_tooltip.cancel();
        self.pending_tooltip = Some(id.to_owned());
        self.show_tooltip
            .schedule(now, ctx.settings.legend.tooltip_show_delay);
    }

    /// Close the legend tooltip after the hide delay.
    pub fn on_item_leave(&mut self, ctx: &ChartContext, now: Instant) {
        self.show_tooltip.cancel();
        self.pending_tooltip = None;
        self.hide_tooltip
            .schedule(now, ctx.settings.legend.tooltip_hide_delay);
    }

    pub fn tick(&mut self, now: Instant) {
        if self.show_tooltip.fire_if_due(now) {
            self.tooltip.set(self.pending_tooltip.take());
        }
        if self.hide_tooltip.fire_if_due(now) {
            self.tooltip.set(None);
        }
    }

    pub fn reset(&mut self) {
        self.show_tooltip.cancel();
        self.hide_tooltip.cancel();
        self.pending_tooltip = None;
        self.tooltip.set(None);
    }
}
