//! Ownership of series/point highlight state.
//!
//! The controller is the only holder of a [`StateAuthority`], so nothing else can
//! write visual state. It also remembers what it last applied and replays it after
//! an engine re-render wiped the visual elements.
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::engine::{ChartEngine, StateAuthority};
use crate::scene::{PointNode, PointRef, Scene, SeriesRef, VisualState, item_id};

/// Opacity of plot lines that are not part of the highlight.
pub(crate) const DIMMED_OPACITY: f32 = 0.4;

type PointKey = (String, String);

#[derive(Debug)]
pub struct HighlightController {
    authority: StateAuthority,
    series_states: IndexMap<String, VisualState>,
    point_states: IndexMap<PointKey, VisualState>,
    plot_line_opacity: IndexMap<String, f32>,
    highlighted: Vec<String>,
}

impl Default for HighlightController {
    fn default() -> Self {
        Self {
            authority: StateAuthority::new(),
            series_states: IndexMap::new(),
            point_states: IndexMap::new(),
            plot_line_opacity: IndexMap::new(),
            highlighted: Vec::new(),
        }
    }
}

/// Desired states for one highlight pass.
#[derive(Default)]
struct Plan {
    series: Vec<(SeriesRef, VisualState)>,
    points: Vec<(PointRef, VisualState)>,
    plot_lines: Vec<(String, f32)>,
    highlighted: Vec<String>,
}

impl HighlightController {
    /// Ids of the legend items currently highlighted.
    pub fn highlighted(&self) -> &[String] {
        &self.highlighted
    }

    pub fn is_active(&self) -> bool {
        !self.highlighted.is_empty()
    }

    /// Highlight a single point and everything attached to it.
    pub fn highlight_point(&mut self, engine: &mut dyn ChartEngine, point: PointRef) {
        self.highlight_group(engine, &[point]);
    }

    /// Highlight a set of points, possibly spanning several series at one x.
    pub fn highlight_group(&mut self, engine: &mut dyn ChartEngine, points: &[PointRef]) {
        let scene = engine.scene();
        let points: Vec<PointRef> = points
            .iter()
            .copied()
            .filter(|p| scene.point_node(*p).is_some())
            .collect();
        if points.is_empty() {
            return;
        }
        let plan = if points
            .iter()
            .all(|p| scene.series_node(p.series).is_some_and(|s| s.kind.is_pie()))
        {
            pie_plan(scene, |point| points.contains(&point))
        } else {
            cartesian_plan(scene, &points)
        };
        self.apply(engine, plan);
    }

    /// Highlight by legend identifiers: pie segments by point id, other charts by series id.
    pub fn highlight_items(&mut self, engine: &mut dyn ChartEngine, ids: &[String]) {
        let scene = engine.scene();
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let plan = if scene.is_pie() {
            pie_plan(scene, |point| {
                scene
                    .point_id(point)
                    .is_some_and(|id| wanted.contains(id.as_str()))
            })
        } else {
            let mut plan = Plan::default();
            for (series_ref, series) in scene.series_refs() {
                let id = item_id(series.id.as_deref(), series.name.as_deref(), series.node);
                let parent_wanted = series
                    .linked_to
                    .and_then(|i| scene.series_ref(i))
                    .and_then(|r| scene.series_id(r))
                    .is_some_and(|parent| wanted.contains(parent.as_str()));
                let active = wanted.contains(id.as_str()) || parent_wanted;
                plan.series.push((series_ref, state_for(active)));
                for (point_ref, _) in scene.point_refs(series_ref) {
                    plan.points.push((point_ref, VisualState::Normal));
                }
                if wanted.contains(id.as_str()) && series.linked_to.is_none() {
                    plan.highlighted.push(id);
                }
            }
            plan.plot_lines = plot_line_plan(scene, |id| wanted.contains(id));
            plan
        };
        self.apply(engine, plan);
    }

    /// Reset everything to normal.
    pub fn clear_highlight(&mut self, engine: &mut dyn ChartEngine) {
        let scene = engine.scene();
        let mut plan = Plan::default();
        for (series_ref, _) in scene.series_refs() {
            plan.series.push((series_ref, VisualState::Normal));
            for (point_ref, _) in scene.point_refs(series_ref) {
                plan.points.push((point_ref, VisualState::Normal));
            }
        }
        plan.plot_lines = scene
            .plot_lines
            .iter()
            .map(|line| (line.id.clone(), 1.0))
            .collect();
        self.apply(engine, plan);
    }

    /// Replay the last applied states after the engine rebuilt its elements.
    ///
    /// Entries whose series or point no longer exists are dropped.
    pub fn restore(&mut self, engine: &mut dyn ChartEngine) {
        let scene = engine.scene();
        let mut series_seen = HashSet::new();
        let mut points_seen = HashSet::new();
        let mut plan = Plan::default();
        for (series_ref, series) in scene.series_refs() {
            let series_id = item_id(series.id.as_deref(), series.name.as_deref(), series.node);
            if let Some(state) = self.series_states.get(&series_id) {
                plan.series.push((series_ref, *state));
                series_seen.insert(series_id.clone());
            }
            for (point_ref, point) in scene.point_refs(series_ref) {
                let key = point_key(&series_id, point);
                if let Some(state) = self.point_states.get(&key) {
                    plan.points.push((point_ref, *state));
                    points_seen.insert(key);
                }
            }
        }
        for line in &scene.plot_lines {
            if let Some(opacity) = self.plot_line_opacity.get(&line.id) {
                plan.plot_lines.push((line.id.clone(), *opacity));
            }
        }
        self.series_states.retain(|id, _| series_seen.contains(id));
        self.point_states.retain(|key, _| points_seen.contains(key));

        for (series, state) in plan.series {
            engine.set_series_state(&self.authority, series, state);
        }
        for (point, state) in plan.points {
            engine.set_point_state(&self.authority, point, state);
        }
        for (id, opacity) in plan.plot_lines {
            engine.set_plot_line_opacity(&self.authority, &id, opacity);
        }
    }

    fn apply(&mut self, engine: &mut dyn ChartEngine, plan: Plan) {
        self.series_states.clear();
        self.point_states.clear();
        self.plot_line_opacity.clear();
        let scene = engine.scene();
        let series_keys: Vec<_> = plan
            .series
            .iter()
            .filter_map(|(r, state)| scene.series_id(*r).map(|id| (id, *state)))
            .collect();
        let point_keys: Vec<_> = plan
            .points
            .iter()
            .filter_map(|(r, state)| {
                let series_id = scene.series_id(r.series)?;
                let point = scene.point_node(*r)?;
                Some((point_key(&series_id, point), *state))
            })
            .collect();
        self.series_states.extend(series_keys);
        self.point_states.extend(point_keys);

        for (series, state) in plan.series {
            engine.set_series_state(&self.authority, series, state);
        }
        for (point, state) in plan.points {
            engine.set_point_state(&self.authority, point, state);
        }
        for (id, opacity) in plan.plot_lines {
            engine.set_plot_line_opacity(&self.authority, &id, opacity);
            self.plot_line_opacity.insert(id, opacity);
        }
        self.highlighted = plan.highlighted;
    }
}

fn state_for(active: bool) -> VisualState {
    if active {
        VisualState::Hover
    } else {
        VisualState::Inactive
    }
}

fn point_key(series_id: &str, point: &PointNode) -> PointKey {
    let point_id = point
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| point.coordinate_key());
    (series_id.to_owned(), point_id)
}

fn plot_line_plan(scene: &Scene, active: impl Fn(&str) -> bool) -> Vec<(String, f32)> {
    scene
        .plot_lines
        .iter()
        .map(|line| {
            let opacity = if active(&line.id) { 1.0 } else { DIMMED_OPACITY };
            (line.id.clone(), opacity)
        })
        .collect()
}

/// Pie: segments matching `active` hover, the rest of the series goes inactive.
fn pie_plan(scene: &Scene, active: impl Fn(PointRef) -> bool) -> Plan {
    let mut plan = Plan::default();
    for (series_ref, series) in scene.series_refs() {
        plan.series.push((series_ref, VisualState::Normal));
        for (point_ref, _) in scene.point_refs(series_ref) {
            let is_active = series.kind.is_pie() && active(point_ref);
            plan.points.push((point_ref, state_for(is_active)));
            if is_active && let Some(id) = scene.point_id(point_ref) {
                plan.highlighted.push(id);
            }
        }
    }
    plan
}

/// Cartesian: target series (and series linked to them) hover, others go inactive.
/// Columns highlight per x so that one stack lights up rather than a whole series.
fn cartesian_plan(scene: &Scene, points: &[PointRef]) -> Plan {
    let mut plan = Plan::default();
    let targets: HashSet<usize> = points.iter().map(|p| p.series.index).collect();
    let xs: Vec<f64> = points
        .iter()
        .filter_map(|p| scene.point_node(*p).map(|n| n.x))
        .collect();
    let mut target_ids = HashSet::new();

    for (series_ref, series) in scene.series_refs() {
        let linked = series.linked_to.is_some_and(|i| targets.contains(&i));
        let active = targets.contains(&series_ref.index) || linked;
        let id = item_id(series.id.as_deref(), series.name.as_deref(), series.node);
        if active && !linked {
            plan.highlighted.push(id.clone());
        }
        if active {
            target_ids.insert(id);
        }

        if series.kind.is_column() {
            plan.series.push((series_ref, VisualState::Normal));
            for (point_ref, point) in scene.point_refs(series_ref) {
                let at_x = xs.iter().any(|x| x.total_cmp(&point.x).is_eq());
                plan.points.push((point_ref, state_for(at_x)));
            }
        } else {
            plan.series.push((series_ref, state_for(active)));
            for (point_ref, _) in scene.point_refs(series_ref) {
                plan.points.push((point_ref, VisualState::Normal));
            }
        }
    }
    plan.plot_lines = plot_line_plan(scene, |id| target_ids.contains(id));
    plan
}
