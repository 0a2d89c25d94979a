//! The engine-owned scene graph: series, points, axes and plot lines.
//!
//! The coordination layer never creates or frees these nodes. It reads them through
//! [`Scene`] and asks the engine to mutate them through [`ChartEngine`](crate::ChartEngine).
//! Nodes can be replaced between renders, so every handle carries the [`NodeId`] it was
//! taken from and resolving a stale handle yields `None`.
use core::fmt;

use iced::{Color, Point, Rectangle};

/// Process-unique identity of a series or point node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Allocate a fresh node id (0, 1, 2, ...).
    pub(crate) fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Visual encoding of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Line,
    Spline,
    Area,
    Column,
    Scatter,
    Pie,
    /// Low/high interval attached to a target series.
    ErrorBar,
    /// Constant reference line across the x axis (a vertical line at x).
    XThreshold,
    /// Constant reference line across the y axis (a horizontal line at y).
    YThreshold,
}

impl SeriesKind {
    pub fn is_threshold(self) -> bool {
        matches!(self, Self::XThreshold | Self::YThreshold)
    }

    pub fn is_error_range(self) -> bool {
        matches!(self, Self::ErrorBar)
    }

    pub fn is_column(self) -> bool {
        matches!(self, Self::Column)
    }

    pub fn is_pie(self) -> bool {
        matches!(self, Self::Pie)
    }

    /// Whether points of this kind take part in x-groups and keyboard navigation.
    pub fn is_navigable(self) -> bool {
        !self.is_threshold() && !self.is_error_range()
    }

    /// Whether the hover cursor puts a marker on points of this kind.
    pub(crate) fn has_cursor_marker(self) -> bool {
        !self.is_column() && !self.is_error_range() && !self.is_threshold() && !self.is_pie()
    }
}

/// Visual highlight state of a series or point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    #[default]
    Normal,
    Hover,
    Inactive,
}

/// Angular extent of a pie segment, in radians clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub start_angle: f32,
    pub end_angle: f32,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f32 {
        (self.start_angle + self.end_angle) * 0.5
    }
}

/// Pie placement within the plot area (plot-local pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieGeometry {
    pub center: Point,
    pub radius: f32,
}

/// A single data item of a series.
///
/// `plot_x` is the pixel offset along the x axis from its start, `plot_y` the pixel
/// offset along the y axis measured from its far (maximum) end. Both are expressed in
/// the engine's un-inverted frame; [`geometry`](crate::geometry) turns them into chart
/// space.
#[derive(Debug, Clone, PartialEq)]
pub struct PointNode {
    pub node: NodeId,
    pub x: f64,
    /// `None` marks an explicit gap.
    pub y: Option<f64>,
    /// Interval for error-range points.
    pub range: Option<(f64, f64)>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub visible: bool,
    pub plot_x: f32,
    pub plot_y: f32,
    /// Bar shape for column points, in the un-inverted plot-local frame.
    pub shape: Option<Rectangle>,
    pub slice: Option<PieSlice>,
    /// Engine-provided tooltip position for pie segments, in chart space.
    pub tooltip_hint: Option<Point>,
    pub state: VisualState,
    pub destroyed: bool,
}

impl PointNode {
    pub fn new(x: f64, y: Option<f64>) -> Self {
        Self {
            node: NodeId::new(),
            x,
            y,
            range: None,
            id: None,
            name: None,
            visible: true,
            plot_x: 0.0,
            plot_y: 0.0,
            shape: None,
            slice: None,
            tooltip_hint: None,
            state: VisualState::Normal,
            destroyed: false,
        }
    }

    /// Key used to remember visual state for points without an id.
    pub(crate) fn coordinate_key(&self) -> String {
        match self.y {
            Some(y) => format!("{}:{}", self.x, y),
            None => format!("{}:null", self.x),
        }
    }
}

/// An ordered, named collection of points.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesNode {
    pub node: NodeId,
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: SeriesKind,
    pub visible: bool,
    pub color: Color,
    /// Index of the series this one is attached to (error ranges).
    pub linked_to: Option<usize>,
    pub points: Vec<PointNode>,
    pub pie: Option<PieGeometry>,
    pub state: VisualState,
    pub destroyed: bool,
}

impl SeriesNode {
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            node: NodeId::new(),
            id: None,
            name: None,
            kind,
            visible: true,
            color: Color::from_rgb(0.3, 0.3, 0.9),
            linked_to: None,
            points: Vec::new(),
            pie: None,
            state: VisualState::Normal,
            destroyed: false,
        }
    }

    /// Display name: the name if set, else the resolved identifier.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| item_id(self.id.as_deref(), None, self.node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisNode {
    pub kind: AxisKind,
    pub title: Option<String>,
    pub visible: bool,
}

/// A decorative reference line drawn for a threshold series.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLineNode {
    /// Id of the threshold series the line belongs to.
    pub id: String,
    pub axis: AxisKind,
    pub value: f64,
    pub color: Color,
    pub opacity: f32,
}

/// Handle to a series slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesRef {
    pub index: usize,
    pub node: NodeId,
}

/// Handle to a point slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointRef {
    pub series: SeriesRef,
    pub index: usize,
    pub node: NodeId,
}

/// Resolve a stable identifier: id, else name, else a placeholder derived from the node.
pub fn item_id(id: Option<&str>, name: Option<&str>, node: NodeId) -> String {
    id.filter(|id| !id.is_empty())
        .or_else(|| name.filter(|name| !name.is_empty()))
        .map(str::to_owned)
        .unwrap_or_else(|| format!("{node}"))
}

/// The root aggregate owned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub series: Vec<SeriesNode>,
    /// Plot area in chart pixels.
    pub plot: Rectangle,
    pub inverted: bool,
    pub axes: Vec<AxisNode>,
    pub plot_lines: Vec<PlotLineNode>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            series: Vec::new(),
            plot: Rectangle::new(Point::ORIGIN, iced::Size::new(600.0, 400.0)),
            inverted: false,
            axes: Vec::new(),
            plot_lines: Vec::new(),
        }
    }
}

impl Scene {
    /// Iterate live series with their handles.
    pub fn series_refs(&self) -> impl Iterator<Item = (SeriesRef, &SeriesNode)> {
        self.series
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.destroyed)
            .map(|(index, s)| {
                (
                    SeriesRef {
                        index,
                        node: s.node,
                    },
                    s,
                )
            })
    }

    /// Iterate live points of a series with their handles.
    pub fn point_refs(&self, series: SeriesRef) -> impl Iterator<Item = (PointRef, &PointNode)> {
        self.series_node(series)
            .into_iter()
            .flat_map(move |s| s.points.iter().enumerate())
            .filter(|(_, p)| !p.destroyed)
            .map(move |(index, p)| {
                (
                    PointRef {
                        series,
                        index,
                        node: p.node,
                    },
                    p,
                )
            })
    }

    pub fn series_node(&self, series: SeriesRef) -> Option<&SeriesNode> {
        self.series
            .get(series.index)
            .filter(|s| s.node == series.node && !s.destroyed)
    }

    pub fn point_node(&self, point: PointRef) -> Option<&PointNode> {
        self.series_node(point.series)?
            .points
            .get(point.index)
            .filter(|p| p.node == point.node && !p.destroyed)
    }

    /// Liveness check for points held across renders.
    pub fn is_valid_point(&self, point: PointRef) -> bool {
        let Some(series) = self.series_node(point.series) else {
            return false;
        };
        series.visible
            && self
                .point_node(point)
                .is_some_and(|p| p.visible && p.y.is_some())
    }

    pub fn series_ref(&self, index: usize) -> Option<SeriesRef> {
        self.series
            .get(index)
            .filter(|s| !s.destroyed)
            .map(|s| SeriesRef {
                index,
                node: s.node,
            })
    }

    pub fn series_id(&self, series: SeriesRef) -> Option<String> {
        self.series_node(series)
            .map(|s| item_id(s.id.as_deref(), s.name.as_deref(), s.node))
    }

    pub fn point_id(&self, point: PointRef) -> Option<String> {
        self.point_node(point)
            .map(|p| item_id(p.id.as_deref(), p.name.as_deref(), p.node))
    }

    pub fn find_series(&self, id: &str) -> Option<SeriesRef> {
        self.series_refs()
            .find(|(_, s)| item_id(s.id.as_deref(), s.name.as_deref(), s.node) == id)
            .map(|(r, _)| r)
    }

    pub fn find_point(&self, id: &str) -> Option<PointRef> {
        self.series_refs()
            .flat_map(|(r, _)| self.point_refs(r))
            .find(|(_, p)| item_id(p.id.as_deref(), p.name.as_deref(), p.node) == id)
            .map(|(r, _)| r)
    }

    /// Charts whose series include a pie have no x-groups.
    pub fn is_pie(&self) -> bool {
        self.series_refs().any(|(_, s)| s.kind.is_pie())
    }

    pub fn has_columns(&self) -> bool {
        self.series_refs()
            .any(|(_, s)| s.visible && s.kind.is_column())
    }

    /// Series attached to `target` through `linked_to`.
    pub fn linked_series(&self, target: SeriesRef) -> impl Iterator<Item = SeriesRef> + '_ {
        self.series_refs()
            .filter(move |(_, s)| s.linked_to == Some(target.index))
            .map(|(r, _)| r)
    }
}
