//! Consumer settings and callbacks for a chart.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Formats a data value for tooltips and announcements.
pub type ValueFormatter = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Called with the ids of the items that became highlighted.
pub type HighlightHandler = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Called when the highlight is cleared.
pub type ClearHighlightHandler = Arc<dyn Fn() + Send + Sync>;

/// Called with the proposed list of visible item ids.
pub type VisibleItemsHandler = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Configures the behavior of a chart.
#[derive(Debug, Clone, Default)]
pub struct ChartSettings {
    pub tooltip: TooltipSettings,
    pub pointer: PointerSettings,
    pub keyboard: KeyboardSettings,
    pub legend: LegendSettings,
    pub status: ChartStatus,
    pub labels: ChartLabels,
}

/// Where the floating tooltip attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipPlacement {
    /// Next to the hovered point (or the first point of the group).
    #[default]
    Target,
    /// Centered on the group rect.
    Middle,
    /// Outside the group rect.
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipSettings {
    pub enabled: bool,
    pub placement: TooltipPlacement,
    /// How long a dismissed pinned tooltip refuses to reappear.
    pub lockout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSettings {
    pub enabled: bool,
    /// Delay before a lost hover is acted upon.
    pub hover_lost_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardSettings {
    pub enabled: bool,
    /// Right-to-left text direction swaps left and right arrows.
    pub rtl: bool,
    /// Fraction of the item count moved by page up/down.
    pub page_fraction: f64,
}

/// Who owns the list of visible items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityMode {
    /// The chart tracks visibility itself and applies legend toggles.
    #[default]
    Uncontrolled,
    /// The consumer supplies the visible ids; legend toggles are only reported.
    Controlled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendSettings {
    pub visibility_mode: VisibilityMode,
    pub tooltip_show_delay: Duration,
    pub tooltip_hide_delay: Duration,
}

/// Data loading status supplied by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartStatus {
    #[default]
    Finished,
    Loading,
    Error,
}

/// Strings and formatters passed through to the view layer.
#[derive(Clone)]
pub struct ChartLabels {
    pub chart: String,
    pub tooltip_dismiss: String,
    pub no_data: String,
    pub no_match: String,
    pub loading: String,
    pub error: String,
    pub x_formatter: ValueFormatter,
    pub y_formatter: ValueFormatter,
}

impl fmt::Debug for ChartLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartLabels")
            .field("chart", &self.chart)
            .field("tooltip_dismiss", &self.tooltip_dismiss)
            .field("no_data", &self.no_data)
            .field("no_match", &self.no_match)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Optional consumer callbacks.
#[derive(Clone, Default)]
pub struct ChartHandlers {
    pub on_highlight: Option<HighlightHandler>,
    pub on_clear_highlight: Option<ClearHighlightHandler>,
    pub on_visible_items_change: Option<VisibleItemsHandler>,
}

impl fmt::Debug for ChartHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartHandlers")
            .field("on_highlight", &self.on_highlight.is_some())
            .field("on_clear_highlight", &self.on_clear_highlight.is_some())
            .field(
                "on_visible_items_change",
                &self.on_visible_items_change.is_some(),
            )
            .finish()
    }
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            placement: TooltipPlacement::default(),
            lockout: Duration::from_millis(250),
        }
    }
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hover_lost_delay: Duration::from_millis(25),
        }
    }
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rtl: false,
            page_fraction: 0.05,
        }
    }
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            visibility_mode: VisibilityMode::default(),
            tooltip_show_delay: Duration::from_millis(300),
            tooltip_hide_delay: Duration::from_millis(200),
        }
    }
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            chart: String::from("Chart"),
            tooltip_dismiss: String::from("Dismiss"),
            no_data: String::from("No data available"),
            no_match: String::from("No matching data"),
            loading: String::from("Loading chart"),
            error: String::from("The data couldn't be fetched"),
            x_formatter: Arc::new(default_formatter),
            y_formatter: Arc::new(default_formatter),
        }
    }
}

/// Integers print without a fractional part, everything else as-is.
pub fn default_formatter(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
