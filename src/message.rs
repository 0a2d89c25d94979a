use iced::Point;
use iced::keyboard::{Key, Modifiers};

use crate::scene::PointRef;

#[derive(Debug, Clone, PartialEq)]
/// Events fed into [`ChartApi::update`](crate::ChartApi::update).
///
/// Point events come from the engine's per-point callbacks; pointer, keyboard and
/// focus events come from the host widget; legend events from the legend view.
pub enum ChartEvent {
    /// The engine reported the cursor entering a point.
    PointHover(PointRef),
    /// The engine reported the cursor leaving a point.
    PointLeave(PointRef),
    /// Click on the chart, with the point under the cursor if any.
    ChartClick(Option<PointRef>),
    /// Cursor moved over the chart surface, in chart coordinates.
    PointerMoved(Point),
    /// Cursor left the chart container.
    PointerLeft,
    /// Cursor entered (`true`) or left the tooltip surface.
    TooltipHover(bool),
    /// The tooltip's dismiss button was pressed.
    DismissTooltip,
    KeyPressed { key: Key, modifiers: Modifiers },
    /// The host's keyboard modifiers changed. Shift or the command key held during
    /// a legend press makes it a multi-select.
    ModifiersChanged(Modifiers),
    /// The application region gained keyboard focus.
    FocusGained,
    /// The application region lost keyboard focus.
    FocusLost,
    /// A legend item was pressed. `multi` toggles it alone instead of isolating it;
    /// it is implied while a multi-select modifier is held.
    LegendSelect { id: String, multi: bool },
    LegendHover(String),
    LegendLeave,
}
