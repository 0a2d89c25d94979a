//! Interaction and state coordination for charts drawn by an external engine.
//!
//! - Groups points by x on every render and keeps hit-test rects for them
//! - Owns highlight state and restores it after the engine re-renders
//! - Pointer hover/click, keyboard navigation, tooltip pinning and legend visibility
//! - Reactive stores for the tooltip, legend, no-data overlay and axis titles
//!
//! Quick start:
//!
//! ```no_run
//! use iced_chart_core::{ChartApi, ChartOptions, ChartSettings, HeadlessEngine, SeriesOptions};
//!
//! let options = ChartOptions::builder()
//!     .with_x_title("x")
//!     .add_series(SeriesOptions::line([[1.0, 11.0], [2.0, 12.0]]).with_name("Line series 1"))
//!     .build()
//!     .unwrap();
//!
//! let mut api = ChartApi::new(HeadlessEngine::new(&options), ChartSettings::default());
//! api.on_load();
//! api.highlight_group(1.0).unwrap();
//! assert_eq!(api.tooltip().content.text(), "1Line series 111");
//! ```
pub mod a11y;
pub mod axis_titles;
pub mod chart_api;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod highlight;
pub mod keyboard;
pub mod legend;
pub mod message;
pub mod no_data;
pub mod options;
pub mod pointer;
pub mod scene;
pub mod settings;
pub mod store;
pub mod tooltip;

pub(crate) mod context;
pub(crate) mod derived;

// Iced re-exports.
pub use iced::Color;

// Re-exports of public types.
pub use a11y::{ApplicationState, Role};
pub use axis_titles::AxisTitles;
pub use chart_api::ChartApi;
pub use context::ChartContext;
pub use deferred::{Clock, Debounce, ManualClock, SystemClock};
pub use derived::{DerivedState, Group};
pub use engine::{ChartEngine, OverlayId, OverlayShape, StateAuthority};
pub use error::{ChartError, ChartWarning};
pub use headless::HeadlessEngine;
pub use keyboard::{FocusedState, KeyOutcome, Nav, NavKey};
pub use legend::{LegendItem, LegendMarker};
pub use message::ChartEvent;
pub use no_data::{NoDataReason, NoDataState};
pub use options::{ChartOptions, ChartOptionsBuilder, DataPoint, SeriesOptions};
pub use pointer::{HoverTarget, PointerAction};
pub use scene::{NodeId, PointRef, Scene, SeriesKind, SeriesRef, VisualState};
pub use settings::{
    ChartHandlers, ChartLabels, ChartSettings, ChartStatus, KeyboardSettings, LegendSettings,
    PointerSettings, TooltipPlacement, TooltipSettings, VisibilityMode,
};
pub use store::{Store, SubscriptionId};
pub use tooltip::{TooltipAnchors, TooltipContent, TooltipItem, TooltipState};
