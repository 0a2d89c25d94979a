use crate::derived::DerivedState;
use crate::error::ChartError;
use crate::scene::Scene;
use crate::settings::{ChartHandlers, ChartSettings};

/// Per-chart state shared by every controller.
///
/// One context exists per chart instance; controllers receive it by reference on
/// every call instead of reaching for anything global.
#[derive(Debug, Clone, Default)]
pub struct ChartContext {
    pub settings: ChartSettings,
    pub handlers: ChartHandlers,
    pub derived: DerivedState,
    pub is_pie: bool,
    pub has_columns: bool,
    pub inverted: bool,
    rendered: bool,
}

impl ChartContext {
    pub fn new(settings: ChartSettings, handlers: ChartHandlers) -> Self {
        Self {
            settings,
            handlers,
            ..Self::default()
        }
    }

    /// Rebuild derived state from the freshly rendered scene.
    pub fn refresh(&mut self, scene: &Scene) {
        self.derived = DerivedState::compute(scene);
        self.is_pie = scene.is_pie();
        self.has_columns = scene.has_columns();
        self.inverted = scene.inverted;
        self.rendered = true;
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Fails until the engine has rendered once.
    pub fn ensure_rendered(&self) -> Result<(), ChartError> {
        if self.rendered {
            Ok(())
        } else {
            Err(ChartError::NotRendered)
        }
    }

    /// Items moved by one page step, out of `count`.
    pub fn page_step(&self, count: usize) -> usize {
        ((count as f64 * self.settings.keyboard.page_fraction).round() as usize).max(1)
    }
}
