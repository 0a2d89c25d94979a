//! Axis titles shown outside the plot.
use crate::scene::{AxisKind, Scene};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisTitles {
    /// Titles of the axes drawn vertically: y when upright, x when inverted.
    pub vertical: Vec<String>,
    pub horizontal: Vec<String>,
}

#[derive(Debug, Default)]
pub struct AxisTitlesCoordinator {
    state: Store<AxisTitles>,
}

impl AxisTitlesCoordinator {
    pub fn store(&self) -> &Store<AxisTitles> {
        &self.state
    }

    pub fn titles(&self) -> AxisTitles {
        self.state.get()
    }

    pub fn refresh(&mut self, scene: &Scene) {
        let vertical_kind = if scene.inverted { AxisKind::X } else { AxisKind::Y };
        let mut titles = AxisTitles::default();
        for axis in scene.axes.iter().filter(|a| a.visible) {
            let Some(title) = axis.title.as_ref().filter(|t| !t.is_empty()) else {
                continue;
            };
            if axis.kind == vertical_kind {
                titles.vertical.push(title.clone());
            } else {
                titles.horizontal.push(title.clone());
            }
        }
        self.state.set(titles);
    }
}
