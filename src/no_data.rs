//! Empty, no-match, loading and error detection.
use crate::context::ChartContext;
use crate::scene::Scene;
use crate::settings::ChartStatus;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    Loading,
    Error,
    /// No series carries a value.
    Empty,
    /// There is data, but everything is filtered out.
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoDataState {
    pub visible: bool,
    pub reason: Option<NoDataReason>,
    /// Label for the reason, taken from the chart labels.
    pub message: String,
}

#[derive(Debug, Default)]
pub struct NoDataCoordinator {
    state: Store<NoDataState>,
}

impl NoDataCoordinator {
    pub fn store(&self) -> &Store<NoDataState> {
        &self.state
    }

    pub fn state(&self) -> NoDataState {
        self.state.get()
    }

    pub fn refresh(&mut self, ctx: &ChartContext, scene: &Scene) {
        let reason = match ctx.settings.status {
            ChartStatus::Loading => Some(NoDataReason::Loading),
            ChartStatus::Error => Some(NoDataReason::Error),
            ChartStatus::Finished => data_reason(scene),
        };
        let labels = &ctx.settings.labels;
        let message = match reason {
            Some(NoDataReason::Loading) => labels.loading.clone(),
            Some(NoDataReason::Error) => labels.error.clone(),
            Some(NoDataReason::Empty) => labels.no_data.clone(),
            Some(NoDataReason::NoMatch) => labels.no_match.clone(),
            None => String::new(),
        };
        self.state.set(NoDataState {
            visible: reason.is_some(),
            reason,
            message,
        });
    }
}

fn data_reason(scene: &Scene) -> Option<NoDataReason> {
    let mut has_data = false;
    for (series_ref, series) in scene.series_refs() {
        if !series.kind.is_navigable() {
            continue;
        }
        for (_, point) in scene.point_refs(series_ref) {
            if point.y.is_none() {
                continue;
            }
            if series.visible && point.visible {
                return None;
            }
            has_data = true;
        }
    }
    Some(if has_data {
        NoDataReason::NoMatch
    } else {
        NoDataReason::Empty
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChartEngine;
    use crate::headless::HeadlessEngine;
    use crate::options::{ChartOptions, DataPoint, SeriesOptions};
    use crate::settings::{ChartHandlers, ChartSettings};

    fn refresh(series: Vec<SeriesOptions>, status: ChartStatus) -> NoDataState {
        let engine = HeadlessEngine::new(&ChartOptions {
            series,
            ..ChartOptions::default()
        });
        let settings = ChartSettings {
            status,
            ..ChartSettings::default()
        };
        let mut ctx = ChartContext::new(settings, ChartHandlers::default());
        ctx.refresh(engine.scene());
        let mut no_data = NoDataCoordinator::default();
        no_data.refresh(&ctx, engine.scene());
        no_data.state()
    }

    #[test]
    fn visible_data_hides_the_overlay() {
        let state = refresh(vec![SeriesOptions::line([[1.0, 1.0]])], ChartStatus::Finished);
        assert!(!state.visible);
        assert_eq!(state.reason, None);
    }

    #[test]
    fn gaps_and_thresholds_alone_are_empty() {
        let state = refresh(
            vec![
                SeriesOptions::line([DataPoint::gap(1.0)]),
                SeriesOptions::y_threshold(2.0),
            ],
            ChartStatus::Finished,
        );
        assert_eq!(state.reason, Some(NoDataReason::Empty));
        assert_eq!(state.message, "No data available");
    }

    #[test]
    fn hidden_data_is_no_match() {
        let state = refresh(
            vec![SeriesOptions::line([[1.0, 1.0]]).hidden()],
            ChartStatus::Finished,
        );
        assert_eq!(state.reason, Some(NoDataReason::NoMatch));
    }

    #[test]
    fn status_wins_over_data() {
        let state = refresh(vec![SeriesOptions::line([[1.0, 1.0]])], ChartStatus::Loading);
        assert_eq!(state.reason, Some(NoDataReason::Loading));
        let state = refresh(vec![], ChartStatus::Error);
        assert_eq!(state.reason, Some(NoDataReason::Error));
    }
}
