use std::sync::{Arc, Mutex};
use std::time::Duration;

use iced::keyboard::Modifiers;
use iced_chart_core::{
    ChartApi, ChartEngine, ChartError, ChartEvent, ChartHandlers, ChartOptions, ChartSettings,
    ChartStatus, HeadlessEngine, ManualClock, NoDataReason, SeriesOptions, VisibilityMode,
};

fn series() -> Vec<SeriesOptions> {
    vec![
        SeriesOptions::line([[1.0, 1.0], [2.0, 2.0]]).with_name("a"),
        SeriesOptions::error_bar([(1.0, 0.5, 1.5)]),
        SeriesOptions::line([[1.0, 2.0], [2.0, 3.0]]).with_name("b"),
        SeriesOptions::y_threshold(1.5).with_id("limit"),
    ]
}

fn api_with(
    series: Vec<SeriesOptions>,
    settings: ChartSettings,
    handlers: ChartHandlers,
) -> (ChartApi<HeadlessEngine>, ManualClock) {
    let options = ChartOptions {
        series,
        ..ChartOptions::default()
    };
    let clock = ManualClock::default();
    let mut api = ChartApi::with_clock(
        HeadlessEngine::new(&options),
        settings,
        Arc::new(clock.clone()),
    )
    .with_handlers(handlers);
    api.on_load();
    (api, clock)
}

fn api() -> ChartApi<HeadlessEngine> {
    api_with(series(), ChartSettings::default(), ChartHandlers::default()).0
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn visible(api: &ChartApi<HeadlessEngine>) -> Vec<String> {
    api.legend_items()
        .into_iter()
        .filter(|item| item.visible)
        .map(|item| item.id)
        .collect()
}

fn select(api: &mut ChartApi<HeadlessEngine>, id: &str, multi: bool) {
    api.update(ChartEvent::LegendSelect {
        id: id.to_owned(),
        multi,
    });
}

#[test]
fn multi_toggle_round_trip_redraws_once_per_change() {
    let mut api = api();
    select(&mut api, "a", true);
    assert_eq!(api.engine().redraw_count(), 1);
    assert_eq!(visible(&api), ids(&["b", "limit"]));
    assert!(!api.engine().scene().series[1].visible);

    select(&mut api, "a", true);
    assert_eq!(api.engine().redraw_count(), 2);
    assert_eq!(visible(&api), ids(&["a", "b", "limit"]));
    assert!(api.engine().scene().series[1].visible);

    api.set_visible_items(&ids(&["a", "b", "limit"])).unwrap();
    assert_eq!(api.engine().redraw_count(), 2);
}

#[test]
fn plain_press_isolates_and_second_press_restores() {
    let mut api = api();
    select(&mut api, "b", false);
    assert_eq!(visible(&api), ids(&["b"]));
    select(&mut api, "b", false);
    assert_eq!(visible(&api), ids(&["a", "b", "limit"]));
}

#[test]
fn held_modifier_turns_a_press_into_multi_select() {
    let mut api = api();
    api.update(ChartEvent::ModifiersChanged(Modifiers::SHIFT));
    select(&mut api, "a", false);
    assert_eq!(visible(&api), ids(&["b", "limit"]));

    api.update(ChartEvent::ModifiersChanged(Modifiers::default()));
    select(&mut api, "b", false);
    assert_eq!(visible(&api), ids(&["b"]));
}

#[test]
fn unknown_items_are_rejected() {
    let mut api = api();
    assert_eq!(
        api.set_visible_items(&ids(&["a", "nope"])),
        Err(ChartError::UnknownItem(String::from("nope")))
    );
    assert_eq!(
        api.highlight_items(&ids(&["nope"])),
        Err(ChartError::UnknownItem(String::from("nope")))
    );
    select(&mut api, "nope", false);
    assert_eq!(api.engine().redraw_count(), 0);
    assert_eq!(visible(&api).len(), 3);
}

#[test]
fn hiding_everything_reports_no_match() {
    let mut api = api();
    assert!(!api.no_data().visible);

    api.set_visible_items(&[]).unwrap();
    let no_data = api.no_data();
    assert!(no_data.visible);
    assert_eq!(no_data.reason, Some(NoDataReason::NoMatch));
    assert_eq!(no_data.message, "No matching data");

    let mut settings = api.settings().clone();
    settings.status = ChartStatus::Loading;
    api.set_settings(settings);
    assert_eq!(api.no_data().reason, Some(NoDataReason::Loading));
}

#[test]
fn empty_series_report_no_data() {
    let (api, _) = api_with(
        vec![SeriesOptions::line(Vec::<[f64; 2]>::new()).with_name("a")],
        ChartSettings::default(),
        ChartHandlers::default(),
    );
    assert_eq!(api.no_data().reason, Some(NoDataReason::Empty));
    assert_eq!(api.no_data().message, "No data available");
}

#[test]
fn legend_hover_highlights_and_notifies() {
    let highlighted = Arc::new(Mutex::new(Vec::new()));
    let cleared = Arc::new(Mutex::new(0));
    let handlers = ChartHandlers {
        on_highlight: Some(Arc::new({
            let highlighted = Arc::clone(&highlighted);
            move |ids: &[String]| highlighted.lock().unwrap().push(ids.to_vec())
        })),
        on_clear_highlight: Some(Arc::new({
            let cleared = Arc::clone(&cleared);
            move || *cleared.lock().unwrap() += 1
        })),
        ..ChartHandlers::default()
    };
    let (mut api, clock) = api_with(series(), ChartSettings::default(), handlers);

    api.update(ChartEvent::LegendHover(String::from("b")));
    assert_eq!(*highlighted.lock().unwrap(), vec![ids(&["b"])]);
    let items = api.legend_items();
    assert!(items.iter().any(|i| i.id == "b" && i.highlighted));
    assert!(items.iter().any(|i| i.id == "a" && !i.highlighted));

    clock.advance(Duration::from_millis(300));
    api.tick();
    assert_eq!(api.legend_tooltip_store().get(), Some(String::from("b")));

    api.update(ChartEvent::LegendLeave);
    assert_eq!(*cleared.lock().unwrap(), 1);
    assert!(api.highlighted().is_empty());
    assert!(api.legend_items().iter().all(|i| !i.highlighted));
}

#[test]
fn controlled_mode_reports_without_applying() {
    let reported = Arc::new(Mutex::new(Vec::new()));
    let handlers = ChartHandlers {
        on_visible_items_change: Some(Arc::new({
            let reported = Arc::clone(&reported);
            move |ids: &[String]| reported.lock().unwrap().push(ids.to_vec())
        })),
        ..ChartHandlers::default()
    };
    let mut settings = ChartSettings::default();
    settings.legend.visibility_mode = VisibilityMode::Controlled;
    let (mut api, _) = api_with(series(), settings, handlers);

    select(&mut api, "limit", true);
    assert_eq!(*reported.lock().unwrap(), vec![ids(&["a", "b"])]);
    assert_eq!(api.engine().redraw_count(), 0);
    assert_eq!(visible(&api), ids(&["a", "b", "limit"]));

    let proposal = reported.lock().unwrap()[0].clone();
    api.set_visible_items(&proposal).unwrap();
    assert_eq!(visible(&api), ids(&["a", "b"]));
}

#[test]
fn hiding_the_tooltip_series_closes_the_tooltip() {
    let mut api = api();
    let point = api.engine().point(0, 1).unwrap();
    api.update(ChartEvent::PointHover(point));
    assert!(api.tooltip().visible);
    assert_eq!(api.highlighted(), ["a"]);

    api.set_visible_items(&ids(&["b", "limit"])).unwrap();
    assert!(!api.tooltip().visible);
    assert!(api.highlighted().is_empty());
}
