use iced::Point;
use iced::keyboard::key::Named;
use iced::keyboard::{Key, Modifiers};
use iced_chart_core::{
    ChartApi, ChartEngine, ChartEvent, ChartOptions, ChartSettings, FocusedState, HeadlessEngine,
    Role, SeriesOptions,
};

fn api_with(options: ChartOptions, settings: ChartSettings) -> ChartApi<HeadlessEngine> {
    let mut api = ChartApi::new(HeadlessEngine::new(&options), settings);
    api.on_load();
    api.update(ChartEvent::FocusGained);
    api
}

fn api(series: Vec<SeriesOptions>) -> ChartApi<HeadlessEngine> {
    api_with(
        ChartOptions {
            series,
            ..ChartOptions::default()
        },
        ChartSettings::default(),
    )
}

fn two_lines() -> Vec<SeriesOptions> {
    vec![
        SeriesOptions::line([[1.0, 11.0], [2.0, 12.0], [3.0, 13.0]]).with_name("Line series 1"),
        SeriesOptions::line([[1.0, 21.0], [2.0, 22.0], [3.0, 23.0], [4.0, 24.0]])
            .with_name("Line series 2"),
    ]
}

fn press(api: &mut ChartApi<HeadlessEngine>, key: Named) {
    api.update(ChartEvent::KeyPressed {
        key: Key::Named(key),
        modifiers: Modifiers::default(),
    });
}

fn focused_point(api: &ChartApi<HeadlessEngine>) -> usize {
    let FocusedState::Point { point, .. } = api.focused() else {
        panic!("expected point focus, got {:?}", api.focused());
    };
    api.engine()
        .scene()
        .point_node(point)
        .map(|p| p.x as usize)
        .unwrap()
}

#[test]
fn page_keys_move_five_percent_and_clamp() {
    let mut api = api(vec![SeriesOptions::line(
        (0..1000).map(|i| [f64::from(i), f64::from(i % 7)]),
    )]);
    press(&mut api, Named::ArrowRight);
    assert_eq!(api.focused(), FocusedState::Group { x: 0.0 });
    press(&mut api, Named::ArrowDown);
    assert_eq!(focused_point(&api), 0);

    press(&mut api, Named::PageDown);
    assert_eq!(focused_point(&api), 50);
    press(&mut api, Named::PageDown);
    assert_eq!(focused_point(&api), 100);
    for _ in 0..20 {
        press(&mut api, Named::PageDown);
    }
    assert_eq!(focused_point(&api), 999);
    press(&mut api, Named::PageUp);
    assert_eq!(focused_point(&api), 949);
}

#[test]
fn home_and_end_jump_within_the_series() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    press(&mut api, Named::ArrowRight);
    press(&mut api, Named::ArrowUp);
    let start = api.focused();
    assert_eq!(focused_point(&api), 2);

    press(&mut api, Named::Home);
    assert_eq!(focused_point(&api), 1);
    press(&mut api, Named::End);
    assert_eq!(focused_point(&api), 4);
    press(&mut api, Named::Home);
    press(&mut api, Named::ArrowRight);
    assert_eq!(api.focused(), start);
}

#[test]
fn inverted_charts_move_along_x_with_up_and_down() {
    let mut api = api_with(
        ChartOptions {
            series: two_lines(),
            inverted: true,
            ..ChartOptions::default()
        },
        ChartSettings::default(),
    );
    press(&mut api, Named::ArrowDown);
    press(&mut api, Named::ArrowDown);
    assert_eq!(api.focused(), FocusedState::Group { x: 2.0 });

    press(&mut api, Named::ArrowRight);
    let first = api.engine().point(0, 1).unwrap();
    assert_eq!(
        api.focused(),
        FocusedState::Point {
            point: first,
            group: Some(2.0)
        }
    );
}

#[test]
fn right_to_left_swaps_horizontal_arrows() {
    let mut settings = ChartSettings::default();
    settings.keyboard.rtl = true;
    let mut api = api_with(
        ChartOptions {
            series: two_lines(),
            ..ChartOptions::default()
        },
        settings,
    );
    press(&mut api, Named::ArrowLeft);
    press(&mut api, Named::ArrowLeft);
    assert_eq!(api.focused(), FocusedState::Group { x: 2.0 });
    press(&mut api, Named::ArrowRight);
    assert_eq!(api.focused(), FocusedState::Group { x: 1.0 });
}

#[test]
fn command_modifiers_are_left_to_the_host() {
    let mut api = api(two_lines());
    api.update(ChartEvent::KeyPressed {
        key: Key::Named(Named::ArrowRight),
        modifiers: Modifiers::CTRL,
    });
    assert_eq!(api.focused(), FocusedState::Chart);
}

#[test]
fn enter_pins_and_escape_climbs() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    assert!(api.tooltip().visible);
    assert!(!api.application().expanded);

    press(&mut api, Named::Enter);
    assert!(api.tooltip().pinned);
    assert!(api.application().expanded);
    assert!(api.application().has_popup);

    press(&mut api, Named::Space);
    assert!(!api.tooltip().pinned);
    assert!(!api.application().expanded);

    press(&mut api, Named::Escape);
    assert_eq!(api.focused(), FocusedState::Chart);
    assert!(!api.tooltip().visible);
    assert_eq!(api.application().role, Role::Application);
    assert_eq!(api.application().label, "Chart");
}

fn group_center(api: &ChartApi<HeadlessEngine>, x: f64) -> Point {
    api.context()
        .derived
        .group_at(x)
        .map(|g| g.rect.center())
        .unwrap()
}

#[test]
fn enter_pins_the_focused_group_not_the_hovered_one() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    api.update(ChartEvent::PointerMoved(group_center(&api, 3.0)));
    assert_eq!(api.tooltip().x, Some(3.0));
    assert_eq!(api.focused(), FocusedState::Group { x: 1.0 });

    press(&mut api, Named::Enter);
    let tooltip = api.tooltip();
    assert!(tooltip.pinned);
    assert_eq!(tooltip.x, Some(1.0));
    assert_eq!(tooltip.point, None);
    assert!(api.application().expanded);

    press(&mut api, Named::Enter);
    assert!(!api.tooltip().pinned);
    assert!(api.tooltip().visible);
    assert!(!api.application().expanded);
}

#[test]
fn enter_reopens_a_dismissed_tooltip() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    api.update(ChartEvent::DismissTooltip);
    assert!(!api.tooltip().visible);

    press(&mut api, Named::Space);
    let tooltip = api.tooltip();
    assert!(tooltip.visible);
    assert!(tooltip.pinned);
    assert_eq!(tooltip.x, Some(1.0));
    assert!(api.application().expanded);
}

#[test]
fn enter_pins_the_focused_point() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    press(&mut api, Named::ArrowDown);
    let first = api.engine().point(0, 0).unwrap();

    press(&mut api, Named::Enter);
    let tooltip = api.tooltip();
    assert!(tooltip.pinned);
    assert_eq!(tooltip.point, Some(first));
    assert_eq!(api.highlighted(), ["Line series 1"]);
}

#[test]
fn every_move_is_announced() {
    let mut api = api(two_lines());
    let before = api.application().announcements;
    press(&mut api, Named::ArrowRight);
    assert_eq!(api.application().label, "1, 2 items");
    press(&mut api, Named::ArrowDown);
    assert_eq!(api.application().label, "1, Line series 1: 11");
    press(&mut api, Named::ArrowLeft);
    assert_eq!(api.focused(), FocusedState::Chart);
    assert_eq!(api.application().announcements, before + 3);

    press(&mut api, Named::F5);
    assert_eq!(api.application().announcements, before + 3);
}

#[test]
fn hidden_focus_target_falls_back_on_render() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    press(&mut api, Named::ArrowDown);
    let announcements = api.application().announcements;

    api.engine_mut().scene_mut().series[0].points[0].visible = false;
    api.on_render();
    assert_eq!(api.focused(), FocusedState::Group { x: 1.0 });
    assert_eq!(api.application().announcements, announcements + 1);
    assert_eq!(api.application().label, "1, 1 items");
}

#[test]
fn focus_highlight_survives_internal_redraw() {
    let mut api = api(two_lines());
    press(&mut api, Named::ArrowRight);
    press(&mut api, Named::ArrowRight);
    press(&mut api, Named::ArrowDown);
    assert_eq!(api.highlighted(), ["Line series 1"]);
    let before = api.engine().scene().clone();

    api.engine_mut().simulate_internal_redraw();
    api.on_render();
    assert_eq!(api.engine().scene(), &before);
    assert_eq!(focused_point(&api), 2);
}
