use portfolio_core::config::DesktopConfig;
use portfolio_core::desktop::{
    Catalog, Desktop, DesktopHandle, FocusOutcome, LoadStage, OpenOutcome, Section,
    WindowControl,
};
use portfolio_core::logger::{LogCapture, Logger};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn desktop() -> (Desktop, LogCapture) {
    let (logger, capture) = Logger::capture("desktop-test");
    let desktop = Desktop::new(
        Arc::new(Catalog::builtin()),
        &DesktopConfig::default(),
        logger,
    );
    (desktop, capture)
}

fn sections(desktop: &Desktop, id: &str) -> Vec<Section> {
    desktop.window(id).unwrap().revealed_sections().to_vec()
}

fn stage(desktop: &Desktop, id: &str) -> LoadStage {
    desktop.window(id).unwrap().load_stage()
}

#[test]
fn every_catalog_project_starts_closed() {
    let (desktop, _) = desktop();
    let snapshot = desktop.snapshot();
    assert_eq!(snapshot.windows.len(), 3);
    assert!(snapshot.windows.values().all(|window| {
        !window.is_open && window.load_stage == LoadStage::Closed && window.revealed_sections.is_empty()
    }));
    assert!(snapshot.stacking_order().is_empty());
}

#[test]
fn double_tap_walks_through_staged_reveal() {
    let (mut desktop, _) = desktop();
    let t0 = Instant::now();

    assert_eq!(desktop.touch_end("tesla", t0), None);
    assert_eq!(
        desktop.touch_end("tesla", t0 + ms(120)),
        Some(OpenOutcome::Opened { z_order: 1 })
    );
    let opened = t0 + ms(120);
    assert_eq!(stage(&desktop, "tesla"), LoadStage::Loading);

    desktop.tick(opened + ms(1_999));
    assert_eq!(stage(&desktop, "tesla"), LoadStage::Loading);

    desktop.tick(opened + ms(2_000));
    assert_eq!(stage(&desktop, "tesla"), LoadStage::Revealing);
    assert_eq!(sections(&desktop, "tesla"), vec![Section::Title]);

    desktop.tick(opened + ms(2_500));
    assert_eq!(
        sections(&desktop, "tesla"),
        vec![Section::Title, Section::Subtitle]
    );

    let mut t = opened + ms(2_500);
    while t < opened + ms(4_500) {
        t += ms(100);
        desktop.tick(t);
        let revealed = sections(&desktop, "tesla");
        assert_eq!(revealed.as_slice(), &Section::ORDER[..revealed.len()]);
    }
    assert_eq!(stage(&desktop, "tesla"), LoadStage::Ready);
    assert_eq!(sections(&desktop, "tesla"), Section::ORDER.to_vec());
    assert_eq!(desktop.next_deadline(), None);
}

#[test]
fn slow_taps_do_not_open() {
    let (mut desktop, _) = desktop();
    let t0 = Instant::now();
    assert_eq!(desktop.touch_end("xblade", t0), None);
    assert_eq!(desktop.touch_end("xblade", t0 + ms(300)), None);
    assert_eq!(stage(&desktop, "xblade"), LoadStage::Closed);
    assert_eq!(
        desktop.touch_end("xblade", t0 + ms(500)),
        Some(OpenOutcome::Opened { z_order: 1 })
    );
}

#[test]
fn opening_twice_only_loads_once() {
    let (mut desktop, capture) = desktop();
    let t0 = Instant::now();
    assert_eq!(
        desktop.double_click("tesla", t0),
        OpenOutcome::Opened { z_order: 1 }
    );
    assert_eq!(desktop.double_click("tesla", t0), OpenOutcome::AlreadyOpen);
    assert_eq!(desktop.window("tesla").unwrap().z_order(), 1);

    let opened = capture
        .events()
        .into_iter()
        .filter(|event| event == "desktop.window_opened")
        .count();
    assert_eq!(opened, 1);

    desktop.tick(t0 + ms(10_000));
    assert_eq!(sections(&desktop, "tesla"), Section::ORDER.to_vec());
}

#[test]
fn z_order_counter_only_grows() {
    let (mut desktop, _) = desktop();
    let t0 = Instant::now();
    let OpenOutcome::Opened { z_order: first } = desktop.double_click("jobsculptor", t0) else {
        panic!("first window should open");
    };
    let OpenOutcome::Opened { z_order: second } = desktop.double_click("tesla", t0 + ms(10))
    else {
        panic!("second window should open");
    };
    assert!(second > first);

    assert_eq!(desktop.focus("tesla"), FocusOutcome::AlreadyFront);
    assert_eq!(desktop.window("tesla").unwrap().z_order(), second);

    assert_eq!(
        desktop.focus("jobsculptor"),
        FocusOutcome::Raised { z_order: 3 }
    );
    assert_eq!(
        desktop.snapshot().stacking_order(),
        vec!["tesla", "jobsculptor"]
    );

    assert_eq!(
        desktop.double_click("xblade", t0 + ms(20)),
        OpenOutcome::Opened { z_order: 4 }
    );
    assert_eq!(desktop.focus("jobsculptor"), FocusOutcome::Raised { z_order: 5 });
}

#[test]
fn focusing_a_closed_window_changes_nothing() {
    let (mut desktop, _) = desktop();
    assert_eq!(desktop.focus("xblade"), FocusOutcome::NotOpen);
    assert_eq!(desktop.focus("missing"), FocusOutcome::NotOpen);
    assert_eq!(desktop.window("xblade").unwrap().z_order(), 0);
}

#[test]
fn unknown_project_is_inert() {
    let (mut desktop, capture) = desktop();
    let before = desktop.snapshot();
    let t0 = Instant::now();
    assert_eq!(
        desktop.double_click("doom", t0),
        OpenOutcome::UnknownProject
    );
    assert_eq!(
        desktop.touch_end("doom", t0),
        Some(OpenOutcome::UnknownProject)
    );
    assert_eq!(desktop.snapshot(), before);
    assert!(desktop.window("doom").is_none());
    assert!(
        capture
            .events()
            .contains(&"desktop.unknown_project".to_string())
    );
}

#[test]
fn title_bar_controls_are_decorative() {
    let (mut desktop, capture) = desktop();
    let t0 = Instant::now();
    desktop.double_click("tesla", t0);
    desktop.tick(t0 + ms(5_000));
    let before = desktop.snapshot();

    desktop.minimize("tesla");
    desktop.maximize("tesla");
    desktop.close("tesla");
    desktop.window_control("tesla", WindowControl::Close);

    assert_eq!(desktop.snapshot(), before);
    assert_eq!(stage(&desktop, "tesla"), LoadStage::Ready);
    let controls = capture
        .entries()
        .into_iter()
        .filter(|entry| entry["event"] == "desktop.window_control")
        .map(|entry| entry["control"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(controls, vec!["minimize", "maximize", "close", "close"]);
}

#[test]
fn windows_reveal_independently() {
    let (mut desktop, _) = desktop();
    let t0 = Instant::now();
    desktop.double_click("tesla", t0);
    desktop.double_click("xblade", t0 + ms(1_000));

    desktop.tick(t0 + ms(2_600));
    assert_eq!(sections(&desktop, "tesla").len(), 2);
    assert_eq!(stage(&desktop, "xblade"), LoadStage::Loading);
    assert_eq!(desktop.next_deadline(), Some(t0 + ms(3_000)));

    desktop.tick(t0 + ms(5_500));
    assert_eq!(stage(&desktop, "tesla"), LoadStage::Ready);
    assert_eq!(sections(&desktop, "xblade").len(), 6);
}

#[test]
fn teardown_drops_pending_reveals() {
    let (mut desktop, _) = desktop();
    let t0 = Instant::now();
    desktop.double_click("tesla", t0);
    desktop.tick(t0 + ms(2_000));
    desktop.teardown();

    assert!(!desktop.has_pending());
    assert!(!desktop.tick(t0 + ms(10_000)));
    assert_eq!(sections(&desktop, "tesla"), vec![Section::Title]);
}

fn spawn_handle() -> DesktopHandle {
    let (logger, _) = Logger::capture("desktop-handle-test");
    let config = DesktopConfig::default();
    let desktop = Desktop::new(Arc::new(Catalog::builtin()), &config, logger);
    DesktopHandle::spawn(desktop, config.tick_interval)
}

#[tokio::test(start_paused = true)]
async fn handle_reveals_on_its_own_tick() {
    let handle = spawn_handle();
    let mut rx = handle.subscribe();

    assert_eq!(
        handle.double_click("tesla").await,
        OpenOutcome::Opened { z_order: 1 }
    );
    assert_eq!(
        rx.borrow_and_update().window("tesla").unwrap().load_stage,
        LoadStage::Loading
    );

    sleep(ms(2_025)).await;
    let snapshot = handle.snapshot().await;
    let tesla = snapshot.window("tesla").unwrap();
    assert_eq!(tesla.load_stage, LoadStage::Revealing);
    assert_eq!(tesla.revealed_sections, vec![Section::Title]);

    sleep(ms(2_500)).await;
    rx.changed().await.unwrap();
    let tesla = rx.borrow().window("tesla").unwrap().clone();
    assert_eq!(tesla.load_stage, LoadStage::Ready);
    assert_eq!(tesla.revealed_sections, Section::ORDER.to_vec());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_pending_reveals() {
    let handle = spawn_handle();
    handle.double_click("xblade").await;
    sleep(ms(2_025)).await;
    handle.shutdown().await;

    sleep(ms(5_000)).await;
    let xblade = handle.snapshot().await.window("xblade").unwrap().clone();
    assert_eq!(xblade.revealed_sections, vec![Section::Title]);
    assert_eq!(xblade.load_stage, LoadStage::Revealing);
}

#[tokio::test(start_paused = true)]
async fn handle_double_tap_and_focus() {
    let handle = spawn_handle();
    assert_eq!(handle.touch_end("jobsculptor").await, None);
    sleep(ms(100)).await;
    assert_eq!(
        handle.touch_end("jobsculptor").await,
        Some(OpenOutcome::Opened { z_order: 1 })
    );
    assert_eq!(
        handle.double_click("tesla").await,
        OpenOutcome::Opened { z_order: 2 }
    );
    assert_eq!(
        handle.focus("jobsculptor").await,
        FocusOutcome::Raised { z_order: 3 }
    );
    let before = handle.snapshot().await;
    handle.minimize("jobsculptor").await;
    handle.maximize("tesla").await;
    handle.close("tesla").await;
    handle
        .window_control("jobsculptor", WindowControl::Close)
        .await;
    assert_eq!(handle.snapshot().await, before);
    assert_eq!(
        handle.snapshot().await.stacking_order(),
        vec!["tesla", "jobsculptor"]
    );
}
