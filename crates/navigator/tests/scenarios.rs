//! Golden recording and comparison runs on the simulated device

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};
use snapnav_navigator::simulated::{BackendEvent, Frame, SimulatedBackend};
use snapnav_navigator::{
    logging, Device, Firmware, NavError, Navigator, NavigatorConfig, Pacing, Scenario, Sleeper,
};
use tempfile::TempDir;

struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&mut self, _duration: Duration) {}
}

#[derive(Clone, Default)]
struct RecordingSleeper(Rc<RefCell<Vec<Duration>>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.0.borrow_mut().push(duration);
    }
}

fn frame(shade: u8, text: &[&str]) -> Frame {
    let img = RgbaImage::from_pixel(16, 8, Rgba([shade, shade, shade, 255]));
    Frame::from_image(&DynamicImage::ImageRgba8(img), text.iter().copied()).unwrap()
}

fn device(shades: &[u8]) -> SimulatedBackend {
    let frames = vec![
        frame(shades[0], &["Review", "transaction"]),
        frame(shades[1], &["Amount", "12 BTC"]),
        frame(shades[2], &["Approve"]),
    ];
    SimulatedBackend::new(frames).unwrap()
}

fn navigator(backend: SimulatedBackend, golden_run: bool) -> Navigator<SimulatedBackend> {
    let config = NavigatorConfig {
        golden_run,
        ..Default::default()
    };
    Navigator::for_firmware(backend, Firmware::new(Device::NanoSP, "1.1"), config)
        .unwrap()
        .with_sleeper(NoSleep)
}

const SIGN: &str = r#"
name: sign-tx
tags: [smoke]
instructions:
  - id: right_click
  - id: right_click
  - id: both_click
"#;

fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn golden_run_then_compare_run() {
    logging::init();
    let root = TempDir::new().unwrap();
    let scenario = Scenario::from_yaml(SIGN).unwrap();

    let mut recorder = navigator(device(&[10, 20, 30]), true);
    scenario.run(&mut recorder, root.path(), root.path()).unwrap();

    let golden = root.path().join("snapshots").join("nanosp").join("sign-tx");
    let temp = root.path().join("snapshots-tmp").join("nanosp").join("sign-tx");
    let expected = vec!["00000.png", "00001.png", "00002.png", "00003.png", "00004.png"];
    assert_eq!(png_names(&golden), expected);
    assert_eq!(png_names(&temp), expected);
    assert_eq!(
        recorder.backend().events(),
        &[BackendEvent::RightClick, BackendEvent::RightClick, BackendEvent::BothClick]
    );

    let mut checker = navigator(device(&[10, 20, 30]), false);
    scenario.run(&mut checker, root.path(), root.path()).unwrap();
}

#[test]
fn compare_run_detects_changed_screen() {
    let root = TempDir::new().unwrap();
    let scenario = Scenario::from_yaml(SIGN).unwrap();

    let mut recorder = navigator(device(&[10, 20, 30]), true);
    scenario.run(&mut recorder, root.path(), root.path()).unwrap();

    let mut checker = navigator(device(&[10, 99, 30]), false);
    let err = scenario.run(&mut checker, root.path(), root.path()).unwrap_err();
    assert!(matches!(err, NavError::SnapshotMismatch { index: 1, .. }), "{err}");
}

#[test]
fn compare_run_without_goldens_fails() {
    let root = TempDir::new().unwrap();
    let scenario = Scenario::from_yaml(SIGN).unwrap();

    let mut checker = navigator(device(&[10, 20, 30]), false);
    let err = scenario.run(&mut checker, root.path(), root.path()).unwrap_err();
    assert!(matches!(err, NavError::MissingGoldenDir { .. }));
    assert!(checker.backend().events().is_empty());
}

#[test]
fn until_text_scenario_reaches_approve_screen() {
    let root = TempDir::new().unwrap();
    let yaml = r#"
name: reach-approve
until_text:
  text: Approve
  ongoing:
    id: right_click
  validation:
    id: both_click
  timeout: 5
"#;
    let scenario = Scenario::from_yaml(yaml).unwrap();

    let mut recorder = navigator(device(&[1, 2, 3]), true);
    scenario.run(&mut recorder, root.path(), root.path()).unwrap();
    assert_eq!(
        recorder.backend().events(),
        &[BackendEvent::RightClick, BackendEvent::RightClick, BackendEvent::BothClick]
    );
    let golden = root.path().join("snapshots").join("nanosp").join("reach-approve");
    assert_eq!(png_names(&golden), vec!["00000.png", "00001.png", "00002.png"]);

    let mut checker = navigator(device(&[1, 2, 3]), false);
    scenario.run(&mut checker, root.path(), root.path()).unwrap();
}

#[test]
fn until_text_scenario_times_out_on_missing_text() {
    let root = TempDir::new().unwrap();
    let yaml = r#"
name: never-there
snapshots: false
until_text:
  text: Reject
  ongoing:
    id: right_click
  timeout: 0.01
"#;
    let scenario = Scenario::from_yaml(yaml).unwrap();
    let mut nav = navigator(device(&[1, 2, 3]), false);

    let err = scenario.run(&mut nav, root.path(), root.path()).unwrap_err();
    assert!(matches!(err, NavError::Timeout { .. }));
    assert_eq!(nav.backend().current_index(), 2);
}

#[test]
fn touch_device_rejects_button_instructions() {
    let root = TempDir::new().unwrap();
    let scenario = Scenario::from_yaml(SIGN).unwrap();
    let config = NavigatorConfig::golden();
    let mut nav = Navigator::for_firmware(device(&[1, 2, 3]), Firmware::new(Device::Stax, "1.0"), config)
        .unwrap()
        .with_sleeper(NoSleep);

    let err = scenario.run(&mut nav, root.path(), root.path()).unwrap_err();
    assert!(matches!(err, NavError::UnregisteredInstruction(_)));
}

#[test]
fn wait_instruction_sleeps_through_navigator_sleeper() {
    let yaml = r#"
name: long-wait
snapshots: false
instructions:
  - id: right_click
  - id: wait
    args: [30]
"#;
    let scenario = Scenario::from_yaml(yaml).unwrap();
    let sleeper = RecordingSleeper::default();
    let sleeps = sleeper.0.clone();
    let mut nav = Navigator::for_firmware(
        device(&[1, 2, 3]),
        Firmware::new(Device::NanoX, "2.2"),
        NavigatorConfig::default(),
    )
    .unwrap()
    .with_sleeper(sleeper);

    let root = TempDir::new().unwrap();
    scenario.run(&mut nav, root.path(), root.path()).unwrap();

    assert!(sleeps.borrow().contains(&Duration::from_secs(30)));
    assert_eq!(nav.backend().events(), &[BackendEvent::RightClick]);
}

#[test]
fn scenario_with_unrepresentable_pacing_is_rejected() {
    let mut scenario = Scenario::from_yaml(SIGN).unwrap();
    scenario.pacing = Pacing::new(1e20, 0.0, 0.0);
    let mut nav = navigator(device(&[1, 2, 3]), false);

    let root = TempDir::new().unwrap();
    let err = scenario.run(&mut nav, root.path(), root.path()).unwrap_err();
    assert!(matches!(err, NavError::InvalidConfig(_)));
    assert!(nav.backend().events().is_empty());
}
