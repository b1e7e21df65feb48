#![cfg(feature = "test-fixtures")]

use firmware::config::Timings;
use firmware::fixtures::{self, BOARD_TIME, BoardHandles, GOLDEN_CODE, TestBoard};
use firmware::ui::{AccessOutcome, DoorScreen, ViewContent};
use firmware::{Controller, FatalError};

fn boot(handles: &BoardHandles) -> Controller<TestBoard> {
    Controller::boot(
        handles.peripherals(),
        fixtures::door_verifier(),
        Timings::default(),
    )
    .expect("boot")
}

fn poll_until_idle(controller: &mut Controller<TestBoard>, handles: &BoardHandles) {
    for _ in 0..1_000 {
        if controller.runtime().screen() == DoorScreen::Idle && handles.keypad.pending() == 0 {
            return;
        }
        controller.poll().expect("poll");
        handles.monotonic.advance(10);
    }
    panic!("door never settled");
}

#[test]
fn full_unlock_cycle_relocks() {
    let handles = BoardHandles::new(BOARD_TIME);
    let mut controller = boot(&handles);

    handles.keypad.type_keys(GOLDEN_CODE);
    for _ in 0..GOLDEN_CODE.len() {
        controller.poll().expect("poll");
    }
    assert_eq!(
        controller.runtime().screen(),
        DoorScreen::Result(AccessOutcome::Granted)
    );
    match handles.display.last().expect("frame").content {
        ViewContent::Result(result) => assert!(result.granted),
        other => panic!("unexpected view: {other:?}"),
    }

    poll_until_idle(&mut controller, &handles);
    assert_eq!(handles.solenoid.levels(), [false, true, false]);
}

#[test]
fn code_entered_after_timeout_starts_over() {
    let handles = BoardHandles::new(BOARD_TIME);
    let mut controller = boot(&handles);

    handles.keypad.type_keys("188");
    for _ in 0..3 {
        controller.poll().expect("poll");
    }
    handles.monotonic.advance(10_001);
    controller.poll().expect("poll");
    assert_eq!(controller.runtime().screen(), DoorScreen::Idle);

    handles.keypad.type_keys("439");
    for _ in 0..3 {
        controller.poll().expect("poll");
    }
    assert_eq!(controller.runtime().screen(), DoorScreen::Entering);
    assert!(!handles.solenoid.is_high());
}

#[test]
fn timezone_survives_a_power_cycle() {
    let handles = BoardHandles::new(BOARD_TIME);
    let mut controller = boot(&handles);
    handles.keypad.type_keys("ACCCCCCCCCCCCCCD");
    poll_until_idle(&mut controller, &handles);
    assert_eq!(controller.timezone().half_hours(), -14);

    let peripherals = controller.into_peripherals();
    let rebooted = Controller::<TestBoard>::boot(
        peripherals,
        fixtures::door_verifier(),
        Timings::default(),
    )
    .expect("reboot");
    assert_eq!(rebooted.timezone().half_hours(), -14);
    assert_eq!(rebooted.timezone().to_string(), "UTC-7");
}

#[test]
fn serial_sync_moves_the_code_window() {
    let handles = BoardHandles::new(BOARD_TIME);
    let mut controller = boot(&handles);

    handles.keypad.type_keys("A");
    controller.poll().expect("poll");
    handles.serial.send("2000000000\r\n");
    controller.poll().expect("poll");
    assert_eq!(handles.rtc.unix_time(), 2_000_000_000);

    handles.keypad.type_keys("D180040");
    for _ in 0..7 {
        controller.poll().expect("poll");
    }
    assert_eq!(
        controller.runtime().screen(),
        DoorScreen::Result(AccessOutcome::Granted)
    );
}

#[test]
fn run_returns_locked_on_clock_loss() {
    let handles = BoardHandles::new(BOARD_TIME);
    let mut controller = boot(&handles);
    handles.keypad.type_keys(GOLDEN_CODE);
    for _ in 0..GOLDEN_CODE.len() {
        controller.poll().expect("poll");
    }

    handles.rtc.disconnect();
    let error = controller.run();
    assert!(matches!(error, FatalError::Clock(_)));
    assert!(!handles.solenoid.is_high());
}
