//! End-to-end acquisition scenarios on the controller
//!
//! These tests drive `start`/`stop`/`tick` by hand with a manual clock and
//! check the buffer, the counter and the CSV log against each other.

mod common;

use std::time::Duration;

use caliper_logger::acquisition::TickOutcome;
use caliper_logger::session::LogSink;
use caliper_logger::types::{AcquisitionState, SeriesEntry};
use common::builders::ControllerBuilder;
use common::mock_helpers::{RecordingPresenter, Step};
use common::{assert_float_eq, read_log_rows};

const TICK: Duration = Duration::from_millis(500);

#[test]
fn test_two_values_and_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctl, clock) = ControllerBuilder::new()
        .steps(&[Step::Value(10.01), Step::Value(10.02), Step::NoData])
        .build(dir.path());
    let mut ui = RecordingPresenter::default();

    ctl.start(&mut ui);
    for _ in 0..3 {
        clock.advance(TICK);
        ctl.tick(&mut ui);
    }

    let session = ctl.session();
    assert_eq!(session.buffer().reading_count(), 2);
    assert_eq!(session.buffer().len(), 2);
    assert_eq!(session.readings_count(), 2);
    assert_eq!(ui.counter, 2);

    let rows = read_log_rows(session.log_path());
    assert_eq!(rows.len(), 2);
    assert_float_eq(rows[0].1, 10.01, 1e-9);
    assert_float_eq(rows[1].1, 10.02, 1e-9);
}

#[test]
fn test_stop_start_leaves_one_gap_and_no_log_row() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctl, clock) = ControllerBuilder::new()
        .steps(&[Step::Value(1.0), Step::Value(2.0), Step::Value(3.0)])
        .build(dir.path());
    let mut ui = RecordingPresenter::default();

    ctl.start(&mut ui);
    clock.advance(TICK);
    ctl.tick(&mut ui);
    clock.advance(TICK);
    ctl.tick(&mut ui);

    clock.advance(TICK);
    ctl.stop(&mut ui);
    // Ticks while idle do nothing
    clock.advance(TICK);
    assert_eq!(ctl.tick(&mut ui), TickOutcome::Skipped);

    ctl.start(&mut ui);
    clock.advance(TICK);
    ctl.tick(&mut ui);

    let entries = ctl.session().buffer().entries();
    let kinds: Vec<bool> = entries.iter().map(SeriesEntry::is_gap).collect();
    assert_eq!(kinds, vec![false, false, true, false]);
    assert_eq!(entries[2].elapsed(), TICK * 3);

    assert_eq!(read_log_rows(ctl.session().log_path()).len(), 3);
    assert_eq!(ui.entries, entries.to_vec());
    assert_eq!(
        ui.states,
        vec![
            AcquisitionState::Running,
            AcquisitionState::Idle,
            AcquisitionState::Running
        ]
    );
    assert_eq!(ctl.transport().reads(), 3);
}

#[test]
fn test_error_on_second_tick_does_not_end_session() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctl, clock) = ControllerBuilder::new()
        .steps(&[Step::Value(5.0), Step::Fail, Step::Value(5.1)])
        .build(dir.path());
    let mut ui = RecordingPresenter::default();

    ctl.start(&mut ui);
    let outcomes: Vec<TickOutcome> = (0..3)
        .map(|_| {
            clock.advance(TICK);
            ctl.tick(&mut ui)
        })
        .collect();

    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Recorded(5.0),
            TickOutcome::Failed,
            TickOutcome::Recorded(5.1)
        ]
    );
    assert_eq!(ctl.state(), AcquisitionState::Running);
    assert_eq!(ui.errors.len(), 1);
    assert_eq!(ui.counter, 2);
    assert_eq!(ctl.stats().failures, 1);
    assert_eq!(read_log_rows(ctl.session().log_path()).len(), 2);
}

#[test]
fn test_log_rows_match_buffered_readings() {
    let dir = tempfile::tempdir().unwrap();
    let steps = [
        Step::Value(0.5),
        Step::NoData,
        Step::Fail,
        Step::Value(-0.25),
        Step::Value(12.345),
    ];
    let (mut ctl, clock) = ControllerBuilder::new().steps(&steps).build(dir.path());
    let mut ui = RecordingPresenter::default();

    ctl.start(&mut ui);
    for _ in 0..steps.len() {
        clock.advance(TICK);
        ctl.tick(&mut ui);
    }

    let buffered: Vec<_> = ctl.session().buffer().readings().copied().collect();
    let rows = read_log_rows(ctl.session().log_path());

    assert_eq!(buffered.len(), rows.len());
    for (reading, (timestamp, value)) in buffered.iter().zip(&rows) {
        assert_eq!(&reading.timestamp_string(), timestamp);
        assert_float_eq(reading.value, *value, 1e-9);
    }

    // Elapsed never decreases
    let entries = ctl.session().buffer().entries();
    assert!(entries.windows(2).all(|w| w[0].elapsed() <= w[1].elapsed()));
}

#[test]
fn test_failure_streak_alerts_once_and_keeps_polling() {
    let dir = tempfile::tempdir().unwrap();
    let mut steps = vec![Step::Fail; 4];
    steps.push(Step::Value(1.0));
    steps.extend([Step::Fail; 3]);
    let (mut ctl, clock) = ControllerBuilder::new()
        .steps(&steps)
        .alert_threshold(3)
        .build(dir.path());
    let mut ui = RecordingPresenter::default();

    ctl.start(&mut ui);
    for _ in 0..steps.len() {
        clock.advance(TICK);
        ctl.tick(&mut ui);
    }

    // First streak of 4 alerts at 3; the reset streak of 3 alerts again
    assert_eq!(ui.streaks, vec![3, 3]);
    assert_eq!(ctl.stats().longest_failure_streak, 4);
    assert!(ctl.state().is_running());
}

#[test]
fn test_log_names_never_collide() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Foo.csv"), "existing").unwrap();

    let second = LogSink::create_unique(dir.path(), "Foo").unwrap();
    let third = LogSink::create_unique(dir.path(), "Foo").unwrap();

    assert_eq!(second.path(), dir.path().join("Foo_2.csv"));
    assert_eq!(third.path(), dir.path().join("Foo_3.csv"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Foo.csv")).unwrap(),
        "existing"
    );
}

#[test]
fn test_log_directory_created_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let (ctl, _) = ControllerBuilder::new()
        .device_name("Bench")
        .build(&nested);

    let path = ctl.session().log_path();
    assert!(path.starts_with(&nested));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Bench_Measurements_"));
    assert!(read_log_rows(path).is_empty());
}
