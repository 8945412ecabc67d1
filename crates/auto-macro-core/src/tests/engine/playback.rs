use crate::{
    ActionLog, ActionRecord, InputHub, KeySymbol, MacroError, Mode, ModeCell, NamedKey,
    PlaybackEngine, PlaybackOptions, PlaybackOutcome,
    tests::support::{
        RecordingSink, SinkCall, key_press, log_of, moves_at, unavailable_sinks, wait_until,
    },
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

fn engine(hub: &InputHub, sink: &RecordingSink) -> (Arc<ModeCell>, PlaybackEngine) {
    let mode = Arc::new(ModeCell::new());
    let engine = PlaybackEngine::new(Arc::clone(&mode), Arc::new(hub.clone()), sink.factory());
    (mode, engine)
}

fn options(speed: f64, repeat: u32) -> PlaybackOptions {
    PlaybackOptions {
        speed,
        repeat,
        cancel_hotkey: None,
    }
}

/// WHAT: Empty log is rejected without starting anything
/// WHY: Precondition errors are synchronous and leave Mode at Idle
#[test]
fn given_empty_log_when_playing_then_empty_log_error_and_idle() {
    // Given: An engine and an empty log
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (mode, engine) = engine(&hub, &sink);

    // When: Playing
    let result = engine.play(Arc::new(ActionLog::new()), options(1.0, 1));

    // Then: EmptyLog, Idle, no listener registered
    assert!(matches!(result, Err(MacroError::EmptyLog { .. })));
    assert_eq!(mode.get(), Mode::Idle);
    assert_eq!(hub.subscriber_count(), 0);
}

/// WHAT: Non-positive and non-finite speeds are rejected
/// WHY: Division by the speed must never produce infinite or negative waits
#[test]
fn given_invalid_speeds_when_playing_then_invalid_speed_error() {
    // Given: An engine and a one-record log
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (mode, engine) = engine(&hub, &sink);

    for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        // When: Playing at the bad speed
        let result = engine.play(moves_at(&[0.0]), options(speed, 1));

        // Then: InvalidSpeed, still Idle
        assert!(matches!(result, Err(MacroError::InvalidSpeed { .. })), "speed {}", speed);
        assert_eq!(mode.get(), Mode::Idle);
    }
}

/// WHAT: Speed 2.0 halves every gap
/// WHY: Records at [0, 1, 2]s must fire at about [0, 0.5, 1.0]s
#[test]
fn given_speed_two_when_playing_then_gaps_halved() {
    // Given: Records at 0.0, 1.0, 2.0
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (mode, engine) = engine(&hub, &sink);

    // When: Playing at double speed
    let started = Instant::now();
    let mut handle = engine.play(moves_at(&[0.0, 1.0, 2.0]), options(2.0, 1)).unwrap();
    let report = handle.wait().unwrap();

    // Then: Events at ~0, ~0.5, ~1.0 seconds (±20ms)
    assert_eq!(report.outcome, PlaybackOutcome::Completed);
    let timed = sink.timed_calls();
    assert_eq!(timed.len(), 3);
    for ((at, _), expected) in timed.iter().zip([0.0, 0.5, 1.0]) {
        let elapsed = at.duration_since(started).as_secs_f64();
        assert!(
            (elapsed - expected).abs() <= 0.020,
            "expected ~{}s, got {}s",
            expected,
            elapsed
        );
    }
    assert_eq!(mode.get(), Mode::Idle);
}

/// WHAT: Repeat 3 synthesizes 3N events in three passes
/// WHY: Each pass restarts its relative-time accumulator at zero
#[test]
fn given_repeat_three_when_playing_then_three_full_passes() {
    // Given: A 4-record log with small gaps
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (_mode, engine) = engine(&hub, &sink);
    let log = moves_at(&[0.0, 0.01, 0.02, 0.03]);

    // When: Playing three times
    let mut handle = engine.play(log, options(1.0, 3)).unwrap();
    let report = handle.wait().unwrap();

    // Then: 12 events, each pass in order
    assert_eq!(report.passes_completed, 3);
    assert_eq!(report.events_synthesized, 12);
    let expected: Vec<SinkCall> = (0..3)
        .flat_map(|_| (0..4).map(|i| SinkCall::Move(i, i)))
        .collect();
    assert_eq!(sink.calls(), expected);
}

/// WHAT: Cancelling during the wait before record k stops before k
/// WHY: Cancellation must interrupt the sleep, not wait it out
#[test]
fn given_long_gap_when_stopped_mid_wait_then_no_later_records_and_idle() {
    // Given: Records at 0s and 10s
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (mode, engine) = engine(&hub, &sink);
    let mut handle = engine.play(moves_at(&[0.0, 10.0]), options(1.0, 1)).unwrap();
    assert!(wait_until(Duration::from_secs(2), || sink.len() == 1));

    // When: Stopping during the 10s wait
    let stop_at = Instant::now();
    let report = handle.stop().unwrap();

    // Then: Returns quickly, second record never synthesized, Idle
    assert!(stop_at.elapsed() < Duration::from_millis(200));
    assert_eq!(report.outcome, PlaybackOutcome::Cancelled);
    assert_eq!(report.events_synthesized, 1);
    assert_eq!(sink.len(), 1);
    assert_eq!(mode.get(), Mode::Idle);
}

/// WHAT: The cancel hotkey stops playback and its listener goes away
/// WHY: No listener may outlive the mode it was registered for
#[test]
fn given_cancel_hotkey_when_pressed_then_playback_cancelled_and_unsubscribed() {
    // Given: Playback with an Escape cancel hotkey and a long gap
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (mode, engine) = engine(&hub, &sink);
    let opts = PlaybackOptions {
        speed: 1.0,
        repeat: 0,
        cancel_hotkey: Some(KeySymbol::Named(NamedKey::Escape)),
    };
    let mut handle = engine.play(moves_at(&[0.0, 5.0]), opts).unwrap();
    assert_eq!(hub.subscriber_count(), 1);

    // When: Escape pressed
    hub.publish(key_press("a"));
    hub.publish(key_press("esc"));

    // Then: Cancelled, listener removed, Idle
    let report = handle.wait().unwrap();
    assert_eq!(report.outcome, PlaybackOutcome::Cancelled);
    assert_eq!(hub.subscriber_count(), 0);
    assert_eq!(mode.get(), Mode::Idle);
}

/// WHAT: Keys and buttons held when playback is cancelled are released
/// WHY: Aborting between a press and its release must not leave it stuck
#[test]
fn given_held_key_when_cancelled_then_force_released() {
    // Given: Shift pressed at 0s, released only at 10s
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (_mode, engine) = engine(&hub, &sink);
    let shift = KeySymbol::Named(NamedKey::ShiftLeft);
    let log = log_of(vec![
        ActionRecord::KeyPress {
            t: 0.0,
            key: shift.clone(),
        },
        ActionRecord::KeyRelease {
            t: 10.0,
            key: shift.clone(),
        },
    ]);
    let mut handle = engine.play(log, options(1.0, 1)).unwrap();
    assert!(wait_until(Duration::from_secs(2), || sink.len() == 1));

    // When: Cancelling mid-wait
    let report = handle.stop().unwrap();

    // Then: Shift pressed then released once
    assert_eq!(report.inputs_released, 1);
    assert_eq!(
        sink.calls(),
        vec![SinkCall::Key(shift.clone(), true), SinkCall::Key(shift, false)]
    );
}

/// WHAT: Decreasing timestamps are played back literally with zero wait
/// WHY: Loaded logs are not validated for monotonicity
#[test]
fn given_decreasing_timestamps_when_playing_then_no_wait_and_all_played() {
    // Given: Records at 0.2, 0.1, 0.0
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (_mode, engine) = engine(&hub, &sink);

    // When: Playing
    let started = Instant::now();
    let mut handle = engine.play(moves_at(&[0.2, 0.1, 0.0]), options(1.0, 1)).unwrap();
    let report = handle.wait().unwrap();

    // Then: All three, total time close to the first gap only
    assert_eq!(report.events_synthesized, 3);
    assert!(started.elapsed() < Duration::from_millis(400));
}

/// WHAT: A record the backend rejects is skipped, the rest still play
/// WHY: One unmappable key must not end the session
#[test]
fn given_failing_record_when_playing_then_skipped_and_counted() {
    // Given: A sink that rejects 'x'
    let hub = InputHub::new();
    let sink = RecordingSink::failing_on('x');
    let (mode, engine) = engine(&hub, &sink);
    let log = log_of(vec![
        ActionRecord::KeyPress {
            t: 0.0,
            key: KeySymbol::Char('x'),
        },
        ActionRecord::MouseMove { t: 0.0, x: 7, y: 7 },
    ]);

    // When: Playing
    let report = engine.play(log, options(1.0, 1)).unwrap().wait().unwrap();

    // Then: One failure, one success, Completed
    assert_eq!(report.outcome, PlaybackOutcome::Completed);
    assert_eq!(report.events_failed, 1);
    assert_eq!(report.events_synthesized, 1);
    assert_eq!(sink.calls(), vec![SinkCall::Move(7, 7)]);
    assert_eq!(mode.get(), Mode::Idle);
}

/// WHAT: Missing synthesis backend ends the session as Failed and Idle
/// WHY: Runtime errors must never leave Mode stuck in Playing
#[test]
fn given_unavailable_backend_when_playing_then_failed_and_idle() {
    // Given: An engine whose sink cannot be created
    let hub = InputHub::new();
    let mode = Arc::new(ModeCell::new());
    let engine = PlaybackEngine::new(Arc::clone(&mode), Arc::new(hub), unavailable_sinks());

    // When: Playing
    let report = engine
        .play(moves_at(&[0.0]), options(1.0, 1))
        .unwrap()
        .wait()
        .unwrap();

    // Then: Failed, Idle
    assert_eq!(report.outcome, PlaybackOutcome::Failed);
    assert_eq!(mode.get(), Mode::Idle);
}

/// WHAT: Dropping the handle of an unbounded session ends it
/// WHY: An abandoned handle must not leave Mode stuck in Playing
#[test]
fn given_unbounded_playback_when_handle_dropped_then_idle_and_unsubscribed() {
    // Given: An unbounded playback with a cancel hotkey listener
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let (mode, engine) = engine(&hub, &sink);
    let handle = engine
        .play(
            moves_at(&[0.0, 0.01]),
            PlaybackOptions {
                speed: 1.0,
                repeat: 0,
                cancel_hotkey: Some(KeySymbol::Named(NamedKey::Escape)),
            },
        )
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || sink.len() >= 2));

    // When: Dropping the handle without stopping
    drop(handle);

    // Then: Idle, listener gone, and a new session can start
    assert!(wait_until(Duration::from_secs(2), || mode.get() == Mode::Idle));
    assert!(wait_until(Duration::from_secs(2), || hub.subscriber_count() == 0));
    let mut next = engine.play(moves_at(&[0.0]), options(1.0, 1)).unwrap();
    assert_eq!(next.wait().unwrap().outcome, PlaybackOutcome::Completed);
}
