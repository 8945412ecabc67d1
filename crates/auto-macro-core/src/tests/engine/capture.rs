use crate::{
    ActionRecord, CaptureEngine, CaptureOptions, InputEvent, InputEventKind, InputHub, KeySymbol,
    LogSlot, MacroError, Mode, ModeCell, NamedKey, PlaybackEngine, PlaybackOptions,
    engine::{CaptureSession, CaptureStep},
    tests::support::{RecordingSink, key_press, key_release, moves_at, mouse_move, wait_until},
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

fn engine(hub: &InputHub) -> (Arc<ModeCell>, LogSlot, CaptureEngine) {
    let mode = Arc::new(ModeCell::new());
    let slot = LogSlot::new();
    let engine = CaptureEngine::new(Arc::clone(&mode), Arc::new(hub.clone()), slot.clone());
    (mode, slot, engine)
}

/// WHAT: Timestamps never decrease even when arrival stamps go backwards
/// WHY: Logs must be non-decreasing in append order by construction
#[test]
fn given_out_of_order_arrivals_when_accepting_then_timestamps_non_decreasing() {
    // Given: A session and events stamped 20ms, 10ms, 30ms after start
    let started = Instant::now();
    let mut session = CaptureSession::new(CaptureOptions::default(), started);
    let stamps = [20u64, 10, 30, 30, 5];

    // When: Accepting them in that order
    for (i, ms) in stamps.iter().enumerate() {
        let event = InputEvent {
            at: started + Duration::from_millis(*ms),
            kind: InputEventKind::MouseMove { x: i as i32, y: 0 },
        };
        assert_eq!(session.accept(event), CaptureStep::Appended);
    }

    // Then: All appended in order with non-decreasing t
    let log = session.into_log();
    assert_eq!(log.len(), stamps.len());
    let times: Vec<f64> = log.records().iter().map(ActionRecord::t).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]), "times: {:?}", times);
    assert!(times[0] >= 0.0);
}

/// WHAT: Every event kind published during a session lands in the log in order
/// WHY: Mixed mouse/keyboard streams share one ordered log
#[test]
fn given_mixed_events_when_recording_then_all_recorded_in_order() {
    // Given: A running capture session
    let hub = InputHub::new();
    let (mode, slot, engine) = engine(&hub);
    let mut handle = engine.start(CaptureOptions::default()).unwrap();
    assert_eq!(mode.get(), Mode::Recording);

    // When: Publishing a burst of events then stopping
    hub.publish(mouse_move(1, 2));
    hub.publish(InputEvent::now(InputEventKind::MouseButton {
        x: 1,
        y: 2,
        button: crate::MouseButton::Left,
        pressed: true,
    }));
    hub.publish(InputEvent::now(InputEventKind::MouseScroll {
        x: 1,
        y: 2,
        dx: 0,
        dy: -3,
    }));
    hub.publish(key_press("a"));
    hub.publish(key_release("a"));
    for i in 0..500 {
        hub.publish(mouse_move(i, i));
    }
    let log = handle.stop().unwrap();

    // Then: All 505 records in publish order, mode back to Idle, slot updated
    assert_eq!(log.len(), 505);
    let kinds: Vec<&str> = log.records().iter().take(5).map(ActionRecord::kind).collect();
    assert_eq!(
        kinds,
        ["mouse_move", "mouse_click", "mouse_scroll", "key_press", "key_release"]
    );
    assert!(matches!(log.records()[504], ActionRecord::MouseMove { x: 499, .. }));
    assert_eq!(mode.get(), Mode::Idle);
    assert_eq!(slot.get().len(), 505);
    assert_eq!(hub.subscriber_count(), 0);
}

/// WHAT: The stop hotkey ends the session and is not recorded
/// WHY: Replaying a log must not re-trigger the key that ended it
#[test]
fn given_stop_hotkey_when_pressed_then_session_ends_without_recording_it() {
    // Given: A session stopped by F9
    let hub = InputHub::new();
    let (mode, _slot, engine) = engine(&hub);
    let mut handle = engine
        .start(CaptureOptions::with_stop_hotkey(NamedKey::F9))
        .unwrap();

    // When: A move, then F9 pressed, then more input
    hub.publish(mouse_move(5, 5));
    hub.publish(key_press("f9"));
    assert!(wait_until(Duration::from_secs(2), || handle.is_finished()));
    hub.publish(mouse_move(6, 6));

    // Then: Only the move before F9 is recorded, everything is released
    let log = handle.wait().unwrap();
    assert_eq!(log.len(), 1);
    assert!(matches!(log.records()[0], ActionRecord::MouseMove { x: 5, y: 5, .. }));
    assert_eq!(mode.get(), Mode::Idle);
    assert_eq!(hub.subscriber_count(), 0);
}

/// WHAT: Ignored keys are dropped on press and release
/// WHY: Toggle hotkeys owned by other listeners must not leak into the log
#[test]
fn given_ignored_key_when_recording_then_press_and_release_skipped() {
    // Given: A session ignoring F10
    let hub = InputHub::new();
    let (_mode, _slot, engine) = engine(&hub);
    let options = CaptureOptions {
        stop_hotkey: None,
        ignored_keys: vec![KeySymbol::Named(NamedKey::F10)],
    };
    let mut handle = engine.start(options).unwrap();

    // When: F10 press/release around a letter
    hub.publish(key_press("F10"));
    hub.publish(key_press("b"));
    hub.publish(key_release("F10"));
    let log = handle.stop().unwrap();

    // Then: Only the letter
    assert_eq!(log.len(), 1);
    assert!(matches!(&log.records()[0], ActionRecord::KeyPress { key: KeySymbol::Char('b'), .. }));
}

/// WHAT: Stop is idempotent and returns the same log
/// WHY: Hotkey and explicit stop may race to end a session
#[test]
fn given_stopped_session_when_stopping_again_then_same_log() {
    // Given: A stopped session
    let hub = InputHub::new();
    let (_mode, _slot, engine) = engine(&hub);
    let mut handle = engine.start(CaptureOptions::default()).unwrap();
    hub.publish(mouse_move(1, 1));
    let first = handle.stop().unwrap();

    // When: Stopping again
    let second = handle.stop().unwrap();

    // Then: Identical log
    assert!(Arc::ptr_eq(&first, &second));
}

/// WHAT: Playback cannot start while recording, and recording continues
/// WHY: Mutual exclusion leaves the active engine untouched
#[test]
fn given_recording_when_playback_requested_then_already_active_and_recording_continues() {
    // Given: A recording session and a playback engine on the same mode
    let hub = InputHub::new();
    let (mode, _slot, engine) = engine(&hub);
    let mut handle = engine.start(CaptureOptions::default()).unwrap();
    let sink = RecordingSink::new();
    let playback = PlaybackEngine::new(Arc::clone(&mode), Arc::new(hub.clone()), sink.factory());

    // When: Starting playback
    let result = playback.play(moves_at(&[0.0]), PlaybackOptions::default());

    // Then: Rejected, still recording, nothing synthesized
    assert!(matches!(result, Err(MacroError::AlreadyActive { .. })));
    assert_eq!(mode.get(), Mode::Recording);
    hub.publish(mouse_move(3, 3));
    assert_eq!(handle.stop().unwrap().len(), 1);
    assert_eq!(sink.len(), 0);
}

/// WHAT: A second capture start while recording is rejected
/// WHY: One session at a time
#[test]
fn given_recording_when_starting_again_then_already_active() {
    // Given: A running capture
    let hub = InputHub::new();
    let (mode, _slot, engine) = engine(&hub);
    let mut handle = engine.start(CaptureOptions::default()).unwrap();

    // When: Starting again
    let result = engine.start(CaptureOptions::default());

    // Then: Rejected, one subscriber only
    assert!(matches!(result, Err(MacroError::AlreadyActive { .. })));
    assert_eq!(hub.subscriber_count(), 1);
    handle.stop().unwrap();
    assert_eq!(mode.get(), Mode::Idle);
}

/// WHAT: Closing the source ends the session cleanly
/// WHY: A dead OS listener must never leave the mode stuck in Recording
#[test]
fn given_source_closed_when_recording_then_session_ends_idle() {
    // Given: A running capture with one recorded move
    let hub = InputHub::new();
    let (mode, slot, engine) = engine(&hub);
    let mut handle = engine.start(CaptureOptions::default()).unwrap();
    hub.publish(mouse_move(1, 1));

    // When: The source goes away
    hub.close();

    // Then: Session ends on its own with the recorded move
    assert!(wait_until(Duration::from_secs(2), || mode.get() == Mode::Idle));
    assert_eq!(handle.wait().unwrap().len(), 1);
    assert_eq!(slot.get().len(), 1);
}

/// WHAT: Dropping the handle ends the recording session
/// WHY: An abandoned handle must not leave Mode stuck in Recording
#[test]
fn given_active_capture_when_handle_dropped_then_idle_and_unsubscribed() {
    // Given: A running capture with one recorded move
    let hub = InputHub::new();
    let (mode, slot, engine) = engine(&hub);
    let handle = engine.start(CaptureOptions::default()).unwrap();
    hub.publish(mouse_move(3, 3));

    // When: Dropping the handle without stopping
    drop(handle);

    // Then: Idle, unsubscribed, and the log still published
    assert!(wait_until(Duration::from_secs(2), || mode.get() == Mode::Idle));
    assert_eq!(hub.subscriber_count(), 0);
    assert!(wait_until(Duration::from_secs(2), || slot.get().len() == 1));
}
