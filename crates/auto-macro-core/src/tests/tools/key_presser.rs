use crate::{
    DEFAULT_SEQUENCE_INTERVAL, KeyPresser, KeySymbol, NamedKey, PeriodicOutcome, PressMode,
    PresserSettings,
    tests::support::{RecordingSink, SinkCall, wait_until},
};

use std::time::{Duration, Instant};

/// WHAT: Continuous mode taps the key repeatedly
/// WHY: Each iteration is a press followed by a release
#[test]
fn given_continuous_mode_when_running_then_press_release_pairs() {
    // Given: A fast continuous presser on 'f'
    let sink = RecordingSink::new();
    let presser = KeyPresser::new(
        sink.factory(),
        PresserSettings {
            interval: Duration::from_millis(2),
            ..PresserSettings::default()
        },
    );

    // When: Running until a few taps happened
    presser.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || sink.len() >= 6));
    presser.stop().unwrap();

    // Then: Strictly alternating press/release of 'f', ending released
    let calls = sink.calls();
    assert_eq!(calls.len() % 2, 0);
    for pair in calls.chunks(2) {
        assert_eq!(pair[0], SinkCall::Key(KeySymbol::Char('f'), true));
        assert_eq!(pair[1], SinkCall::Key(KeySymbol::Char('f'), false));
    }
}

/// WHAT: Hold mode keeps the key down and releases it promptly on stop
/// WHY: Release must not wait for a polling interval
#[test]
fn given_hold_mode_when_stopped_then_released_immediately() {
    // Given: A presser holding shift
    let sink = RecordingSink::new();
    let shift = KeySymbol::Named(NamedKey::ShiftLeft);
    let presser = KeyPresser::new(
        sink.factory(),
        PresserSettings {
            key: shift.clone(),
            mode: PressMode::Hold,
            interval: Duration::from_millis(50),
        },
    );
    presser.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || sink.len() == 1));
    std::thread::sleep(Duration::from_millis(30));

    // When: Stopping
    let started = Instant::now();
    let report = presser.stop().unwrap().unwrap();

    // Then: One press and one release, quickly
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(report.outcome, PeriodicOutcome::Cancelled);
    assert_eq!(
        sink.calls(),
        vec![SinkCall::Key(shift.clone(), true), SinkCall::Key(shift, false)]
    );
}

/// WHAT: One-shot helpers press in order and release everything
/// WHY: press_once, send_sequence and type_text share the sink path
#[test]
fn given_text_when_typing_then_each_char_tapped_in_order() {
    // Given: A presser
    let sink = RecordingSink::new();
    let presser = KeyPresser::new(sink.factory(), PresserSettings::default());

    // When: Typing "hi" and pressing Enter once
    presser.type_text("hi", Duration::from_millis(1)).unwrap();
    presser
        .press_once(&KeySymbol::Named(NamedKey::Return), Duration::from_millis(1))
        .unwrap();

    // Then: h, i, enter each pressed and released
    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Key(KeySymbol::Char('h'), true),
            SinkCall::Key(KeySymbol::Char('h'), false),
            SinkCall::Key(KeySymbol::Char('i'), true),
            SinkCall::Key(KeySymbol::Char('i'), false),
            SinkCall::Key(KeySymbol::Named(NamedKey::Return), true),
            SinkCall::Key(KeySymbol::Named(NamedKey::Return), false),
        ]
    );
}

/// WHAT: Sequence keys are spaced by the requested interval
/// WHY: Callers pace key sequences for slow target applications
#[test]
fn given_default_interval_when_sending_sequence_then_keys_spaced() {
    // Given: A presser and three keys
    let sink = RecordingSink::new();
    let presser = KeyPresser::new(sink.factory(), PresserSettings::default());
    let keys = [KeySymbol::Char('a'), KeySymbol::Char('b'), KeySymbol::Char('c')];

    // When: Sending them at the default interval
    presser.send_sequence(&keys, DEFAULT_SEQUENCE_INTERVAL).unwrap();

    // Then: Consecutive presses are at least the interval apart
    let presses: Vec<Instant> = sink
        .timed_calls()
        .into_iter()
        .filter(|(_, call)| matches!(call, SinkCall::Key(_, true)))
        .map(|(at, _)| at)
        .collect();
    assert_eq!(presses.len(), 3);
    for pair in presses.windows(2) {
        assert!(pair[1] - pair[0] >= DEFAULT_SEQUENCE_INTERVAL);
    }
    assert_eq!(sink.len(), 6);
}
