use crate::CancelToken;

use std::time::{Duration, Instant};

/// WHAT: Cancelling from another thread wakes a long sleep at once
/// WHY: Playback waits must be interruptible immediately, not on a poll
#[test]
fn given_long_sleep_when_cancelled_then_wakes_promptly() {
    // Given: A token and a thread that cancels after 50ms
    let token = CancelToken::new();
    let remote = token.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    // When: Sleeping for 10 seconds
    let started = Instant::now();
    let cancelled = token.sleep(Duration::from_secs(10));

    // Then: Woken early and reported as cancelled
    assert!(cancelled);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(token.is_cancelled());
}

/// WHAT: Uncancelled sleep runs to its deadline
/// WHY: Timing must be preserved when nobody cancels
#[test]
fn given_uncancelled_token_when_sleeping_then_full_duration() {
    // Given: A fresh token
    let token = CancelToken::new();

    // When: Sleeping 30ms
    let started = Instant::now();
    let cancelled = token.sleep(Duration::from_millis(30));

    // Then: Not cancelled, slept at least the duration
    assert!(!cancelled);
    assert!(started.elapsed() >= Duration::from_millis(30));
}

/// WHAT: Cancel is idempotent and visible through every clone
/// WHY: Hotkey watcher, handle and worker all share one token
#[test]
fn given_clones_when_cancelled_twice_then_all_observe_cancellation() {
    // Given: Two clones
    let token = CancelToken::new();
    let clone = token.clone();

    // When: Cancelling twice
    token.cancel();
    clone.cancel();

    // Then: Both see it, and past deadlines return immediately
    assert!(token.is_cancelled());
    assert!(clone.is_cancelled());
    assert!(clone.sleep_until(Instant::now()));
}
