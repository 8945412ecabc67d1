use crate::{
    BindingTable, HotkeyAction, HotkeyBindings, HotkeyController, HotkeyTarget, InputHub,
    KeySymbol, MacroManager, Mode, NamedKey,
    tests::support::{RecordingSink, key_press, key_release, wait_until},
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Default)]
struct ActionLogTarget {
    seen: Mutex<Vec<HotkeyAction>>,
}

impl ActionLogTarget {
    fn seen(&self) -> Vec<HotkeyAction> {
        self.seen.lock().unwrap().clone()
    }
}

impl HotkeyTarget for ActionLogTarget {
    fn on_hotkey(&self, action: HotkeyAction) {
        self.seen.lock().unwrap().push(action);
    }
}

/// WHAT: `with` replaces an action's previous key
/// WHY: At most one key per action in a table
#[test]
fn given_binding_when_rebinding_same_action_then_old_key_unbound() {
    // Given: F9 bound to ToggleRecord
    let table = HotkeyBindings::new().with("F9", HotkeyAction::ToggleRecord);

    // When: Binding F6 to the same action
    let table = table.with("F6", HotkeyAction::ToggleRecord);

    // Then: Only F6 maps to it
    assert_eq!(table.action_for(&KeySymbol::parse("f9")), None);
    assert_eq!(
        table.action_for(&KeySymbol::parse("F6")),
        Some(HotkeyAction::ToggleRecord)
    );
    assert_eq!(table.keys().len(), 1);
}

/// WHAT: Bound presses reach the target, unbound keys and releases do not
/// WHY: Unmapped keys pass through untouched
#[test]
fn given_controller_when_keys_pressed_then_only_bound_presses_dispatched() {
    // Given: A controller with F9/F10 bindings
    let hub = InputHub::new();
    let target = Arc::new(ActionLogTarget::default());
    let table = BindingTable::new(
        HotkeyBindings::new()
            .with("F9", HotkeyAction::ToggleRecord)
            .with("F10", HotkeyAction::TogglePlayback),
    );
    let mut controller = HotkeyController::spawn(&hub, table, target.clone()).unwrap();

    // When: Pressing a letter, F9 (release too) and F10
    hub.publish(key_press("a"));
    hub.publish(key_press("F9"));
    hub.publish(key_release("F9"));
    hub.publish(key_press("f10"));

    // Then: Exactly the two bound actions, in order
    assert!(wait_until(Duration::from_secs(2), || target.seen().len() == 2));
    controller.stop();
    assert_eq!(
        target.seen(),
        vec![HotkeyAction::ToggleRecord, HotkeyAction::TogglePlayback]
    );
    assert_eq!(hub.subscriber_count(), 0);
}

/// WHAT: Rebinding F9 to F6 moves the toggle to F6 only
/// WHY: After a rebind the old key must not toggle anything
#[test]
fn given_rebind_from_f9_to_f6_when_pressing_then_only_f6_toggles_recording() {
    // Given: A manager and controller with ToggleRecord on F9
    let hub = InputHub::new();
    let sink = RecordingSink::new();
    let table = BindingTable::new(HotkeyBindings::new().with("F9", HotkeyAction::ToggleRecord));
    let manager = Arc::new(MacroManager::new(
        Arc::new(hub.clone()),
        sink.factory(),
        table.clone(),
    ));
    let controller = HotkeyController::spawn(&hub, table, manager.clone()).unwrap();

    // When: Rebinding to F6, then pressing F9
    controller.set_hotkey(HotkeyAction::ToggleRecord, NamedKey::F6);
    hub.publish(key_press("F9"));
    std::thread::sleep(Duration::from_millis(50));

    // Then: F9 did nothing
    assert_eq!(manager.mode(), Mode::Idle);

    // When: Pressing F6 twice
    hub.publish(key_press("F6"));
    assert!(wait_until(Duration::from_secs(2), || manager.mode() == Mode::Recording));
    hub.publish(key_press("F6"));

    // Then: Idle -> Recording -> Idle, and F6 was never recorded
    assert!(wait_until(Duration::from_secs(2), || manager.mode() == Mode::Idle));
    assert!(manager.current_log().is_empty());
    assert_eq!(
        controller.bindings().key_for(HotkeyAction::ToggleRecord),
        Some(&KeySymbol::Named(NamedKey::F6))
    );
}

/// WHAT: Dropping the controller unsubscribes it
/// WHY: No listener may outlive its owner
#[test]
fn given_controller_when_dropped_then_unsubscribed() {
    // Given: A running controller
    let hub = InputHub::new();
    let target = Arc::new(ActionLogTarget::default());
    let controller =
        HotkeyController::spawn(&hub, BindingTable::default(), target.clone()).unwrap();
    assert_eq!(hub.subscriber_count(), 1);

    // When: Dropping it
    drop(controller);

    // Then: No subscribers remain
    assert_eq!(hub.subscriber_count(), 0);
}
