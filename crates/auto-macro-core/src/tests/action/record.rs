use crate::{ActionRecord, KeySymbol, MouseButton, NamedKey};

use serde_json::json;

/// WHAT: Records serialize with `type` and `timestamp` fields
/// WHY: The persisted format is read by other tools and older versions
#[test]
fn given_click_record_when_serializing_then_documented_field_names() {
    // Given: A left press
    let record = ActionRecord::MouseClick {
        t: 1.25,
        x: 10,
        y: 20,
        button: MouseButton::Left,
        pressed: true,
    };

    // When: Serializing
    let value = serde_json::to_value(&record).unwrap();

    // Then: Matches the documented shape
    assert_eq!(
        value,
        json!({
            "type": "mouse_click",
            "timestamp": 1.25,
            "x": 10,
            "y": 20,
            "button": "left",
            "pressed": true
        })
    );
}

/// WHAT: Legacy button strings are accepted
/// WHY: Older saved macros write `Button.left`
#[test]
fn given_legacy_button_text_when_deserializing_then_button_parsed() {
    // Given: A legacy click record
    let value = json!({
        "type": "mouse_click",
        "timestamp": 0.1,
        "x": 0,
        "y": 0,
        "button": "Button.right",
        "pressed": false
    });

    // When: Deserializing
    let record: ActionRecord = serde_json::from_value(value).unwrap();

    // Then: Right button release
    assert!(matches!(
        record,
        ActionRecord::MouseClick {
            button: MouseButton::Right,
            pressed: false,
            ..
        }
    ));
}

/// WHAT: Keys serialize as plain strings
/// WHY: Human-diffable files
#[test]
fn given_key_records_when_serializing_then_key_is_string() {
    // Given: A named and a character key press
    let named = ActionRecord::KeyPress {
        t: 0.0,
        key: KeySymbol::Named(NamedKey::Escape),
    };
    let ch = ActionRecord::KeyRelease {
        t: 0.3,
        key: KeySymbol::Char('x'),
    };

    // When/Then: Strings in the key field
    assert_eq!(serde_json::to_value(&named).unwrap()["key"], json!("esc"));
    assert_eq!(serde_json::to_value(&ch).unwrap()["key"], json!("x"));
    assert_eq!(ch.kind(), "key_release");
}
