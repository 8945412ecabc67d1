use crate::{KeySymbol, NamedKey};

/// WHAT: Named keys parse case-insensitively
/// WHY: Hotkey names come from free-form config strings like "F9" or "f9"
#[test]
fn given_mixed_case_function_key_when_parsing_then_named_key() {
    // Given: The same key written three ways
    let inputs = ["F9", "f9", " F9 "];

    // When: Parsing each
    let parsed: Vec<KeySymbol> = inputs.iter().map(|s| KeySymbol::parse(s)).collect();

    // Then: All resolve to the F9 named key
    for key in parsed {
        assert_eq!(key, KeySymbol::Named(NamedKey::F9));
    }
}

/// WHAT: Legacy `Key.` prefix is stripped
/// WHY: Older saved macros store named keys as `Key.shift`
#[test]
fn given_legacy_prefixed_name_when_parsing_then_named_key() {
    // Given/When: A legacy named key
    let key = KeySymbol::parse("Key.shift");

    // Then: Resolves to left shift
    assert_eq!(key, KeySymbol::Named(NamedKey::ShiftLeft));
}

/// WHAT: Aliases map to the canonical named key
/// WHY: Config files use escape/esc, control/ctrl, return/enter interchangeably
#[test]
fn given_aliases_when_parsing_then_same_named_key() {
    // Given/When/Then: Each alias pair resolves identically
    assert_eq!(KeySymbol::parse("escape"), KeySymbol::parse("esc"));
    assert_eq!(KeySymbol::parse("Control"), KeySymbol::parse("ctrl"));
    assert_eq!(KeySymbol::parse("return"), KeySymbol::parse("enter"));
    assert_eq!(KeySymbol::parse("PageUp"), KeySymbol::Named(NamedKey::PageUp));
}

/// WHAT: Single characters become Char symbols
/// WHY: Printable keys are replayed as literal characters
#[test]
fn given_single_character_when_parsing_then_char_symbol() {
    // Given/When: Parse a letter and a digit
    let letter = KeySymbol::parse("a");
    let digit = KeySymbol::parse("7");

    // Then: Both are Char
    assert_eq!(letter, KeySymbol::Char('a'));
    assert_eq!(digit, KeySymbol::Char('7'));
}

/// WHAT: Unknown names are kept verbatim as Raw
/// WHY: Unrecognized symbols must never be silently dropped
#[test]
fn given_unknown_name_when_parsing_then_raw_symbol_keeps_text() {
    // Given/When: A key name outside the fixed set
    let key = KeySymbol::parse("media_play_pause");

    // Then: Raw with the original text, displayed unchanged
    assert!(key.is_raw());
    assert_eq!(key.to_string(), "media_play_pause");
}

/// WHAT: Every named key survives display then parse
/// WHY: Saved logs store keys by their display name
#[test]
fn given_every_named_key_when_displayed_and_parsed_then_same_key() {
    for named in NamedKey::ALL {
        // Given: A named key symbol
        let key = KeySymbol::Named(named);

        // When: Displaying and parsing it back
        let reparsed = KeySymbol::parse(&key.to_string());

        // Then: Same key
        assert_eq!(reparsed, key, "round trip failed for {:?}", named);
    }
}

/// WHAT: Character keys compare case-insensitively for hotkey matching
/// WHY: Caps lock or shift must not break a hotkey bound to a letter
#[test]
fn given_upper_and_lower_char_when_comparing_ignoring_case_then_equal() {
    // Given: Upper and lower case of the same letter
    let upper = KeySymbol::Char('Q');
    let lower = KeySymbol::Char('q');

    // When/Then: Equal ignoring case, but a different key is not
    assert!(upper.eq_ignore_case(&lower));
    assert!(!upper.eq_ignore_case(&KeySymbol::Char('w')));
    assert!(!upper.eq_ignore_case(&KeySymbol::Named(NamedKey::F1)));
}

/// WHAT: Text that names a key never becomes a raw symbol
/// WHY: A raw "f9" would save as "f9" and load back as the named F9
#[test]
fn given_key_like_text_when_parsed_then_symbol_survives_json_unchanged() {
    // Given: Text for a named key, a character and an unknown key
    let inputs = ["f9", "Key.esc", "a", "media_next", "rdev:Unknown(65)"];

    for text in inputs {
        // When: Parsing and sending the symbol through JSON
        let key = KeySymbol::parse(text);
        let json = serde_json::to_string(&key).unwrap();
        let back: KeySymbol = serde_json::from_str(&json).unwrap();

        // Then: Identical symbol, raw only for the unknown ones
        assert_eq!(back, key, "input {:?}", text);
        assert_eq!(key.is_raw(), text == "media_next" || text.starts_with("rdev:"));
    }
    assert_eq!(KeySymbol::parse("f9"), KeySymbol::Named(NamedKey::F9));
}
