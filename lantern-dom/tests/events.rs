use lantern_dom::{Document, Element, Event, EventKind, EventType, Key, Modifiers, PathEntry};

fn nested_document() -> Document {
    let mut doc = Document::new();
    doc.mount(
        Element::box_().id("overlay").child(
            Element::box_().id("panel").child(
                Element::box_()
                    .id("row")
                    .child(Element::button("Fire").id("btn").action("fire")),
            ),
        ),
    );
    doc
}

// ============================================================================
// Event Paths
// ============================================================================

#[test]
fn test_click_path_is_target_first() {
    let doc = nested_document();
    let event = doc.click("btn").unwrap();

    let ids: Vec<&str> = event.path.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["btn", "row", "panel", "overlay", "body"]);
    assert_eq!(event.kind, EventKind::Click);
}

#[test]
fn test_click_path_carries_actions() {
    let doc = nested_document();
    let event = doc.click("btn").unwrap();

    assert_eq!(event.target().unwrap().action.as_deref(), Some("fire"));
    // Ancestors declare no action
    assert!(event.path[1..].iter().all(|e| e.action.is_none()));
}

#[test]
fn test_click_unknown_target() {
    let doc = nested_document();
    assert!(doc.click("missing").is_none());
}

#[test]
fn test_passes_through() {
    let doc = nested_document();
    let event = doc.click("row").unwrap();

    assert!(event.passes_through("overlay"));
    assert!(!event.passes_through("btn"));
    assert_eq!(event.position_of("panel"), Some(1));
}

#[test]
fn test_click_nowhere_has_empty_path() {
    let event = Event::click_nowhere();
    assert!(event.target().is_none());
    assert!(!event.passes_through("body"));
}

#[test]
fn test_event_types() {
    assert_eq!(Event::click_nowhere().event_type(), EventType::Click);
    assert_eq!(Event::key(Key::Escape).event_type(), EventType::KeyDown);

    let doc = nested_document();
    let input = doc.input("row", "abc").unwrap();
    assert_eq!(input.event_type(), EventType::Input);
}

#[test]
fn test_key_down_targets_element() {
    let doc = nested_document();
    let event = doc.key_down("panel", Key::Enter, Modifiers::ctrl()).unwrap();

    match event.kind {
        EventKind::KeyDown { key, modifiers } => {
            assert_eq!(key, Key::Enter);
            assert!(modifiers.ctrl);
            assert!(!modifiers.none());
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_path_entry_builder() {
    let entry = PathEntry::new("x").with_action("go");
    assert_eq!(entry.id, "x");
    assert_eq!(entry.action.as_deref(), Some("go"));
}

// ============================================================================
// Crossterm Conversion
// ============================================================================

#[test]
fn test_key_from_crossterm() {
    use crossterm::event::{KeyCode, KeyModifiers};

    assert_eq!(Key::from(KeyCode::Esc), Key::Escape);
    assert_eq!(Key::from(KeyCode::Char('q')), Key::Char('q'));
    assert_eq!(Key::from(KeyCode::F(5)), Key::F(5));

    let mods = Modifiers::from(KeyModifiers::SHIFT | KeyModifiers::ALT);
    assert!(mods.shift);
    assert!(mods.alt);
    assert!(!mods.ctrl);
}

#[test]
fn test_unsupported_crossterm_key_is_unknown() {
    use crossterm::event::KeyCode;

    assert_eq!(Key::from(KeyCode::CapsLock), Key::Unknown);
    assert_eq!(Key::from(KeyCode::Null), Key::Unknown);
    assert_ne!(Key::from(KeyCode::Null), Key::Char('\0'));
}

// ============================================================================
// Sequence
// ============================================================================

#[test]
fn test_events_are_sequenced_in_creation_order() {
    let before = lantern_dom::next_sequence();
    let first = Event::click_nowhere();
    let second = Event::key(Key::Escape);

    assert!(first.seq >= before);
    assert!(second.seq > first.seq);
    assert_eq!(first.clone().seq, first.seq);
    assert!(lantern_dom::next_sequence() > second.seq);
}
