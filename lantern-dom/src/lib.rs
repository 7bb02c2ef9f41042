pub mod document;
pub mod element;
pub mod event;

pub use document::{Document, BODY_ID};
pub use element::{
    collect_text, element_path, find_element, Content, Element, TextFn, ACTION_ATTR,
};
pub use event::{next_sequence, Event, EventKind, EventType, Key, Modifiers, PathEntry};
