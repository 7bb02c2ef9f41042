use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Sequence number the next created event will get.
///
/// Events created before this call compare lower than it, events created
/// after compare equal or higher.
pub fn next_sequence() -> u64 {
    NEXT_SEQ.load(Ordering::SeqCst)
}

/// One hop of an event's bubbling path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Element ID.
    pub id: String,
    /// Action declared on the element, if any.
    pub action: Option<String>,
}

impl PathEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// High-level event with the element path it bubbles along.
///
/// `path[0]` is the physical target; the last entry is the outermost
/// ancestor (usually the document body). An empty path means the event
/// was not aimed at any element.
///
/// Every event gets a creation sequence number; clones keep it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub path: Vec<PathEntry>,
    pub seq: u64,
}

impl Event {
    pub fn new(kind: EventKind, path: Vec<PathEntry>) -> Self {
        Self {
            kind,
            path,
            seq: NEXT_SEQ.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Click aimed at nothing in particular.
    pub fn click_nowhere() -> Self {
        Self::new(EventKind::Click, Vec::new())
    }

    /// Key press with no element target.
    pub fn key(key: Key) -> Self {
        Self::new(
            EventKind::KeyDown {
                key,
                modifiers: Modifiers::new(),
            },
            Vec::new(),
        )
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// The element the event physically targets.
    pub fn target(&self) -> Option<&PathEntry> {
        self.path.first()
    }

    /// Index of `id` in the bubbling path.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.path.iter().position(|entry| entry.id == id)
    }

    /// Whether the event bubbles through the element with `id`.
    pub fn passes_through(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }
}

/// Event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Mouse click (or tap) on the target.
    Click,
    /// Key press, delivered to the focused element.
    KeyDown { key: Key, modifiers: Modifiers },
    /// Value of an input element changed.
    Input { value: String },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Click => EventType::Click,
            EventKind::KeyDown { .. } => EventType::KeyDown,
            EventKind::Input { .. } => EventType::Input,
        }
    }
}

/// Event kinds without payload, used to key event bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    KeyDown,
    Input,
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    /// Key with no representation here (media keys, lone modifiers).
    Unknown,
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

// Conversion from crossterm types
impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Esc => Key::Escape,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Insert => Key::Insert,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Unknown,
        }
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(mods: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers;
        Self {
            shift: mods.contains(KeyModifiers::SHIFT),
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
        }
    }
}
