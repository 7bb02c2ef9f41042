//! Overlay descriptors: what to show and how it reacts.
//!
//! A descriptor is built by the consumer and moved into
//! [`OverlayManager::open`](crate::OverlayManager::open). From then on it is
//! shared read-only by the instance created for it.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use lantern_dom::{Event, EventType};

use crate::action::{ActionContext, ActionMap, EventBindings};
use crate::binding::{Binding, Properties, Value};
use crate::error::OverlayError;

/// Overlay kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Anchored floating content. Any number may be open at once.
    Popover,
    /// Dialog. At most one is visible at a time.
    Modal,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::Popover => write!(f, "popover"),
            OverlayKind::Modal => write!(f, "modal"),
        }
    }
}

/// Opaque reference to renderable content.
///
/// The core never looks inside; the renderer resolves the template name and
/// may downcast the payload.
#[derive(Clone)]
pub struct ContentProvider {
    template: String,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl ContentProvider {
    /// Content rendered from a named template.
    pub fn template(name: impl Into<String>) -> Self {
        Self {
            template: name.into(),
            payload: None,
        }
    }

    /// Attach an opaque payload for the renderer.
    pub fn with_payload<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    pub fn name(&self) -> &str {
        &self.template
    }

    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for ContentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentProvider")
            .field("template", &self.template)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}

/// Name of a slot within an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Header,
    Content,
    Footer,
    Named(String),
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Header => write!(f, "header"),
            SlotKind::Content => write!(f, "content"),
            SlotKind::Footer => write!(f, "footer"),
            SlotKind::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Independently actionable sub-view of an overlay.
///
/// Actions declared on a slot take precedence over the descriptor's own
/// actions for elements rendered inside the slot.
#[derive(Debug, Clone)]
pub struct Slot {
    pub kind: SlotKind,
    pub view: ContentProvider,
    pub actions: ActionMap,
}

impl Slot {
    pub fn new(kind: SlotKind, view: ContentProvider) -> Self {
        Self {
            kind,
            view,
            actions: ActionMap::new(),
        }
    }

    pub fn header(view: ContentProvider) -> Self {
        Self::new(SlotKind::Header, view)
    }

    pub fn content(view: ContentProvider) -> Self {
        Self::new(SlotKind::Content, view)
    }

    pub fn footer(view: ContentProvider) -> Self {
        Self::new(SlotKind::Footer, view)
    }

    /// Add a slot-local action handler.
    pub fn action<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ActionContext) + Send + Sync + 'static,
    {
        self.actions.insert(name, handler);
        self
    }
}

/// Per-overlay dismissal behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Close when a click lands outside the overlay.
    pub dismiss_on_outside_click: bool,
    /// Close on Escape.
    pub dismiss_on_escape: bool,
    /// Override of the manager's animation grace period.
    pub transition_timeout: Option<Duration>,
}

impl OverlayOptions {
    /// Defaults for a kind: popovers close on outside clicks, modals on Escape.
    pub fn for_kind(kind: OverlayKind) -> Self {
        match kind {
            OverlayKind::Popover => Self {
                dismiss_on_outside_click: true,
                dismiss_on_escape: false,
                transition_timeout: None,
            },
            OverlayKind::Modal => Self {
                dismiss_on_outside_click: false,
                dismiss_on_escape: true,
                transition_timeout: None,
            },
        }
    }

    /// Modal that can only be closed programmatically or by an action.
    pub fn enforce_modality(mut self) -> Self {
        self.dismiss_on_outside_click = false;
        self.dismiss_on_escape = false;
        self
    }
}

/// Configuration of one overlay.
///
/// # Example
///
/// ```ignore
/// let descriptor = OverlayDescriptor::modal()
///     .content(ContentProvider::template("confirm-delete"))
///     .slot(Slot::footer(ContentProvider::template("confirm-footer")))
///     .property("footerText", Value::Null)
///     .action("delete", |cx| {
///         cx.set("footerText", "Deleting...");
///     });
/// let handle = manager.open(descriptor)?;
/// ```
#[derive(Debug, Clone)]
pub struct OverlayDescriptor {
    kind: OverlayKind,
    content: Option<ContentProvider>,
    slots: Vec<Slot>,
    properties: Properties,
    actions: ActionMap,
    events: EventBindings,
    options: OverlayOptions,
}

impl OverlayDescriptor {
    pub fn new(kind: OverlayKind) -> Self {
        Self {
            kind,
            content: None,
            slots: Vec::new(),
            properties: Properties::new(),
            actions: ActionMap::new(),
            events: EventBindings::new(),
            options: OverlayOptions::for_kind(kind),
        }
    }

    pub fn popover() -> Self {
        Self::new(OverlayKind::Popover)
    }

    pub fn modal() -> Self {
        Self::new(OverlayKind::Modal)
    }

    // Builders

    /// Set the content provider (required).
    pub fn content(mut self, content: ContentProvider) -> Self {
        self.content = Some(content);
        self
    }

    pub fn slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Declare a plain property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name, value);
        self
    }

    /// Declare a property backed by a consumer binding.
    pub fn bind(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.properties.bind(name, binding);
        self
    }

    /// Handle a named action triggered from the overlay content.
    pub fn action<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ActionContext) + Send + Sync + 'static,
    {
        self.actions.insert(name, handler);
        self
    }

    /// Bind a raw event handler, delegated from every descendant of the overlay.
    pub fn on<F>(mut self, event_type: EventType, handler: F) -> Self
    where
        F: Fn(&Event, &ActionContext) + Send + Sync + 'static,
    {
        self.events.insert(event_type, handler);
        self
    }

    pub fn options(mut self, options: OverlayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dismiss_on_outside_click(mut self, enabled: bool) -> Self {
        self.options.dismiss_on_outside_click = enabled;
        self
    }

    pub fn dismiss_on_escape(mut self, enabled: bool) -> Self {
        self.options.dismiss_on_escape = enabled;
        self
    }

    pub fn transition_timeout(mut self, timeout: Duration) -> Self {
        self.options.transition_timeout = Some(timeout);
        self
    }

    // Accessors

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn content_provider(&self) -> Option<&ContentProvider> {
        self.content.as_ref()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn find_slot(&self, kind: &SlotKind) -> Option<&Slot> {
        self.slots.iter().find(|slot| &slot.kind == kind)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn events(&self) -> &EventBindings {
        &self.events
    }

    pub fn overlay_options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Check that the descriptor can be opened.
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.content.is_none() {
            return Err(OverlayError::invalid(format!(
                "{} has no content provider",
                self.kind
            )));
        }

        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !seen.insert(&slot.kind) {
                return Err(OverlayError::invalid(format!(
                    "slot '{}' declared more than once",
                    slot.kind
                )));
            }
        }

        Ok(())
    }
}
