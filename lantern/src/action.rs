//! Action and event handler types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lantern_dom::{Event, EventType};

use crate::binding::{Binding, ResolvedProperties, Value};
use crate::descriptor::SlotKind;
use crate::error::OverlayError;
use crate::instance::OverlayId;
use crate::manager::WeakManager;

/// Handler for a named action.
pub type ActionHandler = Arc<dyn Fn(&ActionContext) + Send + Sync>;

/// Handler for a raw DOM event delegated from overlay content.
pub type EventHandler = Arc<dyn Fn(&Event, &ActionContext) + Send + Sync>;

/// Action name → handler.
#[derive(Clone, Default)]
pub struct ActionMap {
    handlers: HashMap<String, ActionHandler>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ActionContext) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&ActionHandler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ActionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Event type → handlers, in registration order.
#[derive(Clone, Default)]
pub struct EventBindings {
    handlers: HashMap<EventType, Vec<EventHandler>>,
}

impl EventBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, event_type: EventType, handler: F)
    where
        F: Fn(&Event, &ActionContext) + Send + Sync + 'static,
    {
        self.handlers
            .entry(event_type)
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn get(&self, event_type: EventType) -> &[EventHandler] {
        self.handlers
            .get(&event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

impl fmt::Debug for EventBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.handlers.iter().map(|(ty, list)| (ty, list.len())))
            .finish()
    }
}

/// Context passed to action and event handlers.
///
/// Property writes go through the overlay's bindings, so anything rendered
/// from those bindings (and any consumer holding them) observes the change.
pub struct ActionContext {
    overlay: OverlayId,
    action: Option<String>,
    slot: Option<SlotKind>,
    properties: ResolvedProperties,
    manager: WeakManager,
}

impl ActionContext {
    pub(crate) fn new(
        overlay: OverlayId,
        properties: ResolvedProperties,
        manager: WeakManager,
    ) -> Self {
        Self {
            overlay,
            action: None,
            slot: None,
            properties,
            manager,
        }
    }

    pub(crate) fn for_action(mut self, action: impl Into<String>, slot: Option<SlotKind>) -> Self {
        self.action = Some(action.into());
        self.slot = slot;
        self
    }

    /// The overlay the handler runs for.
    pub fn overlay_id(&self) -> OverlayId {
        self.overlay
    }

    /// Name of the action being handled (`None` for raw events).
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Slot the action originated from, if any.
    pub fn slot(&self) -> Option<&SlotKind> {
        self.slot.as_ref()
    }

    pub fn properties(&self) -> &ResolvedProperties {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.get(name)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.properties.set(name, value);
    }

    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.properties.binding(name)
    }

    /// Close the overlay this handler belongs to.
    pub fn close(&self) -> Result<(), OverlayError> {
        self.manager.close(self.overlay)
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("overlay", &self.overlay)
            .field("action", &self.action)
            .field("slot", &self.slot)
            .finish()
    }
}
