//! Property bindings shared between consumers, templates and action handlers.
//!
//! A [`Binding`] is a cheap-to-clone handle to one shared value. Every clone
//! sees the same value, so a binding handed to several properties (or to the
//! consumer and an overlay at once) keeps them all in sync. The overlay core
//! only ever goes through [`Binding::get`] / [`Binding::set`].

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Property value type.
pub type Value = serde_json::Value;

/// Shared property value.
///
/// # Example
///
/// ```ignore
/// let title = Binding::new("Rename");
/// let modal = OverlayDescriptor::modal()
///     .content(ContentProvider::template("rename"))
///     .bind("title", title.clone());
///
/// title.set("Rename file");
/// ```
#[derive(Debug, Clone)]
pub struct Binding {
    inner: Arc<RwLock<Value>>,
}

impl Binding {
    /// Create a new binding with the given value
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value.into())),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> Value {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Set a new value
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = value;
    }

    /// Current value formatted for display.
    ///
    /// Strings render without quotes and `null` renders as an empty string.
    pub fn display(&self) -> String {
        display_value(&self.get())
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

/// Format a value for display in rendered text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A property as supplied on a descriptor.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// Plain value. Each overlay instance gets its own binding for it.
    Static(Value),
    /// Consumer-owned binding, shared with the overlay.
    Bound(Binding),
}

/// Properties declared on a descriptor, passed through to the renderer.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a plain property.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries
            .insert(name.into(), PropertyValue::Static(value.into()));
    }

    /// Declare a property backed by a consumer binding.
    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.entries.insert(name.into(), PropertyValue::Bound(binding));
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turn the declared properties into live bindings for one overlay instance.
    ///
    /// Bound properties keep sharing the consumer's binding; static values are
    /// wrapped in fresh bindings owned by the instance.
    pub fn resolve(&self) -> ResolvedProperties {
        let bindings = self
            .entries
            .iter()
            .map(|(name, value)| {
                let binding = match value {
                    PropertyValue::Static(value) => Binding::new(value.clone()),
                    PropertyValue::Bound(binding) => binding.clone(),
                };
                (name.clone(), binding)
            })
            .collect();

        ResolvedProperties {
            bindings: Arc::new(RwLock::new(bindings)),
        }
    }
}

/// Live property bindings of one overlay instance.
///
/// Cloning shares the same set, so a template closure holding a clone sees
/// properties set later by action handlers.
#[derive(Debug, Clone, Default)]
pub struct ResolvedProperties {
    bindings: Arc<RwLock<BTreeMap<String, Binding>>>,
}

impl ResolvedProperties {
    /// Binding backing `name`, if declared.
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.bindings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.binding(name).map(|binding| binding.get())
    }

    /// Current value of `name` formatted for display (empty if undeclared).
    pub fn display(&self, name: &str) -> String {
        self.get(name)
            .map(|value| display_value(&value))
            .unwrap_or_default()
    }

    /// Write `name` through its binding, declaring it if needed.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        if let Some(binding) = self.binding(name) {
            binding.set(value);
            return;
        }

        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        bindings
            .entry(name.to_string())
            .or_default()
            .set(value);
    }

    pub fn names(&self) -> Vec<String> {
        self.bindings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}
