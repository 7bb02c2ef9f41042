//! Rendering collaborators.
//!
//! The manager hands overlay content to a [`Renderer`] and keeps the returned
//! [`MountedContent`] anchors. [`DocumentRenderer`] is the reference
//! implementation: it builds elements from registered templates and mounts
//! them into a shared [`Document`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use lantern_dom::{Document, Element};

use crate::binding::ResolvedProperties;
use crate::descriptor::{ContentProvider, OverlayKind, Slot, SlotKind};
use crate::instance::OverlayId;

/// Data attribute marking an overlay root element.
pub const OVERLAY_ATTR: &str = "overlay";

/// Data attribute marking a slot wrapper element.
pub const SLOT_ATTR: &str = "slot";

/// Everything a renderer needs to mount one overlay.
pub struct MountRequest<'a> {
    pub overlay: OverlayId,
    pub kind: OverlayKind,
    pub content: &'a ContentProvider,
    pub properties: &'a ResolvedProperties,
    pub slots: &'a [Slot],
}

/// Anchors of mounted overlay content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedContent {
    root: String,
    slots: Vec<(SlotKind, String)>,
}

impl MountedContent {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, kind: SlotKind, anchor: impl Into<String>) -> Self {
        self.slots.push((kind, anchor.into()));
        self
    }

    /// ID of the root element.
    pub fn anchor(&self) -> &str {
        &self.root
    }

    pub fn slots(&self) -> &[(SlotKind, String)] {
        &self.slots
    }

    /// Slot whose wrapper element has `id`.
    pub fn slot_for(&self, id: &str) -> Option<&SlotKind> {
        self.slots
            .iter()
            .find(|(_, anchor)| anchor == id)
            .map(|(kind, _)| kind)
    }

    pub fn slot_anchor(&self, kind: &SlotKind) -> Option<&str> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == kind)
            .map(|(_, anchor)| anchor.as_str())
    }
}

/// Mounts overlay content into some view.
pub trait Renderer: Send + Sync {
    fn mount(&self, request: &MountRequest<'_>) -> MountedContent;

    /// Remove previously mounted content. Called exactly once per mount.
    fn unmount(&self, content: &MountedContent);
}

/// Builds an element tree from an overlay's live properties.
pub type TemplateFn = Arc<dyn Fn(&ResolvedProperties) -> Element + Send + Sync>;

/// Template name → element builder.
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: Arc<RwLock<HashMap<String, TemplateFn>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, name: impl Into<String>, template: F)
    where
        F: Fn(&ResolvedProperties) -> Element + Send + Sync + 'static,
    {
        self.templates
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), Arc::new(template));
    }

    pub fn get(&self, name: &str) -> Option<TemplateFn> {
        self.templates
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Build `provider`'s template. Unknown templates render as an empty box.
    pub fn build(&self, provider: &ContentProvider, properties: &ResolvedProperties) -> Element {
        match self.get(provider.name()) {
            Some(template) => template(properties),
            None => {
                log::warn!("no template registered for '{}'", provider.name());
                Element::box_().children(Vec::new())
            }
        }
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let templates = self.templates.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<&String> = templates.keys().collect();
        names.sort();
        f.debug_struct("TemplateRegistry")
            .field("templates", &names)
            .finish()
    }
}

/// Renderer mounting overlays into a shared [`Document`].
///
/// The overlay root gets the overlay ID as element ID; each slot is wrapped
/// in an element with ID `{overlay}-{slot}`.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    document: Arc<RwLock<Document>>,
    templates: TemplateRegistry,
}

impl DocumentRenderer {
    pub fn new(document: Arc<RwLock<Document>>, templates: TemplateRegistry) -> Self {
        Self {
            document,
            templates,
        }
    }

    pub fn document(&self) -> &Arc<RwLock<Document>> {
        &self.document
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }
}

impl Renderer for DocumentRenderer {
    fn mount(&self, request: &MountRequest<'_>) -> MountedContent {
        let root_id = request.overlay.to_string();
        let mut mounted = MountedContent::new(root_id.clone());

        let mut children = vec![self.templates.build(request.content, request.properties)];
        for slot in request.slots {
            let anchor = format!("{}-{}", root_id, slot.kind);
            children.push(
                Element::box_()
                    .id(anchor.clone())
                    .data(SLOT_ATTR, slot.kind.to_string())
                    .child(self.templates.build(&slot.view, request.properties)),
            );
            mounted = mounted.with_slot(slot.kind.clone(), anchor);
        }

        let root = Element::box_()
            .id(root_id)
            .tag(request.kind.to_string())
            .data(OVERLAY_ATTR, request.kind.to_string())
            .children(children);

        self.document
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .mount(root);

        mounted
    }

    fn unmount(&self, content: &MountedContent) {
        let removed = self
            .document
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .unmount(content.anchor());

        if removed.is_none() {
            log::warn!("overlay root '{}' was already gone", content.anchor());
        }
    }
}
