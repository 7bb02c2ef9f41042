//! Shared fixtures for the overlay integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use lantern::dom::{Document, Element};
use lantern::renderer::{MountRequest, MountedContent};
use lantern::transition::Phase;
use lantern::{
    Animator, Completion, CompletionSignal, ContentProvider, DocumentRenderer, ManagerConfig,
    OverlayDescriptor, OverlayId, OverlayManager, Renderer, TemplateRegistry,
};

/// Let spawned tasks (listeners, deferred enrollment) run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// =============================================================================
// Renderer
// =============================================================================

/// Document renderer that records every mount and unmount.
#[derive(Clone)]
pub struct RecordingRenderer {
    inner: DocumentRenderer,
    mounts: Arc<Mutex<Vec<String>>>,
    unmounts: Arc<Mutex<Vec<String>>>,
}

impl RecordingRenderer {
    pub fn new(document: Arc<RwLock<Document>>, templates: TemplateRegistry) -> Self {
        Self {
            inner: DocumentRenderer::new(document, templates),
            mounts: Arc::default(),
            unmounts: Arc::default(),
        }
    }

    pub fn mounts(&self) -> Vec<String> {
        self.mounts.lock().unwrap().clone()
    }

    pub fn unmounts(&self) -> Vec<String> {
        self.unmounts.lock().unwrap().clone()
    }

    pub fn unmount_count(&self, id: OverlayId) -> usize {
        let anchor = id.to_string();
        self.unmounts().iter().filter(|a| **a == anchor).count()
    }
}

impl Renderer for RecordingRenderer {
    fn mount(&self, request: &MountRequest<'_>) -> MountedContent {
        let mounted = self.inner.mount(request);
        self.mounts
            .lock()
            .unwrap()
            .push(mounted.anchor().to_string());
        mounted
    }

    fn unmount(&self, content: &MountedContent) {
        self.unmounts
            .lock()
            .unwrap()
            .push(content.anchor().to_string());
        self.inner.unmount(content);
    }
}

// =============================================================================
// Animator
// =============================================================================

/// Animator whose completions are fired by the test.
#[derive(Clone, Default)]
pub struct ManualAnimator {
    pending: Arc<Mutex<Vec<(String, Phase, CompletionSignal)>>>,
}

impl ManualAnimator {
    /// Fire the pending animation of `id`. Returns false if there is none.
    pub fn fire(&self, id: OverlayId, phase: Phase) -> bool {
        let anchor = id.to_string();
        let mut pending = self.pending.lock().unwrap();
        let Some(index) = pending
            .iter()
            .position(|(a, p, _)| *a == anchor && *p == phase)
        else {
            return false;
        };
        let (_, _, signal) = pending.remove(index);
        signal.fire();
        true
    }

    pub fn is_pending(&self, id: OverlayId, phase: Phase) -> bool {
        let anchor = id.to_string();
        self.pending
            .lock()
            .unwrap()
            .iter()
            .any(|(a, p, _)| *a == anchor && *p == phase)
    }

    fn push(&self, content: &MountedContent, phase: Phase) -> Completion {
        let (signal, completion) = Completion::channel();
        self.pending
            .lock()
            .unwrap()
            .push((content.anchor().to_string(), phase, signal));
        completion
    }
}

impl Animator for ManualAnimator {
    fn play_enter(&self, content: &MountedContent) -> Completion {
        self.push(content, Phase::Enter)
    }

    fn play_exit(&self, content: &MountedContent) -> Completion {
        self.push(content, Phase::Exit)
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub manager: OverlayManager,
    pub document: Arc<RwLock<Document>>,
    pub templates: TemplateRegistry,
    pub renderer: RecordingRenderer,
    pub animator: ManualAnimator,
}

impl Harness {
    /// Transitions complete immediately.
    pub fn new() -> Self {
        Self::build(None, ManagerConfig::default())
    }

    /// Transitions complete when the test fires them.
    pub fn manual() -> Self {
        Self::build(Some(ManualAnimator::default()), ManagerConfig::default())
    }

    pub fn manual_with(config: ManagerConfig) -> Self {
        Self::build(Some(ManualAnimator::default()), config)
    }

    fn build(animator: Option<ManualAnimator>, config: ManagerConfig) -> Self {
        let document = Arc::new(RwLock::new(Document::new()));
        let templates = TemplateRegistry::new();
        templates.register("body", |_| Element::text("content"));
        let renderer = RecordingRenderer::new(document.clone(), templates.clone());

        let mut builder = OverlayManager::builder(renderer.clone()).config(config);
        if let Some(animator) = &animator {
            builder = builder.animator(animator.clone());
        }

        Self {
            manager: builder.build(),
            document,
            templates,
            renderer,
            animator: animator.unwrap_or_default(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.document.read().unwrap().contains(id)
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.document.read().unwrap().text(id)
    }

    pub fn click(&self, id: &str) -> lantern::dom::Event {
        self.document
            .read()
            .unwrap()
            .click(id)
            .unwrap_or_else(|| panic!("'{}' is not in the document", id))
    }
}

pub fn modal() -> OverlayDescriptor {
    OverlayDescriptor::modal().content(ContentProvider::template("body"))
}

pub fn popover() -> OverlayDescriptor {
    OverlayDescriptor::popover().content(ContentProvider::template("body"))
}
