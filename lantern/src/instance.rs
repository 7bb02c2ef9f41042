//! Overlay instances and the handles returned to callers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::binding::ResolvedProperties;
use crate::descriptor::{OverlayDescriptor, OverlayKind};
use crate::error::OverlayError;
use crate::manager::WeakManager;
use crate::renderer::MountedContent;
use crate::transition::{Lifecycle, OverlayState, StateCell};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an overlay instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// Runtime record of one open overlay. Owned by the manager.
pub(crate) struct OverlayInstance {
    pub id: OverlayId,
    pub descriptor: Arc<OverlayDescriptor>,
    pub lifecycle: Lifecycle,
    pub properties: ResolvedProperties,
    /// Rendered content; set on mount, taken on unmount.
    pub mounted: Option<MountedContent>,
    /// Whether the document bridge routes signals to this overlay.
    pub enrolled: bool,
    /// First event sequence that may dismiss this overlay. Set when it turns visible.
    pub armed_at: u64,
    /// Enter animation done, waiting for older modals to be destroyed.
    pub entered: bool,
}

impl OverlayInstance {
    pub fn new(descriptor: Arc<OverlayDescriptor>) -> Self {
        let properties = descriptor.properties().resolve();
        Self {
            id: OverlayId::next(),
            descriptor,
            lifecycle: Lifecycle::new(),
            properties,
            mounted: None,
            enrolled: false,
            armed_at: u64::MAX,
            entered: false,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.descriptor.kind()
    }

    pub fn state(&self) -> OverlayState {
        self.lifecycle.state()
    }

    /// Entering or Visible: the content is live and accepts interaction.
    pub fn is_live(&self) -> bool {
        matches!(self.state(), OverlayState::Entering | OverlayState::Visible)
    }
}

/// Capability returned by [`OverlayManager::open`](crate::OverlayManager::open).
///
/// Cheap to clone. Keeps reporting the overlay's state after it is destroyed.
#[derive(Clone)]
pub struct OverlayHandle {
    id: OverlayId,
    kind: OverlayKind,
    state: StateCell,
    manager: WeakManager,
}

impl OverlayHandle {
    pub(crate) fn new(instance: &OverlayInstance, manager: WeakManager) -> Self {
        Self {
            id: instance.id,
            kind: instance.kind(),
            state: instance.lifecycle.cell(),
            manager,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn state(&self) -> OverlayState {
        self.state.get()
    }

    pub fn is_visible(&self) -> bool {
        self.state() == OverlayState::Visible
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == OverlayState::Destroyed
    }

    /// Close the overlay.
    ///
    /// Fails with [`OverlayError::UnknownOverlay`] once the overlay has been
    /// destroyed or the manager is gone.
    pub fn close(&self) -> Result<(), OverlayError> {
        self.manager.close(self.id)
    }
}

impl fmt::Debug for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}
