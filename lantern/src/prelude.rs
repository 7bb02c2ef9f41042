//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lantern::prelude::*;
//! ```

// Manager and overlays
pub use crate::descriptor::{
    ContentProvider, OverlayDescriptor, OverlayKind, OverlayOptions, Slot, SlotKind,
};
pub use crate::error::OverlayError;
pub use crate::instance::{OverlayHandle, OverlayId};
pub use crate::manager::OverlayManager;
pub use crate::transition::OverlayState;

// Collaborators
pub use crate::action::ActionContext;
pub use crate::animator::{Animator, NoopAnimator, TimedAnimator};
pub use crate::binding::{Binding, Value};
pub use crate::bridge::SignalHub;
pub use crate::config::ManagerConfig;
pub use crate::renderer::{DocumentRenderer, Renderer, TemplateRegistry};

// Element layer
pub use lantern_dom::{Document, Element, Event, EventType, Key};
