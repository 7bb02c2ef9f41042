//! Overlay stack manager for popovers and modals.
//!
//! [`OverlayManager`] opens overlays from [`OverlayDescriptor`]s, keeps at
//! most one modal active, drives every overlay through its enter/exit
//! animations and routes document interaction and dismissal signals to the
//! overlays that should react.

pub mod action;
pub mod animator;
pub mod binding;
pub mod bridge;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod manager;
pub mod prelude;
pub mod renderer;
pub mod transition;

pub use action::{ActionContext, ActionHandler, ActionMap, EventBindings, EventHandler};
pub use animator::{Animator, NoopAnimator, TimedAnimator};
pub use binding::{Binding, Properties, PropertyValue, ResolvedProperties, Value, display_value};
pub use bridge::{DismissSignal, SignalHub};
pub use config::ManagerConfig;
pub use descriptor::{
    ContentProvider, OverlayDescriptor, OverlayKind, OverlayOptions, Slot, SlotKind,
};
pub use dispatch::{ActionScope, DispatchOutcome, DispatchedAction};
pub use error::{OverlayError, extract_panic_message};
pub use instance::{OverlayHandle, OverlayId};
pub use manager::{OverlayManager, OverlayManagerBuilder};
pub use renderer::{DocumentRenderer, MountRequest, MountedContent, Renderer, TemplateRegistry};
pub use transition::{Completion, CompletionSignal, OverlayState};

pub use lantern_dom as dom;
