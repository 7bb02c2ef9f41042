//! Action dispatch and raw event delegation into overlay content.
//!
//! An event reaches an overlay when its bubbling path passes through the
//! overlay's root anchor. From there two things happen:
//!
//! 1. A click on (or inside) an element carrying an `action` attribute runs
//!    the named action. The handler is looked up in the nearest enclosing
//!    slot first, then on the descriptor, then among the built-in actions.
//! 2. Raw handlers bound on the descriptor for the event's type run, however
//!    deep the physical target is.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use lantern_dom::{Event, EventType};

use crate::action::{ActionContext, ActionHandler};
use crate::binding::ResolvedProperties;
use crate::descriptor::{OverlayDescriptor, SlotKind};
use crate::error::extract_panic_message;
use crate::instance::OverlayId;
use crate::manager::WeakManager;
use crate::renderer::MountedContent;

/// Actions every overlay understands without declaring them.
pub const BUILT_IN_ACTIONS: [&str; 3] = ["close", "cancel", "confirm"];

/// Where a named action's handler was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionScope {
    /// The action map of the slot containing the action element.
    Slot(SlotKind),
    /// The descriptor's own action map.
    Descriptor,
    /// A built-in action (closes the overlay).
    BuiltIn,
}

impl fmt::Display for ActionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionScope::Slot(kind) => write!(f, "slot '{}'", kind),
            ActionScope::Descriptor => write!(f, "descriptor"),
            ActionScope::BuiltIn => write!(f, "built-in"),
        }
    }
}

/// A named action found on an event path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedAction {
    pub overlay: OverlayId,
    pub name: String,
    /// `None` if no scope handles the action.
    pub scope: Option<ActionScope>,
}

/// What a call to [`OverlayManager::dispatch_event`](crate::OverlayManager::dispatch_event) did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Overlays the event bubbled through.
    pub reached: Vec<OverlayId>,
    /// Named actions resolved, in dispatch order.
    pub actions: Vec<DispatchedAction>,
    /// Raw event handlers invoked.
    pub delegated: usize,
}

impl DispatchOutcome {
    /// Whether any handler ran.
    pub fn handled(&self) -> bool {
        self.delegated > 0 || self.actions.iter().any(|action| action.scope.is_some())
    }

    /// Scope that handled the action `name`, if any.
    pub fn scope_of(&self, name: &str) -> Option<&ActionScope> {
        self.actions
            .iter()
            .find(|action| action.name == name)
            .and_then(|action| action.scope.as_ref())
    }
}

/// Snapshot of one live overlay, taken under the manager lock.
pub(crate) struct DelegationTarget {
    pub id: OverlayId,
    pub descriptor: Arc<OverlayDescriptor>,
    pub properties: ResolvedProperties,
    pub mounted: MountedContent,
}

/// Action named on the event path and the slot it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActionOrigin {
    pub name: String,
    pub slot: Option<SlotKind>,
}

/// Find the action named on `event`'s path inside the overlay rooted at `root_pos`.
///
/// The nearest element carrying an action wins. The slot is the nearest slot
/// anchor between that element and the overlay root.
pub(crate) fn action_origin(
    event: &Event,
    root_pos: usize,
    mounted: &MountedContent,
) -> Option<ActionOrigin> {
    let inside = &event.path[..=root_pos];
    let (action_pos, name) = inside
        .iter()
        .enumerate()
        .find_map(|(pos, entry)| entry.action.as_deref().map(|name| (pos, name)))?;

    let slot = inside[action_pos..]
        .iter()
        .find_map(|entry| mounted.slot_for(&entry.id))
        .cloned();

    Some(ActionOrigin {
        name: name.to_string(),
        slot,
    })
}

/// Resolve the handler for `origin` through slot, descriptor and built-in scopes.
fn resolve_action(
    descriptor: &OverlayDescriptor,
    origin: &ActionOrigin,
) -> Option<(ActionScope, Option<ActionHandler>)> {
    if let Some(kind) = &origin.slot {
        let slot_handler = descriptor
            .find_slot(kind)
            .and_then(|slot| slot.actions.get(&origin.name));
        if let Some(handler) = slot_handler {
            return Some((ActionScope::Slot(kind.clone()), Some(handler.clone())));
        }
    }

    if let Some(handler) = descriptor.actions().get(&origin.name) {
        return Some((ActionScope::Descriptor, Some(handler.clone())));
    }

    if BUILT_IN_ACTIONS.contains(&origin.name.as_str()) {
        return Some((ActionScope::BuiltIn, None));
    }

    None
}

/// Run a handler, logging instead of propagating a panic.
fn run_isolated(overlay: OverlayId, what: &str, f: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(panic) => {
            log::error!(
                "{} handler of {} panicked: {}",
                what,
                overlay,
                extract_panic_message(&panic)
            );
            false
        }
    }
}

/// Deliver `event` to every overlay it bubbles through.
///
/// Called without the manager lock held; handlers may open or close overlays.
pub(crate) fn dispatch(
    event: &Event,
    targets: &[DelegationTarget],
    manager: &WeakManager,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    for target in targets {
        let Some(root_pos) = event.position_of(target.mounted.anchor()) else {
            continue;
        };
        outcome.reached.push(target.id);

        let origin = match event.event_type() {
            EventType::Click => action_origin(event, root_pos, &target.mounted),
            _ => None,
        };

        if let Some(origin) = origin {
            let resolved = resolve_action(&target.descriptor, &origin);
            let scope = resolved.as_ref().map(|(scope, _)| scope.clone());

            match resolved {
                Some((scope, Some(handler))) => {
                    log::debug!("action '{}' on {} ({})", origin.name, target.id, scope);
                    let cx = ActionContext::new(
                        target.id,
                        target.properties.clone(),
                        manager.clone(),
                    )
                    .for_action(origin.name.clone(), origin.slot.clone());
                    run_isolated(target.id, &origin.name, || handler(&cx));
                }
                Some((_, None)) => {
                    log::debug!("built-in action '{}' closes {}", origin.name, target.id);
                    if let Err(e) = manager.close(target.id) {
                        log::debug!("built-in '{}' ignored: {}", origin.name, e);
                    }
                }
                None => {
                    log::trace!("no handler for action '{}' on {}", origin.name, target.id);
                }
            }

            outcome.actions.push(DispatchedAction {
                overlay: target.id,
                name: origin.name,
                scope,
            });
        }

        let handlers = target.descriptor.events().get(event.event_type());
        if handlers.is_empty() {
            continue;
        }

        let cx = ActionContext::new(target.id, target.properties.clone(), manager.clone());
        for handler in handlers {
            run_isolated(target.id, "event", || handler(event, &cx));
            outcome.delegated += 1;
        }
    }

    outcome
}
