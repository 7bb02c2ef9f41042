//! The overlay stack manager.
//!
//! Owns every overlay instance, the active modal, the ordered popover list
//! and the document bridge registration. All of it sits behind one mutex
//! that is never held while renderer, animator or handler code runs, so
//! those may call back into the manager freely.
//!
//! The manager spawns tokio tasks (animation waits, deferred enrollment,
//! bridge listeners) and must be used from within a tokio runtime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use lantern_dom::Event;

use crate::animator::{Animator, NoopAnimator};
use crate::bridge::{
    BridgeTarget, DismissSignal, DocumentBridge, SignalHub, dismiss_targets, interaction_targets,
};
use crate::config::ManagerConfig;
use crate::descriptor::{OverlayDescriptor, OverlayKind};
use crate::dispatch::{self, DelegationTarget, DispatchOutcome};
use crate::error::OverlayError;
use crate::instance::{OverlayHandle, OverlayId, OverlayInstance};
use crate::renderer::{MountRequest, MountedContent, Renderer};
use crate::transition::{
    CloseRequest, Completion, CompletionOutcome, EnterOutcome, OverlayState, Phase, wait_for,
};

/// Mutable stack state, guarded by the manager mutex.
struct StackState {
    instances: HashMap<OverlayId, OverlayInstance>,
    active_modal: Option<OverlayId>,
    open_popovers: Vec<OverlayId>,
    bridge: DocumentBridge,
}

impl StackState {
    fn bridge_target(&self, id: OverlayId) -> Option<BridgeTarget> {
        let instance = self.instances.get(&id)?;
        if !instance.enrolled {
            return None;
        }
        let mounted = instance.mounted.as_ref()?;
        Some(BridgeTarget {
            id,
            anchor: mounted.anchor().to_string(),
            armed_at: instance.armed_at,
            options: *instance.descriptor.overlay_options(),
        })
    }

    /// Oldest modal opened before `id` that is still tracked.
    ///
    /// Any such modal is already closing; `id` must not become visible
    /// while it is rendered.
    fn older_modal(&self, id: OverlayId) -> Option<OverlayId> {
        let instance = self.instances.get(&id)?;
        if instance.kind() != OverlayKind::Modal {
            return None;
        }
        self.instances
            .values()
            .filter(|other| other.kind() == OverlayKind::Modal && other.id < id)
            .map(|other| other.id)
            .min()
    }

    /// Enrolled overlays: the active modal and the popovers in insertion order.
    fn bridge_targets(&self) -> (Option<BridgeTarget>, Vec<BridgeTarget>) {
        let modal = self.active_modal.and_then(|id| self.bridge_target(id));
        let popovers = self
            .open_popovers
            .iter()
            .filter_map(|id| self.bridge_target(*id))
            .collect();
        (modal, popovers)
    }

    /// Live, mounted overlays: the active modal first, then popovers.
    fn delegation_targets(&self) -> Vec<DelegationTarget> {
        self.active_modal
            .iter()
            .chain(self.open_popovers.iter())
            .filter_map(|id| {
                let instance = self.instances.get(id)?;
                if !instance.is_live() {
                    return None;
                }
                Some(DelegationTarget {
                    id: *id,
                    descriptor: instance.descriptor.clone(),
                    properties: instance.properties.clone(),
                    mounted: instance.mounted.clone()?,
                })
            })
            .collect()
    }
}

struct Shared {
    state: Mutex<StackState>,
    renderer: Arc<dyn Renderer>,
    animator: Arc<dyn Animator>,
    hub: SignalHub,
    config: ManagerConfig,
}

/// Manages the lifecycle of popovers and modals.
///
/// Cheap to clone; clones share the same stack.
///
/// # Example
///
/// ```ignore
/// let manager = OverlayManager::builder(renderer)
///     .animator(TimedAnimator::fade(Duration::from_millis(150)))
///     .build();
///
/// let handle = manager.open(
///     OverlayDescriptor::modal().content(ContentProvider::template("settings")),
/// )?;
/// handle.close()?;
/// ```
#[derive(Clone)]
pub struct OverlayManager {
    shared: Arc<Shared>,
}

impl OverlayManager {
    /// Manager with default configuration and no animations.
    pub fn new(renderer: impl Renderer + 'static) -> Self {
        Self::builder(renderer).build()
    }

    pub fn builder(renderer: impl Renderer + 'static) -> OverlayManagerBuilder {
        OverlayManagerBuilder::new(Arc::new(renderer))
    }

    fn lock(&self) -> MutexGuard<'_, StackState> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn downgrade(&self) -> WeakManager {
        WeakManager(Arc::downgrade(&self.shared))
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    /// Open an overlay.
    ///
    /// Opening a modal while another one is active starts the other one's
    /// close before this one enters.
    pub fn open(&self, descriptor: OverlayDescriptor) -> Result<OverlayHandle, OverlayError> {
        descriptor.validate()?;
        let content = descriptor
            .content_provider()
            .cloned()
            .ok_or_else(|| OverlayError::invalid("missing content provider"))?;

        let descriptor = Arc::new(descriptor);
        let instance = OverlayInstance::new(descriptor.clone());
        let id = instance.id;
        let kind = instance.kind();
        let properties = instance.properties.clone();
        let handle = OverlayHandle::new(&instance, self.downgrade());

        let superseded = {
            let mut state = self.lock();
            state.instances.insert(id, instance);
            let superseded = match kind {
                OverlayKind::Modal => state.active_modal.replace(id),
                OverlayKind::Popover => {
                    state.open_popovers.push(id);
                    None
                }
            };
            state.bridge.acquire(self.downgrade());
            superseded
        };

        log::debug!("opening {} {}", kind, id);

        if let Some(previous) = superseded.filter(|previous| *previous != id) {
            log::debug!("{} supersedes modal {}", id, previous);
            if let Err(e) = self.close(previous) {
                log::debug!("superseded modal already gone: {}", e);
            }
        }

        let mounted = self.shared.renderer.mount(&MountRequest {
            overlay: id,
            kind,
            content: &content,
            properties: &properties,
            slots: descriptor.slots(),
        });

        let tracked = {
            let mut state = self.lock();
            match state.instances.get_mut(&id) {
                Some(instance) => {
                    instance.mounted = Some(mounted.clone());
                    true
                }
                None => false,
            }
        };

        if !tracked {
            // Forgotten while the renderer ran
            self.shared.renderer.unmount(&mounted);
            return Ok(handle);
        }

        let completion = self.play(Phase::Enter, &mounted);
        self.await_phase(id, Phase::Enter, completion);

        Ok(handle)
    }

    /// Close an overlay.
    ///
    /// Closing an overlay that is already leaving does nothing. Closing one
    /// that is still entering is remembered and applied once it has entered.
    pub fn close(&self, id: OverlayId) -> Result<(), OverlayError> {
        let request = {
            let mut state = self.lock();
            let instance = state
                .instances
                .get_mut(&id)
                .ok_or(OverlayError::UnknownOverlay(id))?;
            instance.lifecycle.request_close()
        };

        match request {
            CloseRequest::Begin => self.leave(id),
            CloseRequest::Buffered => log::debug!("close of {} buffered until entered", id),
            CloseRequest::AlreadyClosing => log::trace!("{} is already closing", id),
        }

        Ok(())
    }

    /// Close the active modal, then every popover in insertion order.
    pub fn close_all(&self) {
        let ids: Vec<OverlayId> = {
            let state = self.lock();
            state
                .active_modal
                .iter()
                .chain(state.open_popovers.iter())
                .copied()
                .collect()
        };

        for id in ids {
            if let Err(e) = self.close(id) {
                log::debug!("close_all: {}", e);
            }
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn play(&self, phase: Phase, mounted: &MountedContent) -> Completion {
        if self.shared.config.reduce_motion {
            return Completion::immediate();
        }

        match phase {
            Phase::Enter => self.shared.animator.play_enter(mounted),
            Phase::Exit => self.shared.animator.play_exit(mounted),
        }
    }

    fn grace_for(&self, id: OverlayId) -> Duration {
        self.lock()
            .instances
            .get(&id)
            .and_then(|instance| instance.descriptor.overlay_options().transition_timeout)
            .unwrap_or(self.shared.config.transition_timeout)
    }

    /// Advance `id` once `completion` resolves or its grace period runs out.
    fn await_phase(&self, id: OverlayId, phase: Phase, completion: Completion) {
        if completion.is_immediate() {
            self.complete_phase(id, phase);
            return;
        }

        let grace = self.grace_for(id);
        let manager = self.downgrade();
        tokio::spawn(async move {
            match wait_for(completion, grace).await {
                CompletionOutcome::Fired => {}
                CompletionOutcome::Dropped => {
                    log::warn!("{} animation of {} dropped its signal, advancing", phase, id);
                }
                CompletionOutcome::TimedOut => {
                    log::warn!(
                        "{} animation of {} timed out after {:?}, advancing",
                        phase,
                        id,
                        grace
                    );
                }
            }

            if let Some(manager) = manager.upgrade() {
                manager.complete_phase(id, phase);
            }
        });
    }

    fn complete_phase(&self, id: OverlayId, phase: Phase) {
        match phase {
            Phase::Enter => self.on_entered(id),
            Phase::Exit => self.on_left(id),
        }
    }

    fn on_entered(&self, id: OverlayId) {
        let outcome = {
            let mut state = self.lock();
            let blocked_by = state.older_modal(id);
            let Some(instance) = state.instances.get_mut(&id) else {
                return;
            };
            if let Some(previous) = blocked_by {
                log::debug!(
                    "{} entered, waiting for {} to leave (close pending: {})",
                    id,
                    previous,
                    instance.lifecycle.close_pending()
                );
                instance.entered = true;
                return;
            }
            instance.entered = false;
            let outcome = instance.lifecycle.enter_complete();
            if outcome == EnterOutcome::Visible {
                instance.armed_at = lantern_dom::next_sequence();
            }
            outcome
        };

        match outcome {
            EnterOutcome::Visible => {
                log::debug!("{} visible", id);
                self.schedule_enrollment(id);
            }
            EnterOutcome::ReplayClose => {
                log::debug!("{} entered with a buffered close", id);
                self.leave(id);
            }
            EnterOutcome::Stale => {}
        }
    }

    /// Start the exit of an instance that just moved to Leaving.
    fn leave(&self, id: OverlayId) {
        let mounted = {
            let mut state = self.lock();
            if state.active_modal == Some(id) {
                state.active_modal = None;
            }
            let Some(instance) = state.instances.get_mut(&id) else {
                return;
            };
            instance.enrolled = false;
            instance.mounted.clone()
        };

        log::debug!("{} leaving", id);

        let completion = match &mounted {
            Some(mounted) => self.play(Phase::Exit, mounted),
            None => Completion::immediate(),
        };
        self.await_phase(id, Phase::Exit, completion);
    }

    fn on_left(&self, id: OverlayId) {
        let mounted = {
            let mut state = self.lock();
            let Some(instance) = state.instances.get_mut(&id) else {
                return;
            };
            if instance.state() != OverlayState::Leaving {
                return;
            }
            instance.mounted.take()
        };

        if let Some(mounted) = mounted {
            self.shared.renderer.unmount(&mounted);
        }

        let mut state = self.lock();
        let destroyed = state
            .instances
            .get_mut(&id)
            .is_some_and(|instance| instance.lifecycle.leave_complete());
        if !destroyed {
            return;
        }

        state.instances.remove(&id);
        state.open_popovers.retain(|popover| *popover != id);
        if state.active_modal == Some(id) {
            state.active_modal = None;
        }
        state.bridge.release();
        log::debug!("{} destroyed", id);

        // Modals that finished entering while an older one was still leaving
        let mut waiting: Vec<OverlayId> = state
            .instances
            .values()
            .filter(|instance| instance.entered)
            .map(|instance| instance.id)
            .collect();
        waiting.sort();
        drop(state);

        for successor in waiting {
            self.on_entered(successor);
        }
    }

    /// Enroll `id` with the bridge one scheduling turn after it became visible.
    fn schedule_enrollment(&self, id: OverlayId) {
        let manager = self.downgrade();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            if let Some(manager) = manager.upgrade() {
                manager.enroll(id);
            }
        });
    }

    fn enroll(&self, id: OverlayId) {
        let mut state = self.lock();
        if let Some(instance) = state.instances.get_mut(&id) {
            if instance.state() == OverlayState::Visible {
                instance.enrolled = true;
                log::trace!("{} enrolled with document bridge", id);
            }
        }
    }

    // =========================================================================
    // Bridge callbacks
    // =========================================================================

    pub(crate) fn on_dismiss_signal(&self, signal: DismissSignal) {
        let targets = {
            let state = self.lock();
            let (modal, popovers) = state.bridge_targets();
            dismiss_targets(signal, modal.as_ref(), &popovers)
        };

        if !targets.is_empty() {
            log::debug!("{:?} closes {} overlay(s)", signal, targets.len());
        }
        self.close_each(targets);
    }

    pub(crate) fn on_interaction(&self, event: &Event) {
        let targets = {
            let state = self.lock();
            let (modal, popovers) = state.bridge_targets();
            interaction_targets(event, modal.as_ref(), &popovers)
        };

        if !targets.is_empty() {
            log::debug!("{:?} dismisses {} overlay(s)", event.kind, targets.len());
        }
        self.close_each(targets);
    }

    fn close_each(&self, ids: Vec<OverlayId>) {
        for id in ids {
            if let Err(e) = self.close(id) {
                log::debug!("dismiss skipped: {}", e);
            }
        }
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Deliver a DOM event into overlay content, then let it bubble on to the
    /// document (the signal hub).
    pub fn dispatch_event(&self, event: &Event) -> DispatchOutcome {
        let targets = self.lock().delegation_targets();
        let outcome = dispatch::dispatch(event, &targets, &self.downgrade());
        self.shared.hub.interaction(event.clone());
        outcome
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// State of a tracked overlay. `None` once destroyed.
    pub fn state(&self, id: OverlayId) -> Option<OverlayState> {
        self.lock().instances.get(&id).map(OverlayInstance::state)
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.lock().instances.contains_key(&id)
    }

    pub fn active_modal(&self) -> Option<OverlayId> {
        self.lock().active_modal
    }

    /// Tracked popovers in the order they were opened.
    pub fn open_popovers(&self) -> Vec<OverlayId> {
        self.lock().open_popovers.clone()
    }

    /// Anchors of a mounted overlay.
    pub fn mounted(&self, id: OverlayId) -> Option<MountedContent> {
        self.lock()
            .instances
            .get(&id)
            .and_then(|instance| instance.mounted.clone())
    }

    /// Whether the bridge currently routes signals to `id`.
    pub fn is_enrolled(&self, id: OverlayId) -> bool {
        self.lock()
            .instances
            .get(&id)
            .is_some_and(|instance| instance.enrolled)
    }

    /// Number of tracked overlays.
    pub fn len(&self) -> usize {
        self.lock().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().instances.is_empty()
    }

    /// Whether the document listeners are installed.
    pub fn is_listening(&self) -> bool {
        self.lock().bridge.is_listening()
    }

    pub fn bridge_registrations(&self) -> usize {
        self.lock().bridge.registrations()
    }

    pub fn hub(&self) -> &SignalHub {
        &self.shared.hub
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.shared.config
    }
}

impl std::fmt::Debug for OverlayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("OverlayManager")
            .field("overlays", &state.instances.len())
            .field("active_modal", &state.active_modal)
            .field("open_popovers", &state.open_popovers)
            .field("listening", &state.bridge.is_listening())
            .finish()
    }
}

/// Builder for [`OverlayManager`].
pub struct OverlayManagerBuilder {
    renderer: Arc<dyn Renderer>,
    animator: Arc<dyn Animator>,
    hub: Option<SignalHub>,
    config: ManagerConfig,
}

impl OverlayManagerBuilder {
    fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            animator: Arc::new(NoopAnimator),
            hub: None,
            config: ManagerConfig::default(),
        }
    }

    pub fn animator(mut self, animator: impl Animator + 'static) -> Self {
        self.animator = Arc::new(animator);
        self
    }

    /// Use an existing hub, shared with other signal sources.
    pub fn hub(mut self, hub: SignalHub) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> OverlayManager {
        let hub = self
            .hub
            .unwrap_or_else(|| SignalHub::new(self.config.signal_capacity));

        OverlayManager {
            shared: Arc::new(Shared {
                state: Mutex::new(StackState {
                    instances: HashMap::new(),
                    active_modal: None,
                    open_popovers: Vec::new(),
                    bridge: DocumentBridge::new(hub.clone()),
                }),
                renderer: self.renderer,
                animator: self.animator,
                hub,
                config: self.config,
            }),
        }
    }
}

/// Non-owning reference to a manager, held by handles, contexts and tasks.
#[derive(Clone, Default)]
pub(crate) struct WeakManager(Weak<Shared>);

impl WeakManager {
    pub fn upgrade(&self) -> Option<OverlayManager> {
        self.0.upgrade().map(|shared| OverlayManager { shared })
    }

    /// Close `id` if the manager is still alive.
    pub fn close(&self, id: OverlayId) -> Result<(), OverlayError> {
        self.upgrade()
            .ok_or(OverlayError::UnknownOverlay(id))?
            .close(id)
    }
}
