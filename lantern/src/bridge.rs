//! Document event bridge.
//!
//! Two process-wide listeners, one per [`SignalHub`] channel, are shared by
//! every open overlay. They are installed when the first overlay registers
//! and torn down when the last one is destroyed. Incoming signals are routed
//! to *enrolled* overlays only: the modal first, then popovers in the order
//! they were opened.
//!
//! Interactions are also filtered by event sequence. An overlay only reacts
//! to events created after it became visible, so the click that opened it is
//! never taken for an outside click, whichever task runs first.

use lantern_dom::{Event, EventKind, Key};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::DEFAULT_SIGNAL_CAPACITY;
use crate::descriptor::OverlayOptions;
use crate::instance::OverlayId;
use crate::manager::WeakManager;

/// Custom dismissal signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissSignal {
    /// Close the active modal.
    HideModal,
    /// Close every popover.
    HidePopovers,
}

/// Broadcast point for dismissal signals and document interactions.
///
/// Cloning shares the channels. Emitting while no overlay is open does
/// nothing.
#[derive(Debug, Clone)]
pub struct SignalHub {
    dismiss: broadcast::Sender<DismissSignal>,
    interaction: broadcast::Sender<Event>,
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_CAPACITY)
    }
}

impl SignalHub {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (dismiss, _) = broadcast::channel(capacity);
        let (interaction, _) = broadcast::channel(capacity);
        Self {
            dismiss,
            interaction,
        }
    }

    /// Ask the active modal to close.
    pub fn hide_modal(&self) {
        self.emit(DismissSignal::HideModal);
    }

    /// Ask every popover to close.
    pub fn hide_popovers(&self) {
        self.emit(DismissSignal::HidePopovers);
    }

    pub fn emit(&self, signal: DismissSignal) {
        if self.dismiss.send(signal).is_err() {
            log::trace!("{:?} emitted with no listener", signal);
        }
    }

    /// Report a document-level interaction (click, key press).
    pub fn interaction(&self, event: Event) {
        let _ = self.interaction.send(event);
    }

    /// Number of listeners on the dismissal channel.
    pub fn dismiss_listeners(&self) -> usize {
        self.dismiss.receiver_count()
    }

    /// Number of listeners on the interaction channel.
    pub fn interaction_listeners(&self) -> usize {
        self.interaction.receiver_count()
    }
}

/// The running listener tasks. Aborted on drop.
struct ListenerSet {
    tasks: Vec<JoinHandle<()>>,
}

impl ListenerSet {
    fn spawn(hub: &SignalHub, manager: WeakManager) -> Self {
        let mut dismiss = hub.dismiss.subscribe();
        let mut interaction = hub.interaction.subscribe();

        let dismiss_manager = manager.clone();
        let dismiss_task = tokio::spawn(async move {
            loop {
                match dismiss.recv().await {
                    Ok(signal) => {
                        let Some(manager) = dismiss_manager.upgrade() else {
                            break;
                        };
                        manager.on_dismiss_signal(signal);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("dismiss listener lagged, {} signals skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let interaction_task = tokio::spawn(async move {
            loop {
                match interaction.recv().await {
                    Ok(event) => {
                        let Some(manager) = manager.upgrade() else {
                            break;
                        };
                        manager.on_interaction(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("interaction listener lagged, {} events skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self {
            tasks: vec![dismiss_task, interaction_task],
        }
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Reference-counted owner of the listeners. Mutated only by the manager.
pub(crate) struct DocumentBridge {
    hub: SignalHub,
    registrations: usize,
    listeners: Option<ListenerSet>,
}

impl DocumentBridge {
    pub fn new(hub: SignalHub) -> Self {
        Self {
            hub,
            registrations: 0,
            listeners: None,
        }
    }

    /// Register one overlay. Installs the listeners on the first registration.
    pub fn acquire(&mut self, manager: WeakManager) {
        self.registrations += 1;
        if self.registrations == 1 {
            log::debug!("installing document listeners");
            self.listeners = Some(ListenerSet::spawn(&self.hub, manager));
        }
    }

    /// Unregister one overlay. Removes the listeners after the last one.
    pub fn release(&mut self) {
        if self.registrations == 0 {
            log::warn!("document bridge released more often than acquired");
            return;
        }

        self.registrations -= 1;
        if self.registrations == 0 {
            log::debug!("removing document listeners");
            self.listeners = None;
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listeners.is_some()
    }

    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

/// Routing snapshot of one enrolled overlay.
#[derive(Debug, Clone)]
pub(crate) struct BridgeTarget {
    pub id: OverlayId,
    pub anchor: String,
    pub options: OverlayOptions,
    /// Events with a lower sequence predate the overlay and are ignored.
    pub armed_at: u64,
}

/// Overlays a dismissal signal closes, in close order.
pub(crate) fn dismiss_targets(
    signal: DismissSignal,
    modal: Option<&BridgeTarget>,
    popovers: &[BridgeTarget],
) -> Vec<OverlayId> {
    match signal {
        DismissSignal::HideModal => modal.map(|target| target.id).into_iter().collect(),
        DismissSignal::HidePopovers => popovers.iter().map(|target| target.id).collect(),
    }
}

/// Overlays a document interaction dismisses, in close order.
pub(crate) fn interaction_targets(
    event: &Event,
    modal: Option<&BridgeTarget>,
    popovers: &[BridgeTarget],
) -> Vec<OverlayId> {
    let targets = modal
        .into_iter()
        .chain(popovers.iter())
        .filter(|target| event.seq >= target.armed_at);

    match &event.kind {
        EventKind::Click => targets
            .filter(|target| target.options.dismiss_on_outside_click)
            .filter(|target| !event.passes_through(&target.anchor))
            .map(|target| target.id)
            .collect(),
        EventKind::KeyDown {
            key: Key::Escape, ..
        } => targets
            .filter(|target| target.options.dismiss_on_escape)
            .map(|target| target.id)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use lantern_dom::PathEntry;

    use super::*;
    use crate::descriptor::OverlayKind;

    fn target(kind: OverlayKind) -> BridgeTarget {
        let id = OverlayId::next();
        BridgeTarget {
            id,
            anchor: id.to_string(),
            options: OverlayOptions::for_kind(kind),
            armed_at: 0,
        }
    }

    fn click_on(path: &[&str]) -> Event {
        Event::new(
            EventKind::Click,
            path.iter().map(|id| PathEntry::new(*id)).collect(),
        )
    }

    #[test]
    fn test_hide_modal_targets_only_modal() {
        let modal = target(OverlayKind::Modal);
        let popovers = vec![target(OverlayKind::Popover)];

        let ids = dismiss_targets(DismissSignal::HideModal, Some(&modal), &popovers);
        assert_eq!(ids, vec![modal.id]);

        let ids = dismiss_targets(DismissSignal::HideModal, None, &popovers);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_hide_popovers_keeps_insertion_order() {
        let modal = target(OverlayKind::Modal);
        let popovers = vec![
            target(OverlayKind::Popover),
            target(OverlayKind::Popover),
            target(OverlayKind::Popover),
        ];

        let ids = dismiss_targets(DismissSignal::HidePopovers, Some(&modal), &popovers);
        let expected: Vec<OverlayId> = popovers.iter().map(|p| p.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_outside_click_closes_popover_not_modal() {
        let modal = target(OverlayKind::Modal);
        let popover = target(OverlayKind::Popover);
        let popovers = vec![popover.clone()];

        let event = click_on(&["button", "body"]);
        let ids = interaction_targets(&event, Some(&modal), &popovers);
        assert_eq!(ids, vec![popover.id]);
    }

    #[test]
    fn test_inside_click_keeps_popover() {
        let popover = target(OverlayKind::Popover);
        let event = click_on(&["item", &popover.anchor, "body"]);

        let ids = interaction_targets(&event, None, std::slice::from_ref(&popover));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_events_older_than_overlay_are_ignored() {
        let opening_click = click_on(&["button", "body"]);
        let mut popover = target(OverlayKind::Popover);
        popover.armed_at = lantern_dom::next_sequence();

        let ids = interaction_targets(&opening_click, None, std::slice::from_ref(&popover));
        assert!(ids.is_empty());

        let later_click = Event::click_nowhere();
        let ids = interaction_targets(&later_click, None, std::slice::from_ref(&popover));
        assert_eq!(ids, vec![popover.id]);
    }

    #[test]
    fn test_escape_closes_modal_not_popover() {
        let modal = target(OverlayKind::Modal);
        let popovers = vec![target(OverlayKind::Popover)];

        let ids = interaction_targets(&Event::key(Key::Escape), Some(&modal), &popovers);
        assert_eq!(ids, vec![modal.id]);

        let ids = interaction_targets(&Event::key(Key::Enter), Some(&modal), &popovers);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_hub_without_listeners_is_silent() {
        let hub = SignalHub::new(0);
        hub.hide_modal();
        hub.hide_popovers();
        hub.interaction(Event::click_nowhere());
        assert_eq!(hub.dismiss_listeners(), 0);
        assert_eq!(hub.interaction_listeners(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bridge_reference_counting() {
        let hub = SignalHub::default();
        let mut bridge = DocumentBridge::new(hub.clone());

        bridge.acquire(WeakManager::default());
        bridge.acquire(WeakManager::default());
        assert!(bridge.is_listening());
        assert_eq!(bridge.registrations(), 2);
        assert_eq!(hub.dismiss_listeners(), 1);
        assert_eq!(hub.interaction_listeners(), 1);

        bridge.release();
        assert!(bridge.is_listening());

        bridge.release();
        assert!(!bridge.is_listening());

        // Extra release is tolerated
        bridge.release();
        assert_eq!(bridge.registrations(), 0);
    }
}
