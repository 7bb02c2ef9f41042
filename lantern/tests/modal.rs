//! Modal lifecycle tests.

mod common;

use std::time::Duration;

use common::{Harness, modal, settle};
use lantern::dom::{Event, Key};
use lantern::transition::Phase;
use lantern::{ManagerConfig, OverlayError, OverlayState};

// =============================================================================
// Open / close
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_open_modal_becomes_visible() {
    let h = Harness::new();
    let handle = h.manager.open(modal()).unwrap();

    assert_eq!(handle.state(), OverlayState::Visible);
    assert_eq!(h.manager.active_modal(), Some(handle.id()));
    assert!(h.contains(&handle.id().to_string()));
    assert_eq!(h.manager.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_destroys_and_unmounts() {
    let h = Harness::new();
    let handle = h.manager.open(modal()).unwrap();

    handle.close().unwrap();

    assert_eq!(handle.state(), OverlayState::Destroyed);
    assert!(h.manager.is_empty());
    assert_eq!(h.manager.active_modal(), None);
    assert!(!h.contains(&handle.id().to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_descriptor_is_rejected() {
    let h = Harness::new();
    let err = h
        .manager
        .open(lantern::OverlayDescriptor::modal())
        .unwrap_err();

    assert!(matches!(err, OverlayError::InvalidDescriptor { .. }));
    assert!(h.manager.is_empty());
    assert!(!h.manager.is_listening());
}

#[tokio::test(start_paused = true)]
async fn test_close_twice_unmounts_once() {
    let h = Harness::manual();
    let handle = h.manager.open(modal()).unwrap();
    h.animator.fire(handle.id(), Phase::Enter);
    settle().await;

    handle.close().unwrap();
    handle.close().unwrap();
    assert_eq!(handle.state(), OverlayState::Leaving);

    h.animator.fire(handle.id(), Phase::Exit);
    settle().await;

    assert_eq!(handle.state(), OverlayState::Destroyed);
    assert_eq!(h.renderer.unmount_count(handle.id()), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_destroyed_handle_is_unknown_overlay() {
    let h = Harness::new();
    let popover = h.manager.open(common::popover()).unwrap();
    let handle = h.manager.open(modal()).unwrap();
    handle.close().unwrap();
    assert_eq!(handle.state(), OverlayState::Destroyed);

    let err = handle.close().unwrap_err();
    assert_eq!(err, OverlayError::UnknownOverlay(handle.id()));
    assert!(err.is_unknown_overlay());

    // Nothing else was disturbed
    assert_eq!(h.manager.open_popovers(), vec![popover.id()]);
    assert_eq!(popover.state(), OverlayState::Visible);
}

#[tokio::test(start_paused = true)]
async fn test_close_after_manager_dropped() {
    let h = Harness::new();
    let handle = h.manager.open(modal()).unwrap();
    let id = handle.id();
    drop(h);

    assert_eq!(handle.close(), Err(OverlayError::UnknownOverlay(id)));
}

// =============================================================================
// Buffered close
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_close_while_entering_is_replayed() {
    let h = Harness::manual();
    let handle = h.manager.open(modal()).unwrap();
    assert_eq!(handle.state(), OverlayState::Entering);

    handle.close().unwrap();
    assert_eq!(handle.state(), OverlayState::Entering);
    assert!(!h.animator.is_pending(handle.id(), Phase::Exit));

    h.animator.fire(handle.id(), Phase::Enter);
    settle().await;

    // Straight to Leaving, never Visible
    assert_eq!(handle.state(), OverlayState::Leaving);
    assert!(h.animator.is_pending(handle.id(), Phase::Exit));

    h.animator.fire(handle.id(), Phase::Exit);
    settle().await;
    assert_eq!(handle.state(), OverlayState::Destroyed);
}

// =============================================================================
// Single active modal
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_second_modal_supersedes_first() {
    let h = Harness::new();
    let first = h.manager.open(modal()).unwrap();
    let second = h.manager.open(modal()).unwrap();

    assert_eq!(first.state(), OverlayState::Destroyed);
    assert_eq!(second.state(), OverlayState::Visible);
    assert_eq!(h.manager.active_modal(), Some(second.id()));
    assert_eq!(h.manager.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_modals_never_visible_together() {
    let h = Harness::manual();
    let first = h.manager.open(modal()).unwrap();
    h.animator.fire(first.id(), Phase::Enter);
    settle().await;
    assert_eq!(first.state(), OverlayState::Visible);

    let second = h.manager.open(modal()).unwrap();
    assert_eq!(first.state(), OverlayState::Leaving);
    assert_eq!(second.state(), OverlayState::Entering);

    // The new modal finishes entering before the old one has left
    h.animator.fire(second.id(), Phase::Enter);
    settle().await;
    assert_eq!(second.state(), OverlayState::Entering);
    assert!(h.contains(&first.id().to_string()));

    h.animator.fire(first.id(), Phase::Exit);
    settle().await;

    assert_eq!(first.state(), OverlayState::Destroyed);
    assert_eq!(second.state(), OverlayState::Visible);
    assert!(!h.contains(&first.id().to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_supersede_while_first_is_entering() {
    let h = Harness::manual();
    let first = h.manager.open(modal()).unwrap();
    let second = h.manager.open(modal()).unwrap();

    assert_eq!(first.state(), OverlayState::Entering);
    assert_eq!(h.manager.active_modal(), Some(second.id()));

    h.animator.fire(second.id(), Phase::Enter);
    h.animator.fire(first.id(), Phase::Enter);
    settle().await;

    assert_eq!(first.state(), OverlayState::Leaving);
    assert_eq!(second.state(), OverlayState::Entering);

    h.animator.fire(first.id(), Phase::Exit);
    settle().await;

    assert_eq!(first.state(), OverlayState::Destroyed);
    assert_eq!(second.state(), OverlayState::Visible);
    assert!(!h.contains(&first.id().to_string()));
    assert_eq!(h.manager.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_open_second_modal_before_first_finishes_leaving() {
    let h = Harness::manual();
    let first = h.manager.open(modal()).unwrap();
    h.animator.fire(first.id(), Phase::Enter);
    settle().await;

    first.close().unwrap();
    assert_eq!(h.manager.active_modal(), None);

    let second = h.manager.open(modal()).unwrap();
    h.animator.fire(second.id(), Phase::Enter);
    settle().await;

    // First modal still rendered, so the second one waits
    assert_eq!(second.state(), OverlayState::Entering);
    assert_eq!(first.state(), OverlayState::Leaving);

    h.animator.fire(first.id(), Phase::Exit);
    settle().await;

    assert_eq!(first.state(), OverlayState::Destroyed);
    assert_eq!(second.state(), OverlayState::Visible);
    assert!(!h.contains(&first.id().to_string()));
}

// =============================================================================
// Timeouts and reduced motion
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_missing_signal_times_out() {
    let config = ManagerConfig::new().transition_timeout(Duration::from_millis(200));
    let h = Harness::manual_with(config);
    let handle = h.manager.open(modal()).unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(handle.state(), OverlayState::Entering);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(handle.state(), OverlayState::Visible);

    // Stuck exit is forced too
    handle.close().unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(handle.state(), OverlayState::Destroyed);
    assert!(h.manager.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_descriptor_timeout_overrides_config() {
    let h = Harness::manual();
    let handle = h
        .manager
        .open(modal().transition_timeout(Duration::from_millis(10)))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.state(), OverlayState::Visible);
}

#[tokio::test(start_paused = true)]
async fn test_reduce_motion_skips_animator() {
    let h = Harness::manual_with(ManagerConfig::new().reduce_motion(true));
    let handle = h.manager.open(modal()).unwrap();

    assert_eq!(handle.state(), OverlayState::Visible);
    assert!(!h.animator.is_pending(handle.id(), Phase::Enter));

    handle.close().unwrap();
    assert_eq!(handle.state(), OverlayState::Destroyed);
}

// =============================================================================
// Dismissal
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_escape_closes_modal() {
    let h = Harness::new();
    let handle = h.manager.open(modal()).unwrap();
    settle().await;
    assert!(h.manager.is_enrolled(handle.id()));

    h.manager.dispatch_event(&Event::key(Key::Escape));
    settle().await;

    assert_eq!(handle.state(), OverlayState::Destroyed);
}

#[tokio::test(start_paused = true)]
async fn test_enforced_modality_ignores_escape() {
    let h = Harness::new();
    let handle = h.manager.open(modal().dismiss_on_escape(false)).unwrap();
    settle().await;

    h.manager.hub().interaction(Event::key(Key::Escape));
    h.manager.hub().interaction(Event::click_nowhere());
    settle().await;

    assert_eq!(handle.state(), OverlayState::Visible);
}

#[tokio::test(start_paused = true)]
async fn test_hide_modal_signal() {
    let h = Harness::new();
    let popover = h.manager.open(common::popover()).unwrap();
    let handle = h.manager.open(modal()).unwrap();
    settle().await;

    h.manager.hub().hide_modal();
    settle().await;

    assert_eq!(handle.state(), OverlayState::Destroyed);
    assert_eq!(popover.state(), OverlayState::Visible);
}

#[tokio::test(start_paused = true)]
async fn test_close_all() {
    let h = Harness::new();
    let popover = h.manager.open(common::popover()).unwrap();
    let handle = h.manager.open(modal()).unwrap();

    h.manager.close_all();

    assert_eq!(handle.state(), OverlayState::Destroyed);
    assert_eq!(popover.state(), OverlayState::Destroyed);
    assert!(h.manager.is_empty());
}
