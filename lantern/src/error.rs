//! Error types for overlay operations.

use std::any::Any;

use thiserror::Error;

use crate::instance::OverlayId;

/// Errors returned synchronously by [`OverlayManager`](crate::OverlayManager) operations.
///
/// Missing action handlers and animation timeouts are not errors: the former
/// are silently ignored, the latter are logged and recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The descriptor cannot be opened (e.g. it has no content provider).
    #[error("Invalid overlay descriptor: {reason}")]
    InvalidDescriptor {
        /// Why the descriptor was rejected.
        reason: String,
    },

    /// The overlay is not (or no longer) tracked by the manager.
    ///
    /// Callers that may close twice can treat this as a benign double close.
    #[error("Overlay {0} is not tracked")]
    UnknownOverlay(OverlayId),
}

impl OverlayError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            reason: reason.into(),
        }
    }

    /// Whether this is a close of an already forgotten overlay.
    pub fn is_unknown_overlay(&self) -> bool {
        matches!(self, OverlayError::UnknownOverlay(_))
    }
}

/// Extract a human-readable message from a panic payload.
///
/// Panics can contain either `&str` or `String` payloads. This function
/// attempts to extract either, falling back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
