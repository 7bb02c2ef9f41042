//! Enter/exit animation collaborators.
//!
//! The core never animates anything itself. It asks an [`Animator`] to start
//! an animation and gets back a [`Completion`] to wait on.

use std::time::Duration;

use crate::renderer::MountedContent;
use crate::transition::Completion;

/// Starts enter/exit animations on mounted overlay content.
pub trait Animator: Send + Sync {
    /// Start the enter animation. Must not block.
    fn play_enter(&self, content: &MountedContent) -> Completion;

    /// Start the exit animation. Must not block.
    fn play_exit(&self, content: &MountedContent) -> Completion;
}

/// Animator without animations. Every transition completes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnimator;

impl Animator for NoopAnimator {
    fn play_enter(&self, _content: &MountedContent) -> Completion {
        Completion::immediate()
    }

    fn play_exit(&self, _content: &MountedContent) -> Completion {
        Completion::immediate()
    }
}

/// Animator with fixed durations, signalled from a tokio timer.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct TimedAnimator {
    enter: Duration,
    exit: Duration,
}

impl TimedAnimator {
    pub fn new(enter: Duration, exit: Duration) -> Self {
        Self { enter, exit }
    }

    /// Same duration both ways.
    pub fn fade(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    fn play(&self, duration: Duration) -> Completion {
        if duration.is_zero() {
            return Completion::immediate();
        }

        let (signal, completion) = Completion::channel();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            signal.fire();
        });
        completion
    }
}

impl Animator for TimedAnimator {
    fn play_enter(&self, content: &MountedContent) -> Completion {
        log::trace!("enter animation on '{}' ({:?})", content.anchor(), self.enter);
        self.play(self.enter)
    }

    fn play_exit(&self, content: &MountedContent) -> Completion {
        log::trace!("exit animation on '{}' ({:?})", content.anchor(), self.exit);
        self.play(self.exit)
    }
}
