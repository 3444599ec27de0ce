//! Imperative handle for parents that drive the swiper without gestures

use tokio::sync::mpsc;

/// Commands a parent controller can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeCommand {
    SwipeLeft,
    SwipeRight,
    SwipeBack,
}

/// Cloneable handle returned by [`SwipeEngine::controller`].
///
/// Commands are queued and applied by the engine at the start of its next
/// `tick`, in the order they were sent.
///
/// [`SwipeEngine::controller`]: super::SwipeEngine::controller
#[derive(Debug, Clone)]
pub struct SwipeController {
    tx: mpsc::UnboundedSender<SwipeCommand>,
}

impl SwipeController {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SwipeCommand>) -> Self {
        Self { tx }
    }

    pub fn swipe_left(&self) {
        self.send(SwipeCommand::SwipeLeft);
    }

    pub fn swipe_right(&self) {
        self.send(SwipeCommand::SwipeRight);
    }

    /// Undo the most recent decision
    pub fn swipe_back(&self) {
        self.send(SwipeCommand::SwipeBack);
    }

    fn send(&self, command: SwipeCommand) {
        // Engine dropped: nothing left to control
        if self.tx.send(command).is_err() {
            tracing::trace!(?command, "swiper gone, command dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_arrive_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let controller = SwipeController::new(tx);
        let other = controller.clone();

        controller.swipe_left();
        other.swipe_right();
        controller.swipe_back();

        assert_eq!(rx.try_recv().unwrap(), SwipeCommand::SwipeLeft);
        assert_eq!(rx.try_recv().unwrap(), SwipeCommand::SwipeRight);
        assert_eq!(rx.try_recv().unwrap(), SwipeCommand::SwipeBack);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        SwipeController::new(tx).swipe_right();
    }
}
