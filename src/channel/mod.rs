//! Ordered single-consumer message channel between the two sides.
//!
//! Each direction is its own channel; messages arrive in send order. Nothing
//! is ordered across the two directions.

mod messages;
mod timers;

use std::sync::mpsc::{self, Receiver, Sender};

pub use messages::{HostMessage, RenderMessage, decode_host_message, decode_render_message};
pub use timers::{Debouncer, Throttle};

/// Create a connected outbox/inbox pair.
pub fn channel<M>() -> (Outbox<M>, Inbox<M>) {
    let (tx, rx) = mpsc::channel();
    (Outbox { tx }, Inbox { rx })
}

/// Sending half. Cheap to clone.
#[derive(Debug)]
pub struct Outbox<M> {
    tx: Sender<M>,
}

impl<M> Clone for Outbox<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: std::fmt::Debug> Outbox<M> {
    /// Send `message`. Returns false if the other side is gone.
    pub fn post(&self, message: M) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(message = ?err.0, "channel closed, message dropped");
                false
            }
        }
    }
}

/// Receiving half.
#[derive(Debug)]
pub struct Inbox<M> {
    rx: Receiver<M>,
}

impl<M> Inbox<M> {
    /// All messages currently queued, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<M> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_arrive_in_send_order() {
        let (outbox, inbox) = channel();
        for n in 0..5 {
            assert!(outbox.post(n));
        }
        assert_eq!(inbox.drain(), vec![0, 1, 2, 3, 4]);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_post_after_inbox_dropped_reports_failure() {
        let (outbox, inbox) = channel::<u8>();
        drop(inbox);
        assert!(!outbox.post(1));
    }

    #[test]
    fn test_cloned_outboxes_share_the_inbox() {
        let (outbox, inbox) = channel();
        let other = outbox.clone();
        outbox.post("a");
        other.post("b");
        assert_eq!(inbox.drain(), vec!["a", "b"]);
    }
}
