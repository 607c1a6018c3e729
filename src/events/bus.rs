//! Broadcast channel for manager events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The polling
//! loop is the only publisher; any number of consumers subscribe.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **No replay**: a receiver only observes events published after it
//!   subscribed.
//! - **Loop order**: events are delivered in the order the loop decided them.
//! - **Lag handling**: a receiver that falls more than `capacity` events
//!   behind gets `RecvError::Lagged(n)` and skips the `n` oldest items.
//! - Subscribing and dropping receivers never affects the manager's internal
//!   bookkeeping (cooldown state lives in the manager, not the channel).

use tokio::sync::broadcast;

/// Broadcast channel for one kind of manager event.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone> Bus<T> {
    /// Creates a new bus with the given ring-buffer capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If nobody is subscribed the event is dropped; the manager's own state
    /// (pending alert, cooldown timestamps) is updated before publishing, so a
    /// missed broadcast loses nothing a late consumer cannot pull.
    pub fn publish(&self, ev: T) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events only.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let bus: Bus<u32> = Bus::new(8);
        bus.publish(1);

        let mut rx = bus.subscribe();
        bus.publish(2);
        bus.publish(3);

        assert_eq!(rx.recv().await.unwrap(), 2);
        assert_eq!(rx.recv().await.unwrap(), 3);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn receivers_are_independent_and_ordered() {
        let bus: Bus<&'static str> = Bus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish("first");
        bus.publish("second");

        assert_eq!(a.recv().await.unwrap(), "first");
        assert_eq!(b.recv().await.unwrap(), "first");
        assert_eq!(a.recv().await.unwrap(), "second");
        assert_eq!(b.recv().await.unwrap(), "second");
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus: Bus<u32> = Bus::new(1);
        bus.publish(42);
    }
}
