//! The key event bus.
//!
//! On-screen keys publish the [`KeyId`] they stand for; every virtual text
//! input subscribes and decides for itself whether to act on it.  There is
//! exactly one bus per application, owned by
//! [`Services`](super::services::Services).

use std::rc::Rc;

use tracing::trace;
use vkbd_core::KeyId;

use super::broadcast::{Broadcast, Subscription};

/// Fan-out of key identifiers from on-screen keys to virtual inputs.
pub struct KeyEventBus {
    channel: Rc<Broadcast<KeyId>>,
}

impl KeyEventBus {
    pub(crate) fn new() -> Self {
        Self {
            channel: Broadcast::new("key-event-bus"),
        }
    }

    /// Delivers `key` synchronously to every subscriber.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, key: &KeyId) -> usize {
        let delivered = self.channel.emit(key);
        trace!(%key, delivered, "published virtual key");
        delivered
    }

    pub fn subscribe(&self, handler: impl FnMut(&KeyId) + 'static) -> Subscription {
        self.channel.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_publish_delivers_same_key_to_every_subscriber() {
        // Arrange
        let bus = KeyEventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<Subscription> = (0..3)
            .map(|_| {
                let seen = Rc::clone(&seen);
                bus.subscribe(move |key: &KeyId| seen.borrow_mut().push(key.clone()))
            })
            .collect();

        // Act
        let delivered = bus.publish(&KeyId::Return);

        // Assert
        assert_eq!(delivered, 3);
        assert_eq!(*seen.borrow(), vec![KeyId::Return; 3]);
        drop(subs);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_a_noop() {
        let bus = KeyEventBus::new();
        assert_eq!(bus.publish(&KeyId::Text("a".into())), 0);
    }
}
