//! Single-threaded publish/subscribe channel.
//!
//! # How delivery works (for beginners)
//!
//! A [`Broadcast`] keeps an ordered list of handlers.  [`Broadcast::emit`]
//! calls every handler synchronously, in subscription order, before it
//! returns.  There is no queue and no background thread: the whole UI runs
//! on one thread, so handlers are plain `FnMut` closures behind `Rc`.
//!
//! Subscribing returns a [`Subscription`] guard.  Dropping the guard removes
//! the handler, so a widget that owns its subscription stops receiving
//! payloads the moment it is dropped.
//!
//! A handler that emits on the same channel while it is being delivered to
//! would recurse without bound; such nested emits are dropped with a warning.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// An ordered set of handlers receiving every emitted payload.
pub struct Broadcast<T> {
    name: &'static str,
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(u64, Handler<T>)>>,
    delivering: Cell<bool>,
}

impl<T: fmt::Debug + 'static> Broadcast<T> {
    /// Creates a channel; `name` only appears in log output.
    pub fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            next_id: Cell::new(0),
            handlers: RefCell::new(Vec::new()),
            delivering: Cell::new(false),
        })
    }

    /// Adds `handler` after every existing handler.
    pub fn subscribe(self: &Rc<Self>, handler: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().push((id, handler));

        let channel: Weak<Self> = Rc::downgrade(self);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(channel) = channel.upgrade() {
                    channel.handlers.borrow_mut().retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Delivers `payload` to every handler and returns how many were called.
    ///
    /// Handlers subscribed during delivery first see the next payload.
    /// Handlers unsubscribed during delivery are skipped if not yet called.
    pub fn emit(&self, payload: &T) -> usize {
        if self.delivering.get() {
            warn!(
                channel = self.name,
                ?payload,
                "dropping nested emit from inside a handler"
            );
            return 0;
        }

        let snapshot: Vec<(u64, Handler<T>)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        let _guard = DeliveryGuard::enter(&self.delivering);
        let mut delivered = 0;
        for (id, handler) in &snapshot {
            if !self.is_subscribed(*id) {
                continue;
            }
            let mut handler = handler.borrow_mut();
            (&mut *handler)(payload);
            delivered += 1;
        }
        delivered
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.handlers.borrow().iter().any(|(other, _)| *other == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

/// Clears the delivering flag on exit, including when a handler panics.
struct DeliveryGuard<'a>(&'a Cell<bool>);

impl<'a> DeliveryGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Keeps a handler subscribed until dropped.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
