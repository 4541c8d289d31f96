//! Synchronous, re-entrant publish/subscribe bus
//!
//! The bus is constructed explicitly and injected into every component via
//! `Rc`; there is no ambient singleton. Dispatch is depth-first: emitting
//! from inside a handler runs the nested chain to completion before the
//! outer chain resumes.

use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::error::Result;
use crate::events::envelope::EventEnvelope;
use crate::events::keys::EventKey;

/// Subscriber callback. Returning an error aborts the remaining chain and
/// propagates to the emitter.
pub type Handler = Rc<dyn Fn(&EventEnvelope) -> Result<()>>;

#[derive(Default)]
pub struct EventBus {
    specific: RefCell<AHashMap<EventKey, Vec<Handler>>>,
    wildcard: RefCell<Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a handler for one key. Handlers for the same key run in
    /// subscription order.
    pub fn subscribe(&self, key: EventKey, handler: Handler) {
        self.specific.borrow_mut().entry(key).or_default().push(handler);
    }

    /// Register a handler for every key. Wildcard handlers run after the
    /// key-specific handlers, in registration order.
    pub fn subscribe_wildcard(&self, handler: Handler) {
        self.wildcard.borrow_mut().push(handler);
    }

    /// Deliver an event to all subscribers, synchronously.
    ///
    /// The handler list is snapshotted before the first invocation, so a
    /// handler may subscribe or emit without deadlocking the bus; handlers
    /// registered mid-dispatch see only subsequent events.
    pub fn emit(&self, event: &EventEnvelope) -> Result<()> {
        let chain: Vec<Handler> = {
            let specific = self.specific.borrow();
            let wildcard = self.wildcard.borrow();
            let keyed = specific.get(&event.key).map(|v| v.as_slice()).unwrap_or(&[]);
            keyed.iter().chain(wildcard.iter()).cloned().collect()
        };
        tracing::trace!(key = %event.key, subscribers = chain.len(), "dispatch");
        for handler in chain {
            handler(event)?;
        }
        Ok(())
    }
}
