//! Immutable event envelope

use serde::{Deserialize, Serialize};

use crate::core::types::ActorId;
use crate::events::keys::EventKey;
use crate::events::payload::{Payload, Value};

/// A single event as delivered to subscribers.
///
/// Envelopes are created at the emission site, consumed synchronously, and
/// never stored by reference beyond the dispatch. `target: None` means
/// broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub key: EventKey,
    pub source: ActorId,
    pub target: Option<ActorId>,
    pub data: Payload,
}

impl EventEnvelope {
    pub fn new(key: EventKey, source: ActorId) -> Self {
        Self { key, source, target: None, data: Payload::new() }
    }

    pub fn with_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data = self.data.with(key, value);
        self
    }

    /// True when `actor` is the source or the target of this event.
    pub fn involves(&self, actor: ActorId) -> bool {
        self.source == actor || self.target == Some(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_has_no_target() {
        let e = EventEnvelope::new(EventKey::RoundEnded, ActorId(0));
        assert!(e.target.is_none());
    }

    #[test]
    fn test_involves_source_and_target() {
        let e = EventEnvelope::new(EventKey::DamageApplied, ActorId(1)).with_target(ActorId(2));
        assert!(e.involves(ActorId(1)));
        assert!(e.involves(ActorId(2)));
        assert!(!e.involves(ActorId(3)));
    }
}
