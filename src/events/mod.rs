//! Event bus: closed key vocabulary, flat payloads, synchronous dispatch

pub mod bus;
pub mod envelope;
pub mod keys;
pub mod payload;

pub use bus::{EventBus, Handler};
pub use envelope::EventEnvelope;
pub use keys::{EventKey, VOCABULARY_VERSION};
pub use payload::{Payload, Value};
