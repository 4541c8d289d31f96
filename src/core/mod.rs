//! Core types, errors, and configuration

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{ActionRejection, EngineError, Result};
pub use types::{ActorId, Era, GameTimestamp, GridPos, LegacyId, NodeId, Tick, SYSTEM_ACTOR};
