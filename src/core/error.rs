use thiserror::Error;

use crate::core::types::{ActorId, NodeId};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Actor not found: {0:?}")]
    ActorNotFound(ActorId),

    #[error("Settlement node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Why a requested action was turned away before resolution.
///
/// Rejections are normal control flow, not engine faults: no state has been
/// mutated and no event has been emitted when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionRejection {
    #[error("insufficient action points: need {required}, have {available}")]
    InsufficientPoints { required: u32, available: u32 },

    #[error("unknown ability: {0}")]
    UnknownAbility(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("actor is not in its acting phase")]
    NotActing,
}
