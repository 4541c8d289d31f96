//! Combat resolution: dice, outcomes, effects, modifier expiry

pub mod dice;
pub mod lifecycle;
pub mod resolver;

pub use dice::{categorize, resolve_roll, Outcome, RollMode, RollResult};
pub use lifecycle::ModifierLifecycle;
pub use resolver::{ActionReport, ActionResult, CombatResolver};
