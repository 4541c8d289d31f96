//! Data-driven abilities: effect descriptors and dice formulas

pub mod catalog;
pub mod formula;

pub use catalog::{AbilityBook, AbilityDef, ActorTemplate, EffectDef, TargetType, TemplateBook};
pub use formula::DiceFormula;
