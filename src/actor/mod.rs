//! Actors: identity, vitals, combat stats, modifiers

pub mod modifier;
pub mod registry;
pub mod vitals;

pub use modifier::{Modifier, StatKind};
pub use registry::ActorRegistry;
pub use vitals::{DamageOutcome, Vitals};

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, LegacyId, NodeId};
use crate::economy::EconomyState;

/// Base combat statistics before the modifier overlay.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CombatStats {
    pub attack: i32,
    pub defense: i32,
    pub damage_bonus: i32,
}

/// A single simulation actor, stored in the registry arena.
///
/// Actors are never removed from the arena; retirement flags them out of
/// the active pools and links a legacy record.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub archetype: String,
    pub is_player: bool,
    pub vitals: Vitals,
    pub stats: CombatStats,
    pub speed: f64,
    pub economy: EconomyState,
    pub modifiers: Vec<Modifier>,
    pub node: Option<NodeId>,
    pub retired: bool,
    pub legacy: Option<LegacyId>,
}

impl Actor {
    /// Effective stat value: base plus the sum of live modifiers on that
    /// stat.
    pub fn stat(&self, kind: StatKind) -> i32 {
        let base = match kind {
            StatKind::Attack => self.stats.attack,
            StatKind::Defense => self.stats.defense,
            StatKind::Damage => self.stats.damage_bonus,
        };
        let overlay: i32 = self
            .modifiers
            .iter()
            .filter(|m| m.stat == kind && !m.is_expired())
            .map(|m| m.value)
            .sum();
        base + overlay
    }

    /// Alive, not yet retired into legend, and able to take turns.
    pub fn is_active(&self) -> bool {
        self.vitals.is_alive() && !self.retired
    }
}
