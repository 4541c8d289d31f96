//! Actor arena
//!
//! The registry owns every actor for the lifetime of the simulation. Slots
//! are never reused: retirement flags an actor out of the active pools and
//! leaves the record in place so legacy links stay valid.

use crate::actor::{Actor, CombatStats, DamageOutcome, Modifier, Vitals};
use crate::core::error::{EngineError, Result};
use crate::core::types::{ActorId, LegacyId, NodeId};
use crate::economy::EconomyState;

/// Spawn-time description of an actor.
#[derive(Debug, Clone)]
pub struct ActorSpawn {
    pub name: String,
    pub archetype: String,
    pub is_player: bool,
    pub max_hp: i32,
    pub stats: CombatStats,
    pub speed: f64,
    pub node: Option<NodeId>,
}

#[derive(Default)]
pub struct ActorRegistry {
    actors: Vec<Actor>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, spawn: ActorSpawn) -> ActorId {
        let id = ActorId(self.actors.len() as u32);
        tracing::debug!(actor = %spawn.name, ?id, "spawn");
        self.actors.push(Actor {
            id,
            name: spawn.name,
            archetype: spawn.archetype,
            is_player: spawn.is_player,
            vitals: Vitals::new(spawn.max_hp),
            stats: spawn.stats,
            speed: spawn.speed.max(1.0),
            economy: EconomyState::default(),
            modifiers: Vec::new(),
            node: spawn.node,
            retired: false,
            legacy: None,
        });
        id
    }

    pub fn get(&self, id: ActorId) -> Result<&Actor> {
        self.actors.get(id.index()).ok_or(EngineError::ActorNotFound(id))
    }

    pub fn get_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.actors.get_mut(id.index()).ok_or(EngineError::ActorNotFound(id))
    }

    /// Route an hp change through the single authorized path. The caller is
    /// responsible for emitting the damage and death events afterwards, in
    /// that order.
    pub fn apply_damage(&mut self, id: ActorId, amount: i32) -> Result<DamageOutcome> {
        let actor = self.get_mut(id)?;
        let outcome = actor.vitals.apply_damage(amount);
        if outcome.fatal {
            tracing::info!(actor = %actor.name, "down");
        }
        Ok(outcome)
    }

    pub fn add_modifier(&mut self, id: ActorId, modifier: Modifier) -> Result<()> {
        self.get_mut(id)?.modifiers.push(modifier);
        Ok(())
    }

    /// Flag an actor retired and link its legacy record. The slot stays in
    /// the arena.
    pub fn retire(&mut self, id: ActorId, legacy: LegacyId) -> Result<()> {
        let actor = self.get_mut(id)?;
        actor.retired = true;
        actor.legacy = Some(legacy);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    /// Actors still able to take turns.
    pub fn active_ids(&self) -> Vec<ActorId> {
        self.actors.iter().filter(|a| a.is_active()).map(|a| a.id).collect()
    }

    /// Living, non-retired population of one settlement node.
    pub fn living_in_node(&self, node: NodeId) -> usize {
        self.actors.iter().filter(|a| a.node == Some(node) && a.is_active()).count()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(name: &str, node: Option<NodeId>) -> ActorSpawn {
        ActorSpawn {
            name: name.to_string(),
            archetype: "Brute".to_string(),
            is_player: false,
            max_hp: 10,
            stats: CombatStats::default(),
            speed: 10.0,
            node,
        }
    }

    #[test]
    fn test_ids_are_arena_indices() {
        let mut reg = ActorRegistry::new();
        let a = reg.spawn(spawn("a", None));
        let b = reg.spawn(spawn("b", None));
        assert_eq!(a, ActorId(0));
        assert_eq!(b, ActorId(1));
        assert_eq!(reg.get(b).unwrap().name, "b");
    }

    #[test]
    fn test_unknown_actor_is_an_error() {
        let reg = ActorRegistry::new();
        assert!(matches!(reg.get(ActorId(7)), Err(EngineError::ActorNotFound(_))));
    }

    #[test]
    fn test_retirement_keeps_the_slot() {
        let mut reg = ActorRegistry::new();
        let node = NodeId(0);
        let a = reg.spawn(spawn("a", Some(node)));
        let _b = reg.spawn(spawn("b", Some(node)));
        assert_eq!(reg.living_in_node(node), 2);

        reg.retire(a, LegacyId(0)).unwrap();
        assert_eq!(reg.living_in_node(node), 1);
        assert_eq!(reg.len(), 2);
        let retired = reg.get(a).unwrap();
        assert!(retired.retired);
        assert_eq!(retired.legacy, Some(LegacyId(0)));
    }

    #[test]
    fn test_dead_actors_leave_the_active_pool() {
        let mut reg = ActorRegistry::new();
        let a = reg.spawn(spawn("a", None));
        reg.apply_damage(a, 10).unwrap();
        assert!(reg.active_ids().is_empty());
    }
}
