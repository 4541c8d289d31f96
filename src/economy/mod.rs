//! Action economy: energy accumulation, AP budgeting, turn state machine
//!
//! Each actor runs a four-phase cycle driven by external tick calls:
//! Accumulating -> Eligible -> Acting -> TurnEnding -> Accumulating. There
//! is no suspended execution anywhere; every transition is an explicit
//! method on [`EconomySystem`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::actor::ActorRegistry;
use crate::core::config::EconomyConfig;
use crate::core::error::{ActionRejection, EngineError, Result};
use crate::core::types::ActorId;
use crate::events::{EventBus, EventEnvelope, EventKey};

/// Turn phase of a single actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Banking energy each tick.
    #[default]
    Accumulating,
    /// Energy crossed the threshold; waiting for its turn to begin.
    Eligible,
    /// Mid-turn, spending action points.
    Acting,
    /// Turn wrap-up; modifier expiry runs in this phase.
    TurnEnding,
}

/// Per-actor economy state, owned by the actor record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomyState {
    pub energy: f64,
    pub ap: u32,
    pub spent_this_turn: u32,
    pub phase: TurnPhase,
}

pub struct EconomySystem {
    config: EconomyConfig,
    bus: Rc<EventBus>,
    registry: Rc<RefCell<ActorRegistry>>,
}

impl EconomySystem {
    pub fn new(
        config: EconomyConfig,
        bus: Rc<EventBus>,
        registry: Rc<RefCell<ActorRegistry>>,
    ) -> Self {
        Self { config, bus, registry }
    }

    /// Advance one tick: every accumulating actor banks `speed` energy, and
    /// those crossing the threshold become eligible. Returns the actors that
    /// became eligible this tick, in arena order.
    pub fn tick(&self) -> Vec<ActorId> {
        let mut eligible = Vec::new();
        let mut registry = self.registry.borrow_mut();
        for actor in registry.iter_mut() {
            if !actor.is_active() || actor.economy.phase != TurnPhase::Accumulating {
                continue;
            }
            actor.economy.energy += actor.speed;
            if actor.economy.energy >= self.config.energy_threshold {
                actor.economy.phase = TurnPhase::Eligible;
                eligible.push(actor.id);
            }
        }
        eligible
    }

    /// Eligible -> Acting: reset the AP pool and announce the turn.
    pub fn begin_turn(&self, id: ActorId) -> Result<()> {
        {
            let mut registry = self.registry.borrow_mut();
            let actor = registry.get_mut(id)?;
            if actor.economy.phase != TurnPhase::Eligible {
                return Err(EngineError::InvariantViolation(format!(
                    "begin_turn on {} in phase {:?}",
                    actor.name, actor.economy.phase
                )));
            }
            actor.economy.phase = TurnPhase::Acting;
            actor.economy.ap = self.config.ap_pool;
            actor.economy.spent_this_turn = 0;
        }
        self.bus.emit(
            &EventEnvelope::new(EventKey::TurnStarted, id).with("ap", self.config.ap_pool),
        )
    }

    /// AP cost of moving one tile at the given speed. Faster actors pay
    /// less, but movement is never free.
    pub fn movement_cost(&self, speed: f64) -> u32 {
        let cost = (self.config.ap_pool as f64 / speed.max(1.0)).ceil() as u32;
        cost.max(1)
    }

    /// Affordability check used during pre-resolution validation. Rejecting
    /// here mutates nothing and emits nothing.
    pub fn check_affordable(&self, id: ActorId, cost: u32) -> std::result::Result<(), ActionRejection> {
        let registry = self.registry.borrow();
        let actor = match registry.get(id) {
            Ok(a) => a,
            Err(_) => return Err(ActionRejection::InvalidTarget("unknown actor".to_string())),
        };
        if actor.economy.phase != TurnPhase::Acting {
            return Err(ActionRejection::NotActing);
        }
        if actor.economy.ap < cost {
            return Err(ActionRejection::InsufficientPoints {
                required: cost,
                available: actor.economy.ap,
            });
        }
        Ok(())
    }

    /// Debit AP after a validated action resolved.
    pub fn debit(&self, id: ActorId, cost: u32) -> Result<()> {
        let mut registry = self.registry.borrow_mut();
        let actor = registry.get_mut(id)?;
        if actor.economy.ap < cost {
            return Err(EngineError::InvariantViolation(format!(
                "debit of {} exceeds {}'s remaining {} AP after validation",
                cost, actor.name, actor.economy.ap
            )));
        }
        actor.economy.ap -= cost;
        actor.economy.spent_this_turn += cost;
        Ok(())
    }

    /// Acting -> TurnEnding -> Accumulating. The threshold is subtracted
    /// (residual energy carries forward) and `combat.turn_ended` fires while
    /// the actor is in TurnEnding, which is the window modifier expiry runs
    /// in.
    pub fn end_turn(&self, id: ActorId) -> Result<()> {
        {
            let mut registry = self.registry.borrow_mut();
            let actor = registry.get_mut(id)?;
            if actor.economy.phase != TurnPhase::Acting {
                return Err(EngineError::InvariantViolation(format!(
                    "end_turn on {} in phase {:?}",
                    actor.name, actor.economy.phase
                )));
            }
            actor.economy.phase = TurnPhase::TurnEnding;
            actor.economy.energy = (actor.economy.energy - self.config.energy_threshold).max(0.0);
        }
        self.bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id))?;
        let mut registry = self.registry.borrow_mut();
        registry.get_mut(id)?.economy.phase = TurnPhase::Accumulating;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::registry::ActorSpawn;
    use crate::actor::CombatStats;
    use crate::core::config::EngineConfig;

    fn setup(speed: f64) -> (EconomySystem, Rc<RefCell<ActorRegistry>>, ActorId) {
        let bus = EventBus::new();
        let registry = Rc::new(RefCell::new(ActorRegistry::new()));
        let id = registry.borrow_mut().spawn(ActorSpawn {
            name: "Vex".to_string(),
            archetype: "Skirmisher".to_string(),
            is_player: false,
            max_hp: 10,
            stats: CombatStats::default(),
            speed,
            node: None,
        });
        let system =
            EconomySystem::new(EngineConfig::standard().economy, bus, Rc::clone(&registry));
        (system, registry, id)
    }

    #[test]
    fn test_speed_ten_is_eligible_in_ten_ticks() {
        let (system, _registry, id) = setup(10.0);
        for _ in 0..9 {
            assert!(system.tick().is_empty());
        }
        assert_eq!(system.tick(), vec![id]);
    }

    #[test]
    fn test_residual_energy_carries_over() {
        let (system, registry, id) = setup(12.0);
        // 9 ticks at speed 12 banks 108
        let mut eligible = Vec::new();
        for _ in 0..9 {
            eligible = system.tick();
        }
        assert_eq!(eligible, vec![id]);
        system.begin_turn(id).unwrap();
        system.end_turn(id).unwrap();
        let energy = registry.borrow().get(id).unwrap().economy.energy;
        assert!((energy - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_movement_cost_formula() {
        let (system, _registry, _id) = setup(10.0);
        assert_eq!(system.movement_cost(10.0), 10);
        assert_eq!(system.movement_cost(8.0), 13);
        // movement is never free, however fast the actor
        assert_eq!(system.movement_cost(1000.0), 1);
    }

    #[test]
    fn test_rejection_mutates_nothing() {
        let (system, registry, id) = setup(10.0);
        for _ in 0..10 {
            system.tick();
        }
        system.begin_turn(id).unwrap();
        let err = system.check_affordable(id, 999).unwrap_err();
        assert_eq!(err, ActionRejection::InsufficientPoints { required: 999, available: 100 });
        assert_eq!(registry.borrow().get(id).unwrap().economy.ap, 100);
    }

    #[test]
    fn test_acting_required_to_spend() {
        let (system, _registry, id) = setup(10.0);
        assert_eq!(system.check_affordable(id, 1), Err(ActionRejection::NotActing));
    }

    #[test]
    fn test_full_phase_cycle() {
        let (system, registry, id) = setup(10.0);
        for _ in 0..10 {
            system.tick();
        }
        assert_eq!(registry.borrow().get(id).unwrap().economy.phase, TurnPhase::Eligible);
        system.begin_turn(id).unwrap();
        assert_eq!(registry.borrow().get(id).unwrap().economy.phase, TurnPhase::Acting);
        system.check_affordable(id, 30).unwrap();
        system.debit(id, 30).unwrap();
        assert_eq!(registry.borrow().get(id).unwrap().economy.ap, 70);
        system.end_turn(id).unwrap();
        assert_eq!(registry.borrow().get(id).unwrap().economy.phase, TurnPhase::Accumulating);
    }

    #[test]
    fn test_begin_turn_out_of_phase_is_invariant_violation() {
        let (system, _registry, id) = setup(10.0);
        assert!(matches!(
            system.begin_turn(id),
            Err(EngineError::InvariantViolation(_))
        ));
    }
}
