//! Action resolution: one roll, ordered effects, mandated event order
//!
//! Event order for a landing attack is fixed: `combat.on_damage`, then
//! `combat.on_death` if fatal, then `combat.action_resolved`. Turn end is
//! the caller's transition. Validation happens before any mutation; a
//! rejected action leaves no trace on the bus or in any component.

use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

use crate::abilities::{AbilityBook, AbilityDef, EffectDef, TargetType};
use crate::actor::{ActorRegistry, Modifier, StatKind};
use crate::combat::dice::{categorize, resolve_roll, Outcome, RollMode, RollResult};
use crate::core::config::CombatConfig;
use crate::core::error::{ActionRejection, Result};
use crate::core::types::ActorId;
use crate::economy::EconomySystem;
use crate::events::{EventBus, EventEnvelope, EventKey};
use crate::spatial::GridMap;

/// What happened when an action was submitted.
#[derive(Debug)]
pub enum ActionResult {
    Resolved(ActionReport),
    /// Turned away during validation. Nothing mutated, nothing emitted.
    Rejected(ActionRejection),
}

#[derive(Debug, Clone)]
pub struct ActionReport {
    pub ability: String,
    pub outcome: Option<Outcome>,
    pub roll: Option<RollResult>,
    pub damage_dealt: i32,
}

pub struct CombatResolver {
    config: CombatConfig,
    bus: Rc<EventBus>,
    registry: Rc<RefCell<ActorRegistry>>,
    abilities: Rc<AbilityBook>,
    economy: Rc<EconomySystem>,
    grid: Rc<RefCell<GridMap>>,
}

impl CombatResolver {
    pub fn new(
        config: CombatConfig,
        bus: Rc<EventBus>,
        registry: Rc<RefCell<ActorRegistry>>,
        abilities: Rc<AbilityBook>,
        economy: Rc<EconomySystem>,
        grid: Rc<RefCell<GridMap>>,
    ) -> Self {
        Self { config, bus, registry, abilities, economy, grid }
    }

    /// Validate and resolve one ability use.
    pub fn execute(
        &self,
        source: ActorId,
        ability_id: &str,
        target: Option<ActorId>,
        mode: RollMode,
        rng: &mut impl Rng,
    ) -> Result<ActionResult> {
        let ability = match self.abilities.get(ability_id) {
            Some(a) => a.clone(),
            None => {
                return Ok(ActionResult::Rejected(ActionRejection::UnknownAbility(
                    ability_id.to_string(),
                )))
            }
        };
        if let Err(rejection) = self.economy.check_affordable(source, ability.ap_cost) {
            return Ok(ActionResult::Rejected(rejection));
        }
        let effective_target = match self.validate_target(source, &ability, target) {
            Ok(t) => t,
            Err(rejection) => return Ok(ActionResult::Rejected(rejection)),
        };

        // validation is over; from here the action resolves unconditionally
        let needs_roll = ability.effects.iter().any(|e| matches!(e, EffectDef::Damage { .. }));
        let (roll, outcome, defense_class) = if needs_roll {
            let (attack, defense) = {
                let registry = self.registry.borrow();
                let attack = registry.get(source)?.stat(StatKind::Attack);
                let defense = registry.get(effective_target)?.stat(StatKind::Defense);
                (attack, defense)
            };
            let dc = self.config.base_defense_class + defense;
            let roll = resolve_roll(&self.config, attack, mode, rng);
            let outcome = categorize(&roll, dc, self.config.graze_band);
            (Some(roll), Some(outcome), Some(dc))
        } else {
            (None, None, None)
        };

        let mut damage_dealt = 0;
        for effect in &ability.effects {
            match effect {
                EffectDef::Damage { formula } => {
                    let outcome = outcome.unwrap_or(Outcome::Hit);
                    if !outcome.lands() {
                        continue;
                    }
                    let bonus = self.registry.borrow().get(source)?.stat(StatKind::Damage);
                    let raw = (formula.roll(rng) + bonus).max(0);
                    let scaled = match outcome {
                        Outcome::Critical => {
                            (raw as f64 * self.config.crit_multiplier).round() as i32
                        }
                        Outcome::Graze => (raw / 2).max(1),
                        _ => raw,
                    };
                    damage_dealt += self.deal(source, effective_target, scaled)?;
                }
                EffectDef::Heal { formula } => {
                    let amount = formula.roll(rng).max(0);
                    self.deal(source, effective_target, -amount)?;
                }
                EffectDef::ApplyModifier { name, stat, value, expires_on, max_triggers } => {
                    let modifier = Modifier::new(name, *stat, *value, expires_on.clone())
                        .with_max_triggers(*max_triggers);
                    self.registry.borrow_mut().add_modifier(effective_target, modifier)?;
                    self.bus.emit(
                        &EventEnvelope::new(EventKey::ModifierAdded, source)
                            .with_target(effective_target)
                            .with("modifier", name.as_str())
                            .with("stat", stat.as_str())
                            .with("value", *value),
                    )?;
                }
                EffectDef::Reposition { dx, dy } => {
                    self.grid.borrow_mut().shift(source, *dx, *dy);
                }
            }
        }

        self.economy.debit(source, ability.ap_cost)?;

        let mut resolved = EventEnvelope::new(EventKey::ActionResolved, source)
            .with("ability", ability.id.as_str())
            .with("ap_cost", ability.ap_cost)
            .with("damage", damage_dealt);
        if let Some(t) = target {
            resolved = resolved.with_target(t);
        }
        if let (Some(roll), Some(outcome), Some(dc)) = (roll, outcome, defense_class) {
            resolved = resolved
                .with("outcome", outcome.as_str())
                .with("natural", roll.natural)
                .with("total", roll.total)
                .with("defense_class", dc);
        }
        self.bus.emit(&resolved)?;

        tracing::debug!(
            ability = %ability.id,
            outcome = outcome.map(|o| o.as_str()).unwrap_or("auto"),
            damage_dealt,
            "resolved"
        );
        Ok(ActionResult::Resolved(ActionReport {
            ability: ability.id,
            outcome,
            roll,
            damage_dealt,
        }))
    }

    fn validate_target(
        &self,
        source: ActorId,
        ability: &AbilityDef,
        target: Option<ActorId>,
    ) -> std::result::Result<ActorId, ActionRejection> {
        match ability.target {
            TargetType::SelfOnly => match target {
                None => Ok(source),
                Some(t) if t == source => Ok(source),
                Some(_) => {
                    Err(ActionRejection::InvalidTarget("ability only targets self".to_string()))
                }
            },
            TargetType::Ally | TargetType::Enemy => {
                let t = target
                    .ok_or_else(|| ActionRejection::InvalidTarget("target required".to_string()))?;
                if ability.target == TargetType::Enemy && t == source {
                    return Err(ActionRejection::InvalidTarget(
                        "cannot attack self".to_string(),
                    ));
                }
                let registry = self.registry.borrow();
                match registry.get(t) {
                    Ok(actor) if actor.is_active() => Ok(t),
                    Ok(_) => Err(ActionRejection::InvalidTarget("target is down".to_string())),
                    Err(_) => Err(ActionRejection::InvalidTarget("unknown actor".to_string())),
                }
            }
        }
    }

    /// Route an hp change through the authorized path and emit the damage
    /// and death events in order. Returns the damage actually applied.
    fn deal(&self, source: ActorId, target: ActorId, amount: i32) -> Result<i32> {
        let outcome = self.registry.borrow_mut().apply_damage(target, amount)?;
        if outcome.applied != 0 {
            self.bus.emit(
                &EventEnvelope::new(EventKey::DamageApplied, source)
                    .with_target(target)
                    .with("amount", outcome.applied)
                    .with("hp_remaining", outcome.hp_remaining),
            )?;
        }
        if outcome.fatal {
            self.bus.emit(
                &EventEnvelope::new(EventKey::Death, target)
                    .with("final_hp", outcome.hp_remaining),
            )?;
        }
        Ok(outcome.applied.max(0))
    }
}
