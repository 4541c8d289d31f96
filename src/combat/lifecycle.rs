//! Modifier expiry checkpoint
//!
//! Modifiers never expire in-line as events stream past. This subscriber
//! records which trigger events each actor was involved in during its turn
//! window, and settles all expirations in one pass when the turn ends: the
//! full removal set is determined first, then the expiry events fire. An
//! expiry event is recorded into the *next* window, so one expiry can never
//! cascade into another inside the same pass.

use ahash::AHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::actor::ActorRegistry;
use crate::core::error::{EngineError, Result};
use crate::core::types::ActorId;
use crate::events::{EventBus, EventEnvelope, EventKey};

pub struct ModifierLifecycle {
    bus: Rc<EventBus>,
    registry: Rc<RefCell<ActorRegistry>>,
    window: RefCell<AHashMap<ActorId, Vec<EventKey>>>,
    in_check: Cell<bool>,
}

impl ModifierLifecycle {
    pub fn attach(bus: &Rc<EventBus>, registry: Rc<RefCell<ActorRegistry>>) -> Rc<Self> {
        let lifecycle = Rc::new(Self {
            bus: Rc::clone(bus),
            registry,
            window: RefCell::new(AHashMap::new()),
            in_check: Cell::new(false),
        });
        let handler = Rc::clone(&lifecycle);
        bus.subscribe_wildcard(Rc::new(move |e| handler.handle(e)));
        lifecycle
    }

    fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if event.key == EventKey::TurnEnded {
            if self.in_check.get() {
                return Err(EngineError::InvariantViolation(
                    "modifier checkpoint re-entered during determination".to_string(),
                ));
            }
            return self.checkpoint(event.source);
        }
        // attribute the event to every involved actor's current window
        let mut window = self.window.borrow_mut();
        window.entry(event.source).or_default().push(event.key);
        if let Some(target) = event.target {
            if target != event.source {
                window.entry(target).or_default().push(event.key);
            }
        }
        Ok(())
    }

    fn checkpoint(&self, actor: ActorId) -> Result<()> {
        self.in_check.set(true);
        let mut observed = self.window.borrow_mut().remove(&actor).unwrap_or_default();
        // the turn-end itself is a trigger event for this actor
        observed.push(EventKey::TurnEnded);

        let expired: Vec<(String, &'static str)> = {
            let mut registry = self.registry.borrow_mut();
            let actor_rec = match registry.get_mut(actor) {
                Ok(a) => a,
                Err(e) => {
                    self.in_check.set(false);
                    return Err(e);
                }
            };
            for modifier in actor_rec.modifiers.iter_mut() {
                for key in &observed {
                    modifier.observe(*key);
                }
            }
            let expired = actor_rec
                .modifiers
                .iter()
                .filter(|m| m.is_expired())
                .map(|m| (m.name.clone(), m.stat.as_str()))
                .collect();
            actor_rec.modifiers.retain(|m| !m.is_expired());
            expired
        };
        self.in_check.set(false);

        for (name, stat) in expired {
            tracing::debug!(?actor, modifier = %name, "expired");
            self.bus.emit(
                &EventEnvelope::new(EventKey::ModifierExpired, actor)
                    .with("modifier", name.as_str())
                    .with("stat", stat),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::registry::ActorSpawn;
    use crate::actor::{CombatStats, Modifier, StatKind};

    fn rig() -> (Rc<EventBus>, Rc<RefCell<ActorRegistry>>, ActorId) {
        let bus = EventBus::new();
        let registry = Rc::new(RefCell::new(ActorRegistry::new()));
        let id = registry.borrow_mut().spawn(ActorSpawn {
            name: "Moth".to_string(),
            archetype: "Elite".to_string(),
            is_player: false,
            max_hp: 10,
            stats: CombatStats::default(),
            speed: 10.0,
            node: None,
        });
        ModifierLifecycle::attach(&bus, Rc::clone(&registry));
        (bus, registry, id)
    }

    #[test]
    fn test_turn_end_expiry_removes_and_announces() {
        let (bus, registry, id) = rig();
        registry
            .borrow_mut()
            .add_modifier(
                id,
                Modifier::new("Guarded", StatKind::Defense, 2, vec![EventKey::TurnEnded]),
            )
            .unwrap();

        let expired = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&expired);
        bus.subscribe(
            EventKey::ModifierExpired,
            Rc::new(move |e| {
                log.borrow_mut().push(e.data.text("modifier").unwrap_or("").to_string());
                Ok(())
            }),
        );

        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        assert_eq!(*expired.borrow(), vec!["Guarded".to_string()]);
        assert!(registry.borrow().get(id).unwrap().modifiers.is_empty());
    }

    #[test]
    fn test_damage_triggered_expiry_waits_for_checkpoint() {
        let (bus, registry, id) = rig();
        registry
            .borrow_mut()
            .add_modifier(
                id,
                Modifier::new("Ward", StatKind::Defense, 3, vec![EventKey::DamageApplied]),
            )
            .unwrap();

        bus.emit(
            &EventEnvelope::new(EventKey::DamageApplied, ActorId(99))
                .with_target(id)
                .with("amount", 4),
        )
        .unwrap();
        // still in place until the turn-end checkpoint
        assert_eq!(registry.borrow().get(id).unwrap().modifiers.len(), 1);

        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        assert!(registry.borrow().get(id).unwrap().modifiers.is_empty());
    }

    #[test]
    fn test_expiry_cannot_cascade_within_one_pass() {
        let (bus, registry, id) = rig();
        {
            let mut reg = registry.borrow_mut();
            reg.add_modifier(
                id,
                Modifier::new("First", StatKind::Attack, 1, vec![EventKey::TurnEnded]),
            )
            .unwrap();
            // would expire on a modifier_expired event, but only from the
            // next window onwards
            reg.add_modifier(
                id,
                Modifier::new("Echo", StatKind::Attack, 1, vec![EventKey::ModifierExpired]),
            )
            .unwrap();
        }

        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        {
            let reg = registry.borrow();
            let mods = &reg.get(id).unwrap().modifiers;
            assert_eq!(mods.len(), 1);
            assert_eq!(mods[0].name, "Echo");
        }

        // the recorded expiry event settles Echo at the next checkpoint
        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        assert!(registry.borrow().get(id).unwrap().modifiers.is_empty());
    }

    #[test]
    fn test_absorb_two_survives_first_checkpoint() {
        let (bus, registry, id) = rig();
        registry
            .borrow_mut()
            .add_modifier(
                id,
                Modifier::new("Bulwark", StatKind::Defense, 2, vec![EventKey::DamageApplied])
                    .with_max_triggers(2),
            )
            .unwrap();

        let hit = |bus: &Rc<EventBus>| {
            bus.emit(
                &EventEnvelope::new(EventKey::DamageApplied, ActorId(99))
                    .with_target(id)
                    .with("amount", 1),
            )
            .unwrap();
        };

        hit(&bus);
        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        assert_eq!(registry.borrow().get(id).unwrap().modifiers.len(), 1);

        hit(&bus);
        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        assert!(registry.borrow().get(id).unwrap().modifiers.is_empty());
    }

    #[test]
    fn test_events_for_other_actors_do_not_count() {
        let (bus, registry, id) = rig();
        let other = registry.borrow_mut().spawn(ActorSpawn {
            name: "Else".to_string(),
            archetype: "Brute".to_string(),
            is_player: false,
            max_hp: 10,
            stats: CombatStats::default(),
            speed: 10.0,
            node: None,
        });
        registry
            .borrow_mut()
            .add_modifier(
                id,
                Modifier::new("Ward", StatKind::Defense, 3, vec![EventKey::DamageApplied]),
            )
            .unwrap();

        bus.emit(
            &EventEnvelope::new(EventKey::DamageApplied, ActorId(99))
                .with_target(other)
                .with("amount", 2),
        )
        .unwrap();
        bus.emit(&EventEnvelope::new(EventKey::TurnEnded, id)).unwrap();
        assert_eq!(registry.borrow().get(id).unwrap().modifiers.len(), 1);
    }
}
