//! Social state: reputation, stress, resilience, disposition
//!
//! This engine owns every actor's social component; combat code has no
//! path to these values, so the single-writer rule holds by construction.
//! Stress is applied exclusively through `social.stress_spike` events: the
//! engine translates damage, death, and fumbles into spikes, and separately
//! applies every spike it sees. Conduction rides the same mechanism.

use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::config::SocialConfig;
use crate::core::error::Result;
use crate::core::types::ActorId;
use crate::events::{EventBus, EventEnvelope, EventKey};

pub const CAUSE_DAMAGE: &str = "combat_damage";
pub const CAUSE_DEATH: &str = "combat_death";
pub const CAUSE_FUMBLE: &str = "fumble";

/// Per-actor social values. Mutable only through the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialComponent {
    reputation: f64,
    moral_weight: f64,
    stress: f64,
    resilience: f64,
}

impl Default for SocialComponent {
    fn default() -> Self {
        Self { reputation: 0.0, moral_weight: 0.5, stress: 0.0, resilience: 1.0 }
    }
}

impl SocialComponent {
    pub fn reputation(&self) -> f64 {
        self.reputation
    }

    pub fn moral_weight(&self) -> f64 {
        self.moral_weight
    }

    pub fn stress(&self) -> f64 {
        self.stress
    }

    pub fn resilience(&self) -> f64 {
        self.resilience
    }

    /// Resilience soaks the spike first and depletes; whatever it cannot
    /// absorb lands on stress.
    fn absorb_spike(&mut self, magnitude: f64) {
        let magnitude = magnitude.max(0.0);
        let absorbed = magnitude.min(self.resilience);
        self.resilience -= absorbed;
        self.stress = (self.stress + magnitude - absorbed).clamp(0.0, 1.0);
    }

    fn decay(&mut self, rate: f64) {
        self.stress = (self.stress - rate).max(0.0);
    }

    fn shift_reputation(&mut self, delta: f64) {
        self.reputation = (self.reputation + delta).clamp(-1.0, 1.0);
    }
}

/// Snapshot of the three threshold flags, used to bound catch-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdFlags {
    pub refuses_interaction: bool,
    pub cooperative: bool,
    pub exodus_risk: bool,
}

pub struct SocialEngine {
    config: SocialConfig,
    bus: Rc<EventBus>,
    components: RefCell<AHashMap<ActorId, SocialComponent>>,
}

impl SocialEngine {
    pub fn attach(bus: &Rc<EventBus>, config: SocialConfig) -> Rc<Self> {
        let engine = Rc::new(Self {
            config,
            bus: Rc::clone(bus),
            components: RefCell::new(AHashMap::new()),
        });

        let damage = Rc::clone(&engine);
        bus.subscribe(EventKey::DamageApplied, Rc::new(move |e| damage.on_damage(e)));
        let death = Rc::clone(&engine);
        bus.subscribe(EventKey::Death, Rc::new(move |e| death.on_death(e)));
        let resolved = Rc::clone(&engine);
        bus.subscribe(EventKey::ActionResolved, Rc::new(move |e| resolved.on_action(e)));
        let spike = Rc::clone(&engine);
        bus.subscribe(EventKey::StressSpike, Rc::new(move |e| spike.on_spike(e)));
        engine
    }

    /// Damage translates to a stress spike on whoever took it. The scale is
    /// configured, never hardcoded per ability.
    fn on_damage(&self, event: &EventEnvelope) -> Result<()> {
        let Some(target) = event.target else { return Ok(()) };
        let amount = event.data.int("amount").unwrap_or(0);
        if amount <= 0 {
            return Ok(());
        }
        self.bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, target)
                .with("magnitude", amount as f64 * self.config.damage_stress_scale)
                .with("cause", CAUSE_DAMAGE),
        )
    }

    fn on_death(&self, event: &EventEnvelope) -> Result<()> {
        self.bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, event.source)
                .with("magnitude", self.config.death_stress_magnitude)
                .with("cause", CAUSE_DEATH),
        )
    }

    fn on_action(&self, event: &EventEnvelope) -> Result<()> {
        if event.data.text("outcome") != Some("fumble") {
            return Ok(());
        }
        self.bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, event.source)
                .with("magnitude", self.config.fumble_stress_magnitude)
                .with("cause", CAUSE_FUMBLE),
        )
    }

    fn on_spike(&self, event: &EventEnvelope) -> Result<()> {
        let magnitude = event.data.float("magnitude").unwrap_or(0.0);
        let mut components = self.components.borrow_mut();
        components.entry(event.source).or_default().absorb_spike(magnitude);
        Ok(())
    }

    pub fn component(&self, id: ActorId) -> SocialComponent {
        self.components.borrow().get(&id).cloned().unwrap_or_default()
    }

    pub fn stress(&self, id: ActorId) -> f64 {
        self.component(id).stress
    }

    pub fn reputation(&self, id: ActorId) -> f64 {
        self.component(id).reputation
    }

    /// The only path that moves disposition. Always emits
    /// `social.disposition_shift`, even for a zero-magnitude shift, so the
    /// chronicle sees every attempt.
    pub fn shift_disposition(&self, id: ActorId, delta: f64, cause: &str) -> Result<()> {
        {
            let mut components = self.components.borrow_mut();
            components.entry(id).or_default().shift_reputation(delta);
        }
        self.bus.emit(
            &EventEnvelope::new(EventKey::DispositionShift, id)
                .with("delta", delta)
                .with("cause", cause),
        )
    }

    pub fn flags(&self, id: ActorId) -> ThresholdFlags {
        let c = self.component(id);
        ThresholdFlags {
            refuses_interaction: c.reputation < self.config.reputation_refusal_threshold,
            cooperative: c.reputation > self.config.reputation_cooperative_threshold,
            exodus_risk: c.stress > self.config.stress_exodus_threshold,
        }
    }

    pub fn refuses_interaction(&self, id: ActorId) -> bool {
        self.flags(id).refuses_interaction
    }

    pub fn is_cooperative(&self, id: ActorId) -> bool {
        self.flags(id).cooperative
    }

    pub fn exodus_risk(&self, id: ActorId) -> bool {
        self.flags(id).exodus_risk
    }

    /// One tick of passive stress decay across every known actor.
    pub fn decay_tick(&self) {
        if self.config.stress_decay_rate <= 0.0 {
            return;
        }
        let mut components = self.components.borrow_mut();
        for component in components.values_mut() {
            component.decay(self.config.stress_decay_rate);
        }
    }

    /// Bounded session-boundary catch-up: a fixed number of decay ticks,
    /// and at most `catchup_transition_cap` threshold-flag changes per
    /// actor. An actor that used its budget sits out the rest of the pass.
    pub fn catch_up(&self) {
        let ids: Vec<ActorId> = self.components.borrow().keys().copied().collect();
        let mut transitions: AHashMap<ActorId, u32> = AHashMap::new();
        for _ in 0..self.config.catchup_ticks {
            for &id in &ids {
                if transitions.get(&id).copied().unwrap_or(0) >= self.config.catchup_transition_cap
                {
                    continue;
                }
                let before = self.flags(id);
                {
                    let mut components = self.components.borrow_mut();
                    if let Some(component) = components.get_mut(&id) {
                        component.decay(self.config.stress_decay_rate);
                    }
                }
                if self.flags(id) != before {
                    *transitions.entry(id).or_insert(0) += 1;
                }
            }
        }
        tracing::debug!(actors = ids.len(), "catch-up pass complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;

    fn rig() -> (Rc<EventBus>, Rc<SocialEngine>) {
        let bus = EventBus::new();
        let engine = SocialEngine::attach(&bus, EngineConfig::standard().social);
        (bus, engine)
    }

    #[test]
    fn test_resilience_absorbs_before_stress() {
        let (bus, engine) = rig();
        let id = ActorId(0);
        // 0.6 spike: resilience 1.0 soaks all of it
        bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, id)
                .with("magnitude", 0.6)
                .with("cause", "test"),
        )
        .unwrap();
        let c = engine.component(id);
        assert!((c.resilience() - 0.4).abs() < 1e-9);
        assert_eq!(c.stress(), 0.0);

        // next 0.6 spike: 0.4 absorbed, 0.2 lands
        bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, id)
                .with("magnitude", 0.6)
                .with("cause", "test"),
        )
        .unwrap();
        let c = engine.component(id);
        assert_eq!(c.resilience(), 0.0);
        assert!((c.stress() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_damage_event_becomes_scaled_spike() {
        let (bus, engine) = rig();
        let victim = ActorId(1);
        bus.emit(
            &EventEnvelope::new(EventKey::DamageApplied, ActorId(0))
                .with_target(victim)
                .with("amount", 30),
        )
        .unwrap();
        // 30 damage * 0.01 scale = 0.3, all soaked by resilience
        let c = engine.component(victim);
        assert!((c.resilience() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_stress_clamped_at_one() {
        let (bus, engine) = rig();
        let id = ActorId(0);
        for _ in 0..10 {
            bus.emit(
                &EventEnvelope::new(EventKey::StressSpike, id)
                    .with("magnitude", 0.5)
                    .with("cause", "test"),
            )
            .unwrap();
        }
        assert_eq!(engine.stress(id), 1.0);
    }

    #[test]
    fn test_disposition_shift_always_emits() {
        let (bus, engine) = rig();
        let shifts = Rc::new(RefCell::new(0u32));
        let count = Rc::clone(&shifts);
        bus.subscribe(
            EventKey::DispositionShift,
            Rc::new(move |_e| {
                *count.borrow_mut() += 1;
                Ok(())
            }),
        );
        engine.shift_disposition(ActorId(0), 0.2, "shared_victory").unwrap();
        engine.shift_disposition(ActorId(0), 0.0, "small_talk").unwrap();
        assert_eq!(*shifts.borrow(), 2);
        assert!((engine.reputation(ActorId(0)) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_reputation_clamped_to_band() {
        let (_bus, engine) = rig();
        let id = ActorId(0);
        for _ in 0..20 {
            engine.shift_disposition(id, -0.3, "betrayal").unwrap();
        }
        assert_eq!(engine.reputation(id), -1.0);
        assert!(engine.refuses_interaction(id));
        assert!(!engine.is_cooperative(id));
    }

    #[test]
    fn test_exodus_flag_tracks_threshold_exactly() {
        let (bus, engine) = rig();
        let id = ActorId(0);
        // burn resilience, then push stress to exactly the threshold
        bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, id)
                .with("magnitude", 1.7)
                .with("cause", "test"),
        )
        .unwrap();
        assert!((engine.stress(id) - 0.7).abs() < 1e-9);
        assert!(!engine.exodus_risk(id));

        bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, id)
                .with("magnitude", 0.01)
                .with("cause", "test"),
        )
        .unwrap();
        assert!(engine.exodus_risk(id));
    }

    #[test]
    fn test_catch_up_caps_flag_transitions() {
        let bus = EventBus::new();
        let mut config = EngineConfig::standard().social;
        config.stress_decay_rate = 0.2;
        config.catchup_ticks = 5;
        config.catchup_transition_cap = 1;
        let engine = SocialEngine::attach(&bus, config);
        let id = ActorId(0);
        bus.emit(
            &EventEnvelope::new(EventKey::StressSpike, id)
                .with("magnitude", 1.8)
                .with("cause", "test"),
        )
        .unwrap();
        assert!(engine.exodus_risk(id));

        engine.catch_up();
        // the first decay tick cleared the exodus flag; that used the
        // actor's budget, so the remaining four ticks were skipped
        assert!(!engine.exodus_risk(id));
        assert!((engine.stress(id) - 0.6).abs() < 1e-9);
    }
}
