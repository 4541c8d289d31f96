//! Engine configuration with documented constants
//!
//! Every tunable the engine reads lives here. There are no other numeric
//! knobs hidden in the code: a constant that is not in this struct is a bug.
//! Loading from TOML is strict: a missing field or an unknown field is a
//! fatal startup error, never a silent default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{EngineError, Result};

/// Full configuration surface for the simulation core.
///
/// `EngineConfig::standard()` carries the canonical tuned values and is the
/// documented baseline for tests and the demo binary. Production sessions
/// load a TOML file via [`EngineConfig::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub economy: EconomyConfig,
    pub combat: CombatConfig,
    pub chronicle: ChronicleConfig,
    pub social: SocialConfig,
    pub conduction: ConductionConfig,
    pub equilibrium: EquilibriumConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EconomyConfig {
    /// Energy an actor must bank before its turn comes up.
    ///
    /// Energy accumulates each tick at the actor's speed, so an actor with
    /// speed 10 reaches a 100-point threshold in 10 ticks. Residual energy
    /// above the threshold carries over, letting fast actors bank partial
    /// turns.
    pub energy_threshold: f64,

    /// Action-point pool granted at the start of each turn.
    pub ap_pool: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombatConfig {
    /// Number of dice rolled for an attack (2 gives a bell curve; 1 is the
    /// flat-distribution design-experiment alternative).
    pub dice_count: u32,

    /// Sides per die.
    pub dice_sides: u32,

    /// Natural roll at or above this is a critical, regardless of modifiers.
    pub crit_threshold: u32,

    /// Natural roll at or below this is a fumble, regardless of defense.
    pub fumble_threshold: u32,

    /// Defense class before the defender's defense modifier is added.
    pub base_defense_class: i32,

    /// A total within this many points below the defense class grazes
    /// instead of missing.
    pub graze_band: u32,

    /// Damage multiplier applied on a critical.
    pub crit_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChronicleConfig {
    /// Minimum significance (1-5) for an event to be inscribed.
    pub significance_min: u8,

    /// Confidence assigned to witnessed entries.
    pub confidence_witnessed: f64,

    /// Confidence assigned to fabricated (off-screen) entries.
    pub confidence_fabricated: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialConfig {
    /// Stress magnitude per point of damage taken (damage 10 at the default
    /// 0.01 scale spikes stress by 0.1).
    pub damage_stress_scale: f64,

    /// Stress magnitude of witnessing or suffering a death.
    pub death_stress_magnitude: f64,

    /// Stress the acting actor takes on a fumbled action.
    pub fumble_stress_magnitude: f64,

    /// Passive per-tick stress decay. Zero by default: stress does not fade
    /// on its own in the current tuning.
    pub stress_decay_rate: f64,

    /// Reputation below this flags the actor as refusing interaction.
    pub reputation_refusal_threshold: f64,

    /// Reputation above this flags cooperative behaviors.
    pub reputation_cooperative_threshold: f64,

    /// Stress above this flags exodus risk. The flag is read by party AI;
    /// it mutates nothing by itself.
    pub stress_exodus_threshold: f64,

    /// Ticks of social simulation advanced at a session boundary.
    ///
    /// Bounded on purpose: the world must not drift arbitrarily far while
    /// the player was not observing.
    pub catchup_ticks: u32,

    /// Maximum threshold-flag transitions per actor per catch-up pass.
    pub catchup_transition_cap: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConductionConfig {
    /// Fraction of a stress spike that reaches neighbors. Zero disables
    /// conduction entirely. Valid range [0, 1).
    pub coefficient: f64,

    /// Per-tile decay of the propagated magnitude. Valid range [0, 1).
    pub attenuation: f64,

    /// Grid radius inside which a spike conducts at all.
    pub range: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquilibriumConfig {
    /// Base of the migration taper threshold. Valid range [20, 80].
    ///
    /// A node migrates when a uniform roll in [1,100] exceeds
    /// `base_resistance + living_count * vitality`.
    pub base_resistance: f64,

    /// Living population at which the population term of vitality is
    /// neutral.
    pub vitality_baseline_population: f64,

    /// How strongly each recent chronicled death drags vitality down.
    pub death_trend_weight: f64,

    /// How many ticks back the vitality trend looks in the chronicle.
    pub trend_window: u64,

    /// Stress spike magnitude delivered to actors adjacent to a retiring
    /// one.
    pub retirement_grief_magnitude: f64,

    /// Grid radius within which retirement grief lands.
    pub retirement_grief_range: u32,
}

impl EngineConfig {
    /// The canonical tuned configuration.
    ///
    /// Every value here is a documented design variable; tests and the demo
    /// binary run against this baseline.
    pub fn standard() -> Self {
        Self {
            economy: EconomyConfig { energy_threshold: 100.0, ap_pool: 100 },
            combat: CombatConfig {
                dice_count: 2,
                dice_sides: 8,
                crit_threshold: 16,
                fumble_threshold: 2,
                base_defense_class: 10,
                graze_band: 4,
                crit_multiplier: 2.0,
            },
            chronicle: ChronicleConfig {
                significance_min: 2,
                confidence_witnessed: 0.9,
                confidence_fabricated: 0.4,
            },
            social: SocialConfig {
                damage_stress_scale: 0.01,
                death_stress_magnitude: 0.5,
                fumble_stress_magnitude: 0.05,
                stress_decay_rate: 0.0,
                reputation_refusal_threshold: -0.3,
                reputation_cooperative_threshold: 0.4,
                stress_exodus_threshold: 0.7,
                catchup_ticks: 5,
                catchup_transition_cap: 1,
            },
            conduction: ConductionConfig { coefficient: 0.3, attenuation: 0.6, range: 5 },
            equilibrium: EquilibriumConfig {
                base_resistance: 40.0,
                vitality_baseline_population: 8.0,
                death_trend_weight: 0.05,
                trend_window: 100,
                retirement_grief_magnitude: 0.2,
                retirement_grief_range: 3,
            },
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// Strict by design: every constant must be present, and unknown keys
    /// are rejected. A partially specified file is a startup failure.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate internal consistency and documented ranges.
    pub fn validate(&self) -> Result<()> {
        if self.economy.energy_threshold <= 0.0 {
            return Err(EngineError::Config("energy_threshold must be positive".into()));
        }
        if self.economy.ap_pool == 0 {
            return Err(EngineError::Config("ap_pool must be positive".into()));
        }
        if self.combat.dice_count == 0 || self.combat.dice_sides < 2 {
            return Err(EngineError::Config(
                "dice configuration must roll at least one die with 2+ sides".into(),
            ));
        }
        let max_natural = self.combat.dice_count * self.combat.dice_sides;
        if self.combat.crit_threshold > max_natural {
            return Err(EngineError::Config(format!(
                "crit_threshold {} is unreachable on {}d{}",
                self.combat.crit_threshold, self.combat.dice_count, self.combat.dice_sides
            )));
        }
        if self.combat.fumble_threshold >= self.combat.crit_threshold {
            return Err(EngineError::Config(format!(
                "fumble_threshold {} must be below crit_threshold {}",
                self.combat.fumble_threshold, self.combat.crit_threshold
            )));
        }
        if self.combat.crit_multiplier < 1.0 {
            return Err(EngineError::Config("crit_multiplier must be >= 1.0".into()));
        }
        if !(1..=5).contains(&self.chronicle.significance_min) {
            return Err(EngineError::Config("significance_min must be in 1..=5".into()));
        }
        if self.chronicle.confidence_fabricated >= self.chronicle.confidence_witnessed {
            return Err(EngineError::Config(format!(
                "confidence_fabricated {} must be below confidence_witnessed {}",
                self.chronicle.confidence_fabricated, self.chronicle.confidence_witnessed
            )));
        }
        for (name, v) in [
            ("confidence_witnessed", self.chronicle.confidence_witnessed),
            ("confidence_fabricated", self.chronicle.confidence_fabricated),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(EngineError::Config(format!("{name} must be in [0,1]")));
            }
        }
        for (name, v) in [
            ("conduction.coefficient", self.conduction.coefficient),
            ("conduction.attenuation", self.conduction.attenuation),
        ] {
            if !(0.0..1.0).contains(&v) {
                return Err(EngineError::Config(format!("{name} must be in [0,1)")));
            }
        }
        if !(20.0..=80.0).contains(&self.equilibrium.base_resistance) {
            return Err(EngineError::Config(format!(
                "equilibrium.base_resistance {} outside valid range [20,80]",
                self.equilibrium.base_resistance
            )));
        }
        if self.social.reputation_refusal_threshold >= self.social.reputation_cooperative_threshold
        {
            return Err(EngineError::Config(
                "reputation_refusal_threshold must be below reputation_cooperative_threshold"
                    .into(),
            ));
        }
        if self.social.stress_decay_rate < 0.0 {
            return Err(EngineError::Config("stress_decay_rate must be non-negative".into()));
        }
        Ok(())
    }
}
