//! Attack rolls: naturals, crits, fumbles, outcome categories

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::CombatConfig;

/// Roll-twice handling for favorable or hampered attacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    #[default]
    Normal,
    /// Roll twice, keep the higher natural.
    Advantage,
    /// Roll twice, keep the lower natural.
    Disadvantage,
}

/// One resolved attack roll, chronicle-ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollResult {
    pub natural: u32,
    pub modifier: i32,
    pub total: i32,
    pub is_crit: bool,
    pub is_fumble: bool,
    pub mode: RollMode,
}

/// How an attack total relates to the defense class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Critical,
    Hit,
    Graze,
    Miss,
    Fumble,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Critical => "critical",
            Outcome::Hit => "hit",
            Outcome::Graze => "graze",
            Outcome::Miss => "miss",
            Outcome::Fumble => "fumble",
        }
    }

    pub fn lands(&self) -> bool {
        matches!(self, Outcome::Critical | Outcome::Hit | Outcome::Graze)
    }
}

fn roll_natural(config: &CombatConfig, rng: &mut impl Rng) -> u32 {
    (0..config.dice_count).map(|_| rng.gen_range(1..=config.dice_sides)).sum()
}

/// Roll the configured dice with a flat modifier.
///
/// Crit and fumble are decided by the natural alone; no modifier can buy a
/// critical or argue away a fumble.
pub fn resolve_roll(
    config: &CombatConfig,
    modifier: i32,
    mode: RollMode,
    rng: &mut impl Rng,
) -> RollResult {
    let first = roll_natural(config, rng);
    let second = roll_natural(config, rng);
    let natural = match mode {
        RollMode::Normal => first,
        RollMode::Advantage => first.max(second),
        RollMode::Disadvantage => first.min(second),
    };
    RollResult {
        natural,
        modifier,
        total: natural as i32 + modifier,
        is_crit: natural >= config.crit_threshold,
        is_fumble: natural <= config.fumble_threshold,
        mode,
    }
}

/// Map a roll against a defense class to an outcome category.
///
/// Fumble wins over crit when thresholds are misconfigured close enough to
/// overlap; validate() prevents that in practice.
pub fn categorize(roll: &RollResult, defense_class: i32, graze_band: u32) -> Outcome {
    if roll.is_fumble {
        return Outcome::Fumble;
    }
    if roll.is_crit {
        return Outcome::Critical;
    }
    if roll.total >= defense_class {
        return Outcome::Hit;
    }
    if roll.total >= defense_class - graze_band as i32 {
        return Outcome::Graze;
    }
    Outcome::Miss
}
