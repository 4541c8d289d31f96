//! Hit points behind a single mutation path

use serde::{Deserialize, Serialize};

/// Result of one pass through the damage path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Signed hp change actually applied (negative = healing).
    pub applied: i32,
    pub hp_remaining: i32,
    /// True only on the application that dropped hp to zero.
    pub fatal: bool,
}

/// Actor hit points.
///
/// `hp` is private: [`Vitals::apply_damage`] is the only mutation path in
/// the crate. Healing goes through the same path as a negative amount, so
/// every hp change crosses one choke point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vitals {
    max_hp: i32,
    hp: i32,
}

impl Vitals {
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self { max_hp, hp: max_hp }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply a signed hp change. Positive amounts are damage and clamp at
    /// zero; negative amounts heal and clamp at max. The dead stay dead:
    /// healing a corpse is a no-op.
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome { applied: 0, hp_remaining: self.hp, fatal: false };
        }
        let before = self.hp;
        self.hp = (self.hp - amount).clamp(0, self.max_hp);
        DamageOutcome {
            applied: before - self.hp,
            hp_remaining: self.hp,
            fatal: self.hp == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut v = Vitals::new(10);
        let out = v.apply_damage(25);
        assert_eq!(out.hp_remaining, 0);
        assert_eq!(out.applied, 10);
        assert!(out.fatal);
        assert!(!v.is_alive());
    }

    #[test]
    fn test_fatal_flag_fires_once() {
        let mut v = Vitals::new(5);
        assert!(v.apply_damage(5).fatal);
        let again = v.apply_damage(5);
        assert!(!again.fatal);
        assert_eq!(again.applied, 0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut v = Vitals::new(10);
        v.apply_damage(6);
        let out = v.apply_damage(-20);
        assert_eq!(out.hp_remaining, 10);
        assert_eq!(out.applied, -6);
        assert!(!out.fatal);
    }

    #[test]
    fn test_healing_a_corpse_is_a_no_op() {
        let mut v = Vitals::new(10);
        v.apply_damage(10);
        let out = v.apply_damage(-5);
        assert_eq!(out.applied, 0);
        assert!(!v.is_alive());
    }
}
