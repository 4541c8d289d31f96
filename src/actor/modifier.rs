//! Self-expiring stat modifiers
//!
//! A modifier adjusts one stat by a signed amount until one of its trigger
//! events has been observed `max_triggers` times. Expiry is never decided
//! here on the spot: the lifecycle checkpoint records observations and
//! removes expired modifiers at the end of the turn window.

use serde::{Deserialize, Serialize};

use crate::events::EventKey;

/// Stat slot a modifier can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
    Damage,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Attack => "attack",
            StatKind::Defense => "defense",
            StatKind::Damage => "damage",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    pub stat: StatKind,
    pub value: i32,
    /// Event keys that count toward expiry. Empty = permanent.
    pub expires_on: Vec<EventKey>,
    /// Trigger observations before the modifier expires. Values above 1
    /// model absorb-N effects (a shield that soaks three hits).
    pub max_triggers: u32,
    #[serde(skip)]
    trigger_count: u32,
    #[serde(skip)]
    expired: bool,
}

impl Modifier {
    pub fn new(name: &str, stat: StatKind, value: i32, expires_on: Vec<EventKey>) -> Self {
        Self {
            name: name.to_string(),
            stat,
            value,
            expires_on,
            max_triggers: 1,
            trigger_count: 0,
            expired: false,
        }
    }

    pub fn with_max_triggers(mut self, max_triggers: u32) -> Self {
        self.max_triggers = max_triggers.max(1);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Record one observed trigger event. Returns true exactly once, on the
    /// observation that expires the modifier.
    pub fn observe(&mut self, key: EventKey) -> bool {
        if self.expired || !self.expires_on.contains(&key) {
            return false;
        }
        self.trigger_count += 1;
        if self.trigger_count >= self.max_triggers {
            self.expired = true;
            return true;
        }
        false
    }
}
