//! Closed event vocabulary
//!
//! Every event in the engine carries one of these keys. The vocabulary is a
//! closed enum on purpose: an arbitrary string can never enter the bus, and
//! adding a key is a deliberate, versioned change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bumped whenever a key is added, renamed, or removed.
pub const VOCABULARY_VERSION: u32 = 1;

/// Canonical event keys, serialized in their dotted string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKey {
    /// An actor crossed the energy threshold and begins its turn.
    #[serde(rename = "combat.turn_started")]
    TurnStarted,

    /// An action finished resolving; emitted unconditionally, even on a miss.
    #[serde(rename = "combat.action_resolved")]
    ActionResolved,

    /// An actor's turn is over; drives modifier expiry.
    #[serde(rename = "combat.turn_ended")]
    TurnEnded,

    /// Every actor in the encounter has had a turn this round.
    #[serde(rename = "combat.round_ended")]
    RoundEnded,

    /// Hit points changed through the authorized damage path.
    #[serde(rename = "combat.on_damage")]
    DamageApplied,

    /// An actor's hit points reached zero.
    #[serde(rename = "combat.on_death")]
    Death,

    #[serde(rename = "combat.modifier_added")]
    ModifierAdded,

    #[serde(rename = "combat.modifier_expired")]
    ModifierExpired,

    /// A sudden stress delta landed on an actor.
    #[serde(rename = "social.stress_spike")]
    StressSpike,

    /// A disposition value moved; emitted even for zero-magnitude shifts.
    #[serde(rename = "social.disposition_shift")]
    DispositionShift,

    /// One actor passed a chronicle entry on to another.
    #[serde(rename = "social.rumor_shared")]
    RumorShared,

    #[serde(rename = "chronicle.session_opened")]
    SessionOpened,

    #[serde(rename = "chronicle.session_closed")]
    SessionClosed,

    /// A settlement node gained or lost population at a session boundary.
    #[serde(rename = "equilibrium.migration")]
    Migration,

    /// An actor was retired into a legacy record.
    #[serde(rename = "equilibrium.legacy_converted")]
    LegacyConverted,
}

impl EventKey {
    /// Every key in the vocabulary, for exhaustive iteration.
    pub const ALL: [EventKey; 15] = [
        EventKey::TurnStarted,
        EventKey::ActionResolved,
        EventKey::TurnEnded,
        EventKey::RoundEnded,
        EventKey::DamageApplied,
        EventKey::Death,
        EventKey::ModifierAdded,
        EventKey::ModifierExpired,
        EventKey::StressSpike,
        EventKey::DispositionShift,
        EventKey::RumorShared,
        EventKey::SessionOpened,
        EventKey::SessionClosed,
        EventKey::Migration,
        EventKey::LegacyConverted,
    ];

    /// Canonical dotted string form, as persisted in the chronicle.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKey::TurnStarted => "combat.turn_started",
            EventKey::ActionResolved => "combat.action_resolved",
            EventKey::TurnEnded => "combat.turn_ended",
            EventKey::RoundEnded => "combat.round_ended",
            EventKey::DamageApplied => "combat.on_damage",
            EventKey::Death => "combat.on_death",
            EventKey::ModifierAdded => "combat.modifier_added",
            EventKey::ModifierExpired => "combat.modifier_expired",
            EventKey::StressSpike => "social.stress_spike",
            EventKey::DispositionShift => "social.disposition_shift",
            EventKey::RumorShared => "social.rumor_shared",
            EventKey::SessionOpened => "chronicle.session_opened",
            EventKey::SessionClosed => "chronicle.session_closed",
            EventKey::Migration => "equilibrium.migration",
            EventKey::LegacyConverted => "equilibrium.legacy_converted",
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown event key: {s}"))
    }
}
