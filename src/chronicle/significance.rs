//! Significance scoring (1 ambient .. 5 legendary)

use crate::events::{EventEnvelope, EventKey};

/// Pluggable scoring strategy. The inscriber gates entries on the score
/// this returns; swapping the strategy changes what history remembers.
pub trait SignificanceScorer {
    fn score(&self, event: &EventEnvelope) -> u8;
}

/// Default table-driven scorer with magnitude overrides.
///
/// 1 ambient turn flow, 2 standard combat, 3 notable, 4 significant,
/// 5 legendary. A stress spike of magnitude 0.5 or more is raised to 4;
/// death never scores below 4.
#[derive(Debug, Default)]
pub struct TableScorer;

impl SignificanceScorer for TableScorer {
    fn score(&self, event: &EventEnvelope) -> u8 {
        let base = match event.key {
            EventKey::TurnStarted | EventKey::TurnEnded => 1,
            EventKey::ActionResolved | EventKey::DamageApplied => 2,
            EventKey::ModifierAdded
            | EventKey::ModifierExpired
            | EventKey::RoundEnded
            | EventKey::StressSpike
            | EventKey::RumorShared => 3,
            EventKey::Death | EventKey::Migration => 4,
            EventKey::DispositionShift
            | EventKey::LegacyConverted
            | EventKey::SessionOpened
            | EventKey::SessionClosed => 5,
        };
        if event.key == EventKey::StressSpike {
            let magnitude = event.data.float("magnitude").unwrap_or(0.0);
            if magnitude >= 0.5 {
                return base.max(4);
            }
        }
        base
    }
}
