//! Chronicle entries rendered as prose

use crate::chronicle::entry::ChronicleEntry;
use crate::events::EventKey;

/// Translates chronicle entries into human-readable lines for the journal
/// view and the demo binary.
#[derive(Debug, Default)]
pub struct NarrativeGenerator;

impl NarrativeGenerator {
    pub fn entry_to_text(entry: &ChronicleEntry) -> String {
        let payload = entry.payload();
        let actor = entry.actor_handle();
        let object = payload.object.as_str();
        let detail = &payload.detail;

        match payload.event_type {
            EventKey::SessionOpened => "--- Session Started ---".to_string(),
            EventKey::SessionClosed => "--- Session Ended ---".to_string(),
            EventKey::ActionResolved => {
                let damage = detail.int("damage").unwrap_or(0);
                match detail.text("outcome") {
                    Some("critical") => {
                        format!("{actor} landed a devastating critical blow on {object}!")
                    }
                    Some("fumble") => format!("{actor} fumbled their attack against {object}."),
                    Some("miss") => format!("{actor} missed {object}."),
                    _ => format!("{actor} struck {object} for {damage} damage."),
                }
            }
            EventKey::DamageApplied => {
                let amount = detail.int("amount").unwrap_or(0);
                if amount < 0 {
                    format!("{object} was healed for {} vitality.", -amount)
                } else {
                    format!("{object} took {amount} damage.")
                }
            }
            EventKey::Death => format!("{object} has perished."),
            EventKey::ModifierAdded => {
                let name = detail.text("modifier").unwrap_or("an effect");
                format!("{object} gained {name}.")
            }
            EventKey::ModifierExpired => {
                let name = detail.text("modifier").unwrap_or("an effect");
                format!("{name} faded from {actor}.")
            }
            EventKey::RumorShared => {
                let rumor = detail.text("rumor_name").unwrap_or("a secret");
                format!("{actor} shared rumors of '{rumor}'.")
            }
            EventKey::DispositionShift => {
                let delta = detail.float("delta").unwrap_or(0.0);
                let reason = detail.text("cause").unwrap_or("interaction");
                let direction = if delta > 0.0 { "improved" } else { "worsened" };
                format!("Reputation with {actor} has {direction} due to {reason}.")
            }
            EventKey::StressSpike => {
                let cause = detail.text("cause").unwrap_or("tension");
                format!("{actor} felt a spike of stress from {cause}.")
            }
            EventKey::Migration => {
                let direction = detail.text("direction").unwrap_or("away");
                format!("Folk drifted {direction} at {object}.")
            }
            EventKey::LegacyConverted => format!("{object} passed into legend."),
            _ => format!("{actor} {} {object}.", payload.verb),
        }
    }

    pub fn render_all(entries: &[ChronicleEntry]) -> Vec<String> {
        entries.iter().map(Self::entry_to_text).collect()
    }
}
