//! Immutable chronicle entries
//!
//! Once inscribed, an entry is never modified or deleted. Corrections are
//! new entries carrying the superseded entry's id. All fields are private
//! with getters only; no mutating method exists on this type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::GameTimestamp;
use crate::events::{EventKey, Payload};

/// How the chronicle came to know about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The player was party to the event.
    Witnessed,
    /// Reconstructed off-screen; lower confidence.
    Fabricated,
}

/// Whether readers may see the entry plainly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Legibility {
    Transparent,
    Obscured,
}

/// Normalized payload: canonical key, past-tense verb, object, and the raw
/// event data preserved for fidelity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub event_type: EventKey,
    pub verb: String,
    pub object: String,
    pub detail: Payload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChronicleEntry {
    event_id: Uuid,
    timestamp: GameTimestamp,
    provenance: Provenance,
    legibility: Legibility,
    actor_handle: String,
    payload: EntryPayload,
    confidence: f64,
    /// Dormant: always 0 at inscription, read by later reconciliation.
    citation_count: u32,
    significance: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supersedes: Option<Uuid>,
}

impl ChronicleEntry {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        timestamp: GameTimestamp,
        provenance: Provenance,
        actor_handle: String,
        payload: EntryPayload,
        confidence: f64,
        significance: u8,
        supersedes: Option<Uuid>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp,
            provenance,
            legibility: Legibility::Transparent,
            actor_handle,
            payload,
            confidence: confidence.clamp(0.0, 1.0),
            citation_count: 0,
            significance: significance.clamp(1, 5),
            supersedes,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn timestamp(&self) -> GameTimestamp {
        self.timestamp
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn legibility(&self) -> Legibility {
        self.legibility
    }

    pub fn actor_handle(&self) -> &str {
        &self.actor_handle
    }

    pub fn payload(&self) -> &EntryPayload {
        &self.payload
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn citation_count(&self) -> u32 {
        self.citation_count
    }

    pub fn significance(&self) -> u8 {
        self.significance
    }

    pub fn supersedes(&self) -> Option<Uuid> {
        self.supersedes
    }
}
