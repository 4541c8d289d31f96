//! Legacy records: actors archived into legend
//!
//! Records live in their own arena and link back to the actor arena by id,
//! never by reference, so either side can be archived independently. A
//! record is immutable after creation; the citation counter stays dormant
//! at zero until reconciliation work lands.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, LegacyId};

/// Why an actor left the active world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementCause {
    Death,
    Exodus,
    SettlementCollapse,
}

impl RetirementCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetirementCause::Death => "death",
            RetirementCause::Exodus => "exodus",
            RetirementCause::SettlementCollapse => "settlement_collapse",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyRecord {
    id: LegacyId,
    actor: ActorId,
    name: String,
    final_reputation: f64,
    moral_weight: f64,
    cause: RetirementCause,
    citation_count: u32,
}

impl LegacyRecord {
    pub fn id(&self) -> LegacyId {
        self.id
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn final_reputation(&self) -> f64 {
        self.final_reputation
    }

    pub fn moral_weight(&self) -> f64 {
        self.moral_weight
    }

    pub fn cause(&self) -> RetirementCause {
        self.cause
    }

    pub fn citation_count(&self) -> u32 {
        self.citation_count
    }
}

#[derive(Debug, Default)]
pub struct LegacyArena {
    records: Vec<LegacyRecord>,
}

impl LegacyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        actor: ActorId,
        name: &str,
        final_reputation: f64,
        moral_weight: f64,
        cause: RetirementCause,
    ) -> LegacyId {
        let id = LegacyId(self.records.len() as u32);
        self.records.push(LegacyRecord {
            id,
            actor,
            name: name.to_string(),
            final_reputation,
            moral_weight,
            cause,
            citation_count: 0,
        });
        id
    }

    pub fn get(&self, id: LegacyId) -> Option<&LegacyRecord> {
        self.records.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LegacyRecord> {
        self.records.iter()
    }
}
