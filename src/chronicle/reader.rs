//! Read-only chronicle queries
//!
//! The reader never writes. It re-reads the file per query; chronicles are
//! small enough that simplicity beats caching, and a fresh read always sees
//! the latest flushed append.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::chronicle::entry::ChronicleEntry;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::events::EventKey;

pub struct ChronicleReader {
    path: PathBuf,
}

impl ChronicleReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All inscribed entries in insertion order. A chronicle that does not
    /// exist yet reads as empty.
    pub fn all_entries(&self) -> Result<Vec<ChronicleEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(line)?);
        }
        Ok(entries)
    }

    pub fn by_event_type(&self, key: EventKey) -> Result<Vec<ChronicleEntry>> {
        Ok(self.all_entries()?.into_iter().filter(|e| e.payload().event_type == key).collect())
    }

    pub fn by_actor(&self, handle: &str) -> Result<Vec<ChronicleEntry>> {
        Ok(self.all_entries()?.into_iter().filter(|e| e.actor_handle() == handle).collect())
    }

    pub fn by_significance(&self, minimum: u8) -> Result<Vec<ChronicleEntry>> {
        Ok(self.all_entries()?.into_iter().filter(|e| e.significance() >= minimum).collect())
    }

    pub fn deaths(&self) -> Result<Vec<ChronicleEntry>> {
        self.by_event_type(EventKey::Death)
    }

    /// Deaths inscribed at or after the given tick. Feeds the vitality
    /// trend term.
    pub fn deaths_since(&self, min_tick: Tick) -> Result<usize> {
        Ok(self.deaths()?.iter().filter(|e| e.timestamp().tick >= min_tick).count())
    }

    pub fn session_markers(&self) -> Result<Vec<ChronicleEntry>> {
        Ok(self
            .all_entries()?
            .into_iter()
            .filter(|e| {
                matches!(
                    e.payload().event_type,
                    EventKey::SessionOpened | EventKey::SessionClosed
                )
            })
            .collect())
    }
}
