//! Chronicle inscriber: wildcard subscriber, append-only JSONL writer
//!
//! The inscriber watches every event on the bus, gates on significance, and
//! appends qualifying entries to the chronicle file. Each append is flushed
//! before control returns, so the entry is durable before the emitting call
//! completes. The inscriber never emits events of its own.

use std::cell::{Cell, RefCell};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use uuid::Uuid;

use crate::actor::ActorRegistry;
use crate::chronicle::entry::{ChronicleEntry, EntryPayload, Provenance};
use crate::chronicle::significance::SignificanceScorer;
use crate::core::config::ChronicleConfig;
use crate::core::error::Result;
use crate::core::types::{ActorId, GameTimestamp, Tick};
use crate::events::{EventBus, EventEnvelope, EventKey, Payload};

pub struct ChronicleInscriber {
    writer: RefCell<BufWriter<File>>,
    clock: Cell<GameTimestamp>,
    player_present: Cell<bool>,
    config: ChronicleConfig,
    scorer: Box<dyn SignificanceScorer>,
    registry: Rc<RefCell<ActorRegistry>>,
}

impl ChronicleInscriber {
    /// Open the chronicle file (creating parent directories) and register
    /// as a wildcard subscriber.
    pub fn attach(
        bus: &Rc<EventBus>,
        registry: Rc<RefCell<ActorRegistry>>,
        path: &Path,
        clock: GameTimestamp,
        player_present: bool,
        config: ChronicleConfig,
        scorer: Box<dyn SignificanceScorer>,
    ) -> Result<Rc<Self>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let inscriber = Rc::new(Self {
            writer: RefCell::new(BufWriter::new(file)),
            clock: Cell::new(clock),
            player_present: Cell::new(player_present),
            config,
            scorer,
            registry,
        });
        let handler = Rc::clone(&inscriber);
        bus.subscribe_wildcard(Rc::new(move |e| handler.on_event(e)));
        Ok(inscriber)
    }

    fn on_event(&self, event: &EventEnvelope) -> Result<()> {
        let significance = self.scorer.score(event);
        if significance < self.config.significance_min {
            return Ok(());
        }
        self.inscribe(event, significance, None)?;
        Ok(())
    }

    /// Inscribe the session-open marker. Session markers bypass the
    /// significance gate.
    pub fn open_session(&self) -> Result<Uuid> {
        self.marker(EventKey::SessionOpened, "session_opened")
    }

    pub fn close_session(&self) -> Result<Uuid> {
        self.marker(EventKey::SessionClosed, "session_closed")
    }

    /// Inscribe a correction. The original line stays untouched; readers
    /// resolve the chain through `supersedes`.
    pub fn inscribe_correction(&self, original: Uuid, event: &EventEnvelope) -> Result<Uuid> {
        let significance = self.scorer.score(event);
        self.inscribe(event, significance, Some(original))
    }

    pub fn advance_clock(&self, ticks: Tick) {
        let mut clock = self.clock.get();
        for _ in 0..ticks {
            clock = clock.advance_tick();
        }
        self.clock.set(clock);
    }

    pub fn clock(&self) -> GameTimestamp {
        self.clock.get()
    }

    /// Provenance assignments after this call reflect the new state.
    pub fn set_player_present(&self, present: bool) {
        self.player_present.set(present);
    }

    fn marker(&self, key: EventKey, verb: &str) -> Result<Uuid> {
        let entry = ChronicleEntry::new(
            self.clock.get(),
            self.provenance_for_involved(false),
            "system".to_string(),
            EntryPayload {
                event_type: key,
                verb: verb.to_string(),
                object: "system".to_string(),
                detail: Payload::new().with("player_present", self.player_present.get()),
            },
            self.confidence(self.provenance_for_involved(false)),
            5,
            None,
        );
        self.append(&entry)?;
        Ok(entry.event_id())
    }

    fn inscribe(
        &self,
        event: &EventEnvelope,
        significance: u8,
        supersedes: Option<Uuid>,
    ) -> Result<Uuid> {
        let (handle, object, player_involved) = {
            let registry = self.registry.borrow();
            let name = |id: ActorId| {
                if id == crate::core::types::SYSTEM_ACTOR {
                    return "system".to_string();
                }
                registry.get(id).map(|a| a.name.clone()).unwrap_or_else(|_| format!("actor-{}", id.0))
            };
            let is_player =
                |id: ActorId| registry.get(id).map(|a| a.is_player).unwrap_or(false);
            let handle = name(event.source);
            let object = event.target.map(name).unwrap_or_else(|| handle.clone());
            let involved = is_player(event.source)
                || event.target.map(is_player).unwrap_or(false);
            (handle, object, involved)
        };
        let provenance = self.provenance_for_involved(player_involved);
        let entry = ChronicleEntry::new(
            self.clock.get(),
            provenance,
            handle,
            EntryPayload {
                event_type: event.key,
                verb: verb_for(event),
                object,
                detail: event.data.clone(),
            },
            self.confidence(provenance),
            significance,
            supersedes,
        );
        self.append(&entry)?;
        Ok(entry.event_id())
    }

    fn provenance_for_involved(&self, player_involved: bool) -> Provenance {
        if self.player_present.get() || player_involved {
            Provenance::Witnessed
        } else {
            Provenance::Fabricated
        }
    }

    fn confidence(&self, provenance: Provenance) -> f64 {
        match provenance {
            Provenance::Witnessed => self.config.confidence_witnessed,
            Provenance::Fabricated => self.config.confidence_fabricated,
        }
    }

    fn append(&self, entry: &ChronicleEntry) -> Result<()> {
        let mut writer = self.writer.borrow_mut();
        serde_json::to_writer(&mut *writer, entry)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        tracing::trace!(id = %entry.event_id(), significance = entry.significance(), "inscribed");
        Ok(())
    }
}

/// Past-tense verb for the normalized payload.
fn verb_for(event: &EventEnvelope) -> String {
    let verb = match event.key {
        EventKey::TurnStarted => "turn_started",
        EventKey::ActionResolved => "acted",
        EventKey::TurnEnded => "turn_ended",
        EventKey::RoundEnded => "round_ended",
        EventKey::DamageApplied => {
            if event.data.int("amount").unwrap_or(0) < 0 {
                "healed"
            } else {
                "damaged"
            }
        }
        EventKey::Death => "perished",
        EventKey::ModifierAdded => "gained_modifier",
        EventKey::ModifierExpired => "lost_modifier",
        EventKey::StressSpike => "stressed",
        EventKey::DispositionShift => "reputation_shifted",
        EventKey::RumorShared => "shared_rumor",
        EventKey::SessionOpened => "session_opened",
        EventKey::SessionClosed => "session_closed",
        EventKey::Migration => "migrated",
        EventKey::LegacyConverted => "passed_into_legend",
    };
    verb.to_string()
}
