//! Chronicle: permanent, epistemically tagged history
//!
//! One writer (the inscriber), many readers. Entries are append-only JSONL,
//! immutable once written; corrections supersede, never overwrite.

pub mod entry;
pub mod inscriber;
pub mod narrative;
pub mod reader;
pub mod significance;

pub use entry::{ChronicleEntry, EntryPayload, Legibility, Provenance};
pub use inscriber::ChronicleInscriber;
pub use narrative::NarrativeGenerator;
pub use reader::ChronicleReader;
pub use significance::{SignificanceScorer, TableScorer};
