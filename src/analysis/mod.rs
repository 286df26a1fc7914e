//! Offline analysis of the chat export.

pub mod digest;
pub mod lexicon;
pub mod stats;

pub use digest::{DigestOptions, RelationshipMemory, dedup_and_cap, run_digest};
pub use lexicon::{Lexicon, Signals, Tone};
pub use stats::{CorpusStats, StatsOptions, run_stats};
