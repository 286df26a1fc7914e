//! The relationship digest: preferences, milestones and activity per participant.

use super::lexicon::{Lexicon, Tone};
use super::stats::extract_words;
use crate::chat::{ChatMessage, load_corpus};
use crate::config::{AnalysisConfig, StatsConfig};
use crate::errors::KeepsakeError;
use crate::ingest::timestamp::Normalizer;
use crate::utils::atomic_write;
use chrono::Timelike;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Personality {
    pub keywords: Vec<String>,
    pub tone: String,
    pub intensity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub sender: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionStats {
    pub total_messages: usize,
    pub messages_by_participant: IndexMap<String, usize>,
    /// `"00"`..`"23"`, only hours that had messages.
    pub intensity_by_hour: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipMemory {
    pub personalities: IndexMap<String, Personality>,
    pub milestones: Vec<Milestone>,
    pub likes: IndexMap<String, Vec<Entry>>,
    pub dislikes: IndexMap<String, Vec<Entry>>,
    pub common_words: IndexMap<String, usize>,
    pub interaction_stats: InteractionStats,
}

#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub max_entries: usize,
    pub common_words: usize,
    pub stop_words: HashSet<String>,
    pub normalizer: Normalizer,
}

impl DigestOptions {
    pub fn from_config(
        analysis: &AnalysisConfig,
        stats: &StatsConfig,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            max_entries: analysis.max_entries,
            common_words: analysis.common_words,
            stop_words: stats.stop_words.iter().cloned().collect(),
            normalizer,
        }
    }
}

/// Drop repeated texts (first occurrence wins), then keep the last `max` items.
pub fn dedup_and_cap<T>(items: Vec<T>, max: usize, text: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut unique: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(text(item).trim().to_string()))
        .collect();
    if unique.len() > max {
        unique.drain(..unique.len() - max);
    }
    unique
}

#[derive(Debug, Default)]
struct ParticipantTally {
    messages: usize,
    likes: Vec<Entry>,
    dislikes: Vec<Entry>,
    keywords: IndexSet<String>,
    romantic: usize,
    playful: usize,
    sad: usize,
}

/// Running state of one pass over the corpus.
struct Accumulator<'a> {
    lexicon: &'a Lexicon,
    options: &'a DigestOptions,
    tallies: Vec<ParticipantTally>,
    milestones: Vec<Milestone>,
    words: IndexMap<String, usize>,
    hours: BTreeMap<String, usize>,
    total: usize,
}

impl<'a> Accumulator<'a> {
    fn new(lexicon: &'a Lexicon, options: &'a DigestOptions) -> Self {
        Self {
            lexicon,
            options,
            tallies: (0..lexicon.participant_count())
                .map(|_| ParticipantTally::default())
                .collect(),
            milestones: Vec::new(),
            words: IndexMap::new(),
            hours: BTreeMap::new(),
            total: 0,
        }
    }

    fn absorb(mut self, message: &ChatMessage) -> Self {
        self.total += 1;
        let text = message.text();
        let signals = self.lexicon.classify(text);

        if let Some(tally) = self.tallies.get_mut(self.lexicon.attribute(message.sender())) {
            tally.messages += 1;
            let entry = || Entry {
                text: text.to_string(),
                date: message.date.clone(),
            };
            if signals.is_like() {
                tally.likes.push(entry());
            }
            if signals.is_dislike() {
                tally.dislikes.push(entry());
            }
            for keyword in signals.likes.iter().chain(&signals.dislikes) {
                tally.keywords.insert((*keyword).to_string());
            }
            tally.romantic += signals.romantic;
            tally.playful += signals.playful;
            tally.sad += signals.sad;
        }

        if signals.milestone {
            self.milestones.push(Milestone {
                text: text.to_string(),
                date: message.date.clone(),
                sender: message.sender().to_string(),
            });
        }

        for word in extract_words(text, &self.options.stop_words) {
            *self.words.entry(word).or_default() += 1;
        }

        if let Ok(dt) = self
            .options
            .normalizer
            .parse_wall_clock(message.date(), message.time())
        {
            *self.hours.entry(format!("{:02}", dt.hour())).or_default() += 1;
        }
        self
    }

    fn finish(self) -> RelationshipMemory {
        let max = self.options.max_entries;
        let mut memory = RelationshipMemory {
            milestones: dedup_and_cap(self.milestones, max, |m| m.text.as_str()),
            ..RelationshipMemory::default()
        };

        for (name, tally) in self.lexicon.participants().zip(self.tallies) {
            memory.personalities.insert(
                name.to_string(),
                Personality {
                    keywords: tally.keywords.into_iter().collect(),
                    tone: Tone::dominant(tally.romantic, tally.playful, tally.sad)
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default(),
                    intensity: tally.romantic,
                },
            );
            memory.likes.insert(
                name.to_string(),
                dedup_and_cap(tally.likes, max, |e| e.text.as_str()),
            );
            memory.dislikes.insert(
                name.to_string(),
                dedup_and_cap(tally.dislikes, max, |e| e.text.as_str()),
            );
            memory
                .interaction_stats
                .messages_by_participant
                .insert(name.to_string(), tally.messages);
        }

        let mut words = self.words;
        words.sort_by(|_, a, _, b| b.cmp(a));
        words.truncate(self.options.common_words);
        memory.common_words = words;

        memory.interaction_stats.total_messages = self.total;
        memory.interaction_stats.intensity_by_hour = self.hours;
        memory
    }
}

impl RelationshipMemory {
    pub fn from_corpus(
        messages: &[ChatMessage],
        lexicon: &Lexicon,
        options: &DigestOptions,
    ) -> Self {
        messages
            .iter()
            .fold(Accumulator::new(lexicon, options), Accumulator::absorb)
            .finish()
    }

    pub fn write(&self, path: &Path) -> Result<(), KeepsakeError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| KeepsakeError::Output {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        atomic_write(path, &content).map_err(|e| KeepsakeError::Output {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })
    }
}

/// Load the corpus, build the digest and replace the file at `output`.
///
/// Nothing is written when the corpus is missing or unreadable.
pub fn run_digest(
    input: &Path,
    output: &Path,
    lexicon: &Lexicon,
    options: &DigestOptions,
) -> Result<RelationshipMemory, KeepsakeError> {
    let messages = load_corpus(input)?;
    info!("analyzing {} messages from {}", messages.len(), input.display());

    let memory = RelationshipMemory::from_corpus(&messages, lexicon, options);
    memory.write(output)?;
    info!(
        "digest written to {} ({} milestones)",
        output.display(),
        memory.milestones.len()
    );
    Ok(memory)
}
