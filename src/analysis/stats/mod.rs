//! Corpus-wide analytics: vocabulary, activity by hour and mood by month.

use crate::chat::{ChatMessage, load_corpus};
use crate::config::StatsConfig;
use crate::errors::KeepsakeError;
use crate::ingest::timestamp::Normalizer;
use crate::utils::atomic_write;
use crate::utils::regex::RegexPatterns;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPoint {
    /// `YYYY-MM`
    pub date: String,
    /// Mean per-message score in `[-1, 1]`, rounded to 3 decimals.
    pub sentiment: f64,
    pub message_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub top_words: Vec<WordCount>,
    pub active_hours: BTreeMap<String, usize>,
    pub mood_timeline: Vec<MoodPoint>,
    pub total_messages: usize,
    pub date_range: DateRange,
}

/// Word lists used by the analytics pass.
#[derive(Debug, Clone)]
pub struct StatsOptions {
    pub top_words: usize,
    pub stop_words: HashSet<String>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub normalizer: Normalizer,
}

impl StatsOptions {
    pub fn from_config(config: &StatsConfig, normalizer: Normalizer) -> Self {
        Self {
            top_words: config.top_words,
            stop_words: config.stop_words.iter().cloned().collect(),
            positive: dedup_lowercase(&config.positive_keywords),
            negative: dedup_lowercase(&config.negative_keywords),
            normalizer,
        }
    }
}

fn dedup_lowercase(words: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Words worth counting in a message.
///
/// Links, mentions and hashtags are removed first. A word is a run of Arabic
/// letters or at least two ASCII letters, lowercased, and never a stop word.
pub fn extract_words(text: &str, stop_words: &HashSet<String>) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let cleaned = RegexPatterns::links_and_tags().replace_all(text, "");
    let lowered = cleaned.to_lowercase();
    RegexPatterns::corpus_words()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 1 && !stop_words.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Count every word, most frequent first. Equal counts keep first-seen order.
pub fn word_counts(messages: &[ChatMessage], stop_words: &HashSet<String>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for message in messages {
        for word in extract_words(message.text(), stop_words) {
            *counts.entry(word).or_default() += 1;
        }
    }
    // stable sort keeps insertion order among ties
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

pub fn top_words(messages: &[ChatMessage], stop_words: &HashSet<String>, n: usize) -> Vec<WordCount> {
    word_counts(messages, stop_words)
        .into_iter()
        .take(n)
        .map(|(word, count)| WordCount { word, count })
        .collect()
}

fn parsed<'a>(
    messages: &'a [ChatMessage],
    normalizer: &'a Normalizer,
) -> impl Iterator<Item = (&'a ChatMessage, NaiveDateTime)> + 'a {
    messages.iter().filter_map(move |m| {
        normalizer
            .parse_wall_clock(m.date(), m.time())
            .ok()
            .map(|dt| (m, dt))
    })
}

/// Messages per hour of day, all 24 hours present.
pub fn active_hours(messages: &[ChatMessage], normalizer: &Normalizer) -> BTreeMap<String, usize> {
    let mut hours: BTreeMap<String, usize> = (0..24).map(|h| (format!("{:02}", h), 0)).collect();
    for (_, dt) in parsed(messages, normalizer) {
        *hours.entry(format!("{:02}", dt.hour())).or_default() += 1;
    }
    hours
}

/// Keyword sentiment of one message: `(pos - neg) / (pos + neg)`, 0 when neither.
///
/// Each configured keyword counts at most once per message.
pub fn sentiment(text: &str, positive: &[String], negative: &[String]) -> f64 {
    let lowered = text.to_lowercase();
    let pos = positive.iter().filter(|k| lowered.contains(k.as_str())).count();
    let neg = negative.iter().filter(|k| lowered.contains(k.as_str())).count();
    if pos + neg == 0 {
        return 0.0;
    }
    (pos as f64 - neg as f64) / (pos + neg) as f64
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Average sentiment per calendar month, months in order.
pub fn mood_timeline(messages: &[ChatMessage], options: &StatsOptions) -> Vec<MoodPoint> {
    let mut months: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (message, dt) in parsed(messages, &options.normalizer) {
        let score = sentiment(message.text(), &options.positive, &options.negative);
        let entry = months.entry(dt.format("%Y-%m").to_string()).or_default();
        entry.0 += score;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|(date, (sum, count))| MoodPoint {
            date,
            sentiment: round3(sum / count as f64),
            message_count: count,
        })
        .collect()
}

pub fn date_range(messages: &[ChatMessage], normalizer: &Normalizer) -> DateRange {
    let dates: Vec<NaiveDate> = parsed(messages, normalizer).map(|(_, dt)| dt.date()).collect();
    let fmt = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
    DateRange {
        start: dates.iter().min().map(fmt),
        end: dates.iter().max().map(fmt),
    }
}

impl CorpusStats {
    pub fn compute(messages: &[ChatMessage], options: &StatsOptions) -> Self {
        Self {
            top_words: top_words(messages, &options.stop_words, options.top_words),
            active_hours: active_hours(messages, &options.normalizer),
            mood_timeline: mood_timeline(messages, options),
            total_messages: messages.len(),
            date_range: date_range(messages, &options.normalizer),
        }
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

/// Load the corpus, compute analytics and write them to `output`.
pub fn run_stats(
    input: &Path,
    output: &Path,
    options: &StatsOptions,
) -> Result<CorpusStats, KeepsakeError> {
    let messages = load_corpus(input)?;
    info!("loaded {} messages from {}", messages.len(), input.display());

    let stats = CorpusStats::compute(&messages, options);
    stats.write(output)?;
    info!(
        "analytics written to {} ({} words, {} months)",
        output.display(),
        stats.top_words.len(),
        stats.mood_timeline.len()
    );
    Ok(stats)
}
