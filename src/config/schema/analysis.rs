use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Relationship digest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantConfig {
    pub name: String,
    /// Substrings matched case-sensitively against the message sender.
    #[serde(default)]
    pub identifiers: Vec<String>,
}

fn default_participants() -> Vec<ParticipantConfig> {
    vec![
        ParticipantConfig {
            name: "jana".to_string(),
            identifiers: strings(&["Lana", "جنى"]),
        },
        ParticipantConfig {
            name: "ahmed".to_string(),
            identifiers: strings(&["Ahmed"]),
        },
    ]
}

fn default_likes() -> Vec<String> {
    strings(&["بحب", "أحب", "بموت في", "أعشق", "love", "عاجبني", "نفسي في"])
}

fn default_dislikes() -> Vec<String> {
    strings(&["بكره", "مش بحب", "مبقتش طايق", "ضايقني", "زعلت", "hate", "كفاية"])
}

fn default_milestones() -> Vec<String> {
    strings(&[
        "أول مرة",
        "فاكر لما",
        "ذكرى",
        "عيد ميلاد",
        "خطوبة",
        "بداية",
        "اتعرفنا",
        "كتبنا",
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmojiConfig {
    #[serde(default = "default_romantic")]
    pub romantic: Vec<String>,
    #[serde(default = "default_playful")]
    pub playful: Vec<String>,
    #[serde(default = "default_sad")]
    pub sad: Vec<String>,
}

fn default_romantic() -> Vec<String> {
    strings(&["❤️", "💖", "🥰", "😘", "💍"])
}

fn default_playful() -> Vec<String> {
    strings(&["😂", "🤣", "😜", "👻"])
}

fn default_sad() -> Vec<String> {
    strings(&["😢", "😔", "💔"])
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            romantic: default_romantic(),
            playful: default_playful(),
            sad: default_sad(),
        }
    }
}

fn default_digest_path() -> String {
    "public/relationship_memory.json".to_string()
}

fn default_max_short_length() -> usize {
    60
}

fn default_max_entries() -> usize {
    40
}

fn default_common_words() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_digest_path", rename = "outputPath")]
    pub output_path: String,
    /// Exactly two participants. Senders matching nobody belong to the second.
    #[serde(default = "default_participants")]
    pub participants: Vec<ParticipantConfig>,
    #[serde(default = "default_likes")]
    pub likes: Vec<String>,
    #[serde(default = "default_dislikes")]
    pub dislikes: Vec<String>,
    #[serde(default = "default_milestones")]
    pub milestones: Vec<String>,
    #[serde(default)]
    pub emojis: EmojiConfig,
    /// Likes/dislikes only count for messages shorter than this (UTF-16 units).
    #[serde(default = "default_max_short_length", rename = "maxShortLength")]
    pub max_short_length: usize,
    /// Cap for every likes/dislikes/milestones list after dedup.
    #[serde(default = "default_max_entries", rename = "maxEntries")]
    pub max_entries: usize,
    #[serde(default = "default_common_words", rename = "commonWords")]
    pub common_words: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_path: default_digest_path(),
            participants: default_participants(),
            likes: default_likes(),
            dislikes: default_dislikes(),
            milestones: default_milestones(),
            emojis: EmojiConfig::default(),
            max_short_length: default_max_short_length(),
            max_entries: default_max_entries(),
            common_words: default_common_words(),
        }
    }
}

// ---------------------------------------------------------------------------
// Corpus analytics
// ---------------------------------------------------------------------------

fn default_stats_path() -> String {
    "public/analytics_results.json".to_string()
}

fn default_top_words() -> usize {
    100
}

fn default_stop_words() -> Vec<String> {
    strings(&[
        "في", "من", "إلى", "على", "هذا", "هذه", "ذلك", "التي", "الذي", "أن", "إن", "كان", "يكون",
        "لا", "ما", "هل", "عن", "مع", "او", "و", "ف", "ب", "ل", "ك", "لم", "لن", "قد", "كل", "بعض",
        "هنا", "هناك", "انا", "انت", "هو", "هي", "نحن", "انتم", "هم", "the", "a", "an", "and",
        "or", "but", "in", "on", "at", "to", "for", "omitted", "media",
    ])
}

fn default_positive() -> Vec<String> {
    strings(&[
        "حب", "حبيبي", "حبيبتي", "احبك", "بحبك", "عشق", "سعيد", "سعيدة", "فرحان", "فرحانه",
        "مبسوط", "مبسوطه", "جميل", "رائع", "ممتاز", "حلو", "كويس", "تمام", "مشتاق", "مشتاقة",
        "❤️", "😍", "🥰", "😊", "💕", "💗", "💖", "love", "happy", "good", "great", "nice",
    ])
}

fn default_negative() -> Vec<String> {
    strings(&[
        "حزين", "حزينة", "زعلان", "زعلانة", "تعبان", "تعبانة", "مش", "زعل", "صعب", "وحش",
        "مش كويس", "غلط", "😢", "😭", "😔", "💔", "sad", "bad", "tired", "upset", "angry",
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Defaults to `source.chatPath` when unset.
    #[serde(default, rename = "inputPath")]
    pub input_path: Option<String>,
    #[serde(default = "default_stats_path", rename = "outputPath")]
    pub output_path: String,
    #[serde(default = "default_top_words", rename = "topWords")]
    pub top_words: usize,
    #[serde(default = "default_stop_words", rename = "stopWords")]
    pub stop_words: Vec<String>,
    #[serde(default = "default_positive", rename = "positiveKeywords")]
    pub positive_keywords: Vec<String>,
    #[serde(default = "default_negative", rename = "negativeKeywords")]
    pub negative_keywords: Vec<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: default_stats_path(),
            top_words: default_top_words(),
            stop_words: default_stop_words(),
            positive_keywords: default_positive(),
            negative_keywords: default_negative(),
        }
    }
}
