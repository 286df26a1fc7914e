use crate::config::{AnalysisConfig, EmojiConfig, ParticipantConfig};

/// Which emoji class dominates a participant's messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Romantic,
    Playful,
    Sad,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Romantic => "romantic",
            Self::Playful => "playful",
            Self::Sad => "sad",
        }
    }

    /// Highest count wins; ties go to the earlier class (romantic, playful, sad).
    pub fn dominant(romantic: usize, playful: usize, sad: usize) -> Option<Self> {
        let mut best: Option<(Self, usize)> = None;
        for (tone, count) in [
            (Self::Romantic, romantic),
            (Self::Playful, playful),
            (Self::Sad, sad),
        ] {
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((tone, count));
            }
        }
        best.map(|(tone, _)| tone)
    }
}

/// Everything one message contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals<'a> {
    /// Like keywords found, empty unless the message is short enough.
    pub likes: Vec<&'a str>,
    pub dislikes: Vec<&'a str>,
    pub milestone: bool,
    /// Total romantic emoji occurrences.
    pub romantic: usize,
    pub playful: usize,
    pub sad: usize,
}

impl Signals<'_> {
    pub fn is_like(&self) -> bool {
        !self.likes.is_empty()
    }

    pub fn is_dislike(&self) -> bool {
        !self.dislikes.is_empty()
    }
}

/// Keyword and emoji matcher built from the analysis config.
#[derive(Debug, Clone)]
pub struct Lexicon {
    participants: Vec<ParticipantConfig>,
    likes: Vec<String>,
    dislikes: Vec<String>,
    milestones: Vec<String>,
    emojis: EmojiConfig,
    max_short_length: usize,
}

impl Lexicon {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            participants: config.participants.clone(),
            likes: config.likes.clone(),
            dislikes: config.dislikes.clone(),
            milestones: config.milestones.clone(),
            emojis: config.emojis.clone(),
            max_short_length: config.max_short_length,
        }
    }

    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.participants.iter().map(|p| p.name.as_str())
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Index of the participant who sent a message.
    ///
    /// Identifiers are case-sensitive substrings checked in configured order.
    /// A sender nobody claims belongs to the last participant.
    pub fn attribute(&self, sender: &str) -> usize {
        self.participants
            .iter()
            .position(|p| {
                p.identifiers
                    .iter()
                    .any(|id| !id.is_empty() && sender.contains(id.as_str()))
            })
            .unwrap_or_else(|| self.participants.len().saturating_sub(1))
    }

    /// Message length in UTF-16 code units, the way browsers count it.
    pub fn text_length(text: &str) -> usize {
        text.encode_utf16().count()
    }

    pub fn classify<'a>(&'a self, text: &str) -> Signals<'a> {
        let short = Self::text_length(text) < self.max_short_length;
        let found = |keywords: &'a [String]| -> Vec<&'a str> {
            keywords
                .iter()
                .filter(|k| text.contains(k.as_str()))
                .map(String::as_str)
                .collect()
        };
        let occurrences = |emojis: &[String]| -> usize {
            emojis.iter().map(|e| text.matches(e.as_str()).count()).sum()
        };

        Signals {
            likes: if short {
                found(self.likes.as_slice())
            } else {
                Vec::new()
            },
            dislikes: if short {
                found(self.dislikes.as_slice())
            } else {
                Vec::new()
            },
            milestone: self.milestones.iter().any(|k| text.contains(k.as_str())),
            romantic: occurrences(self.emojis.romantic.as_slice()),
            playful: occurrences(self.emojis.playful.as_slice()),
            sad: occurrences(self.emojis.sad.as_slice()),
        }
    }
}
