use regex::Regex;
use std::sync::LazyLock;

/// Compiled regex patterns that are reused across the codebase
pub struct RegexPatterns;

impl RegexPatterns {
    /// Regex for a 12-hour clock time (`1:02 am`, `11:45PM`) at the start of the value.
    ///
    /// Trailing annotations such as `1:02 am (edited)` are ignored.
    ///
    /// Captures: 1 = hour, 2 = minute, 3 = meridiem.
    pub fn meridiem_time() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm)\b")
                .expect("Failed to compile meridiem time regex")
        });
        &RE
    }

    /// Regex for URLs, @mentions and #hashtags stripped before word counting
    pub fn links_and_tags() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"http\S+|www\S+|@\w+|#\w+").expect("Failed to compile links regex")
        });
        &RE
    }

    /// Regex for corpus words: a run of Arabic letters, or 2+ ASCII letters
    pub fn corpus_words() -> &'static Regex {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"[\x{0600}-\x{06FF}]+|[a-zA-Z]{2,}")
                .expect("Failed to compile corpus words regex")
        });
        &RE
    }
}
