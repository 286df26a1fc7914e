#![warn(clippy::pedantic)]
// Noisy doc/signature lints, would require annotating every pub function
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference: keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
// Counts, byte sizes and backoff delays are converted between integer and float freely
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod chat;
pub mod cli;
pub mod config;
pub mod errors;
pub mod ingest;
pub(crate) mod utils;

/// Re-exports for fuzz targets. Not part of the public API.
#[doc(hidden)]
pub mod fuzz_api {
    pub use crate::chat::parse_corpus;
    pub use crate::ingest::timestamp::strip_non_ascii;

    /// Parse a date/time pair with default settings in UTC.
    pub fn parse_wall_clock(date: &str, time: &str) -> bool {
        crate::ingest::timestamp::Normalizer::default()
            .in_zone(chrono_tz::UTC)
            .normalize(date, time)
            .is_ok()
    }

    /// Deserialize and validate a config document the way `load_config` does.
    pub fn parse_config(json: &str) -> bool {
        serde_json::from_str::<crate::config::Config>(json).is_ok_and(|c| c.validate().is_ok())
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
