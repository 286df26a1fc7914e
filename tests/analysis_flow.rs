mod common;

use common::{config_in, message, write_corpus};
use keepsake::analysis::{DigestOptions, Lexicon, StatsOptions, run_digest, run_stats};
use keepsake::config::Config;
use keepsake::errors::KeepsakeError;
use keepsake::ingest::Normalizer;

fn digest_inputs(config: &Config) -> (Lexicon, DigestOptions) {
    let normalizer = Normalizer::from_config(&config.timestamps).unwrap();
    (
        Lexicon::from_config(&config.analysis),
        DigestOptions::from_config(&config.analysis, &config.stats, normalizer),
    )
}

#[test]
fn test_digest_from_export() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut messages = Vec::new();
    for i in 0..60 {
        let text = if i < 5 {
            format!("بحب الآيس كريم {}", i)
        } else {
            format!("رسالة {}", i)
        };
        messages.push(message("جنى", "14/02/25", "8:00 pm", &text));
    }
    for i in 0..40 {
        messages.push(message("Ahmed", "14/02/25", "11:30 pm", &format!("رد {}", i)));
    }
    messages.push(message("Ahmed", "15/02/25", "12:10 am", "فاكر لما اتعرفنا 💖🥰😘"));
    let input = write_corpus(dir.path(), &messages);
    let config = config_in(dir.path());
    let (lexicon, options) = digest_inputs(&config);

    let output = config.digest_path();
    let memory = run_digest(&input, &output, &lexicon, &options).unwrap();

    assert_eq!(memory.likes["jana"].len(), 5);
    assert_eq!(memory.personalities["ahmed"].intensity, 3);
    assert_eq!(memory.milestones.len(), 1);
    assert_eq!(memory.interaction_stats.total_messages, 101);
    assert_eq!(memory.interaction_stats.intensity_by_hour["20"], 60);
    assert_eq!(memory.interaction_stats.intensity_by_hour["23"], 40);
    assert_eq!(memory.interaction_stats.intensity_by_hour["00"], 1);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["likes"]["jana"].as_array().unwrap().len(), 5);
    assert_eq!(written["interaction_stats"]["total_messages"], 101);
}

#[test]
fn test_digest_respects_configured_participants() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_corpus(
        dir.path(),
        &[
            message("Sam", "01/01/25", "1:00 pm", "love this"),
            message("Alex", "01/01/25", "1:00 pm", "hate that"),
        ],
    );
    let mut config = config_in(dir.path());
    config.analysis.participants = serde_json::from_str(
        r#"[{"name": "sam", "identifiers": ["Sam"]}, {"name": "alex", "identifiers": ["Alex"]}]"#,
    )
    .unwrap();
    let (lexicon, options) = digest_inputs(&config);

    let memory = run_digest(&input, &config.digest_path(), &lexicon, &options).unwrap();
    assert_eq!(memory.likes["sam"][0].text, "love this");
    assert_eq!(memory.dislikes["alex"][0].text, "hate that");
}

#[test]
fn test_digest_failure_leaves_previous_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = config_in(dir.path());
    let output = config.digest_path();
    std::fs::write(&output, "{\"previous\": true}").unwrap();
    std::fs::write(config.chat_path(), "[{").unwrap();
    let (lexicon, options) = digest_inputs(&config);

    let err = run_digest(&config.chat_path(), &output, &lexicon, &options).unwrap_err();
    assert!(matches!(err, KeepsakeError::SourceParse { .. }));
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{\"previous\": true}"
    );
}

#[test]
fn test_stats_from_export() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_corpus(
        dir.path(),
        &[
            message("Lana", "03/01/25", "9:00 am", "حبيبي happy"),
            message("Ahmed", "04/01/25", "9:30 am", "tired today"),
            message("Lana", "01/02/25", "10:00 pm", "حبيبي"),
            message("Ahmed", "bad", "bad", "حبيبي"),
        ],
    );
    let config = config_in(dir.path());
    let options = StatsOptions::from_config(
        &config.stats,
        Normalizer::from_config(&config.timestamps).unwrap(),
    );

    let stats = run_stats(&input, &config.stats_output_path(), &options).unwrap();
    assert_eq!(stats.total_messages, 4);
    assert_eq!(stats.top_words[0].word, "حبيبي");
    assert_eq!(stats.top_words[0].count, 3);
    assert_eq!(stats.active_hours["09"], 2);
    assert_eq!(stats.active_hours["22"], 1);
    assert_eq!(stats.mood_timeline.len(), 2);
    assert_eq!(stats.mood_timeline[0].date, "2025-01");
    assert_eq!(stats.mood_timeline[0].sentiment, 0.0);
    assert_eq!(stats.mood_timeline[1].sentiment, 1.0);
    assert_eq!(stats.date_range.start.as_deref(), Some("2025-01-03"));
    assert_eq!(stats.date_range.end.as_deref(), Some("2025-02-01"));
    assert!(config.stats_output_path().exists());
}
