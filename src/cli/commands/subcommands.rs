use super::resolve;
use crate::analysis::{DigestOptions, Lexicon, StatsOptions, run_digest, run_stats};
use crate::config::credentials::missing_credentials;
use crate::config::{Config, get_config_path, save_config};
use crate::ingest::{BulkSink, Normalizer, RestSink, run_migration};
use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

pub(super) fn init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    if path.exists() && !force {
        println!(
            "\u{26a0}\u{fe0f}  Config already exists at {} (use --force to replace it)",
            path.display()
        );
        return Ok(());
    }

    save_config(&Config::default(), Some(path.as_path()))?;
    println!("\u{2713} Created config at {}", path.display());
    println!("\nNext steps:");
    println!("  1. Set store.url and store.apiKey in {}", path.display());
    println!("     (or export KEEPSAKE_STORE_URL / KEEPSAKE_STORE_API_KEY)");
    println!("  2. Check the input: keepsake migrate --dry-run");
    println!("  3. Upload: keepsake migrate");
    Ok(())
}

pub(super) async fn migrate(config: &Config, input: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let sink: Option<Arc<dyn BulkSink>> = if dry_run {
        None
    } else {
        config.require_store()?;
        Some(Arc::new(RestSink::new(&config.store)))
    };

    let input = resolve(input, || config.chat_path());
    info!("migrating {}", input.display());
    if let Err(e) = run_migration(&input, config, sink, Utc::now()).await {
        error!("migration aborted: {}", e);
    }
    Ok(())
}

pub(super) fn analyze(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let normalizer = Normalizer::from_config(&config.timestamps)?;
    let input = resolve(input, || config.chat_path());
    let output = resolve(output, || config.digest_path());

    let lexicon = Lexicon::from_config(&config.analysis);
    let options = DigestOptions::from_config(&config.analysis, &config.stats, normalizer);
    if let Err(e) = run_digest(&input, &output, &lexicon, &options) {
        error!("analysis failed: {}", e);
    }
    Ok(())
}

pub(super) fn stats(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let normalizer = Normalizer::from_config(&config.timestamps)?;
    let input = resolve(input, || config.stats_input_path());
    let output = resolve(output, || config.stats_output_path());

    let options = StatsOptions::from_config(&config.stats, normalizer);
    if let Err(e) = run_stats(&input, &output, &options) {
        error!("analytics failed: {}", e);
    }
    Ok(())
}

pub(super) fn status(config: &Config, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    let mark = |exists: bool| if exists { "\u{2713}" } else { "\u{2717}" };

    println!("keepsake status\n");
    println!("Config: {} {}", path.display(), mark(path.exists()));
    let chat = config.chat_path();
    println!("Chat export: {} {}", chat.display(), mark(chat.exists()));
    println!("Digest: {}", config.digest_path().display());
    println!("Analytics: {}", config.stats_output_path().display());
    println!(
        "Timezone: {}",
        config.timestamps.timezone.as_deref().unwrap_or("system local")
    );

    let missing = missing_credentials(config);
    if missing.is_empty() {
        println!(
            "Store: {}/{} \u{2713} (batch {}, concurrency {})",
            config.store.url.trim_end_matches('/'),
            config.store.table,
            config.store.batch_size,
            config.store.concurrency
        );
    } else {
        println!("Store: not configured, missing {}", missing.join(", "));
    }
    Ok(())
}
