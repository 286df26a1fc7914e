use crate::config::Config;
use crate::utils::{ensure_dir, get_keepsake_home};
use anyhow::{Context, Result};
use fs2::FileExt;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use tracing::warn;

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_keepsake_home()?.join("config.json"))
}

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    if path.exists() {
        // Shared lock: concurrent readers are fine, `init` holds the exclusive one
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open config at {}", path.display()))?;
        file.lock_shared()
            .with_context(|| "Failed to acquire shared lock on config file")?;

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut data: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?;

        data = migrate_config(data);

        let mut config: Config =
            serde_json::from_value(data).with_context(|| "Failed to deserialize config")?;

        crate::config::credentials::apply_env_overrides(&mut config);

        check_file_permissions(path);

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        return Ok(config);
    }

    let mut default_config = Config::default();
    crate::config::credentials::apply_env_overrides(&mut default_config);
    default_config
        .validate()
        .with_context(|| "Default configuration validation failed")?;
    Ok(default_config)
}

/// Warn if the config file holds an API key and is readable by others.
/// Only emits the warning once per process.
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Once;

    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        if let Ok(meta) = std::fs::metadata(path) {
            let mode = meta.permissions().mode();
            if mode & 0o077 != 0 {
                warn!(
                    "config file {} has permissions {:o}, recommend 0600",
                    path.display(),
                    mode & 0o777
                );
            }
        }
    });
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}

/// Fold the flat keys of the first config format into `store`.
///
/// Early configs mirrored the migration script constants:
/// `{"supabaseUrl": "...", "supabaseKey": "...", "batchSize": 500}`.
fn migrate_config(data: Value) -> Value {
    let Value::Object(mut map) = data else {
        return data;
    };

    let legacy = [
        ("supabaseUrl", "url"),
        ("supabaseKey", "apiKey"),
        ("batchSize", "batchSize"),
    ];
    if !legacy.iter().any(|(old, _)| map.contains_key(*old)) {
        return Value::Object(map);
    }

    let mut store = match map.remove("store") {
        Some(Value::Object(store)) => store,
        _ => serde_json::Map::new(),
    };
    for (old, new) in legacy {
        if let Some(value) = map.remove(old)
            && !store.contains_key(new)
        {
            store.insert(new.to_string(), value);
        }
    }
    // The first format appended `/rest/v1` at request time
    if let Some(Value::String(url)) = store.get_mut("url")
        && !url.trim_end_matches('/').ends_with("/rest/v1")
    {
        *url = format!("{}/rest/v1", url.trim_end_matches('/'));
    }
    map.insert("store".to_string(), Value::Object(store));
    Value::Object(map)
}

pub fn save_config(config: &Config, config_path: Option<&Path>) -> Result<()> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    ensure_dir(path.parent().context("Config path has no parent")?)?;

    // atomic_write() renames over the original inode, so the lock lives in a sidecar file
    let lock_path = path.with_extension("json.lock");
    let lock_file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file at {}", lock_path.display()))?;
    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire exclusive lock on config lock file")?;

    let content = serde_json::to_string_pretty(config)?;
    crate::utils::atomic_write(path, &content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }

    Ok(())
}
