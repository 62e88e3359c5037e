//! Configuration loader for Formcraft.
//!
//! Reads `config.toml` from the data directory (`~/.formcraft/` in
//! production) into [`AppConfig`], falling back to defaults when the file
//! is missing or malformed. Environment variables override the file, and
//! provider credentials only ever come from the environment.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use formcraft_types::config::{AppConfig, ProviderKind};

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "formcraft.db";

/// Resolve the data directory.
///
/// Priority:
/// 1. `FORMCRAFT_DATA_DIR` environment variable
/// 2. `~/.formcraft`
/// 3. `.formcraft` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FORMCRAFT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".formcraft");
    }

    PathBuf::from(".formcraft")
}

/// Load configuration from `{data_dir}/config.toml`, then apply
/// environment overrides.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

async fn read_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply `FORMCRAFT_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("FORMCRAFT_DATABASE_URL") {
        config.database.url = Some(url);
    }
    if let Some(url) = non_empty("FORMCRAFT_SHEETS_WEBHOOK_URL") {
        config.sheets.webhook_url = Some(url);
    }
    if let Some(mode) = non_empty("FORMCRAFT_GENERATOR_MODE") {
        match mode.parse() {
            Ok(mode) => config.generator.mode = mode,
            Err(e) => tracing::warn!("Ignoring FORMCRAFT_GENERATOR_MODE: {e}"),
        }
    }
    if let Some(provider) = non_empty("FORMCRAFT_PROVIDER") {
        match provider.parse() {
            Ok(provider) => config.generator.provider = provider,
            Err(e) => tracing::warn!("Ignoring FORMCRAFT_PROVIDER: {e}"),
        }
    }
    if let Some(flag) = non_empty("FORMCRAFT_LOG_JSON") {
        config.logging.json = is_truthy(&flag);
    }
    if let Some(flag) = non_empty("FORMCRAFT_OTEL") {
        config.logging.otel = is_truthy(&flag);
    }

    config
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// SQLite URL: the configured one, or `{data_dir}/formcraft.db`.
pub fn database_url(config: &AppConfig, data_dir: &Path) -> String {
    match &config.database.url {
        Some(url) => url.clone(),
        None => format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display()),
    }
}

/// Read the provider's API key from its environment variable.
pub fn provider_api_key(provider: ProviderKind) -> Option<SecretString> {
    std::env::var(provider.api_key_env())
        .ok()
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
}
