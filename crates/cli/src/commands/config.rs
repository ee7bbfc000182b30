use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use petsit_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let entries: Vec<(&str, String, Option<&str>)> = vec![
        ("database.url", config.database.url.clone(), Some("PETSIT_DATABASE_URL")),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            Some("PETSIT_DATABASE_MAX_CONNECTIONS"),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            Some("PETSIT_DATABASE_TIMEOUT_SECS"),
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            Some("PETSIT_SERVER_BIND_ADDRESS"),
        ),
        ("server.api_port", config.server.api_port.to_string(), Some("PETSIT_SERVER_API_PORT")),
        (
            "server.health_check_port",
            config.server.health_check_port.to_string(),
            Some("PETSIT_SERVER_HEALTH_CHECK_PORT"),
        ),
        (
            "pricing.min_sample_size",
            config.pricing.min_sample_size.to_string(),
            Some("PETSIT_PRICING_MIN_SAMPLE_SIZE"),
        ),
        (
            "pricing.default_band_pct",
            config.pricing.default_band_pct.to_string(),
            Some("PETSIT_PRICING_DEFAULT_BAND_PCT"),
        ),
        (
            "pricing.fallback_min",
            config.pricing.fallback_min.to_string(),
            Some("PETSIT_PRICING_FALLBACK_MIN"),
        ),
        (
            "pricing.fallback_max",
            config.pricing.fallback_max.to_string(),
            Some("PETSIT_PRICING_FALLBACK_MAX"),
        ),
        (
            "pricing.fallback_avg",
            config.pricing.fallback_avg.to_string(),
            Some("PETSIT_PRICING_FALLBACK_AVG"),
        ),
        (
            "pricing.fallback_recommended_high",
            config.pricing.fallback_recommended_high.to_string(),
            Some("PETSIT_PRICING_FALLBACK_RECOMMENDED_HIGH"),
        ),
        ("logging.level", config.logging.level.clone(), Some("PETSIT_LOGGING_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format), Some("PETSIT_LOGGING_FORMAT")),
    ];

    for (key, value, env_key) in entries {
        lines.push(render_line(
            key,
            &value,
            field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("petsit.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/petsit.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
