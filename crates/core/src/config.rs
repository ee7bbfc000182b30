use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub api_port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

/// Tunables of the recommendation engine. The generic fallback amounts and
/// the admin-default band are configuration, not inline literals, so product
/// can adjust them without a release.
#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub min_sample_size: usize,
    pub default_band_pct: i64,
    pub fallback_min: i64,
    pub fallback_max: i64,
    pub fallback_avg: i64,
    pub fallback_recommended_high: i64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://petsit.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                api_port: 8080,
                health_check_port: 8081,
                graceful_shutdown_secs: 15,
            },
            pricing: PricingConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 3,
            default_band_pct: 20,
            fallback_min: 1500,
            fallback_max: 3000,
            fallback_avg: 2000,
            fallback_recommended_high: 2500,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("petsit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(api_port) = server.api_port {
                self.server.api_port = api_port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(min_sample_size) = pricing.min_sample_size {
                self.pricing.min_sample_size = min_sample_size;
            }
            if let Some(default_band_pct) = pricing.default_band_pct {
                self.pricing.default_band_pct = default_band_pct;
            }
            if let Some(fallback_min) = pricing.fallback_min {
                self.pricing.fallback_min = fallback_min;
            }
            if let Some(fallback_max) = pricing.fallback_max {
                self.pricing.fallback_max = fallback_max;
            }
            if let Some(fallback_avg) = pricing.fallback_avg {
                self.pricing.fallback_avg = fallback_avg;
            }
            if let Some(fallback_recommended_high) = pricing.fallback_recommended_high {
                self.pricing.fallback_recommended_high = fallback_recommended_high;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PETSIT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("PETSIT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("PETSIT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("PETSIT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("PETSIT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PETSIT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PETSIT_SERVER_API_PORT") {
            self.server.api_port = parse_u16("PETSIT_SERVER_API_PORT", &value)?;
        }
        if let Some(value) = read_env("PETSIT_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("PETSIT_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("PETSIT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PETSIT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("PETSIT_PRICING_MIN_SAMPLE_SIZE") {
            self.pricing.min_sample_size =
                parse_u64("PETSIT_PRICING_MIN_SAMPLE_SIZE", &value)? as usize;
        }
        if let Some(value) = read_env("PETSIT_PRICING_DEFAULT_BAND_PCT") {
            self.pricing.default_band_pct = parse_i64("PETSIT_PRICING_DEFAULT_BAND_PCT", &value)?;
        }
        if let Some(value) = read_env("PETSIT_PRICING_FALLBACK_MIN") {
            self.pricing.fallback_min = parse_i64("PETSIT_PRICING_FALLBACK_MIN", &value)?;
        }
        if let Some(value) = read_env("PETSIT_PRICING_FALLBACK_MAX") {
            self.pricing.fallback_max = parse_i64("PETSIT_PRICING_FALLBACK_MAX", &value)?;
        }
        if let Some(value) = read_env("PETSIT_PRICING_FALLBACK_AVG") {
            self.pricing.fallback_avg = parse_i64("PETSIT_PRICING_FALLBACK_AVG", &value)?;
        }
        if let Some(value) = read_env("PETSIT_PRICING_FALLBACK_RECOMMENDED_HIGH") {
            self.pricing.fallback_recommended_high =
                parse_i64("PETSIT_PRICING_FALLBACK_RECOMMENDED_HIGH", &value)?;
        }

        let log_level = read_env("PETSIT_LOGGING_LEVEL").or_else(|| read_env("PETSIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PETSIT_LOGGING_FORMAT").or_else(|| read_env("PETSIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("petsit.toml"), PathBuf::from("config/petsit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.api_port == 0 || server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server ports must be greater than zero".to_string(),
        ));
    }
    if server.api_port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.api_port and server.health_check_port must differ".to_string(),
        ));
    }
    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.min_sample_size == 0 {
        return Err(ConfigError::Validation(
            "pricing.min_sample_size must be at least 1".to_string(),
        ));
    }
    if !(0..100).contains(&pricing.default_band_pct) {
        return Err(ConfigError::Validation(
            "pricing.default_band_pct must be in range 0..100".to_string(),
        ));
    }
    if pricing.fallback_min < 0
        || pricing.fallback_min > pricing.fallback_avg
        || pricing.fallback_avg > pricing.fallback_max
    {
        return Err(ConfigError::Validation(
            "pricing fallback amounts must satisfy 0 <= min <= avg <= max".to_string(),
        ));
    }
    if pricing.fallback_recommended_high < pricing.fallback_min
        || pricing.fallback_recommended_high > pricing.fallback_max
    {
        return Err(ConfigError::Validation(
            "pricing.fallback_recommended_high must lie within the fallback range".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    match logging.level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "unsupported logging.level `{other}` (expected trace|debug|info|warn|error)"
        ))),
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    api_port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    min_sample_size: Option<usize>,
    default_band_pct: Option<i64>,
    fallback_min: Option<i64>,
    fallback_max: Option<i64>,
    fallback_avg: Option<i64>,
    fallback_recommended_high: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
