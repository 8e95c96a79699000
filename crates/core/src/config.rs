use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::DomainError;
use crate::mining::{
    MiningParameters, DEFAULT_MAX_BASKET_SIZE, DEFAULT_MAX_LEVEL, DEFAULT_MAX_PER_PRODUCT,
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_LIFT, DEFAULT_MIN_SUPPORT,
};

/// Subset enumeration uses a 64-bit mask, so baskets are capped below that.
pub const MAX_SUPPORTED_BASKET_SIZE: usize = 63;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub mining: MiningConfig,
    pub sanitation: SanitationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MiningConfig {
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub max_per_product: usize,
    pub max_level: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitationConfig {
    pub max_basket_size: usize,
    pub drop_empty_baskets: bool,
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
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub min_lift: Option<f64>,
    pub max_per_product: Option<usize>,
    pub max_level: Option<usize>,
    pub max_basket_size: Option<usize>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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
            mining: MiningConfig {
                min_support: DEFAULT_MIN_SUPPORT,
                min_confidence: DEFAULT_MIN_CONFIDENCE,
                min_lift: DEFAULT_MIN_LIFT,
                max_per_product: DEFAULT_MAX_PER_PRODUCT,
                max_level: DEFAULT_MAX_LEVEL,
            },
            sanitation: SanitationConfig {
                max_basket_size: DEFAULT_MAX_BASKET_SIZE,
                drop_empty_baskets: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl MiningConfig {
    pub fn parameters(&self) -> MiningParameters {
        MiningParameters {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            min_lift: self.min_lift,
            max_per_product: self.max_per_product,
            max_level: self.max_level,
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
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("bundlewise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(mining) = patch.mining {
            if let Some(min_support) = mining.min_support {
                self.mining.min_support = min_support;
            }
            if let Some(min_confidence) = mining.min_confidence {
                self.mining.min_confidence = min_confidence;
            }
            if let Some(min_lift) = mining.min_lift {
                self.mining.min_lift = min_lift;
            }
            if let Some(max_per_product) = mining.max_per_product {
                self.mining.max_per_product = max_per_product;
            }
            if let Some(max_level) = mining.max_level {
                self.mining.max_level = max_level;
            }
        }

        if let Some(sanitation) = patch.sanitation {
            if let Some(max_basket_size) = sanitation.max_basket_size {
                self.sanitation.max_basket_size = max_basket_size;
            }
            if let Some(drop_empty_baskets) = sanitation.drop_empty_baskets {
                self.sanitation.drop_empty_baskets = drop_empty_baskets;
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
        if let Some(value) = read_env("BUNDLEWISE_MINING_MIN_SUPPORT") {
            self.mining.min_support = parse_f64("BUNDLEWISE_MINING_MIN_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("BUNDLEWISE_MINING_MIN_CONFIDENCE") {
            self.mining.min_confidence = parse_f64("BUNDLEWISE_MINING_MIN_CONFIDENCE", &value)?;
        }
        if let Some(value) = read_env("BUNDLEWISE_MINING_MIN_LIFT") {
            self.mining.min_lift = parse_f64("BUNDLEWISE_MINING_MIN_LIFT", &value)?;
        }
        if let Some(value) = read_env("BUNDLEWISE_MINING_MAX_PER_PRODUCT") {
            self.mining.max_per_product =
                parse_usize("BUNDLEWISE_MINING_MAX_PER_PRODUCT", &value)?;
        }
        if let Some(value) = read_env("BUNDLEWISE_MINING_MAX_LEVEL") {
            self.mining.max_level = parse_usize("BUNDLEWISE_MINING_MAX_LEVEL", &value)?;
        }

        if let Some(value) = read_env("BUNDLEWISE_SANITATION_MAX_BASKET_SIZE") {
            self.sanitation.max_basket_size =
                parse_usize("BUNDLEWISE_SANITATION_MAX_BASKET_SIZE", &value)?;
        }
        if let Some(value) = read_env("BUNDLEWISE_SANITATION_DROP_EMPTY_BASKETS") {
            self.sanitation.drop_empty_baskets =
                parse_bool("BUNDLEWISE_SANITATION_DROP_EMPTY_BASKETS", &value)?;
        }

        let log_level =
            read_env("BUNDLEWISE_LOGGING_LEVEL").or_else(|| read_env("BUNDLEWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BUNDLEWISE_LOGGING_FORMAT").or_else(|| read_env("BUNDLEWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(min_support) = overrides.min_support {
            self.mining.min_support = min_support;
        }
        if let Some(min_confidence) = overrides.min_confidence {
            self.mining.min_confidence = min_confidence;
        }
        if let Some(min_lift) = overrides.min_lift {
            self.mining.min_lift = min_lift;
        }
        if let Some(max_per_product) = overrides.max_per_product {
            self.mining.max_per_product = max_per_product;
        }
        if let Some(max_level) = overrides.max_level {
            self.mining.max_level = max_level;
        }
        if let Some(max_basket_size) = overrides.max_basket_size {
            self.sanitation.max_basket_size = max_basket_size;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_mining(&self.mining)?;
        validate_sanitation(&self.sanitation)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("bundlewise.toml"), PathBuf::from("config/bundlewise.toml")]
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

fn validate_mining(mining: &MiningConfig) -> Result<(), ConfigError> {
    mining.parameters().validate().map_err(|error| match error {
        DomainError::InvalidParameter { name, value, expected } => ConfigError::Validation(
            format!("mining.{name} must be {expected} (got {value})"),
        ),
        other => ConfigError::Validation(other.to_string()),
    })
}

fn validate_sanitation(sanitation: &SanitationConfig) -> Result<(), ConfigError> {
    if sanitation.max_basket_size == 0 || sanitation.max_basket_size > MAX_SUPPORTED_BASKET_SIZE {
        return Err(ConfigError::Validation(format!(
            "sanitation.max_basket_size must be in range 1..={MAX_SUPPORTED_BASKET_SIZE}"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    mining: Option<MiningPatch>,
    sanitation: Option<SanitationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct MiningPatch {
    min_support: Option<f64>,
    min_confidence: Option<f64>,
    min_lift: Option<f64>,
    max_per_product: Option<usize>,
    max_level: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct SanitationPatch {
    max_basket_size: Option<usize>,
    drop_empty_baskets: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
