use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bundlewise_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Renders the effective configuration with the layer each value came from.
pub fn run(config_path: Option<PathBuf>) -> String {
    let options = LoadOptions {
        require_file: config_path.is_some(),
        config_path: config_path.clone(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file_path = config_path.filter(|path| path.exists()).or_else(detect_config_path);
    let file_doc = load_config_file_doc(file_path.as_deref());
    let attribution = Attribution { file_doc: file_doc.as_ref(), file_path: file_path.as_deref() };

    let fields: [(&str, String, &[&str]); 9] = [
        (
            "mining.min_support",
            config.mining.min_support.to_string(),
            &["BUNDLEWISE_MINING_MIN_SUPPORT"],
        ),
        (
            "mining.min_confidence",
            config.mining.min_confidence.to_string(),
            &["BUNDLEWISE_MINING_MIN_CONFIDENCE"],
        ),
        ("mining.min_lift", config.mining.min_lift.to_string(), &["BUNDLEWISE_MINING_MIN_LIFT"]),
        (
            "mining.max_per_product",
            config.mining.max_per_product.to_string(),
            &["BUNDLEWISE_MINING_MAX_PER_PRODUCT"],
        ),
        ("mining.max_level", config.mining.max_level.to_string(), &["BUNDLEWISE_MINING_MAX_LEVEL"]),
        (
            "sanitation.max_basket_size",
            config.sanitation.max_basket_size.to_string(),
            &["BUNDLEWISE_SANITATION_MAX_BASKET_SIZE"],
        ),
        (
            "sanitation.drop_empty_baskets",
            config.sanitation.drop_empty_baskets.to_string(),
            &["BUNDLEWISE_SANITATION_DROP_EMPTY_BASKETS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["BUNDLEWISE_LOGGING_LEVEL", "BUNDLEWISE_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["BUNDLEWISE_LOGGING_FORMAT", "BUNDLEWISE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.iter().map(|(key_path, value, env_keys)| {
        render_line(key_path, value, attribution.source_of(key_path, env_keys))
    }));
    lines.join("\n")
}

struct Attribution<'a> {
    file_doc: Option<&'a Value>,
    file_path: Option<&'a Path>,
}

impl Attribution<'_> {
    fn source_of(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if self.file_doc.is_some_and(|doc| contains_path(doc, key_path)) {
            let file_path = self
                .file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }

        "default".to_string()
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("bundlewise.toml"), PathBuf::from("config/bundlewise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
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
