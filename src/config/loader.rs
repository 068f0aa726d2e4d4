//! Layered configuration loading
//!
//! Sources, highest precedence first:
//! 1. `ROLLER_STORE` (shortcut for `store.path`)
//! 2. `ROLLER__*` environment variables, `__` separating nested keys
//! 3. A TOML file, either given explicitly or the first default path found
//! 4. Serde defaults on [`AppConfig`]

use crate::config::types::{AppConfig, MatcherStrategy};
use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

/// Searched in order when no file is given
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "roller.toml",
    ".roller.toml",
    "~/.config/roller/config.toml",
    "/etc/roller/config.toml",
];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Parse and validate configuration from a TOML string, without touching the
/// environment
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    finish(Config::builder().add_source(File::from_str(toml_str, FileFormat::Toml)))
}

/// Load configuration from a file and the environment
///
/// An explicit `config_path` must exist; otherwise the default paths are
/// optional.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let file = match config_path {
        Some(path) if !Path::new(path).exists() => {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        Some(path) => Some(path.to_string()),
        None => find_default_config(),
    };

    let mut builder = Config::builder();
    if let Some(file) = file {
        builder = builder.add_source(File::new(&file, FileFormat::Toml));
    }

    // ROLLER__MATCHER__TERMINATOR -> matcher.terminator
    builder = builder.add_source(
        Environment::with_prefix("ROLLER")
            .separator("__")
            .try_parsing(true),
    );

    if let Ok(store) = std::env::var("ROLLER_STORE") {
        builder = builder
            .set_override("store.path", store)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }

    finish(builder)
}

fn find_default_config() -> Option<String> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(|path| shellexpand::tilde(path).into_owned())
        .find(|path| Path::new(path).exists())
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig = builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;
    Ok(app_config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.store.path.is_empty() {
        return Err(ConfigError::Missing {
            field: "store.path".to_string(),
        });
    }

    let matcher = &config.matcher;
    if matcher.strategy == MatcherStrategy::Implicit && matcher.delimiter.is_empty() {
        return Err(ConfigError::Invalid {
            message: "matcher.delimiter must not be empty for the implicit strategy".to_string(),
        });
    }
    if matcher.include_terminator && matcher.terminator.is_empty() {
        return Err(ConfigError::Invalid {
            message: "matcher.include_terminator requires a non-empty matcher.terminator"
                .to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::Invalid {
            message: format!(
                "logging.level must be one of {}, got: {}",
                LOG_LEVELS.join(", "),
                config.logging.level
            ),
        });
    }

    Ok(())
}
