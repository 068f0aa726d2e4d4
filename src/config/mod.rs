//! Configuration
//!
//! Layered configuration: TOML file, `ROLLER__*` environment variables and
//! serde defaults, validated before use.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::{
    AppConfig, LogFormat, LoggingConfig, MatcherConfig, MatcherStrategy, ResolverConfig,
    StoreConfig,
};
