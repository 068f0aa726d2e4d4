//! Configuration types for roller
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::provider::StoreOptions;
use crate::provider::json::DEFAULT_INDENT;
use crate::resolver::WeightOrder;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Group/subject store settings
    pub store: StoreConfig,

    /// Merge ordering
    pub resolver: ResolverConfig,

    /// Matching strategy
    pub matcher: MatcherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// JSON store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON document (`~` is expanded)
    pub path: String,

    /// Refuse to modify or save the store
    pub read_only: bool,

    /// Indentation used when saving
    pub indent: String,

    /// Load documents containing unknown keys instead of rejecting them
    pub allow_unknown: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "roller.json".to_string(),
            read_only: false,
            indent: DEFAULT_INDENT.to_string(),
            allow_unknown: false,
        }
    }
}

impl StoreConfig {
    /// Store path with a leading `~` expanded
    pub fn expanded_path(&self) -> String {
        shellexpand::tilde(&self.path).into_owned()
    }

    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            read_only: self.read_only,
            indent: self.indent.clone(),
            allow_unknown: self.allow_unknown,
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Direction groups and flags are applied in
    pub weight_order: WeightOrder,
}

/// Matcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Matching strategy
    pub strategy: MatcherStrategy,

    /// Segment separator for hierarchical nodes
    pub delimiter: String,

    /// Suffix marking a grant as covering descendants
    pub terminator: String,

    /// Treat the bare terminator as a universal grant
    pub include_terminator: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy: MatcherStrategy::Implicit,
            delimiter: ".".to_string(),
            terminator: "*".to_string(),
            include_terminator: false,
        }
    }
}

/// Matching strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherStrategy {
    /// Exact node membership
    Explicit,
    /// Hierarchical matching with terminator wildcards
    #[default]
    Implicit,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
