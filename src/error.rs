//! Error types for roller
//!
//! This module defines the error hierarchy used throughout the crate.
//! Provider errors keep "not found" apart from operational failures so the
//! resolver never has to inspect error messages.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Errors reported by a group/subject provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("group '{id}' not found")]
    GroupNotFound { id: String },

    #[error("subject '{id}' not found")]
    SubjectNotFound { id: String },

    #[error("provider is read-only")]
    ReadOnly,

    #[error("duplicate group id '{id}'")]
    DuplicateGroup { id: String },

    #[error("unknown fields in store document: {}", paths.join(", "))]
    UnknownFields { paths: Vec<String> },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn group_not_found(id: impl Into<String>) -> Self {
        Self::GroupNotFound { id: id.into() }
    }

    pub fn subject_not_found(id: impl Into<String>) -> Self {
        Self::SubjectNotFound { id: id.into() }
    }

    /// True when the lookup target simply does not exist, as opposed to the
    /// provider failing to answer.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::GroupNotFound { .. } | ProviderError::SubjectNotFound { .. }
        )
    }
}

/// Errors produced while resolving a permission list
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to resolve group '{id}': {source}")]
    GroupLookup { id: String, source: ProviderError },

    #[error("failed to resolve flag '{flag}' of group '{group}': {source}")]
    FlagLookup {
        group: String,
        flag: String,
        source: ProviderError,
    },

    #[error("failed to load subject '{subject}': {source}")]
    SubjectNotFound {
        subject: String,
        source: ProviderError,
    },
}

impl ResolveError {
    pub fn group_lookup(id: impl Into<String>, source: ProviderError) -> Self {
        Self::GroupLookup {
            id: id.into(),
            source,
        }
    }

    pub fn flag_lookup(
        group: impl Into<String>,
        flag: impl Into<String>,
        source: ProviderError,
    ) -> Self {
        Self::FlagLookup {
            group: group.into(),
            flag: flag.into(),
            source,
        }
    }

    pub fn subject_not_found(subject: impl Into<String>, source: ProviderError) -> Self {
        Self::SubjectNotFound {
            subject: subject.into(),
            source,
        }
    }

    /// The provider error this resolution failure wraps
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            ResolveError::GroupLookup { source, .. }
            | ResolveError::FlagLookup { source, .. }
            | ResolveError::SubjectNotFound { source, .. } => source,
        }
    }
}

/// Result type alias for resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Result type alias for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
