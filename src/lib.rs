//! Roller
//!
//! Weighted permission groups resolved into effective permission sets.
//!
//! ## Features
//!
//! - **Weighted groups** merged in a deterministic, configurable order
//! - **Selectable flags** applied around a group's base permission
//! - **Exact or hierarchical matching** with wildcard terminators and power levels
//! - **Cached resolution** invalidated by the provider's change counter
//!
//! ## Resolution Model
//!
//! ```text
//! groups (by weight) → flags / base per group → subject overwrites → List
//! ```
//!
//! Each step applies an [`Entry`](model::Entry):
//! - `empty_set` discards everything accumulated so far
//! - `revoke` removes nodes, then `grant` appends nodes
//! - `level` is added, or overwrites when `set_level` is true
//!
//! ## Example Configuration
//!
//! ```toml
//! [store]
//! path = "~/.config/roller/groups.json"
//!
//! [resolver]
//! weight_order = "descending"     # smallest weight applied last
//!
//! [matcher]
//! strategy = "implicit"
//! delimiter = "."
//! terminator = "*"                # "chat*" grants chat.send, chat.mute, ...
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod provider;
pub mod ranker;
pub mod resolver;

// Re-export main types
pub use cache::CachedProcessor;
pub use config::{AppConfig, load_config};
pub use error::{ConfigError, ProviderError, ResolveError};
pub use matcher::{ImplicitMatcher, Matcher, Permissible};
pub use model::{Entry, FlagEntry, Group, List, RawList};
pub use provider::{GroupProvider, JsonStore, MemoryProvider, Provider};
pub use ranker::Ranker;
pub use resolver::{Processor, WeightOrder, apply_entry, merge_entries};
