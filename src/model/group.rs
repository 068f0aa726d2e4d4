//! Permission groups

use crate::model::entry::{Entry, FlagEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, weighted bundle of permission deltas shared across subjects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    /// Unique identifier used for storage and references; never changes
    pub id: String,

    /// Display name, no semantic weight
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Command-friendly display name, no semantic weight
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_name: String,

    /// Merge-order key, should be unique among groups resolved together
    pub weight: i64,

    /// Base delta applied for every member
    pub permission: Entry,

    /// Optional selectable deltas, keyed by flag id
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, FlagEntry>,
}

impl Group {
    pub fn new(id: impl Into<String>, weight: i64, permission: Entry) -> Self {
        Self {
            id: id.into(),
            weight,
            permission,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.ref_name = ref_name.into();
        self
    }

    pub fn with_flag(mut self, id: impl Into<String>, flag: FlagEntry) -> Self {
        self.flags.insert(id.into(), flag);
        self
    }

    /// Name to show to humans, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
