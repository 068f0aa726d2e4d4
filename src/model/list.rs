//! Unresolved and resolved permission lists

use crate::model::entry::Entry;
use serde::{Deserialize, Serialize};

/// A subject's stored, unresolved permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawList {
    /// Ids of the groups to inherit from; order is irrelevant
    pub groups: Vec<String>,

    /// Subject-specific delta, always applied last
    pub overwrites: Entry,
}

impl RawList {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
            overwrites: Entry::default(),
        }
    }

    pub fn with_overwrites(mut self, overwrites: Entry) -> Self {
        self.overwrites = overwrites;
        self
    }
}

/// A resolved, queryable permission set
///
/// `permission` keeps merge order and may contain duplicates; neither is
/// meaningful to matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct List {
    pub level: i64,
    pub permission: Vec<String>,
}

impl List {
    pub fn new<I, S>(level: i64, permission: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            level,
            permission: permission.into_iter().map(Into::into).collect(),
        }
    }

    /// Verbatim membership test
    pub fn contains(&self, node: &str) -> bool {
        self.permission.iter().any(|n| n == node)
    }

    pub fn is_empty(&self) -> bool {
        self.permission.is_empty()
    }
}
