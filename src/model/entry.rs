//! Permission deltas
//!
//! An [`Entry`] describes how to change an accumulating permission state.
//! Within one application the order is fixed: `empty_set`, then `revoke`,
//! then `grant`.

use serde::{Deserialize, Serialize};

/// A delta applied to an accumulating permission state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// Discard every previously accumulated node before granting
    #[serde(skip_serializing_if = "is_false")]
    pub empty_set: bool,

    /// Level to add, or to set when `set_level` is true
    #[serde(skip_serializing_if = "is_zero")]
    pub level: i64,

    /// Overwrite the accumulated level instead of adding to it
    #[serde(skip_serializing_if = "is_false")]
    pub set_level: bool,

    /// Nodes appended to the accumulator
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grant: Vec<String>,

    /// Nodes removed from the accumulator before granting
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revoke: Vec<String>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add nodes to the grant sequence
    pub fn grant<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grant.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Add nodes to the revoke sequence
    pub fn revoke<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.revoke.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Add `level` to the accumulated level
    pub fn add_level(mut self, level: i64) -> Self {
        self.level = level;
        self.set_level = false;
        self
    }

    /// Overwrite the accumulated level with `level`
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self.set_level = true;
        self
    }

    /// Reset the accumulated nodes before granting
    pub fn empty_set(mut self) -> Self {
        self.empty_set = true;
        self
    }

    /// True when applying this entry changes nothing
    pub fn is_noop(&self) -> bool {
        !self.empty_set
            && !self.set_level
            && self.level == 0
            && self.grant.is_empty()
            && self.revoke.is_empty()
    }
}

/// An optional, selectable entry attached to a group
///
/// Serialized flat: the entry's fields sit next to `weight` and `preprocess`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FlagRecord", into = "FlagRecord")]
pub struct FlagEntry {
    pub entry: Entry,

    /// Ordering key among the flags of one group
    pub weight: i64,

    /// Apply before the owning group's base permission instead of after
    pub preprocess: bool,
}

impl FlagEntry {
    pub fn new(entry: Entry, weight: i64) -> Self {
        Self {
            entry,
            weight,
            preprocess: false,
        }
    }

    /// Mark this flag to run before the group's base permission
    pub fn preprocessed(mut self) -> Self {
        self.preprocess = true;
        self
    }
}

/// Flat on-disk form of a [`FlagEntry`]
///
/// Spelled out instead of `#[serde(flatten)]` so that every key is a declared
/// field and unknown keys are reported like anywhere else in a document.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct FlagRecord {
    #[serde(skip_serializing_if = "is_false")]
    empty_set: bool,
    #[serde(skip_serializing_if = "is_zero")]
    level: i64,
    #[serde(skip_serializing_if = "is_false")]
    set_level: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    grant: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    revoke: Vec<String>,
    weight: i64,
    #[serde(skip_serializing_if = "is_false")]
    preprocess: bool,
}

impl From<FlagRecord> for FlagEntry {
    fn from(record: FlagRecord) -> Self {
        Self {
            entry: Entry {
                empty_set: record.empty_set,
                level: record.level,
                set_level: record.set_level,
                grant: record.grant,
                revoke: record.revoke,
            },
            weight: record.weight,
            preprocess: record.preprocess,
        }
    }
}

impl From<FlagEntry> for FlagRecord {
    fn from(flag: FlagEntry) -> Self {
        let Entry {
            empty_set,
            level,
            set_level,
            grant,
            revoke,
        } = flag.entry;
        Self {
            empty_set,
            level,
            set_level,
            grant,
            revoke,
            weight: flag.weight,
            preprocess: flag.preprocess,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
