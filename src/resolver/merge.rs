//! Entry application
//!
//! The merge primitive every resolution is built from. Given an accumulated
//! [`List`] and an [`Entry`]:
//!
//! ```text
//! level      = set_level ? entry.level : list.level + entry.level
//! permission = (empty_set ? [] : list.permission - revoke) ++ grant
//! ```
//!
//! Revoking removes every instance of a node, not only the first one.

use crate::model::{Entry, List};
use std::collections::HashSet;

/// Above this many revoked nodes a hash set beats repeated linear scans
const REVOKE_SET_THRESHOLD: usize = 8;

/// Apply one entry to a list, returning a new list
///
/// Neither input is modified.
pub fn apply_entry(list: &List, entry: &Entry) -> List {
    let level = next_level(list.level, entry);

    let mut permission = if entry.empty_set {
        Vec::with_capacity(entry.grant.len())
    } else if entry.revoke.is_empty() {
        let mut kept = Vec::with_capacity(list.permission.len() + entry.grant.len());
        kept.extend_from_slice(&list.permission);
        kept
    } else {
        let revoked = Revoked::new(&entry.revoke);
        let mut kept = Vec::with_capacity(list.permission.len() + entry.grant.len());
        kept.extend(
            list.permission
                .iter()
                .filter(|node| !revoked.contains(node))
                .cloned(),
        );
        kept
    };
    permission.extend_from_slice(&entry.grant);

    List { level, permission }
}

/// Apply a sequence of entries in order
pub fn merge_entries<'a, I>(list: &List, entries: I) -> List
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries.into_iter().fold(list.clone(), fold_entry)
}

/// Owned variant used while folding; reuses the accumulator's allocation.
pub(crate) fn fold_entry(mut list: List, entry: &Entry) -> List {
    list.level = next_level(list.level, entry);

    if entry.empty_set {
        list.permission.clear();
    } else if !entry.revoke.is_empty() {
        let revoked = Revoked::new(&entry.revoke);
        list.permission.retain(|node| !revoked.contains(node));
    }
    list.permission.extend_from_slice(&entry.grant);

    list
}

fn next_level(current: i64, entry: &Entry) -> i64 {
    if entry.set_level {
        entry.level
    } else {
        current.saturating_add(entry.level)
    }
}

/// Revoked nodes, hashed once the list gets long
enum Revoked<'a> {
    Few(&'a [String]),
    Many(HashSet<&'a str>),
}

impl<'a> Revoked<'a> {
    fn new(revoke: &'a [String]) -> Self {
        if revoke.len() > REVOKE_SET_THRESHOLD {
            Revoked::Many(revoke.iter().map(String::as_str).collect())
        } else {
            Revoked::Few(revoke)
        }
    }

    fn contains(&self, node: &str) -> bool {
        match self {
            Revoked::Few(nodes) => nodes.iter().any(|n| n == node),
            Revoked::Many(nodes) => nodes.contains(node),
        }
    }
}
