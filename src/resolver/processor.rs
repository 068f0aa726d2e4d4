//! Permission list processor
//!
//! Resolves a [`RawList`] against a [`GroupProvider`]:
//! 1. Look up every referenced group (fail-fast on the first failure)
//! 2. Sort the groups by weight
//! 3. Fold each group's base permission, surrounded by its selected flags
//! 4. Fold the subject's overwrites last

use crate::error::{ResolveError, ResolveResult};
use crate::model::{Entry, FlagEntry, Group, List, RawList};
use crate::provider::GroupProvider;
use crate::resolver::merge::{fold_entry, merge_entries};
use serde::Deserialize;
use tracing::{debug, trace};

/// Direction in which weights are applied
///
/// The entry applied last has the final say, so the direction decides which
/// end of the weight range takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightOrder {
    /// Largest weight applied first; the smallest weight wins
    #[default]
    Descending,
    /// Smallest weight applied first; the largest weight wins
    Ascending,
}

impl WeightOrder {
    /// Stable sort by weight in this direction
    pub fn sort_by_weight<T, F>(&self, items: &mut [T], weight: F)
    where
        F: Fn(&T) -> i64,
    {
        match self {
            WeightOrder::Descending => items.sort_by(|a, b| weight(b).cmp(&weight(a))),
            WeightOrder::Ascending => items.sort_by_key(|item| weight(item)),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            WeightOrder::Descending => "descending",
            WeightOrder::Ascending => "ascending",
        }
    }
}

impl std::fmt::Display for WeightOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stateless resolver from raw lists to resolved lists
#[derive(Debug, Clone)]
pub struct Processor<P> {
    provider: P,
    order: WeightOrder,
}

impl<P: GroupProvider> Processor<P> {
    /// Create a processor with the default weight order
    pub fn new(provider: P) -> Self {
        Self::with_order(provider, WeightOrder::default())
    }

    pub fn with_order(provider: P, order: WeightOrder) -> Self {
        Self { provider, order }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn order(&self) -> WeightOrder {
        self.order
    }

    /// Resolve a raw list into a list
    pub fn process(&self, raw: &RawList) -> ResolveResult<List> {
        let groups = self.groups(&raw.groups)?;
        debug!(
            groups = groups.len(),
            order = %self.order,
            "Resolving permission list"
        );

        let list = groups.iter().fold(List::default(), |list, group| {
            trace!(group = %group.id, weight = group.weight, "Applying group");
            fold_entry(list, &group.permission)
        });

        Ok(fold_entry(list, &raw.overwrites))
    }

    /// Resolve a raw list, also applying the selected flags of each group
    ///
    /// Per group the order is: preprocess flags, base permission, remaining
    /// flags. Flags a group does not define are skipped.
    pub fn process_flags<S: AsRef<str>>(
        &self,
        raw: &RawList,
        selected: &[S],
    ) -> ResolveResult<List> {
        let groups = self.groups(&raw.groups)?;
        let selected = dedup(selected);
        debug!(
            groups = groups.len(),
            flags = selected.len(),
            order = %self.order,
            "Resolving permission list with flags"
        );

        let mut list = List::default();
        for group in &groups {
            let (pre, post) = self.flags(group, &selected)?;
            trace!(
                group = %group.id,
                weight = group.weight,
                preprocess = pre.len(),
                postprocess = post.len(),
                "Applying group with flags"
            );

            list = pre.iter().fold(list, |acc, flag| fold_entry(acc, &flag.entry));
            list = fold_entry(list, &group.permission);
            list = post.iter().fold(list, |acc, flag| fold_entry(acc, &flag.entry));
        }

        Ok(fold_entry(list, &raw.overwrites))
    }

    /// Layer ad-hoc entries onto an already resolved list
    pub fn merge_entry(&self, list: &List, entries: &[Entry]) -> List {
        merge_entries(list, entries)
    }

    /// Look up and sort the referenced groups
    fn groups(&self, ids: &[String]) -> ResolveResult<Vec<Group>> {
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            let group = self
                .provider
                .group(id)
                .map_err(|e| ResolveError::group_lookup(id.as_str(), e))?;
            groups.push(group);
        }

        self.order.sort_by_weight(&mut groups, |g| g.weight);
        Ok(groups)
    }

    /// Selected flags of a group, split into (preprocess, postprocess) and
    /// sorted by weight
    fn flags(
        &self,
        group: &Group,
        selected: &[&str],
    ) -> ResolveResult<(Vec<FlagEntry>, Vec<FlagEntry>)> {
        let mut pre = Vec::new();
        let mut post = Vec::new();

        for &flag_id in selected {
            match self.provider.flag(&group.id, flag_id) {
                Ok(Some(flag)) if flag.preprocess => pre.push(flag),
                Ok(Some(flag)) => post.push(flag),
                Ok(None) => trace!(group = %group.id, flag = flag_id, "Flag not defined"),
                Err(e) => return Err(ResolveError::flag_lookup(group.id.as_str(), flag_id, e)),
            }
        }

        self.order.sort_by_weight(&mut pre, |f| f.weight);
        self.order.sort_by_weight(&mut post, |f| f.weight);
        Ok((pre, post))
    }
}

/// Selected flag ids with repeats removed, first occurrence kept
fn dedup<S: AsRef<str>>(selected: &[S]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(selected.len());
    for id in selected {
        let id = id.as_ref();
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    fn provider_with(groups: Vec<Group>) -> MemoryProvider {
        let provider = MemoryProvider::new();
        for group in groups {
            provider.set_group(group);
        }
        provider
    }

    #[test]
    fn test_empty_raw_list() {
        let processor = Processor::new(MemoryProvider::new());
        let list = processor.process(&RawList::default()).unwrap();
        assert_eq!(list, List::default());
    }

    #[test]
    fn test_descending_lets_smaller_weight_win() {
        let provider = provider_with(vec![
            Group::new("high", 20, Entry::new().grant(["node"])),
            Group::new("low", 10, Entry::new().revoke(["node"])),
        ]);
        let processor = Processor::new(&provider);

        let list = processor.process(&RawList::new(["high", "low"])).unwrap();
        assert!(!list.contains("node"));

        let list = processor.process(&RawList::new(["low", "high"])).unwrap();
        assert!(!list.contains("node"));
    }

    #[test]
    fn test_ascending_lets_larger_weight_win() {
        let provider = provider_with(vec![
            Group::new("high", 20, Entry::new().grant(["node"])),
            Group::new("low", 10, Entry::new().revoke(["node"])),
        ]);
        let processor = Processor::with_order(&provider, WeightOrder::Ascending);

        let list = processor.process(&RawList::new(["high", "low"])).unwrap();
        assert!(list.contains("node"));
    }

    #[test]
    fn test_overwrites_applied_last() {
        let provider = provider_with(vec![Group::new(
            "base",
            1,
            Entry::new().grant(["a", "b"]).with_level(10),
        )]);
        let processor = Processor::new(&provider);
        let raw = RawList::new(["base"]).with_overwrites(Entry::new().revoke(["a"]).add_level(5));

        let list = processor.process(&raw).unwrap();
        assert_eq!(list.permission, vec!["b"]);
        assert_eq!(list.level, 15);
    }

    #[test]
    fn test_missing_group_fails_fast() {
        let provider = provider_with(vec![Group::new("base", 1, Entry::new())]);
        let processor = Processor::new(&provider);

        let err = processor
            .process(&RawList::new(["base", "ghost", "phantom"]))
            .unwrap_err();
        match err {
            ResolveError::GroupLookup { id, source } => {
                assert_eq!(id, "ghost");
                assert!(source.is_not_found());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(dedup(&["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_weight_order_sort_is_stable() {
        let mut items = vec![(1, "a"), (2, "b"), (1, "c"), (2, "d")];
        WeightOrder::Descending.sort_by_weight(&mut items, |i| i.0);
        assert_eq!(items, vec![(2, "b"), (2, "d"), (1, "a"), (1, "c")]);

        WeightOrder::Ascending.sort_by_weight(&mut items, |i| i.0);
        assert_eq!(items, vec![(1, "a"), (1, "c"), (2, "b"), (2, "d")]);
    }
}
