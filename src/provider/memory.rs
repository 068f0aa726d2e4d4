//! In-memory provider
//!
//! Thread-safe store for groups, flags and subjects. All data sits behind a
//! single lock; the version counter is bumped after every mutation so cache
//! layers can notice changes.

use crate::error::{ProviderError, ProviderResult};
use crate::model::{FlagEntry, Group, RawList};
use crate::provider::{GroupProvider, Provider};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// In-memory group and subject store
#[derive(Debug, Default)]
pub struct MemoryProvider {
    data: RwLock<StoreData>,
    version: AtomicU64,
}

/// Everything a provider stores, protected by a single lock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StoreData {
    pub(crate) groups: BTreeMap<String, Group>,
    pub(crate) subjects: BTreeMap<String, RawList>,
    pub(crate) default_subject: Option<RawList>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a group, keyed by its id
    pub fn set_group(&self, group: Group) {
        trace!(group = %group.id, "Storing group");
        self.write_data().groups.insert(group.id.clone(), group);
        self.bump();
    }

    /// Remove a group and return it
    pub fn remove_group(&self, id: &str) -> ProviderResult<Group> {
        let removed = self
            .write_data()
            .groups
            .remove(id)
            .ok_or_else(|| ProviderError::group_not_found(id))?;
        self.bump();
        Ok(removed)
    }

    /// Insert or replace a flag on an existing group
    pub fn set_flag(&self, group_id: &str, flag_id: &str, flag: FlagEntry) -> ProviderResult<()> {
        {
            let mut data = self.write_data();
            let group = data
                .groups
                .get_mut(group_id)
                .ok_or_else(|| ProviderError::group_not_found(group_id))?;
            group.flags.insert(flag_id.to_string(), flag);
        }
        self.bump();
        Ok(())
    }

    /// Remove a flag from a group, returning it if it existed
    pub fn remove_flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        let removed = {
            let mut data = self.write_data();
            let group = data
                .groups
                .get_mut(group_id)
                .ok_or_else(|| ProviderError::group_not_found(group_id))?;
            group.flags.remove(flag_id)
        };
        if removed.is_some() {
            self.bump();
        }
        Ok(removed)
    }

    /// Store a subject's raw list
    pub fn set_raw_list(&self, subject_id: impl Into<String>, raw: RawList) {
        self.write_data().subjects.insert(subject_id.into(), raw);
        self.bump();
    }

    /// Remove a subject's raw list, returning it if it existed
    pub fn remove_raw_list(&self, subject_id: &str) -> Option<RawList> {
        let removed = self.write_data().subjects.remove(subject_id);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Raw list handed out for subjects without a stored entry
    pub fn set_default_raw_list(&self, raw: Option<RawList>) {
        self.write_data().default_subject = raw;
        self.bump();
    }

    /// All groups, ordered by id
    pub fn groups(&self) -> Vec<Group> {
        self.read_data().groups.values().cloned().collect()
    }

    /// All flags of a group
    pub fn flags(&self, group_id: &str) -> ProviderResult<BTreeMap<String, FlagEntry>> {
        self.read_data()
            .groups
            .get(group_id)
            .map(|g| g.flags.clone())
            .ok_or_else(|| ProviderError::group_not_found(group_id))
    }

    /// Ids of all stored subjects
    pub fn subjects(&self) -> Vec<String> {
        self.read_data().subjects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read_data().groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_data().groups.is_empty()
    }

    pub(crate) fn snapshot(&self) -> StoreData {
        self.read_data().clone()
    }

    pub(crate) fn replace(&self, data: StoreData) {
        *self.write_data() = data;
        self.bump();
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    // Lock helpers recover from poisoning; the data is plain values and stays
    // consistent even if a writer panicked.

    fn write_data(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.data.write().unwrap_or_else(|poisoned| {
            tracing::warn!("provider data lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read_data(&self) -> RwLockReadGuard<'_, StoreData> {
        self.data.read().unwrap_or_else(|poisoned| {
            tracing::warn!("provider data lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl GroupProvider for MemoryProvider {
    fn group(&self, id: &str) -> ProviderResult<Group> {
        self.read_data()
            .groups
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::group_not_found(id))
    }

    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        let data = self.read_data();
        let group = data
            .groups
            .get(group_id)
            .ok_or_else(|| ProviderError::group_not_found(group_id))?;
        Ok(group.flags.get(flag_id).cloned())
    }
}

impl Provider for MemoryProvider {
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList> {
        let data = self.read_data();
        data.subjects
            .get(subject_id)
            .or(data.default_subject.as_ref())
            .cloned()
            .ok_or_else(|| ProviderError::subject_not_found(subject_id))
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
