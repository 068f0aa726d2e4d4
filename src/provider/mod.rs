//! Group and subject providers
//!
//! The resolver only needs [`GroupProvider`]; the cache layer additionally
//! needs to load subjects and observe changes through [`Provider`].
//!
//! Two implementations ship with the crate:
//! - [`MemoryProvider`] - thread-safe in-memory store
//! - [`JsonStore`] - the same store persisted to a JSON document

pub mod json;
pub mod memory;

pub use json::{JsonStore, StoreOptions};
pub use memory::MemoryProvider;

use crate::error::ProviderResult;
use crate::model::{FlagEntry, Group, RawList};
use std::sync::Arc;

/// Source of groups and their flags
pub trait GroupProvider {
    /// Look up a group by id
    ///
    /// A missing group must be reported with an error for which
    /// [`ProviderError::is_not_found`](crate::error::ProviderError::is_not_found)
    /// returns true.
    fn group(&self, id: &str) -> ProviderResult<Group>;

    /// Look up a flag of a group
    ///
    /// `Ok(None)` means the group has no such flag; errors are reserved for
    /// operational failures.
    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>>;
}

/// Full provider consumed by the cache layer
pub trait Provider: GroupProvider {
    /// Load a subject's stored permissions
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList>;

    /// Change counter; never decreases and increases on every change to a
    /// group, flag, or stored subject
    fn version(&self) -> u64;
}

impl<T: GroupProvider + ?Sized> GroupProvider for &T {
    fn group(&self, id: &str) -> ProviderResult<Group> {
        (**self).group(id)
    }

    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        (**self).flag(group_id, flag_id)
    }
}

impl<T: Provider + ?Sized> Provider for &T {
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList> {
        (**self).raw_list(subject_id)
    }

    fn version(&self) -> u64 {
        (**self).version()
    }
}

impl<T: GroupProvider + ?Sized> GroupProvider for Arc<T> {
    fn group(&self, id: &str) -> ProviderResult<Group> {
        (**self).group(id)
    }

    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        (**self).flag(group_id, flag_id)
    }
}

impl<T: Provider + ?Sized> Provider for Arc<T> {
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList> {
        (**self).raw_list(subject_id)
    }

    fn version(&self) -> u64 {
        (**self).version()
    }
}
