//! Cached resolution
//!
//! Memoizes resolved lists per subject id. Invalidation is global: whenever
//! the provider's version moves past the last observed one, every cached
//! entry is dropped, since a single group edit can affect any subject.
//!
//! Cache reads happen under a read lock; invalidation and population take the
//! write lock. Resolution itself runs without holding the lock, and a result
//! is only stored if neither a version bump nor [`CachedProcessor::clear_cache`]
//! happened while it was being computed.

use crate::error::{ResolveError, ResolveResult};
use crate::model::List;
use crate::provider::Provider;
use crate::resolver::{Processor, WeightOrder};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Cached entries and the provider version they were computed against
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, List>,
    observed_version: u64,
    /// Bumped by every explicit clear
    generation: u64,
}

/// Subject resolver with a per-subject cache
#[derive(Debug)]
pub struct CachedProcessor<P> {
    processor: Processor<P>,
    state: RwLock<CacheState>,
}

impl<P: Provider> CachedProcessor<P> {
    pub fn new(provider: P) -> Self {
        Self::from_processor(Processor::new(provider))
    }

    pub fn with_order(provider: P, order: WeightOrder) -> Self {
        Self::from_processor(Processor::with_order(provider, order))
    }

    pub fn from_processor(processor: Processor<P>) -> Self {
        let observed_version = processor.provider().version();
        Self {
            processor,
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                observed_version,
                generation: 0,
            }),
        }
    }

    pub fn processor(&self) -> &Processor<P> {
        &self.processor
    }

    pub fn provider(&self) -> &P {
        self.processor.provider()
    }

    /// Resolve a subject, serving from the cache when it is still fresh
    pub fn process(&self, subject_id: &str) -> ResolveResult<List> {
        let version = self.provider().version();

        let generation = {
            let state = self.read_state();
            if version <= state.observed_version
                && let Some(list) = state.entries.get(subject_id)
            {
                trace!(subject = subject_id, "Cache hit");
                return Ok(list.clone());
            }
            state.generation
        };

        self.invalidate_if_stale(version);

        trace!(subject = subject_id, "Cache miss");
        let list = self.direct_process(subject_id)?;

        let mut state = self.write_state();
        if state.observed_version == version && state.generation == generation {
            state.entries.insert(subject_id.to_string(), list.clone());
        }
        Ok(list)
    }

    /// Resolve a subject without reading or populating the cache
    pub fn direct_process(&self, subject_id: &str) -> ResolveResult<List> {
        let raw = self
            .provider()
            .raw_list(subject_id)
            .map_err(|e| ResolveError::subject_not_found(subject_id, e))?;
        self.processor.process(&raw)
    }

    /// Drop every cached entry
    pub fn clear_cache(&self) {
        let mut state = self.write_state();
        debug!(entries = state.entries.len(), "Clearing permission cache");
        state.entries.clear();
        state.generation = state.generation.wrapping_add(1);
    }

    /// Number of cached subjects
    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    fn invalidate_if_stale(&self, version: u64) {
        let mut state = self.write_state();
        if version > state.observed_version {
            debug!(
                from = state.observed_version,
                to = version,
                dropped = state.entries.len(),
                "Provider changed, invalidating permission cache"
            );
            state.entries.clear();
            state.observed_version = version;
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|poisoned| {
            tracing::warn!("permission cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|poisoned| {
            tracing::warn!("permission cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
