//! Cache layer integration tests
//!
//! Checks that cached resolution never serves stale lists:
//! - explicit clears
//! - provider version bumps (group, flag and subject edits)
//! - concurrent readers while the provider changes

use roller::error::ProviderResult;
use roller::{
    CachedProcessor, Entry, FlagEntry, Group, GroupProvider, List, MemoryProvider, Provider,
    RawList, ResolveError, WeightOrder,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

// =============================================================================
// Test Helpers
// =============================================================================

fn provider() -> MemoryProvider {
    let provider = MemoryProvider::new();
    provider.set_group(Group::new("member", 20, Entry::new().grant(["chat.send"])));
    provider.set_group(Group::new(
        "mod",
        10,
        Entry::new().grant(["chat.mute"]).with_level(5),
    ));
    provider.set_raw_list("alice", RawList::new(["member", "mod"]));
    provider.set_raw_list("bob", RawList::new(["member"]));
    provider
}

/// Provider that counts subject loads
struct Counting {
    inner: MemoryProvider,
    loads: AtomicUsize,
}

impl Counting {
    fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            loads: AtomicUsize::new(0),
        }
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl GroupProvider for Counting {
    fn group(&self, id: &str) -> ProviderResult<Group> {
        self.inner.group(id)
    }

    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        self.inner.flag(group_id, flag_id)
    }
}

impl Provider for Counting {
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.raw_list(subject_id)
    }

    fn version(&self) -> u64 {
        self.inner.version()
    }
}

/// Provider that runs a one-shot hook while a subject is being loaded
struct Hooked {
    inner: Counting,
    hook: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Hooked {
    fn new(inner: MemoryProvider) -> Self {
        Self {
            inner: Counting::new(inner),
            hook: Mutex::new(None),
        }
    }

    fn on_next_load(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }
}

impl GroupProvider for Hooked {
    fn group(&self, id: &str) -> ProviderResult<Group> {
        self.inner.group(id)
    }

    fn flag(&self, group_id: &str, flag_id: &str) -> ProviderResult<Option<FlagEntry>> {
        self.inner.flag(group_id, flag_id)
    }
}

impl Provider for Hooked {
    fn raw_list(&self, subject_id: &str) -> ProviderResult<RawList> {
        let hook = self.hook.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        self.inner.raw_list(subject_id)
    }

    fn version(&self) -> u64 {
        self.inner.version()
    }
}

// =============================================================================
// 1. Hits And Misses
// =============================================================================

#[test]
fn test_second_process_is_served_from_cache() {
    let counting = Counting::new(provider());
    let cache = CachedProcessor::new(&counting);

    let first = cache.process("alice").unwrap();
    let second = cache.process("alice").unwrap();

    assert_eq!(first, second);
    assert_eq!(counting.loads(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cached_result_matches_direct_resolution() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);

    let cached = cache.process("alice").unwrap();
    assert_eq!(cached, cache.direct_process("alice").unwrap());
    assert_eq!(cached, List::new(5, ["chat.send", "chat.mute"]));
}

#[test]
fn test_direct_process_bypasses_cache() {
    let counting = Counting::new(provider());
    let cache = CachedProcessor::new(&counting);

    cache.direct_process("alice").unwrap();
    assert!(cache.is_empty());

    cache.process("alice").unwrap();
    cache.direct_process("alice").unwrap();
    assert_eq!(counting.loads(), 3);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_subjects_are_cached_independently() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);

    let alice = cache.process("alice").unwrap();
    let bob = cache.process("bob").unwrap();

    assert_ne!(alice, bob);
    assert_eq!(bob, List::new(0, ["chat.send"]));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_respects_weight_order() {
    let provider = provider();
    let cache = CachedProcessor::with_order(&provider, WeightOrder::Ascending);

    let list = cache.process("alice").unwrap();
    assert_eq!(list.permission, vec!["chat.mute", "chat.send"]);
}

// =============================================================================
// 2. Invalidation
// =============================================================================

#[test]
fn test_clear_cache_forces_recomputation() {
    let counting = Counting::new(provider());
    let cache = CachedProcessor::new(&counting);

    cache.process("alice").unwrap();
    cache.clear_cache();
    assert!(cache.is_empty());

    cache.process("alice").unwrap();
    assert_eq!(counting.loads(), 2);
}

#[test]
fn test_clear_during_resolution_discards_result() {
    let hooked = Arc::new(Hooked::new(provider()));
    let cache = Arc::new(CachedProcessor::new(Arc::clone(&hooked)));
    let weak = Arc::downgrade(&cache);
    hooked.on_next_load(move || {
        if let Some(cache) = weak.upgrade() {
            cache.clear_cache();
        }
    });

    // the caller still gets its answer, but the cache stays empty
    let list = cache.process("alice").unwrap();
    assert_eq!(list, List::new(5, ["chat.send", "chat.mute"]));
    assert!(cache.is_empty());

    cache.process("alice").unwrap();
    assert_eq!(hooked.inner.loads(), 2);
    assert_eq!(cache.len(), 1);

    cache.process("alice").unwrap();
    assert_eq!(hooked.inner.loads(), 2);
}

#[test]
fn test_group_edit_invalidates_every_subject() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);
    cache.process("alice").unwrap();
    cache.process("bob").unwrap();

    provider.set_group(Group::new("member", 20, Entry::new().grant(["chat.read"])));

    assert_eq!(cache.process("bob").unwrap().permission, vec!["chat.read"]);
    assert_eq!(
        cache.process("alice").unwrap().permission,
        vec!["chat.read", "chat.mute"]
    );
}

#[test]
fn test_flag_edit_bumps_version() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);
    cache.process("alice").unwrap();
    let before = provider.version();

    provider
        .set_flag("mod", "night", FlagEntry::new(Entry::new().grant(["x"]), 1))
        .unwrap();

    assert!(provider.version() > before);
    cache.process("alice").unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_subject_edit_is_visible_immediately() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);
    assert_eq!(cache.process("bob").unwrap().level, 0);

    provider.set_raw_list("bob", RawList::new(["mod"]));

    assert_eq!(cache.process("bob").unwrap(), List::new(5, ["chat.mute"]));
}

#[test]
fn test_removed_subject_is_reported() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);
    cache.process("bob").unwrap();

    provider.remove_raw_list("bob");

    let err = cache.process("bob").unwrap_err();
    assert!(matches!(err, ResolveError::SubjectNotFound { ref subject, .. } if subject == "bob"));
}

#[test]
fn test_failed_resolution_is_not_cached() {
    let provider = provider();
    provider.set_raw_list("carol", RawList::new(["ghost"]));
    let cache = CachedProcessor::new(&provider);

    assert!(matches!(
        cache.process("carol"),
        Err(ResolveError::GroupLookup { .. })
    ));
    assert!(cache.is_empty());

    provider.set_group(Group::new("ghost", 1, Entry::new().grant(["boo"])));
    assert_eq!(cache.process("carol").unwrap().permission, vec!["boo"]);
}

#[test]
fn test_default_subject_fallback() {
    let provider = provider();
    let cache = CachedProcessor::new(&provider);
    assert!(cache.process("stranger").is_err());

    provider.set_default_raw_list(Some(RawList::new(["member"])));

    assert_eq!(
        cache.process("stranger").unwrap(),
        List::new(0, ["chat.send"])
    );
}

// =============================================================================
// 3. Concurrency
// =============================================================================

#[test]
fn test_concurrent_readers_share_cache() {
    let provider = Arc::new(provider());
    let cache = Arc::new(CachedProcessor::new(Arc::clone(&provider)));
    let expected = cache.direct_process("alice").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                (0..100)
                    .map(|_| cache.process("alice").unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for list in handle.join().unwrap() {
            assert_eq!(list, expected);
        }
    }
}

#[test]
fn test_no_stale_read_after_concurrent_writes() {
    let provider = Arc::new(provider());
    let cache = Arc::new(CachedProcessor::new(Arc::clone(&provider)));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..200 {
                    cache.process("alice").unwrap();
                }
            })
        })
        .collect();

    let writer = {
        let provider = Arc::clone(&provider);
        thread::spawn(move || {
            for level in 0..50 {
                provider.set_group(Group::new(
                    "mod",
                    10,
                    Entry::new().grant(["chat.mute"]).with_level(level),
                ));
            }
        })
    };

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    // every write happened before this call; the last one must be visible
    assert_eq!(cache.process("alice").unwrap().level, 49);
}
