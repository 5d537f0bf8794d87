//! Cache Store Module
//!
//! Byte-bounded LRU store combining a key→slot map with a recency list.
//! Pure data structure: it knows nothing about loaders, groups or queues.
//! All operations are serialized by one internal mutex, held only for the
//! O(1) map/list work (scans copy keys out before any slow work happens).

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::cache::{ByteView, Entry, RecencyList};

// == Eviction Hook ==
/// Invoked for every entry evicted to satisfy the byte budget.
///
/// Runs under the store lock: keep it short and never call back into the
/// store from inside it.
pub type EvictionHook = Box<dyn Fn(&str, &ByteView) + Send + Sync>;

// == Byte Store ==
/// Size-bounded LRU store with timestamped entries.
///
/// The budget is enforced immediately after every insertion by evicting
/// from the least-recent end. A budget of zero disables eviction.
pub struct ByteStore {
    inner: Mutex<StoreInner>,
    /// Maximum bytes held; 0 = unbounded
    max_bytes: u64,
    on_evict: Option<EvictionHook>,
}

#[derive(Default)]
struct StoreInner {
    /// Lazily allocated on first write so unused namespaces cost nothing
    state: Option<LruState>,
}

struct LruState {
    slots: HashMap<String, usize>,
    list: RecencyList,
    used_bytes: u64,
}

impl LruState {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            list: RecencyList::new(),
            used_bytes: 0,
        }
    }
}

impl ByteStore {
    // == Constructors ==
    /// Creates a store with the given byte budget (0 disables eviction).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            max_bytes,
            on_evict: None,
        }
    }

    /// Creates a store that reports every eviction through `hook`.
    pub fn with_eviction_hook(max_bytes: u64, hook: EvictionHook) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            max_bytes,
            on_evict: Some(hook),
        }
    }

    // == Add ==
    /// Inserts or replaces the entry for `key` with a fresh timestamp,
    /// moves it to the most-recent end, then evicts from the oldest end
    /// while the byte budget is exceeded.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let state = inner.state.get_or_insert_with(LruState::new);

        if let Some(&slot) = state.slots.get(key) {
            let (old_weight, new_weight) = match state.list.entry_mut(slot) {
                Some(entry) => {
                    let old = entry.weight();
                    entry.repopulate(value);
                    (old, entry.weight())
                }
                None => (0, 0),
            };
            state.used_bytes = state.used_bytes + new_weight - old_weight;
            state.list.move_to_front(slot);
        } else {
            let entry = Entry::new(key, value);
            state.used_bytes += entry.weight();
            let slot = state.list.push_front(entry);
            state.slots.insert(key.to_string(), slot);
        }

        while self.max_bytes > 0 && state.used_bytes > self.max_bytes {
            let Some(evicted) = state.list.pop_back() else {
                break;
            };
            state.slots.remove(&evicted.key);
            state.used_bytes -= evicted.weight();
            if let Some(hook) = &self.on_evict {
                hook(&evicted.key, &evicted.value);
            }
        }
    }

    // == Get ==
    /// Returns the value for `key`, moving the entry to the most-recent
    /// end. The population timestamp is left untouched.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let state = inner.state.as_mut()?;
        let &slot = state.slots.get(key)?;
        state.list.move_to_front(slot);
        state.list.entry(slot).map(|e| e.value.clone())
    }

    // == Oldest Matching ==
    /// Walks from the least-recent end, collecting up to `limit` keys whose
    /// entries satisfy `pred`. Scanning never disturbs recency order.
    pub fn oldest_matching<F>(&self, limit: usize, pred: F) -> Vec<String>
    where
        F: Fn(&Entry) -> bool,
    {
        let inner = self.inner.lock();
        let Some(state) = inner.state.as_ref() else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        for entry in state.list.iter_oldest() {
            if keys.len() == limit {
                break;
            }
            if pred(entry) {
                keys.push(entry.key.clone());
            }
        }
        keys
    }

    // == All ==
    /// Every (key, value) pair, most recently updated first. Read-only;
    /// used for snapshotting.
    pub fn all(&self) -> Vec<(String, ByteView)> {
        let inner = self.inner.lock();
        let Some(state) = inner.state.as_ref() else {
            return Vec::new();
        };
        state
            .list
            .iter_recent()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect()
    }

    // == Length ==
    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .state
            .as_ref()
            .map_or(0, |s| s.list.len())
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Used Bytes ==
    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> u64 {
        self.inner
            .lock()
            .state
            .as_ref()
            .map_or(0, |s| s.used_bytes)
    }

    // == Max Bytes ==
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    // == Test Support ==
    /// Rewinds an entry's population timestamp so staleness paths can be
    /// exercised without sleeping.
    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, by: std::time::Duration) {
        let mut inner = self.inner.lock();
        if let Some(state) = inner.state.as_mut() {
            if let Some(&slot) = state.slots.get(key) {
                if let Some(entry) = state.list.entry_mut(slot) {
                    entry.updated_at = std::time::Instant::now() - by;
                }
            }
        }
    }
}

impl std::fmt::Debug for ByteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStore")
            .field("len", &self.len())
            .field("used_bytes", &self.used_bytes())
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
