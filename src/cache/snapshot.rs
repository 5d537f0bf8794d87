//! Snapshot Persistence Module
//!
//! Whole-store serialization to a single file, overwritten on every save.
//! Persistence is best-effort: failures are reported to the caller and
//! must never take the serving path down. Timestamps are not persisted;
//! restored entries start life fresh.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::cache::{ByteStore, ByteView};
use crate::error::{CacheError, Result};

// == Save ==
/// Serializes every key/value pair in `store` to `path`, replacing any
/// prior snapshot. Values are written as raw byte arrays so arbitrary
/// payloads survive the round trip. Returns the number of entries written.
pub fn save(store: &ByteStore, path: &Path) -> Result<usize> {
    let mut kvs = BTreeMap::new();
    for (key, value) in store.all() {
        kvs.insert(key, value.to_vec());
    }

    let data = serde_json::to_vec(&kvs).map_err(|e| CacheError::PersistenceFailed {
        op: "save",
        cause: e.to_string(),
    })?;
    fs::write(path, data).map_err(|e| CacheError::PersistenceFailed {
        op: "save",
        cause: e.to_string(),
    })?;
    Ok(kvs.len())
}

// == Load ==
/// Restores a snapshot into `store`. A missing file is a cold start, not
/// an error. Replay goes through the normal `add` path, so the byte budget
/// applies and ages reset to now. Returns the number of entries restored.
pub fn load(store: &ByteStore, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let data = fs::read(path).map_err(|e| CacheError::PersistenceFailed {
        op: "load",
        cause: e.to_string(),
    })?;
    let kvs: BTreeMap<String, Vec<u8>> =
        serde_json::from_slice(&data).map_err(|e| CacheError::PersistenceFailed {
            op: "load",
            cause: e.to_string(),
        })?;

    let restored = kvs.len();
    for (key, value) in kvs {
        store.add(&key, ByteView::new(value));
    }
    Ok(restored)
}
