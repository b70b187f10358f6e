//! Explicit memoization for recomputed views.
//!
//! Engine functions are idempotent, so a result can be reused for as long as
//! the inputs serialize to the same bytes. The cache is owned by the caller;
//! nothing here is shared between threads.
//!
//! serde_json writes every non-finite float as `null`, so inputs that differ
//! only in NaN or infinite fields share a key. The engine rejects such values
//! wherever it reads them, which makes those inputs equivalent.

use serde::Serialize;

use crate::errors::EngineError;

/// Cache key of any serializable input: its full JSON encoding.
pub fn memo_key<T: Serialize + ?Sized>(input: &T) -> Result<Vec<u8>, EngineError> {
    Ok(serde_json::to_vec(input)?)
}

/// Single-slot cache keyed on the serialized input.
#[derive(Debug)]
pub struct Memo<V> {
    slot: Option<(Vec<u8>, V)>,
    hits: u64,
    misses: u64,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self {
            slot: None,
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> Memo<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute<K, F>(&mut self, key: &K, compute: F) -> Result<&V, EngineError>
    where
        K: Serialize + ?Sized,
        F: FnOnce() -> V,
    {
        let key = memo_key(key)?;
        let hit = matches!(&self.slot, Some((stored, _)) if *stored == key);
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
            tracing::trace!(key_len = key.len(), "memo miss");
            self.slot = None;
        }
        let (_, value) = self.slot.get_or_insert_with(|| (key, compute()));
        Ok(&*value)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
