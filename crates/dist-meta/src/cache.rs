//! # Memoization
//!
//! Parsing the same entry point text, version string or wheel filename over
//! and over is common when scanning large environments. [`Memo`] is a small,
//! bounded LRU map guarded by a mutex so a single process-wide instance can be
//! shared between threads.
//!
//! A [`Memo`] created with caching disabled simply calls through to the
//! supplied function every time.


use std::convert::Infallible;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

//================================================================================================
// Statics
//================================================================================================

/// The number of results retained by each process-wide cache.
pub const CAPACITY: NonZeroUsize = match NonZeroUsize::new(128) {
    Some(n) => n,
    None => unreachable!(),
};

//================================================================================================
// Types
//================================================================================================

/// A bounded, thread-safe memoization table.
#[derive(Debug)]
pub struct Memo<K: Hash + Eq, V> {
    inner: Option<Mutex<LruCache<K, V>>>,
}

//================================================================================================
// Impls
//================================================================================================

impl<K: Hash + Eq, V: Clone> Memo<K, V> {
    /// Creates a table holding up to [`CAPACITY`] results, or a pass-through
    /// table when `enabled` is false.
    pub fn new(enabled: bool) -> Self {
        Self::with_capacity(CAPACITY, enabled)
    }

    /// Creates a table holding up to `capacity` results.
    pub fn with_capacity(capacity: NonZeroUsize, enabled: bool) -> Self {
        Memo {
            inner: enabled.then(|| Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Whether results are retained at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// The number of results currently retained.
    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |cache| cache.lock().len())
    }

    /// Returns `true` if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every retained result.
    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.lock().clear();
        }
    }

    /// Returns the retained result for `key`, computing and retaining it with
    /// `f` on a miss.
    pub fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> V {
        match self.get_or_try_insert_with(key, || Ok::<V, Infallible>(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`Memo::get_or_insert_with`] for fallible computations. Errors are
    /// returned to the caller and never retained.
    ///
    /// The lock is not held while `f` runs.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        f: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let Some(cache) = &self.inner else {
            return f();
        };

        if let Some(hit) = cache.lock().get(&key) {
            tracing::trace!("memo hit");
            return Ok(hit.clone());
        }

        let value = f()?;
        cache.lock().put(key, value.clone());
        Ok(value)
    }
}
