#![forbid(unsafe_code)]

//! Fixed-capacity FIFO width cache.
//!
//! Width measurement is a per-frame hot path, but terminal lines are short
//! and repetitive, so a small cache with the dumbest possible eviction
//! policy wins: insertion-order FIFO, no recency tracking. The capacity is
//! a fixed constant; simplicity is the point, not hit rate.
//!
//! The cache is consulted only after the printable-ASCII fast path fails —
//! ASCII strings are measured by byte count, which is cheaper than hashing.
//!
//! Keys are 64-bit FxHash values rather than owned strings. Ownership is
//! explicit: embedders hold a `WidthCache` and pass it where measurement
//! happens, so tests can reset it deterministically.
//!
//! # Example
//! ```
//! use weft_text::WidthCache;
//!
//! let mut cache = WidthCache::default();
//! assert_eq!(cache.width("日本語"), 6);
//! assert_eq!(cache.width("日本語"), 6);
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use crate::width::{is_printable_ascii, str_width};

/// Fixed cache capacity: generous for typical sub-200-column frames.
pub const WIDTH_CACHE_CAPACITY: usize = 512;

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to measure.
    pub misses: u64,
    /// Current number of entries.
    pub len: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

/// FIFO-evicting width cache.
#[derive(Debug)]
pub struct WidthCache {
    entries: FxHashMap<u64, usize>,
    order: VecDeque<u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl WidthCache {
    /// Create a cache with an explicit capacity (clamped to at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Measure `text`, consulting the cache for non-ASCII input.
    pub fn width(&mut self, text: &str) -> usize {
        if is_printable_ascii(text.as_bytes()) {
            return text.len();
        }
        let key = hash_text(text);
        if let Some(&width) = self.entries.get(&key) {
            self.hits += 1;
            return width;
        }
        self.misses += 1;
        let width = str_width(text);
        self.insert(key, width);
        width
    }

    fn insert(&mut self, key: u64, width: usize) {
        if self.entries.len() >= self.capacity {
            // FIFO: drop the oldest insertion, whatever its popularity.
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        if self.entries.insert(key, width).is_none() {
            self.order.push_back(key);
        }
    }

    /// Whether `text` currently has a cached measurement.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(&hash_text(text))
    }

    /// Drop every entry. Counters are kept; see [`WidthCache::reset_stats`].
    pub fn clear(&mut self) {
        tracing::trace!(len = self.entries.len(), "width cache cleared");
        self.entries.clear();
        self.order.clear();
    }

    /// Zero the hit/miss counters.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Snapshot the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.capacity,
        }
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WidthCache {
    fn default() -> Self {
        Self::new(WIDTH_CACHE_CAPACITY)
    }
}

#[inline]
fn hash_text(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}
