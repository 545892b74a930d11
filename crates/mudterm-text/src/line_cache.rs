#![forbid(unsafe_code)]

//! LRU cache of wrapped row counts.
//!
//! Scrolling walks display rows line by line, so the row count of the same
//! logical line is asked for over and over while the view moves. The cache
//! keys on a 64-bit FxHash of the line's characters, its hidden ranges and the
//! wrap options.
//!
//! # Example
//! ```
//! use mudterm_text::{StyledText, WrapCache, WrapOptions};
//!
//! let mut cache = WrapCache::new(64);
//! let line = StyledText::plain("Captain Mal Reynolds");
//! assert_eq!(cache.rendered_line_count(&line, WrapOptions::new(8)), 3);
//! assert_eq!(cache.rendered_line_count(&line, WrapOptions::new(8)), 3);
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;

use crate::styled::StyledText;
use crate::wrap::{WrapOptions, rendered_line_count};

/// Default cache capacity.
pub const DEFAULT_WRAP_CACHE_CAPACITY: usize = 1024;

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Current number of entries.
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate between 0.0 and 1.0.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of [`rendered_line_count`] results.
#[derive(Debug)]
pub struct WrapCache {
    cache: LruCache<u64, usize>,
    hits: u64,
    misses: u64,
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN)
}

impl WrapCache {
    /// A zero capacity is treated as 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(non_zero(capacity)),
            hits: 0,
            misses: 0,
        }
    }

    /// Row count of `text` under `options`, computed on a miss.
    pub fn rendered_line_count(&mut self, text: &StyledText, options: WrapOptions) -> usize {
        let key = hash_line(text, options);
        if let Some(&count) = self.cache.get(&key) {
            self.hits += 1;
            return count;
        }
        self.misses += 1;
        let count = rendered_line_count(text, options);
        self.cache.put(key, count);
        count
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Change the capacity, evicting least recently used entries if needed.
    pub fn resize(&mut self, capacity: usize) {
        self.cache.resize(non_zero(capacity));
    }
}

impl Default for WrapCache {
    fn default() -> Self {
        Self::new(DEFAULT_WRAP_CACHE_CAPACITY)
    }
}

fn hash_line(text: &StyledText, options: WrapOptions) -> u64 {
    let mut hasher = FxHasher::default();
    text.chars().hash(&mut hasher);
    for run in text.runs() {
        if run.flavor.is_hidden() {
            run.end.hash(&mut hasher);
        }
        run.flavor.is_hidden().hash(&mut hasher);
    }
    options.hash(&mut hasher);
    hasher.finish()
}
