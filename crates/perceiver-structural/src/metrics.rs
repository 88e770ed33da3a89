//! Cache telemetry.
//!
//! Lightweight per-instance counters so callers can surface hit rates without
//! an external metrics backend. Counters are owned by the cache, not global.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::CacheCategory;

#[derive(Default)]
struct CategoryCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    evictions: AtomicU64,
}

#[derive(Default)]
pub struct CacheCounters {
    per_category: [CategoryCounters; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheMetric {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total: CacheMetric,
    pub visibility: CacheMetric,
    pub computed_style: CacheMetric,
    pub label: CacheMetric,
    pub signals: CacheMetric,
}

impl CacheCounters {
    pub fn hit(&self, category: CacheCategory) {
        self.per_category[category.index()]
            .hits
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self, category: CacheCategory) {
        self.per_category[category.index()]
            .misses
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn set(&self, category: CacheCategory) {
        self.per_category[category.index()]
            .sets
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn evict(&self, category: CacheCategory) {
        self.per_category[category.index()]
            .evictions
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, entries: usize) -> CacheStats {
        let metric = |category: CacheCategory| {
            let counters = &self.per_category[category.index()];
            build_metric(
                counters.hits.load(Ordering::Relaxed),
                counters.misses.load(Ordering::Relaxed),
                counters.sets.load(Ordering::Relaxed),
                counters.evictions.load(Ordering::Relaxed),
            )
        };
        let visibility = metric(CacheCategory::Visibility);
        let computed_style = metric(CacheCategory::ComputedStyle);
        let label = metric(CacheCategory::Label);
        let signals = metric(CacheCategory::Signals);
        let all = [visibility, computed_style, label, signals];
        let total = build_metric(
            all.iter().map(|m| m.hits).sum(),
            all.iter().map(|m| m.misses).sum(),
            all.iter().map(|m| m.sets).sum(),
            all.iter().map(|m| m.evictions).sum(),
        );
        CacheStats {
            entries,
            total,
            visibility,
            computed_style,
            label,
            signals,
        }
    }
}

fn build_metric(hits: u64, misses: u64, sets: u64, evictions: u64) -> CacheMetric {
    let total = hits + misses;
    let hit_rate = if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    };
    CacheMetric {
        hits,
        misses,
        sets,
        evictions,
        hit_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_without_lookups() {
        let counters = CacheCounters::default();
        let stats = counters.snapshot(0);
        assert_eq!(stats.total.hit_rate, 0.0);
    }

    #[test]
    fn totals_sum_categories() {
        let counters = CacheCounters::default();
        counters.hit(CacheCategory::Label);
        counters.hit(CacheCategory::Visibility);
        counters.miss(CacheCategory::Label);
        counters.set(CacheCategory::Signals);

        let stats = counters.snapshot(3);
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.total.hits, 2);
        assert_eq!(stats.total.misses, 1);
        assert_eq!(stats.label.hit_rate, 0.5);
        assert_eq!(stats.signals.sets, 1);
    }
}
