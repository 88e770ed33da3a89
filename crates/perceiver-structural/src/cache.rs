//! Per-element memoization with independent TTL per category.
//!
//! Entries are keyed by [`ElementKey`] and hold only a weak reference to the
//! owning document, so the cache never keeps a page alive. Entries whose
//! document has been dropped are treated as misses and reclaimed on access or
//! by [`ResultCache::sweep`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use fieldsense_core_types::Signal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dom::{Element, ElementKey, PageDocument};
use crate::judges::{JudgeReport, StyleHints};
use crate::label::ResolvedLabel;
use crate::metrics::{CacheCounters, CacheStats};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    Visibility,
    ComputedStyle,
    Label,
    Signals,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 4] = [
        CacheCategory::Visibility,
        CacheCategory::ComputedStyle,
        CacheCategory::Label,
        CacheCategory::Signals,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            CacheCategory::Visibility => 0,
            CacheCategory::ComputedStyle => 1,
            CacheCategory::Label => 2,
            CacheCategory::Signals => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::Visibility => "visibility",
            CacheCategory::ComputedStyle => "computed_style",
            CacheCategory::Label => "label",
            CacheCategory::Signals => "signals",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CachedValue {
    Visibility(JudgeReport),
    Style(StyleHints),
    Label(ResolvedLabel),
    Signals(Vec<Signal>),
}

impl CachedValue {
    pub fn category(&self) -> CacheCategory {
        match self {
            CachedValue::Visibility(_) => CacheCategory::Visibility,
            CachedValue::Style(_) => CacheCategory::ComputedStyle,
            CachedValue::Label(_) => CacheCategory::Label,
            CachedValue::Signals(_) => CacheCategory::Signals,
        }
    }
}

/// Time-to-live per category, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtls {
    pub visibility_ms: u64,
    pub computed_style_ms: u64,
    pub label_ms: u64,
    pub signals_ms: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            visibility_ms: 100,
            computed_style_ms: 100,
            label_ms: 5_000,
            signals_ms: 5_000,
        }
    }
}

impl CacheTtls {
    pub fn ttl(&self, category: CacheCategory) -> Duration {
        let ms = match category {
            CacheCategory::Visibility => self.visibility_ms,
            CacheCategory::ComputedStyle => self.computed_style_ms,
            CacheCategory::Label => self.label_ms,
            CacheCategory::Signals => self.signals_ms,
        };
        Duration::from_millis(ms)
    }
}

struct CacheEntry {
    document: Weak<PageDocument>,
    value: CachedValue,
    stored_at: Instant,
}

/// Writes between two automatic sweeps.
pub const SWEEP_INTERVAL: usize = 256;

pub struct ResultCache {
    entries: DashMap<(ElementKey, CacheCategory), CacheEntry>,
    ttls: CacheTtls,
    counters: CacheCounters,
    writes: AtomicUsize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheTtls::default())
    }
}

impl ResultCache {
    pub fn new(ttls: CacheTtls) -> Self {
        Self {
            entries: DashMap::new(),
            ttls,
            counters: CacheCounters::default(),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.ttls
    }

    pub fn get(&self, element: &Element, category: CacheCategory) -> Option<CachedValue> {
        let key = match element.checked_key() {
            Ok(key) => key,
            Err(err) => {
                trace!(target: "fieldsense::cache", error = %err, "cache read treated as miss");
                self.counters.miss(category);
                return None;
            }
        };
        let map_key = (key, category);
        let ttl = self.ttls.ttl(category);
        let mut stale = false;
        if let Some(entry) = self.entries.get(&map_key) {
            if entry.document.strong_count() > 0 && entry.stored_at.elapsed() <= ttl {
                self.counters.hit(category);
                return Some(entry.value.clone());
            }
            stale = true;
        }
        if stale && self.entries.remove(&map_key).is_some() {
            self.counters.evict(category);
        }
        self.counters.miss(category);
        None
    }

    /// Store `value` under its own category. Invalid elements are ignored.
    ///
    /// Every [`SWEEP_INTERVAL`] writes the cache sweeps itself, so entries of
    /// released documents are reclaimed without an explicit call.
    pub fn set(&self, element: &Element, value: CachedValue) {
        let key = match element.checked_key() {
            Ok(key) => key,
            Err(err) => {
                trace!(target: "fieldsense::cache", error = %err, "rejected cache write");
                return;
            }
        };
        let category = value.category();
        self.entries.insert(
            (key, category),
            CacheEntry {
                document: Arc::downgrade(element.document()),
                value,
                stored_at: Instant::now(),
            },
        );
        self.counters.set(category);

        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            let reclaimed = self.sweep();
            trace!(target: "fieldsense::cache", reclaimed, "periodic sweep");
        }
    }

    /// Drop one category for `element`, or all of its categories when `None`.
    pub fn invalidate(&self, element: &Element, category: Option<CacheCategory>) {
        let key = element.key();
        let categories: Vec<CacheCategory> = match category {
            Some(category) => vec![category],
            None => CacheCategory::ALL.to_vec(),
        };
        for category in categories {
            if self.entries.remove(&(key.clone(), category)).is_some() {
                self.counters.evict(category);
            }
        }
    }

    pub fn clear_all(&self) {
        self.entries.clear();
    }

    /// Reclaim entries that expired or whose document is gone.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, category), entry| {
            let live = entry.document.strong_count() > 0
                && entry.stored_at.elapsed() <= self.ttls.ttl(*category);
            if !live {
                self.counters.evict(*category);
            }
            live
        });
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }

    /// Read-through helper: return the cached value or compute and store it.
    pub fn get_or_insert_with<F>(
        &self,
        element: &Element,
        category: CacheCategory,
        compute: F,
    ) -> CachedValue
    where
        F: FnOnce() -> CachedValue,
    {
        if let Some(value) = self.get(element, category) {
            return value;
        }
        let value = compute();
        self.set(element, value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelSource;
    use fieldsense_core_types::{FieldType, SourceId};
    use std::thread::sleep;

    fn sample() -> (Arc<PageDocument>, Element) {
        let doc = PageDocument::parse(
            r#"<html><body><input id="a"><input id="b"></body></html>"#,
            None,
        )
        .unwrap();
        let el = doc.by_id("a").unwrap();
        (doc, el)
    }

    fn label(text: &str) -> CachedValue {
        CachedValue::Label(ResolvedLabel {
            text: text.into(),
            source: LabelSource::AriaLabel,
        })
    }

    #[test]
    fn hit_after_set_and_counters_track() {
        let cache = ResultCache::default();
        let (_doc, el) = sample();

        assert!(cache.get(&el, CacheCategory::Label).is_none());
        cache.set(&el, label("Email"));
        assert_eq!(cache.get(&el, CacheCategory::Label), Some(label("Email")));

        let stats = cache.stats();
        assert_eq!(stats.total.hits, 1);
        assert_eq!(stats.total.misses, 1);
        assert_eq!(stats.total.sets, 1);
    }

    #[test]
    fn categories_are_independent() {
        let cache = ResultCache::default();
        let (_doc, el) = sample();
        cache.set(&el, label("Email"));
        cache.set(
            &el,
            CachedValue::Signals(vec![Signal::proposing(
                FieldType::Email,
                0.8,
                SourceId::Attribute,
            )]),
        );

        cache.invalidate(&el, Some(CacheCategory::Label));
        assert!(cache.get(&el, CacheCategory::Label).is_none());
        assert!(cache.get(&el, CacheCategory::Signals).is_some());

        cache.invalidate(&el, None);
        assert!(cache.get(&el, CacheCategory::Signals).is_none());
    }

    #[test]
    fn fast_category_expires_before_slow_one() {
        let cache = ResultCache::new(CacheTtls {
            visibility_ms: 10,
            computed_style_ms: 10,
            label_ms: 5_000,
            signals_ms: 5_000,
        });
        let (_doc, el) = sample();
        cache.set(&el, CachedValue::Style(StyleHints::default()));
        cache.set(&el, label("Phone"));

        sleep(Duration::from_millis(30));

        assert!(cache.get(&el, CacheCategory::ComputedStyle).is_none());
        assert!(cache.get(&el, CacheCategory::Label).is_some());
    }

    #[test]
    fn entries_do_not_keep_documents_alive() {
        let cache = ResultCache::default();
        let (doc, el) = sample();
        let weak = Arc::downgrade(&doc);
        cache.set(&el, label("Email"));
        drop(el);
        drop(doc);

        assert!(weak.upgrade().is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sweep(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn released_pages_are_reclaimed_without_explicit_sweep() {
        let cache = ResultCache::default();
        for _ in 0..(SWEEP_INTERVAL * 4) {
            let (_doc, el) = sample();
            cache.set(&el, label("Email"));
        }
        assert!(cache.len() <= SWEEP_INTERVAL);
        assert!(cache.stats().total.evictions >= (SWEEP_INTERVAL * 3) as u64);
    }

    #[test]
    fn elements_of_different_pages_do_not_collide() {
        let cache = ResultCache::default();
        let (_doc_a, el_a) = sample();
        let (_doc_b, el_b) = sample();
        assert_eq!(el_a.node_id(), el_b.node_id());

        cache.set(&el_a, label("First"));
        assert!(cache.get(&el_b, CacheCategory::Label).is_none());
    }

    #[test]
    fn get_or_insert_computes_once() {
        let cache = ResultCache::default();
        let (_doc, el) = sample();
        let mut calls = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(&el, CacheCategory::Label, || {
                calls += 1;
                label("City")
            });
        }
        assert_eq!(calls, 1);
    }
}
