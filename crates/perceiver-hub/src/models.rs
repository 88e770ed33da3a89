//! Data models for the field engine
use std::sync::atomic::{AtomicU64, Ordering};

use fieldsense_core_types::{AggregationResult, Locale};
use perceiver_structural::{CacheStats, CacheTtls, LabelSource};
use serde::{Deserialize, Serialize};

use crate::aggregator::AggregatorConfig;

/// Locale handling options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locale used when no page signal is found
    pub default_locale: Locale,

    /// Below this detection confidence the matcher consults every locale
    pub low_confidence_threshold: f64,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::En,
            low_confidence_threshold: 0.6,
        }
    }
}

/// Engine construction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scoring parameters
    pub aggregator: AggregatorConfig,

    /// Result cache time-to-live per category
    pub cache: CacheTtls,

    /// Locale detection options
    pub locale: LocaleConfig,

    /// Skip controls judged not visible during batch classification
    pub skip_hidden: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            cache: CacheTtls::default(),
            locale: LocaleConfig::default(),
            skip_hidden: true,
        }
    }
}

impl EngineConfig {
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }
}

/// Outcome for one control of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedField {
    /// Short CSS-like path of the control
    pub path: String,

    /// Resolved caption
    pub label: String,

    /// Strategy that produced the caption
    pub label_source: LabelSource,

    /// Decision, when one was reached
    pub result: Option<AggregationResult>,
}

/// Engine counters, snapshot form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub classifications: u64,
    pub decisions: u64,
    pub rejections: u64,
    pub source_failures: u64,
    pub cache: CacheStats,
}

#[derive(Default)]
pub(crate) struct EngineCounters {
    classifications: AtomicU64,
    decisions: AtomicU64,
    rejections: AtomicU64,
    source_failures: AtomicU64,
}

impl EngineCounters {
    pub fn classified(&self, decided: bool) {
        self.classifications.fetch_add(1, Ordering::Relaxed);
        if decided {
            self.decisions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn source_failed(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, cache: CacheStats) -> EngineStats {
        EngineStats {
            classifications: self.classifications.load(Ordering::Relaxed),
            decisions: self.decisions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            source_failures: self.source_failures.load(Ordering::Relaxed),
            cache,
        }
    }
}
