//! Field classification engine
use crate::{
    aggregator::SignalAggregator,
    context::PageContext,
    errors::*,
    models::*,
    sources::{default_slots, SignalSource, SourceSlot},
};
use async_trait::async_trait;
use fieldsense_core_types::{AggregationResult, PageId, Signal};
use parking_lot::RwLock;
use perceiver_semantic::{LocaleDetector, PatternRegistry};
use perceiver_structural::judges::{style_hints, visible};
use perceiver_structural::{
    clean_label, CacheCategory, CachedValue, Element, LabelExtractor, LabelSource, PageDocument,
    ResolvedLabel, ResultCache, SectionSource, StructuredDataSource,
};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

/// Field classification engine trait
#[async_trait]
pub trait FieldEngine: Send + Sync {
    /// Make `doc` the current page. Drops every derived state of the previous one.
    async fn load_page(&self, doc: Arc<PageDocument>);

    /// Classify one control, optionally with a caller-supplied caption
    async fn classify_field(
        &self,
        element: &Element,
        label_override: Option<&str>,
    ) -> Option<AggregationResult>;

    /// Classify many controls independently; undecided controls are left out
    async fn classify_fields(&self, elements: &[Element]) -> HashMap<Element, AggregationResult>;

    /// Whether the current page looks like a job application form
    async fn is_application_like_page(&self) -> bool;

    /// Derived context of the current page
    async fn page_context(&self) -> Result<Arc<PageContext>>;

    /// Forget cached element data, page contexts and locale detections
    fn clear_cache(&self);

    /// Whether at least one signal source is configured
    fn is_available(&self) -> bool;

    fn stats(&self) -> EngineStats;
}

/// Field classification engine implementation
pub struct FieldEngineImpl {
    config: EngineConfig,
    slots: Vec<SourceSlot>,
    aggregator: SignalAggregator,
    labels: LabelExtractor,
    detector: Arc<LocaleDetector>,
    cache: ResultCache,
    page: RwLock<Option<Arc<PageDocument>>>,
    contexts: RwLock<HashMap<PageId, (Weak<PageDocument>, Arc<PageContext>)>>,
    counters: EngineCounters,
}

impl FieldEngineImpl {
    /// Create an engine with the default source line-up over `registry`
    pub fn new(config: EngineConfig, registry: Arc<PatternRegistry>) -> Self {
        Self::with_slots(config, default_slots(Some(registry)))
    }

    /// Create an engine over the built-in pattern tables
    pub fn builtin(config: EngineConfig) -> Result<Self> {
        let registry = PatternRegistry::builtin()?;
        Ok(Self::new(config, Arc::new(registry)))
    }

    /// Create an engine without text matching; only structural sources run
    pub fn structural_only(config: EngineConfig) -> Self {
        Self::with_slots(config, default_slots(None))
    }

    /// Create an engine over an explicit source line-up
    pub fn with_slots(config: EngineConfig, slots: Vec<SourceSlot>) -> Self {
        Self {
            aggregator: SignalAggregator::new(config.aggregator.clone()),
            labels: LabelExtractor::new(),
            detector: Arc::new(LocaleDetector::new(config.locale.default_locale)),
            cache: ResultCache::new(config.cache.clone()),
            page: RwLock::new(None),
            contexts: RwLock::new(HashMap::new()),
            counters: EngineCounters::default(),
            slots,
            config,
        }
    }

    /// Add a source, replacing any slot with the same id
    pub fn with_source(mut self, source: Arc<dyn SignalSource>) -> Self {
        let id = source.id();
        let slot = SourceSlot::Present(source);
        match self.slots.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => *existing = slot,
            None => self.slots.push(slot),
        }
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn slots(&self) -> &[SourceSlot] {
        &self.slots
    }

    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(HubError::Unavailable(
                "every signal source is absent".to_string(),
            ))
        }
    }

    /// `page_context`, bounded by `limit`.
    ///
    /// The context is built on the blocking pool. When the limit expires the
    /// build is abandoned and nothing is stored.
    pub async fn page_context_within(&self, limit: Duration) -> Result<Arc<PageContext>> {
        let doc = self.current_page().ok_or(HubError::NoPage)?;
        if let Some(ctx) = self.cached_context(&doc) {
            return Ok(ctx);
        }

        let detector = Arc::clone(&self.detector);
        let locale = self.config.locale.clone();
        let task_doc = Arc::clone(&doc);
        let task = tokio::task::spawn_blocking(move || {
            PageContext::build(
                &task_doc,
                &detector,
                &StructuredDataSource::new(),
                &SectionSource::new(),
                &locale,
            )
        });
        let built = tokio::time::timeout(limit, task)
            .await
            .map_err(|_| HubError::Timeout(format!("page context after {}ms", limit.as_millis())))?
            .map_err(|err| HubError::Context(format!("context build aborted: {err}")))?;
        Ok(self.store_context(&doc, built))
    }

    /// Number of pages with a cached context.
    pub fn cached_contexts(&self) -> usize {
        self.contexts.read().len()
    }

    /// Per-control outcome for a batch, in input order. Honors `skip_hidden`.
    pub async fn describe_fields(&self, elements: &[Element]) -> Vec<ClassifiedField> {
        let mut fields = Vec::with_capacity(elements.len());
        for element in elements {
            if self.config.skip_hidden && !self.is_visible(element) {
                continue;
            }
            let label = self.label_for(element);
            let result = self.classify_field(element, None).await;
            fields.push(ClassifiedField {
                path: element_path(element),
                label: label.text,
                label_source: label.source,
                result,
            });
        }
        fields
    }

    /// Visibility judgement through the style and visibility cache categories
    pub fn is_visible(&self, element: &Element) -> bool {
        let report = self
            .cache
            .get_or_insert_with(element, CacheCategory::Visibility, || {
                let style = match self
                    .cache
                    .get_or_insert_with(element, CacheCategory::ComputedStyle, || {
                        CachedValue::Style(style_hints(element))
                    }) {
                    CachedValue::Style(style) => style,
                    _ => style_hints(element),
                };
                CachedValue::Visibility(visible(element, &style))
            });
        match report {
            CachedValue::Visibility(report) => report.ok,
            _ => visible(element, &style_hints(element)).ok,
        }
    }

    fn label_for(&self, element: &Element) -> ResolvedLabel {
        match self
            .cache
            .get_or_insert_with(element, CacheCategory::Label, || {
                CachedValue::Label(self.labels.resolve(element))
            }) {
            CachedValue::Label(label) => label,
            _ => self.labels.resolve(element),
        }
    }

    fn cached_context(&self, doc: &Arc<PageDocument>) -> Option<Arc<PageContext>> {
        self.contexts
            .read()
            .get(doc.id())
            .map(|(_, ctx)| Arc::clone(ctx))
    }

    /// Keep `built` unless another caller stored one first. Contexts of
    /// released documents are dropped here.
    fn store_context(&self, doc: &Arc<PageDocument>, built: PageContext) -> Arc<PageContext> {
        let mut contexts = self.contexts.write();
        contexts.retain(|_, (page, _)| page.strong_count() > 0);
        let (_, ctx) = contexts
            .entry(doc.id().clone())
            .or_insert_with(|| (Arc::downgrade(doc), Arc::new(built)));
        Arc::clone(ctx)
    }

    fn context_for(&self, doc: &Arc<PageDocument>) -> Arc<PageContext> {
        if let Some(ctx) = self.cached_context(doc) {
            return ctx;
        }
        let built = PageContext::build(
            doc,
            &self.detector,
            &StructuredDataSource::new(),
            &SectionSource::new(),
            &self.config.locale,
        );
        self.store_context(doc, built)
    }

    async fn gather(&self, element: &Element, label: &ResolvedLabel) -> Vec<Signal> {
        let ctx = self.context_for(element.document());
        let mut signals = Vec::new();
        for slot in &self.slots {
            let Some(source) = slot.source() else {
                continue;
            };
            match source.evaluate(element, label, &ctx).await {
                Ok(Some(signal)) => signals.push(signal),
                Ok(None) => {}
                Err(err) => {
                    self.counters.source_failed();
                    warn!(
                        target: "fieldsense::engine",
                        source = %source.id(),
                        error = %err,
                        "signal source failed, treating as abstention"
                    );
                }
            }
        }
        signals
    }

    fn current_page(&self) -> Option<Arc<PageDocument>> {
        self.page.read().clone()
    }
}

#[async_trait]
impl FieldEngine for FieldEngineImpl {
    async fn load_page(&self, doc: Arc<PageDocument>) {
        debug!(target: "fieldsense::engine", page = %doc.id(), url = ?doc.url().map(|u| u.as_str()), "page loaded");
        let previous = self.page.write().replace(doc);
        if previous.is_some() {
            self.contexts.write().clear();
            self.detector.clear(None);
            self.cache.clear_all();
        } else {
            let reclaimed = self.cache.sweep();
            debug!(target: "fieldsense::engine", reclaimed, "cache swept");
        }
    }

    async fn classify_field(
        &self,
        element: &Element,
        label_override: Option<&str>,
    ) -> Option<AggregationResult> {
        if !self.is_available() {
            return None;
        }

        let label = match label_override {
            Some(text) => ResolvedLabel {
                text: clean_label(text),
                source: LabelSource::Override,
            },
            None => self.label_for(element),
        };

        // Signals computed from an override are not cached.
        let signals = if label_override.is_some() {
            self.gather(element, &label).await
        } else {
            match self.cache.get(element, CacheCategory::Signals) {
                Some(CachedValue::Signals(signals)) => signals,
                _ => {
                    let signals = self.gather(element, &label).await;
                    self.cache.set(element, CachedValue::Signals(signals.clone()));
                    signals
                }
            }
        };

        let result = self.aggregator.classify(&signals);
        self.counters.classified(result.is_some());
        debug!(
            target: "fieldsense::engine",
            label = %label.text,
            signals = signals.len(),
            field_type = ?result.as_ref().map(|r| r.field_type),
            confidence = ?result.as_ref().map(|r| r.confidence),
            "field evaluated"
        );
        result
    }

    async fn classify_fields(&self, elements: &[Element]) -> HashMap<Element, AggregationResult> {
        let mut results = HashMap::with_capacity(elements.len());
        for element in elements {
            if self.config.skip_hidden && !self.is_visible(element) {
                continue;
            }
            if let Some(result) = self.classify_field(element, None).await {
                results.insert(element.clone(), result);
            }
        }
        results
    }

    async fn is_application_like_page(&self) -> bool {
        match self.page_context().await {
            Ok(ctx) => ctx.application_like,
            Err(_) => false,
        }
    }

    async fn page_context(&self) -> Result<Arc<PageContext>> {
        let doc = self.current_page().ok_or(HubError::NoPage)?;
        Ok(self.context_for(&doc))
    }

    fn clear_cache(&self) {
        self.cache.clear_all();
        self.contexts.write().clear();
        self.detector.clear(None);
        debug!(target: "fieldsense::engine", "engine caches cleared");
    }

    fn is_available(&self) -> bool {
        self.slots.iter().any(SourceSlot::is_present)
    }

    fn stats(&self) -> EngineStats {
        self.counters.snapshot(self.cache.stats())
    }
}

/// Short CSS-like path for reports: nearest id, else tag chain with name.
pub fn element_path(element: &Element) -> String {
    fn step(el: &Element) -> String {
        match el.attr_trimmed("id") {
            Some(id) => format!("{}#{}", el.tag(), id),
            None => match el.attr_trimmed("name") {
                Some(name) => format!("{}[name=\"{}\"]", el.tag(), name),
                None => el.tag().to_string(),
            },
        }
    }

    let mut parts = vec![step(element)];
    if element.attr_trimmed("id").is_none() {
        for ancestor in element.ancestors().take(3) {
            let part = step(&ancestor);
            let anchored = ancestor.attr_trimmed("id").is_some();
            if matches!(ancestor.tag(), "html" | "body") {
                break;
            }
            parts.push(part);
            if anchored {
                break;
            }
        }
    }
    parts.reverse();
    parts.join(" > ")
}
