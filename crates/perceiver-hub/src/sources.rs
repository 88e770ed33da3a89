//! Signal sources as an explicit capability.
//!
//! Every source answers `Ok(None)` for "no evidence" and `Err(_)` when
//! gathering evidence failed; the engine tells the two apart for telemetry.
//! A source that was never configured is represented by
//! [`SourceSlot::Absent`] rather than by probing at runtime.

use std::sync::Arc;

use async_trait::async_trait;
use fieldsense_core_types::{Signal, SourceId};
use perceiver_semantic::{AttributeSource, PatternRegistry, SemanticMatcher};
use perceiver_structural::{Element, ResolvedLabel, SectionSource, StructuredDataSource};

use crate::context::PageContext;
use crate::errors::{HubError, Result};

#[async_trait]
pub trait SignalSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Evaluate one element against its resolved label and the page context.
    async fn evaluate(
        &self,
        element: &Element,
        label: &ResolvedLabel,
        ctx: &PageContext,
    ) -> Result<Option<Signal>>;
}

/// A configured source, or the marker for one that is not available.
#[derive(Clone)]
pub enum SourceSlot {
    Present(Arc<dyn SignalSource>),
    Absent(SourceId),
}

impl SourceSlot {
    pub fn id(&self) -> SourceId {
        match self {
            SourceSlot::Present(source) => source.id(),
            SourceSlot::Absent(id) => *id,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SourceSlot::Present(_))
    }

    pub fn source(&self) -> Option<&Arc<dyn SignalSource>> {
        match self {
            SourceSlot::Present(source) => Some(source),
            SourceSlot::Absent(_) => None,
        }
    }
}

impl std::fmt::Debug for SourceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSlot::Present(source) => f.debug_tuple("Present").field(&source.id()).finish(),
            SourceSlot::Absent(id) => f.debug_tuple("Absent").field(id).finish(),
        }
    }
}

/// Schema hints filtered by the element's label.
#[derive(Debug, Default)]
pub struct StructuredSignalSource {
    inner: StructuredDataSource,
}

impl StructuredSignalSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalSource for StructuredSignalSource {
    fn id(&self) -> SourceId {
        SourceId::StructuredData
    }

    async fn evaluate(
        &self,
        _element: &Element,
        label: &ResolvedLabel,
        ctx: &PageContext,
    ) -> Result<Option<Signal>> {
        if label.is_empty() {
            return Ok(None);
        }
        Ok(self.inner.hint(&label.text, &ctx.structured))
    }
}

/// Heading region containing the element. Never proposes a field type.
#[derive(Debug, Default)]
pub struct SectionSignalSource {
    inner: SectionSource,
}

impl SectionSignalSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignalSource for SectionSignalSource {
    fn id(&self) -> SourceId {
        SourceId::SectionContext
    }

    async fn evaluate(
        &self,
        element: &Element,
        _label: &ResolvedLabel,
        ctx: &PageContext,
    ) -> Result<Option<Signal>> {
        Ok(self
            .inner
            .context_in(element, &ctx.sections)
            .map(|context| context.to_signal()))
    }
}

/// The three-tier label matcher. Emits either a semantic-mapping or a
/// keyword-pattern signal, so it reports the semantic id.
#[derive(Clone)]
pub struct PhraseSignalSource {
    matcher: SemanticMatcher,
}

impl PhraseSignalSource {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            matcher: SemanticMatcher::new(registry),
        }
    }

    pub fn matcher(&self) -> &SemanticMatcher {
        &self.matcher
    }
}

#[async_trait]
impl SignalSource for PhraseSignalSource {
    fn id(&self) -> SourceId {
        SourceId::SemanticMapping
    }

    async fn evaluate(
        &self,
        _element: &Element,
        label: &ResolvedLabel,
        ctx: &PageContext,
    ) -> Result<Option<Signal>> {
        if label.is_empty() {
            return Ok(None);
        }
        if ctx.match_locales.is_empty() {
            return Err(HubError::source_failed(self.id(), "no locale to match against"));
        }
        Ok(self.matcher.match_label(&label.text, &ctx.match_locales))
    }
}

pub struct AttributeSignalSource {
    inner: AttributeSource,
}

impl AttributeSignalSource {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            inner: AttributeSource::new(registry),
        }
    }
}

#[async_trait]
impl SignalSource for AttributeSignalSource {
    fn id(&self) -> SourceId {
        SourceId::Attribute
    }

    async fn evaluate(
        &self,
        element: &Element,
        _label: &ResolvedLabel,
        _ctx: &PageContext,
    ) -> Result<Option<Signal>> {
        Ok(self.inner.signal(element))
    }
}

/// Default source line-up. Without a registry the text sources are absent.
pub fn default_slots(registry: Option<Arc<PatternRegistry>>) -> Vec<SourceSlot> {
    let mut slots: Vec<SourceSlot> = vec![
        SourceSlot::Present(Arc::new(StructuredSignalSource::new())),
        SourceSlot::Present(Arc::new(SectionSignalSource::new())),
    ];
    match registry {
        Some(registry) => {
            slots.push(SourceSlot::Present(Arc::new(PhraseSignalSource::new(
                Arc::clone(&registry),
            ))));
            slots.push(SourceSlot::Present(Arc::new(AttributeSignalSource::new(registry))));
        }
        None => {
            slots.push(SourceSlot::Absent(SourceId::SemanticMapping));
            slots.push(SourceSlot::Absent(SourceId::Attribute));
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_without_registry_mark_text_sources_absent() {
        let slots = default_slots(None);
        let absent: Vec<SourceId> = slots
            .iter()
            .filter(|slot| !slot.is_present())
            .map(SourceSlot::id)
            .collect();
        assert_eq!(absent, vec![SourceId::SemanticMapping, SourceId::Attribute]);
    }

    #[test]
    fn full_slots_are_present() {
        let registry = Arc::new(PatternRegistry::builtin().unwrap());
        let slots = default_slots(Some(registry));
        assert_eq!(slots.len(), 4);
        assert!(slots.iter().all(SourceSlot::is_present));
    }
}
