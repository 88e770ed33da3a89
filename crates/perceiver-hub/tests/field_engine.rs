use std::sync::Arc;

use async_trait::async_trait;
use fieldsense_core_types::{Evidence, FieldType, Locale, Signal, SourceId};
use perceiver_hub::{
    EngineConfig, FieldEngine, FieldEngineImpl, HubError, PageContext, SignalSource,
};
use perceiver_semantic::DetectionSource;
use perceiver_structural::{Element, PageDocument, ResolvedLabel};

const EXPECTED_CTC: &str = include_str!("fixtures/expected_ctc.html");
const JOB_POSTING: &str = include_str!("fixtures/job_posting.html");
const UNLABELED: &str = include_str!("fixtures/unlabeled.html");
const NOTICE_SECTION: &str = include_str!("fixtures/notice_section.html");
const APPLICATION_FORM: &str = include_str!("fixtures/application_form.html");
const BEWERBUNG: &str = include_str!("fixtures/bewerbung.html");

/// Source with a canned answer, used to inject competing or failing evidence.
struct CannedSource {
    id: SourceId,
    answer: std::result::Result<Option<Signal>, String>,
}

#[async_trait]
impl SignalSource for CannedSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn evaluate(
        &self,
        _element: &Element,
        _label: &ResolvedLabel,
        _ctx: &PageContext,
    ) -> perceiver_hub::Result<Option<Signal>> {
        self.answer
            .clone()
            .map_err(|message| HubError::source_failed(self.id, message))
    }
}

async fn loaded(engine: &FieldEngineImpl, html: &str, url: Option<&str>) -> Arc<PageDocument> {
    let doc = PageDocument::parse(html, url).unwrap();
    engine.load_page(Arc::clone(&doc)).await;
    doc
}

fn engine() -> FieldEngineImpl {
    FieldEngineImpl::builtin(EngineConfig::default()).unwrap()
}

#[tokio::test]
async fn expected_ctc_resolves_through_phrase_table() {
    let engine = engine();
    let doc = loaded(&engine, EXPECTED_CTC, None).await;
    let control = doc.by_id("q1").unwrap();

    let result = engine.classify_field(&control, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::ExpectedCompensation);
    assert!((0.75..=0.85).contains(&result.confidence));
    assert_eq!(result.sources(), vec![SourceId::SemanticMapping]);
    assert_eq!(result.field_type.as_str(), "expectedCompensation");
}

#[tokio::test]
async fn job_posting_schema_outranks_competing_keyword() {
    let competing = Arc::new(CannedSource {
        id: SourceId::KeywordPattern,
        answer: Ok(Some(Signal::proposing(
            FieldType::JobTitle,
            0.65,
            SourceId::KeywordPattern,
        ))),
    });
    let engine = FieldEngineImpl::structural_only(EngineConfig::default()).with_source(competing);
    let doc = loaded(&engine, JOB_POSTING, Some("https://acme.example/careers/42")).await;
    let control = doc.by_id("company").unwrap();

    let result = engine.classify_field(&control, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::CurrentCompany);
    assert_eq!(result.sources(), vec![SourceId::StructuredData]);
    let schema = &result.contributing_signals[0];
    assert!((0.80..=0.90).contains(&schema.confidence));
    assert!(matches!(&schema.evidence, Evidence::Schema { property, .. } if property.contains("hiringOrganization")));
    assert!(result.confidence <= 0.95);

    let ctx = engine.page_context().await.unwrap();
    assert_eq!(ctx.structured.blocks, 2);
    assert_eq!(ctx.structured.rejected_blocks, 1);
    let posting = ctx.structured.job_posting.as_ref().unwrap();
    assert_eq!(posting.company.as_deref(), Some("Acme Robotics"));
    assert_eq!(posting.location.as_deref(), Some("Berlin"));
}

#[tokio::test]
async fn job_posting_with_all_sources_agrees_on_company() {
    let engine = engine();
    let doc = loaded(&engine, JOB_POSTING, None).await;
    let control = doc.by_id("company").unwrap();

    let result = engine.classify_field(&control, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::CurrentCompany);
    assert_eq!(result.sources()[0], SourceId::StructuredData);
    assert!(result.sources().contains(&SourceId::SemanticMapping));
    assert_eq!(result.confidence, 0.95);
}

#[tokio::test]
async fn unlabeled_control_without_context_is_undecided() {
    let engine = engine();
    let doc = loaded(&engine, UNLABELED, None).await;
    let control = doc.by_id("mystery").unwrap();

    assert!(engine.classify_field(&control, None).await.is_none());
    let stats = engine.stats();
    assert_eq!(stats.classifications, 1);
    assert_eq!(stats.rejections, 1);
}

#[tokio::test]
async fn weak_keyword_needs_section_context() {
    let engine = engine();
    let doc = loaded(&engine, NOTICE_SECTION, None).await;
    let control = doc.by_id("q17").unwrap();

    let result = engine.classify_field(&control, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::NoticePeriod);
    assert!(result.confidence >= 0.60);
    assert_eq!(
        result.sources(),
        vec![SourceId::KeywordPattern, SourceId::SectionContext]
    );
    let keyword = &result.contributing_signals[0];
    assert!(keyword.confidence < 0.60);

    // Without the heading the same caption stays below the threshold.
    let bare = NOTICE_SECTION.replace("<h2>Your current employment</h2>", "");
    let engine = FieldEngineImpl::builtin(EngineConfig::default()).unwrap();
    let doc = loaded(&engine, &bare, None).await;
    let control = doc.by_id("q17").unwrap();
    assert!(engine.classify_field(&control, None).await.is_none());
}

#[tokio::test]
async fn batch_classification_skips_hidden_controls() {
    let engine = engine();
    let doc = loaded(&engine, APPLICATION_FORM, Some("https://example.com/form")).await;
    let controls = doc.form_controls();

    let results = engine.classify_fields(&controls).await;
    let by_id = |id: &str| {
        let el = doc.by_id(id).unwrap();
        results.get(&el).map(|result| result.field_type)
    };
    assert_eq!(by_id("fn"), Some(FieldType::FirstName));
    assert_eq!(by_id("ln"), Some(FieldType::LastName));
    assert_eq!(by_id("em"), Some(FieldType::Email));
    assert_eq!(by_id("ph"), Some(FieldType::Phone));
    assert_eq!(by_id("sal"), Some(FieldType::ExpectedCompensation));
    assert_eq!(by_id("np"), Some(FieldType::NoticePeriod));
    assert_eq!(by_id("cv"), Some(FieldType::Resume));
    assert_eq!(by_id("cl"), Some(FieldType::CoverLetter));
    assert_eq!(by_id("honeypot"), None);

    assert!(engine.is_application_like_page().await);

    let described = engine.describe_fields(&controls).await;
    assert_eq!(described.len(), 8);
    assert_eq!(described[0].label, "First name");
}

#[tokio::test]
async fn hidden_controls_are_kept_when_not_skipping() {
    let engine =
        FieldEngineImpl::builtin(EngineConfig::default().with_skip_hidden(false)).unwrap();
    let doc = loaded(&engine, APPLICATION_FORM, None).await;
    let controls = doc.form_controls();

    let described = engine.describe_fields(&controls).await;
    assert_eq!(described.len(), controls.len());
    assert!(described.iter().any(|field| field.path.contains("honeypot")));
}

#[tokio::test]
async fn german_page_uses_german_tables() {
    let engine = engine();
    let doc = loaded(&engine, BEWERBUNG, None).await;

    let ctx = engine.page_context().await.unwrap();
    assert_eq!(ctx.locale.locale, Locale::De);
    assert_eq!(ctx.locale.source, DetectionSource::MetaTag);
    assert_eq!(ctx.match_locales, vec![Locale::De]);

    let first = doc.by_id("vn").unwrap();
    let salary = doc.by_id("gv").unwrap();
    assert_eq!(
        engine.classify_field(&first, None).await.unwrap().field_type,
        FieldType::FirstName
    );
    let result = engine.classify_field(&salary, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::ExpectedCompensation);
    assert!(result.sources().contains(&SourceId::SectionContext));
}

#[tokio::test]
async fn generic_co_host_keeps_english_tables() {
    let engine = engine();
    let doc = loaded(
        &engine,
        r#"<html><body><label for="f">First name</label><input id="f"></body></html>"#,
        Some("https://jobs.lever.co/acme/123/apply"),
    )
    .await;

    let ctx = engine.page_context().await.unwrap();
    assert_eq!(ctx.locale.locale, Locale::En);
    assert_ne!(ctx.locale.source, DetectionSource::HostConvention);
    assert_eq!(ctx.match_locales.first(), Some(&Locale::En));

    let first = doc.by_id("f").unwrap();
    let result = engine.classify_field(&first, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::FirstName);
}

#[tokio::test]
async fn failing_source_counts_and_abstains() {
    let failing = Arc::new(CannedSource {
        id: SourceId::StructuredData,
        answer: Err("schema cache unavailable".to_string()),
    });
    let engine = engine().with_source(failing);
    let doc = loaded(&engine, EXPECTED_CTC, None).await;
    let control = doc.by_id("q1").unwrap();

    let result = engine.classify_field(&control, None).await.unwrap();
    assert_eq!(result.field_type, FieldType::ExpectedCompensation);
    assert_eq!(engine.stats().source_failures, 1);
}

#[tokio::test]
async fn navigation_and_clear_rebuild_context() {
    let engine = engine();
    loaded(&engine, EXPECTED_CTC, None).await;
    let first = engine.page_context().await.unwrap();
    let again = engine.page_context().await.unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    engine.clear_cache();
    let rebuilt = engine.page_context().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(rebuilt.locale, first.locale);

    loaded(&engine, BEWERBUNG, None).await;
    let next = engine.page_context().await.unwrap();
    assert_ne!(next.page, first.page);
    assert_eq!(next.locale.locale, Locale::De);
}

#[tokio::test]
async fn page_context_serializes_for_diagnostics() {
    let engine = engine();
    loaded(&engine, JOB_POSTING, None).await;
    let ctx = engine.page_context().await.unwrap();
    let json = serde_json::to_value(&*ctx).unwrap();
    assert_eq!(json["locale"]["locale"], "en");
    assert_eq!(json["application_like"], true);
    assert!(json["structured"]["hints"].as_array().unwrap().len() >= 2);
}
