//! Cache behaviour across labels, sections and page lifetimes.

use std::sync::Arc;
use std::time::Duration;

use fieldsense_core_types::SectionType;
use perceiver_structural::{
    CacheCategory, CacheTtls, CachedValue, LabelExtractor, PageDocument, ResultCache,
    SectionSource,
};

const FORM: &str = r#"<!doctype html>
<html lang="en"><body>
  <form>
    <h2>Personal details</h2>
    <label for="fn">First name *</label><input id="fn" name="first_name">
    <label for="em">Email</label><input id="em" type="email">
    <h2>Work experience</h2>
    <div class="form-group">
      <label class="field-label">Current employer</label>
      <input id="co">
    </div>
  </form>
</body></html>"#;

fn cached_label(cache: &ResultCache, doc: &Arc<PageDocument>, id: &str) -> String {
    let el = doc.by_id(id).expect("element present");
    let value = cache.get_or_insert_with(&el, CacheCategory::Label, || {
        CachedValue::Label(LabelExtractor::new().resolve(&el))
    });
    match value {
        CachedValue::Label(label) => label.text,
        other => panic!("unexpected cached value {other:?}"),
    }
}

#[test]
fn labels_are_served_from_cache_on_repeat() {
    let doc = PageDocument::parse(FORM, Some("https://jobs.example.com/apply")).unwrap();
    let cache = ResultCache::default();

    assert_eq!(cached_label(&cache, &doc, "fn"), "First name");
    assert_eq!(cached_label(&cache, &doc, "fn"), "First name");
    assert_eq!(cached_label(&cache, &doc, "co"), "Current employer");

    let stats = cache.stats();
    assert_eq!(stats.label.hits, 1);
    assert_eq!(stats.label.misses, 2);
    assert_eq!(stats.entries, 2);
}

#[test]
fn reparsed_page_does_not_reuse_stale_entries() {
    let cache = ResultCache::default();
    let first = PageDocument::parse(FORM, None).unwrap();
    cached_label(&cache, &first, "em");
    drop(first);

    let second = PageDocument::parse(&FORM.replace("Email", "Work email"), None).unwrap();
    assert_eq!(cached_label(&cache, &second, "em"), "Work email");
    assert_eq!(cache.sweep(), 1);
}

#[test]
fn clear_all_drops_every_category() {
    let doc = PageDocument::parse(FORM, None).unwrap();
    let cache = ResultCache::new(CacheTtls {
        label_ms: 60_000,
        ..CacheTtls::default()
    });
    cached_label(&cache, &doc, "fn");
    cached_label(&cache, &doc, "em");
    assert!(!cache.is_empty());

    cache.clear_all();
    assert!(cache.is_empty());
    assert_eq!(cache.ttls().ttl(CacheCategory::Label), Duration::from_secs(60));
}

#[test]
fn sections_follow_document_order() {
    let doc = PageDocument::parse(FORM, None).unwrap();
    let source = SectionSource::new();
    let sections = source.page_sections(&doc);
    assert_eq!(sections.len(), 2);

    let email = source.context_in(&doc.by_id("em").unwrap(), &sections).unwrap();
    assert_eq!(email.section_type, SectionType::Personal);
    let company = source.context_in(&doc.by_id("co").unwrap(), &sections).unwrap();
    assert_eq!(company.section_type, SectionType::Experience);
}
