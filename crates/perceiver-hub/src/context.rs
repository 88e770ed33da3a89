//! Per-page derived state shared by every signal source.

use std::sync::Arc;

use fieldsense_core_types::{Locale, PageId};
use perceiver_semantic::keywords::normalize;
use perceiver_semantic::{LocaleDetection, LocaleDetector};
use perceiver_structural::judges::{style_hints, visible};
use perceiver_structural::{
    PageDocument, PageSection, SectionSource, StructuredDataSource, StructuredHints,
};
use serde::Serialize;
use tracing::debug;

use crate::models::LocaleConfig;

const MIN_APPLICATION_CONTROLS: usize = 3;
const MIN_APPLICATION_KEYWORDS: usize = 2;
const TEXT_SAMPLE_CHARS: usize = 8_000;

const APPLY_URL_MARKERS: &[&str] = &[
    "apply",
    "application",
    "careers",
    "jobs",
    "greenhouse",
    "lever",
    "workday",
    "myworkdayjobs",
    "smartrecruiters",
    "ashby",
    "bewerbung",
    "candidature",
    "postular",
];

fn application_keywords(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::En => &[
            "resume", "cv", "cover letter", "apply", "application", "submit application",
            "work authorization", "notice period", "expected salary",
        ],
        Locale::De => &["lebenslauf", "bewerbung", "anschreiben", "bewerben", "gehaltsvorstellung", "kündigungsfrist"],
        Locale::Fr => &["cv", "candidature", "lettre de motivation", "postuler", "prétentions salariales"],
        Locale::Es => &["cv", "currículum", "postular", "postulación", "solicitud", "carta de presentación"],
        Locale::Pt => &["currículo", "cv", "candidatura", "candidatar", "carta de apresentação"],
        Locale::Hi => &["आवेदन", "बायोडाटा", "रिज्यूमे"],
    }
}

/// Everything derived once per document view.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub page: PageId,
    pub url: Option<String>,
    pub locale: LocaleDetection,
    /// Locales consulted by text matching, active locale first.
    pub match_locales: Vec<Locale>,
    pub structured: StructuredHints,
    pub sections: Vec<PageSection>,
    pub visible_controls: usize,
    pub application_like: bool,
}

impl PageContext {
    pub fn build(
        doc: &Arc<PageDocument>,
        detector: &LocaleDetector,
        structured: &StructuredDataSource,
        sections: &SectionSource,
        locale_config: &LocaleConfig,
    ) -> Self {
        let locale = detector.detect(doc);
        let match_locales = match_locales(&locale, locale_config.low_confidence_threshold);
        let structured = structured.extract(doc);
        let sections = sections.page_sections(doc);
        let visible_controls = doc
            .form_controls()
            .iter()
            .filter(|control| visible(control, &style_hints(control)).ok)
            .count();
        let application_like =
            application_like(doc, &structured, visible_controls, &match_locales);

        debug!(
            target: "fieldsense::context",
            page = %doc.id(),
            locale = %locale.locale,
            hints = structured.hints.len(),
            sections = sections.len(),
            visible_controls,
            application_like,
            "page context built"
        );
        Self {
            page: doc.id().clone(),
            url: doc.url().map(|url| url.to_string()),
            locale,
            match_locales,
            structured,
            sections,
            visible_controls,
            application_like,
        }
    }
}

fn match_locales(detection: &LocaleDetection, threshold: f64) -> Vec<Locale> {
    let mut locales = vec![detection.locale];
    if detection.confidence < threshold {
        locales.extend(Locale::ALL.iter().copied().filter(|l| *l != detection.locale));
    }
    locales
}

fn application_like(
    doc: &Arc<PageDocument>,
    structured: &StructuredHints,
    visible_controls: usize,
    locales: &[Locale],
) -> bool {
    if structured.job_posting.is_some() {
        return true;
    }
    if let Some(url) = doc.url() {
        let segments = format!("{}/{}", url.host_str().unwrap_or_default(), url.path()).to_lowercase();
        if segments
            .split(|c: char| !c.is_alphanumeric())
            .any(|segment| APPLY_URL_MARKERS.contains(&segment))
        {
            return true;
        }
    }
    if visible_controls < MIN_APPLICATION_CONTROLS {
        return false;
    }
    let text = format!(" {} ", normalize(&doc.text_sample(TEXT_SAMPLE_CHARS)));
    let hits = locales
        .iter()
        .flat_map(|locale| application_keywords(*locale).iter())
        .filter(|keyword| text.contains(&format!(" {} ", normalize(keyword))))
        .count();
    hits >= MIN_APPLICATION_KEYWORDS
}
