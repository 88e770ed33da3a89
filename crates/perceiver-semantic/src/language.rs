//! Locale detection from declared language, metadata, host naming and content.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use fieldsense_core_types::{Locale, PageId};
use parking_lot::RwLock;
use perceiver_structural::PageDocument;
use serde::Serialize;
use tracing::{debug, trace};
use whatlang::{detect, Lang};

use crate::errors::{Result, SemanticError};
use crate::keywords::normalize;

pub const DECLARED_CONFIDENCE: f64 = 1.0;
pub const META_CONFIDENCE: f64 = 0.9;
pub const HOST_CONFIDENCE: f64 = 0.7;
pub const SUBDOMAIN_CONFIDENCE: f64 = 0.55;
pub const CONTENT_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_CONFIDENCE: f64 = 0.3;

const MIN_CONTENT_HITS: usize = 2;
const CONTENT_SAMPLE_CHARS: usize = 5_000;
const META_KEYS: &[&str] = &[
    "content-language",
    "og:locale",
    "language",
    "dc.language",
    "inlanguage",
];

/// Which signal produced the detected locale.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    DeclaredLang,
    MetaTag,
    HostConvention,
    ContentKeywords,
    Default,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocaleDetection {
    pub locale: Locale,
    pub confidence: f64,
    pub source: DetectionSource,
}

/// Words that are strong evidence of a language on a data-entry page.
fn content_keywords(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::En => &[
            "first name", "last name", "email", "phone", "resume", "cover letter", "apply",
            "submit", "address", "experience", "salary", "please",
        ],
        Locale::De => &[
            "vorname", "nachname", "bewerbung", "lebenslauf", "anschreiben", "telefon",
            "absenden", "berufserfahrung", "gehaltsvorstellung", "bitte", "und", "ihre",
        ],
        Locale::Fr => &[
            "prénom", "nom de famille", "candidature", "lettre de motivation", "téléphone",
            "envoyer", "expérience", "salaire", "veuillez", "votre", "postuler",
        ],
        Locale::Es => &[
            "nombre", "apellido", "apellidos", "correo electrónico", "teléfono", "enviar",
            "experiencia", "salario", "postular", "currículum", "hoja de vida", "su",
        ],
        Locale::Pt => &[
            "nome", "sobrenome", "telefone", "currículo", "candidatura", "enviar", "experiência",
            "salário", "endereço", "você", "seu",
        ],
        Locale::Hi => &[
            "नाम", "ईमेल", "फ़ोन", "फोन", "पता", "आवेदन", "अनुभव", "वेतन", "कृपया", "और",
        ],
    }
}

/// Subdomain labels that read as locale codes but usually are not.
const AMBIGUOUS_SUBDOMAINS: &[&str] = &["hi"];

/// Host suffix and subdomain conventions.
///
/// Country-code TLDs give `HOST_CONFIDENCE`. A locale-coded first label
/// (`fr.jobs.example.com`) gives `SUBDOMAIN_CONFIDENCE`, which stays below the
/// default low-confidence threshold so other locales are still consulted.
fn host_locale(host: &str) -> Option<(Locale, f64)> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    let tld = *labels.last()?;
    let by_tld = match tld {
        "de" | "at" => Some(Locale::De),
        "fr" => Some(Locale::Fr),
        "es" | "mx" | "ar" | "cl" | "pe" => Some(Locale::Es),
        "br" | "pt" => Some(Locale::Pt),
        "uk" | "au" | "nz" | "ie" => Some(Locale::En),
        _ => None,
    };
    if let Some(locale) = by_tld {
        return Some((locale, HOST_CONFIDENCE));
    }

    let first = *labels.first()?;
    if labels.len() < 3 || first.len() != 2 || AMBIGUOUS_SUBDOMAINS.contains(&first) {
        return None;
    }
    Locale::from_tag(first).map(|locale| (locale, SUBDOMAIN_CONFIDENCE))
}

/// Map a whatlang language onto a supported locale.
fn lang_to_locale(lang: Lang) -> Option<Locale> {
    match lang {
        Lang::Eng => Some(Locale::En),
        Lang::Deu => Some(Locale::De),
        Lang::Fra => Some(Locale::Fr),
        Lang::Spa => Some(Locale::Es),
        Lang::Por => Some(Locale::Pt),
        Lang::Hin => Some(Locale::Hi),
        _ => None,
    }
}

/// Detects the active locale of a page and memoizes it per page identity.
///
/// Memo entries do not keep documents alive; entries of released documents
/// are dropped on the next insert.
pub struct LocaleDetector {
    default_locale: Locale,
    memo: RwLock<HashMap<PageId, (Weak<PageDocument>, LocaleDetection)>>,
}

impl LocaleDetector {
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// `detect(page)`: memoized until [`LocaleDetector::clear`].
    pub fn detect(&self, doc: &Arc<PageDocument>) -> LocaleDetection {
        if let Some((_, hit)) = self.memo.read().get(doc.id()) {
            return hit.clone();
        }
        let detection = self.detect_uncached(doc);
        let mut memo = self.memo.write();
        memo.retain(|_, (page, _)| page.strong_count() > 0);
        memo.entry(doc.id().clone())
            .or_insert_with(|| (Arc::downgrade(doc), detection))
            .1
            .clone()
    }

    /// Number of pages with a memoized detection.
    pub fn memoized(&self) -> usize {
        self.memo.read().len()
    }

    /// Forget one page, or every page when `None`.
    pub fn clear(&self, page: Option<&PageId>) {
        let mut memo = self.memo.write();
        match page {
            Some(page) => {
                memo.remove(page);
            }
            None => memo.clear(),
        }
    }

    pub fn detect_uncached(&self, doc: &Arc<PageDocument>) -> LocaleDetection {
        type Stage = fn(&LocaleDetector, &Arc<PageDocument>) -> Option<LocaleDetection>;
        let stages: [(f64, Stage); 4] = [
            (DECLARED_CONFIDENCE, |_, doc| declared(doc)),
            (META_CONFIDENCE, |_, doc| meta(doc)),
            (HOST_CONFIDENCE, |_, doc| host(doc)),
            (CONTENT_CONFIDENCE, |detector, doc| detector.content(doc)),
        ];

        let mut best: Option<LocaleDetection> = None;
        for (ceiling, stage) in stages {
            if best.as_ref().map_or(false, |b| b.confidence >= ceiling) {
                break;
            }
            if let Some(found) = stage(self, doc) {
                trace!(target: "fieldsense::locale", ?found, "locale stage produced a result");
                if best.as_ref().map_or(true, |b| found.confidence > b.confidence) {
                    best = Some(found);
                }
            }
        }

        let detection = best.unwrap_or(LocaleDetection {
            locale: self.default_locale,
            confidence: DEFAULT_CONFIDENCE,
            source: DetectionSource::Default,
        });
        debug!(
            target: "fieldsense::locale",
            page = %doc.id(),
            locale = %detection.locale,
            confidence = detection.confidence,
            source = ?detection.source,
            "locale detected"
        );
        detection
    }

    fn content(&self, doc: &Arc<PageDocument>) -> Option<LocaleDetection> {
        let sample = doc.text_sample(CONTENT_SAMPLE_CHARS);
        let normalized = format!(" {} ", normalize(&sample));
        let mut counts: Vec<(Locale, usize)> = Locale::ALL
            .iter()
            .map(|locale| {
                let hits = content_keywords(*locale)
                    .iter()
                    .filter(|kw| normalized.contains(&format!(" {} ", normalize(kw))))
                    .count();
                (*locale, hits)
            })
            .filter(|(_, hits)| *hits >= MIN_CONTENT_HITS)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let top = counts.first()?.1;
        let leaders: Vec<Locale> = counts
            .iter()
            .filter(|(_, hits)| *hits == top)
            .map(|(locale, _)| *locale)
            .collect();

        let locale = if leaders.len() == 1 {
            leaders[0]
        } else {
            match detect_text(&sample) {
                Ok((locale, _)) if leaders.contains(&locale) => locale,
                _ => leaders[0],
            }
        };
        Some(LocaleDetection {
            locale,
            confidence: CONTENT_CONFIDENCE,
            source: DetectionSource::ContentKeywords,
        })
    }
}

impl Default for LocaleDetector {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

fn declared(doc: &Arc<PageDocument>) -> Option<LocaleDetection> {
    let locale = Locale::from_tag(&doc.declared_lang()?)?;
    Some(LocaleDetection {
        locale,
        confidence: DECLARED_CONFIDENCE,
        source: DetectionSource::DeclaredLang,
    })
}

fn meta(doc: &Arc<PageDocument>) -> Option<LocaleDetection> {
    let locale = META_KEYS
        .iter()
        .filter_map(|key| doc.meta_content(key))
        .find_map(|content| {
            content
                .split(',')
                .find_map(|tag| Locale::from_tag(tag.trim()))
        })?;
    Some(LocaleDetection {
        locale,
        confidence: META_CONFIDENCE,
        source: DetectionSource::MetaTag,
    })
}

fn host(doc: &Arc<PageDocument>) -> Option<LocaleDetection> {
    let (locale, confidence) = host_locale(&doc.host()?)?;
    Some(LocaleDetection {
        locale,
        confidence,
        source: DetectionSource::HostConvention,
    })
}

/// Statistical detection over free text, restricted to supported locales.
pub fn detect_text(text: &str) -> Result<(Locale, f64)> {
    if text.trim().is_empty() {
        return Err(SemanticError::InvalidInput(
            "cannot detect language from empty text".to_string(),
        ));
    }
    let info = detect(text).ok_or_else(|| {
        SemanticError::LanguageDetectionFailed("no language recognised".to_string())
    })?;
    let locale = lang_to_locale(info.lang()).ok_or_else(|| {
        SemanticError::UnsupportedLocale(info.lang().code().to_string())
    })?;
    Ok((locale, info.confidence()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str, url: Option<&str>) -> Arc<PageDocument> {
        PageDocument::parse(html, url).unwrap()
    }

    #[test]
    fn declared_lang_wins() {
        let doc = page(
            r#"<html lang="de-AT"><head><meta http-equiv="content-language" content="fr"></head></html>"#,
            Some("https://jobs.example.es/"),
        );
        let detection = LocaleDetector::default().detect(&doc);
        assert_eq!(detection.locale, Locale::De);
        assert_eq!(detection.confidence, DECLARED_CONFIDENCE);
        assert_eq!(detection.source, DetectionSource::DeclaredLang);
    }

    #[test]
    fn meta_used_when_lang_missing_or_unsupported() {
        let doc = page(
            r#"<html lang="ja"><head><meta property="og:locale" content="pt_BR"></head></html>"#,
            None,
        );
        let detection = LocaleDetector::default().detect(&doc);
        assert_eq!(detection.locale, Locale::Pt);
        assert_eq!(detection.source, DetectionSource::MetaTag);
    }

    #[test]
    fn host_convention_then_content() {
        let doc = page("<html><body><p>hello</p></body></html>", Some("https://karriere.firma.de/jobs"));
        let detection = LocaleDetector::default().detect(&doc);
        assert_eq!(detection.locale, Locale::De);
        assert_eq!(detection.confidence, HOST_CONFIDENCE);

        let doc = page("<html><body></body></html>", Some("https://fr.jobs.example.com/"));
        let detection = LocaleDetector::default().detect(&doc);
        assert_eq!(detection.locale, Locale::Fr);
        assert_eq!(detection.confidence, SUBDOMAIN_CONFIDENCE);
    }

    #[test]
    fn generic_hosts_are_not_locale_evidence() {
        assert_eq!(host_locale("jobs.lever.co"), None);
        assert_eq!(host_locale("hi.company.com"), None);
        assert_eq!(host_locale("de.com"), None);
        assert_eq!(host_locale("careers.example.us"), None);
        assert_eq!(host_locale("jobs.example.mx"), Some((Locale::Es, HOST_CONFIDENCE)));

        let doc = page(
            r#"<html><body><label for="f">First name</label><input id="f"></body></html>"#,
            Some("https://jobs.lever.co/acme/123/apply"),
        );
        let detection = LocaleDetector::default().detect(&doc);
        assert_eq!(detection.locale, Locale::En);
        assert_ne!(detection.source, DetectionSource::HostConvention);
    }

    #[test]
    fn memo_drops_released_pages() {
        let detector = LocaleDetector::default();
        for _ in 0..20 {
            let doc = page(r#"<html lang="fr"></html>"#, None);
            assert_eq!(detector.detect(&doc).locale, Locale::Fr);
        }
        assert!(detector.memoized() <= 1);

        let kept = page(r#"<html lang="de"></html>"#, None);
        detector.detect(&kept);
        let other = page(r#"<html lang="es"></html>"#, None);
        detector.detect(&other);
        assert_eq!(detector.memoized(), 2);
    }

    #[test]
    fn content_needs_two_hits() {
        let doc = page(
            "<html><body><label>Vorname</label><label>Nachname</label><label>Lebenslauf</label></body></html>",
            Some("https://apply.example.com/"),
        );
        let detection = LocaleDetector::default().detect(&doc);
        assert_eq!(detection.locale, Locale::De);
        assert_eq!(detection.source, DetectionSource::ContentKeywords);
        assert_eq!(detection.confidence, CONTENT_CONFIDENCE);

        let doc = page("<html><body><label>Vorname</label></body></html>", None);
        let detection = LocaleDetector::new(Locale::Es).detect(&doc);
        assert_eq!(detection.locale, Locale::Es);
        assert_eq!(detection.source, DetectionSource::Default);
    }

    #[test]
    fn detection_is_memoized_until_cleared() {
        let detector = LocaleDetector::default();
        let doc = page(r#"<html lang="hi"></html>"#, None);
        let first = detector.detect(&doc);
        let second = detector.detect(&doc);
        assert_eq!(first, second);
        detector.clear(Some(doc.id()));
        assert_eq!(detector.detect(&doc), first);
        detector.clear(None);
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(detect_text("   ").is_err());
    }

    #[test]
    fn free_text_detection() {
        let (locale, confidence) =
            detect_text("This is a reasonably long sentence written in plain English.").unwrap();
        assert_eq!(locale, Locale::En);
        assert!(confidence > 0.3);
    }
}
