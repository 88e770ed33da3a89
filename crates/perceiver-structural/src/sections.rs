//! Form section classification.
//!
//! Sections never propose a field type. They produce a plausibility set the
//! aggregator uses as a late boost.

use std::sync::Arc;

use fieldsense_core_types::{Evidence, FieldType, SectionType, Signal, SourceId};
use serde::Serialize;
use tracing::trace;

use crate::dom::{Element, NodeId, PageDocument};
use crate::label::clean_label;

pub const EXACT_SECTION_CONFIDENCE: f64 = 0.60;
pub const PARTIAL_SECTION_CONFIDENCE: f64 = 0.50;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "legend"];
const HEADING_CLASS_MARKERS: &[&str] = &["section-title", "section-header", "section-heading"];
const MAX_HEADING_CHARS: usize = 80;

fn section_phrases(section: SectionType) -> &'static [&'static str] {
    match section {
        SectionType::Personal => &[
            "personal information",
            "personal details",
            "personal info",
            "contact information",
            "contact details",
            "about you",
            "your details",
            "basic information",
            "persönliche angaben",
            "persönliche daten",
            "kontaktdaten",
            "informations personnelles",
            "coordonnées",
            "información personal",
            "datos personales",
            "informações pessoais",
            "dados pessoais",
            "व्यक्तिगत जानकारी",
        ],
        SectionType::Experience => &[
            "work experience",
            "employment history",
            "professional experience",
            "experience",
            "work history",
            "current employment",
            "berufserfahrung",
            "expérience professionnelle",
            "expérience",
            "experiencia laboral",
            "experiencia",
            "experiência profissional",
            "experiência",
            "कार्य अनुभव",
        ],
        SectionType::Education => &[
            "education",
            "academic background",
            "qualifications",
            "ausbildung",
            "bildung",
            "formation",
            "éducation",
            "educación",
            "formación",
            "educação",
            "formação",
            "शिक्षा",
        ],
        SectionType::Skills => &[
            "skills",
            "technical skills",
            "competencies",
            "kenntnisse",
            "fähigkeiten",
            "compétences",
            "habilidades",
            "competencias",
            "competências",
            "कौशल",
        ],
        SectionType::Compensation => &[
            "compensation",
            "salary expectations",
            "salary",
            "ctc",
            "remuneration",
            "gehaltsvorstellung",
            "gehalt",
            "rémunération",
            "salaire",
            "salario",
            "remuneración",
            "salário",
            "remuneração",
            "वेतन",
        ],
        SectionType::Diversity => &[
            "voluntary self-identification",
            "self-identification",
            "diversity",
            "equal employment opportunity",
            "eeo",
            "demographic",
            "vielfalt",
            "diversité",
            "diversidad",
            "diversidade",
        ],
        SectionType::Application => &[
            "application",
            "apply for this job",
            "submit your application",
            "additional information",
            "application questions",
            "resume",
            "cv",
            "bewerbung",
            "unterlagen",
            "candidature",
            "postular",
            "solicitud",
            "candidatura",
            "आवेदन",
        ],
    }
}

/// Field types plausible inside a section.
pub fn expected_field_types(section: SectionType) -> &'static [FieldType] {
    use FieldType::*;
    match section {
        SectionType::Personal => &[
            FirstName,
            MiddleName,
            LastName,
            FullName,
            PreferredName,
            Email,
            Phone,
            Address,
            AddressLine2,
            City,
            State,
            PostalCode,
            Country,
            DateOfBirth,
            Nationality,
            Linkedin,
            Github,
            Website,
            Pronouns,
        ],
        SectionType::Experience => &[
            CurrentCompany,
            CurrentTitle,
            YearsOfExperience,
            NoticePeriod,
            AvailableStartDate,
        ],
        SectionType::Education => &[School, Degree, FieldOfStudy, GraduationYear, Gpa],
        SectionType::Skills => &[Skills, Languages],
        SectionType::Compensation => &[
            ExpectedCompensation,
            CurrentCompensation,
            SalaryCurrency,
            NoticePeriod,
        ],
        SectionType::Diversity => &[Gender, Ethnicity, VeteranStatus, DisabilityStatus, Pronouns],
        SectionType::Application => &[
            Resume,
            CoverLetter,
            HowDidYouHear,
            WorkAuthorization,
            SponsorshipRequired,
            WillingToRelocate,
            AvailableStartDate,
        ],
    }
}

/// A classified heading and the region it opens.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageSection {
    pub section_type: SectionType,
    pub heading: String,
    #[serde(skip)]
    pub heading_node: NodeId,
    /// Next heading-like node, classified or not. The region is `[heading, end)`.
    #[serde(skip)]
    pub end: Option<NodeId>,
    pub confidence: f64,
}

/// Section context for one element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionContext {
    pub section_type: SectionType,
    pub heading: String,
    pub expected_field_types: Vec<FieldType>,
    pub confidence: f64,
}

impl SectionContext {
    pub fn to_signal(&self) -> Signal {
        Signal::new(
            None,
            self.confidence,
            SourceId::SectionContext,
            Evidence::Section {
                section: self.section_type,
                heading: self.heading.clone(),
                expected: self.expected_field_types.clone(),
            },
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct SectionSource;

impl SectionSource {
    pub fn new() -> Self {
        Self
    }

    /// Classify heading text. Exact phrase equality beats containment.
    pub fn classify_heading(&self, text: &str) -> Option<(SectionType, f64)> {
        let normalized = clean_label(text).to_lowercase();
        if normalized.is_empty() || normalized.chars().count() > MAX_HEADING_CHARS {
            return None;
        }
        for section in SectionType::ALL {
            if section_phrases(*section).iter().any(|p| *p == normalized) {
                return Some((*section, EXACT_SECTION_CONFIDENCE));
            }
        }
        for section in SectionType::ALL {
            if section_phrases(*section)
                .iter()
                .any(|p| contains_phrase(&normalized, p))
            {
                return Some((*section, PARTIAL_SECTION_CONFIDENCE));
            }
        }
        None
    }

    /// Every heading-like node of the page in document order, classified where possible.
    pub fn page_sections(&self, doc: &Arc<PageDocument>) -> Vec<PageSection> {
        let headings: Vec<Element> = doc.elements().filter(is_heading_like).collect();
        let mut sections = Vec::new();
        for (idx, heading) in headings.iter().enumerate() {
            let text = heading.text();
            let end = headings.get(idx + 1).map(Element::node_id);
            let classified = self.classify_heading(&text);
            trace!(target: "fieldsense::sections", heading = %text, ?classified, "heading scanned");
            if let Some((section_type, confidence)) = classified {
                sections.push(PageSection {
                    section_type,
                    heading: clean_label(&text),
                    heading_node: heading.node_id(),
                    end,
                    confidence,
                });
            }
        }
        sections
    }

    /// Context of the region that contains `element`, using precomputed sections.
    pub fn context_in(&self, element: &Element, sections: &[PageSection]) -> Option<SectionContext> {
        let position = element.node_id();
        sections
            .iter()
            .rev()
            .find(|section| {
                section.heading_node < position && section.end.map_or(true, |end| position < end)
            })
            .map(|section| SectionContext {
                section_type: section.section_type,
                heading: section.heading.clone(),
                expected_field_types: expected_field_types(section.section_type).to_vec(),
                confidence: section.confidence,
            })
    }

    /// `contextFor(element)`: computes the page sections on the fly.
    pub fn context_for(&self, element: &Element) -> Option<SectionContext> {
        let sections = self.page_sections(element.document());
        self.context_in(element, &sections)
    }
}

pub fn is_heading_like(element: &Element) -> bool {
    if HEADING_TAGS.contains(&element.tag()) {
        return true;
    }
    if element
        .attr("role")
        .map_or(false, |role| role.eq_ignore_ascii_case("heading"))
    {
        return true;
    }
    element.attr("class").map_or(false, |class| {
        let lower = class.to_ascii_lowercase();
        HEADING_CLASS_MARKERS.iter().any(|marker| lower.contains(marker))
    })
}

/// Word-bounded containment so "cv" does not match inside "cvv".
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><form>
        <h2>Personal Information</h2>
        <input id="first">
        <h2>Education</h2>
        <input id="school">
        <h3>Something unrelated</h3>
        <input id="other">
        <fieldset><legend>Your salary expectations</legend><input id="salary"></fieldset>
    </form></body></html>"#;

    #[test]
    fn exact_and_partial_heading_confidence() {
        let source = SectionSource::new();
        assert_eq!(
            source.classify_heading("Education"),
            Some((SectionType::Education, EXACT_SECTION_CONFIDENCE))
        );
        assert_eq!(
            source.classify_heading("Your salary expectations"),
            Some((SectionType::Compensation, PARTIAL_SECTION_CONFIDENCE))
        );
        assert_eq!(source.classify_heading("Frequently asked"), None);
    }

    #[test]
    fn element_maps_to_nearest_preceding_section() {
        let doc = PageDocument::parse(PAGE, None).unwrap();
        let source = SectionSource::new();

        let first = source.context_for(&doc.by_id("first").unwrap()).unwrap();
        assert_eq!(first.section_type, SectionType::Personal);
        assert!(first.expected_field_types.contains(&FieldType::FirstName));

        let school = source.context_for(&doc.by_id("school").unwrap()).unwrap();
        assert_eq!(school.section_type, SectionType::Education);

        let salary = source.context_for(&doc.by_id("salary").unwrap()).unwrap();
        assert_eq!(salary.section_type, SectionType::Compensation);
    }

    #[test]
    fn unclassified_heading_closes_region() {
        let doc = PageDocument::parse(PAGE, None).unwrap();
        let source = SectionSource::new();
        assert!(source.context_for(&doc.by_id("other").unwrap()).is_none());
    }

    #[test]
    fn section_signal_never_proposes_a_field() {
        let context = SectionContext {
            section_type: SectionType::Skills,
            heading: "Skills".into(),
            expected_field_types: expected_field_types(SectionType::Skills).to_vec(),
            confidence: EXACT_SECTION_CONFIDENCE,
        };
        let signal = context.to_signal();
        assert!(signal.field_type.is_none());
        assert_eq!(signal.source, SourceId::SectionContext);
        assert_eq!(signal.expected_field_types(), &[FieldType::Skills, FieldType::Languages]);
    }

    #[test]
    fn phrase_containment_respects_word_boundaries() {
        assert!(contains_phrase("upload your cv here", "cv"));
        assert!(!contains_phrase("cvv code", "cv"));
    }
}
