//! Signals from the element's own attributes.

use std::sync::Arc;

use fieldsense_core_types::{Evidence, FieldType, Locale, MatchTier, Signal, SourceId};
use perceiver_structural::Element;
use tracing::trace;

use crate::keywords::identifier_tokens;
use crate::patterns::{PatternRegistry, RuleMatcher};

pub const AUTOCOMPLETE_CONFIDENCE: f64 = 0.85;
pub const INPUT_TYPE_CONFIDENCE: f64 = 0.80;
pub const RESUME_UPLOAD_CONFIDENCE: f64 = 0.75;
pub const IDENTIFIER_CONFIDENCE: f64 = 0.70;
pub const URL_TYPE_CONFIDENCE: f64 = 0.60;

const IDENTIFIER_ATTRS: &[&str] = &["name", "id", "data-field", "data-qa", "data-automation-id"];
const RESUME_TOKENS: &[&str] = &["resume", "cv", "curriculum", "lebenslauf", "currículo", "currículum"];

/// HTML autofill detail tokens.
fn autocomplete_field(token: &str) -> Option<FieldType> {
    use FieldType::*;
    let field = match token {
        "given-name" => FirstName,
        "additional-name" => MiddleName,
        "family-name" => LastName,
        "name" => FullName,
        "nickname" => PreferredName,
        "email" => Email,
        "tel" | "tel-national" | "tel-local" => Phone,
        "street-address" | "address-line1" => Address,
        "address-line2" | "address-line3" => AddressLine2,
        "address-level2" => City,
        "address-level1" => State,
        "postal-code" => PostalCode,
        "country" | "country-name" => Country,
        "bday" => DateOfBirth,
        "sex" => Gender,
        "url" => Website,
        "organization" => CurrentCompany,
        "organization-title" => CurrentTitle,
        "language" => Languages,
        _ => return None,
    };
    Some(field)
}

pub struct AttributeSource {
    registry: Arc<PatternRegistry>,
}

impl AttributeSource {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    /// Strongest attribute evidence for `element`, if any.
    pub fn signal(&self, element: &Element) -> Option<Signal> {
        let signal = self
            .autocomplete(element)
            .or_else(|| self.input_type(element))
            .or_else(|| self.identifiers(element));
        if let Some(signal) = &signal {
            trace!(
                target: "fieldsense::attributes",
                field_type = ?signal.field_type,
                confidence = signal.confidence,
                "attribute signal"
            );
        }
        signal
    }

    fn autocomplete(&self, element: &Element) -> Option<Signal> {
        let raw = element.attr_trimmed("autocomplete")?;
        let lowered = raw.to_ascii_lowercase();
        // Section and contact-type prefixes ("section-x shipping tel") precede the field token.
        let field = lowered.split_whitespace().rev().find_map(autocomplete_field)?;
        Some(attribute_signal(field, AUTOCOMPLETE_CONFIDENCE, "autocomplete", raw))
    }

    fn input_type(&self, element: &Element) -> Option<Signal> {
        if element.tag() != "input" {
            return None;
        }
        let ty = element.input_type()?;
        match ty.as_str() {
            "email" => Some(attribute_signal(FieldType::Email, INPUT_TYPE_CONFIDENCE, "type", &ty)),
            "tel" => Some(attribute_signal(FieldType::Phone, INPUT_TYPE_CONFIDENCE, "type", &ty)),
            "url" => Some(attribute_signal(FieldType::Website, URL_TYPE_CONFIDENCE, "type", &ty)),
            "file" => {
                let marks = identifier_text(element);
                let is_resume = marks
                    .split(' ')
                    .any(|token| RESUME_TOKENS.contains(&token));
                is_resume.then(|| {
                    attribute_signal(FieldType::Resume, RESUME_UPLOAD_CONFIDENCE, "type", &ty)
                })
            }
            _ => None,
        }
    }

    fn identifiers(&self, element: &Element) -> Option<Signal> {
        for attr in IDENTIFIER_ATTRS {
            let Some(raw) = element.attr_trimmed(attr) else {
                continue;
            };
            let text = identifier_tokens(raw).join(" ");
            if text.is_empty() {
                continue;
            }
            // Longest keyword match wins; catalog order breaks ties.
            let mut hit: Option<(FieldType, usize)> = None;
            for field_type in self.registry.field_types() {
                let span = self
                    .registry
                    .tier_rules(*field_type, Locale::ALL, MatchTier::Keyword)
                    .filter_map(|rule| match &rule.matcher {
                        RuleMatcher::Keyword(regex) => {
                            regex.find_iter(&text).map(|m| m.as_str().chars().count()).max()
                        }
                        RuleMatcher::Phrase(_) => None,
                    })
                    .max();
                if let Some(span) = span {
                    if hit.map_or(true, |(_, best)| span > best) {
                        hit = Some((*field_type, span));
                    }
                }
            }
            if let Some((field_type, _)) = hit {
                return Some(attribute_signal(field_type, IDENTIFIER_CONFIDENCE, attr, raw));
            }
        }
        None
    }
}

fn identifier_text(element: &Element) -> String {
    IDENTIFIER_ATTRS
        .iter()
        .chain(["accept", "aria-label"].iter())
        .filter_map(|attr| element.attr(attr))
        .flat_map(identifier_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

fn attribute_signal(field_type: FieldType, confidence: f64, attribute: &str, value: &str) -> Signal {
    Signal::proposing(field_type, confidence, SourceId::Attribute).with_evidence(Evidence::Attribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use perceiver_structural::PageDocument;

    fn source() -> AttributeSource {
        AttributeSource::new(Arc::new(PatternRegistry::builtin().unwrap()))
    }

    fn signal_for(html: &str) -> Option<Signal> {
        let doc = PageDocument::parse(html, None).unwrap();
        let el = doc.by_id("x").unwrap();
        source().signal(&el)
    }

    #[test]
    fn autocomplete_token_wins() {
        let signal = signal_for(r#"<input id="x" name="q1" autocomplete="section-a shipping postal-code">"#)
            .unwrap();
        assert_eq!(signal.field_type, Some(FieldType::PostalCode));
        assert_eq!(signal.confidence, AUTOCOMPLETE_CONFIDENCE);
    }

    #[test]
    fn input_types() {
        assert_eq!(
            signal_for(r#"<input id="x" type="email">"#).unwrap().field_type,
            Some(FieldType::Email)
        );
        let url = signal_for(r#"<input id="x" type="url">"#).unwrap();
        assert_eq!(url.field_type, Some(FieldType::Website));
        assert_eq!(url.confidence, URL_TYPE_CONFIDENCE);
    }

    #[test]
    fn resume_upload_needs_resume_token() {
        let signal = signal_for(r#"<input id="x" type="file" name="resumeUpload">"#).unwrap();
        assert_eq!(signal.field_type, Some(FieldType::Resume));
        assert!(signal_for(r#"<input id="x" type="file" name="photo">"#).is_none());
    }

    #[test]
    fn name_tokens_use_keyword_rules() {
        let signal = signal_for(r#"<input id="x" name="applicant[lastName]">"#).unwrap();
        assert_eq!(signal.field_type, Some(FieldType::LastName));
        assert_eq!(signal.confidence, IDENTIFIER_CONFIDENCE);

        let signal = signal_for(r#"<input id="x" name="plz">"#).unwrap();
        assert_eq!(signal.field_type, Some(FieldType::PostalCode));
    }

    #[test]
    fn most_specific_identifier_match_wins() {
        let signal = signal_for(r#"<input id="x" name="street_address_line_2">"#).unwrap();
        assert_eq!(signal.field_type, Some(FieldType::AddressLine2));

        let signal = signal_for(r#"<input id="x" name="currentJobTitle">"#).unwrap();
        assert_eq!(signal.field_type, Some(FieldType::CurrentTitle));
    }

    #[test]
    fn opaque_identifiers_abstain() {
        assert!(signal_for(r#"<input id="x" name="field_1234">"#).is_none());
    }
}
