//! Embedded schema.org metadata as field hints.
//!
//! JSON-LD blocks are parsed once per page. Each present schema property that
//! maps to a field type becomes a hint; an element only receives a signal when
//! its label overlaps the semantic context of a present hint.

use std::sync::Arc;

use fieldsense_core_types::{Evidence, FieldType, SemanticContext, Signal, SourceId};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use crate::dom::PageDocument;
use crate::errors::{Result, StructuralError};

const MAX_DEPTH: usize = 8;

struct SchemaMapping {
    owner_types: &'static [&'static str],
    path: &'static [&'static str],
    field_type: FieldType,
    confidence: f64,
    context: SemanticContext,
    label_keywords: &'static [&'static str],
}

const COMPANY_WORDS: &[&str] = &[
    "company", "employer", "organization", "organisation", "firma", "unternehmen", "arbeitgeber",
    "entreprise", "société", "empresa", "कंपनी",
];
const JOB_WORDS: &[&str] = &[
    "position", "job title", "job", "role", "title", "stelle", "poste", "puesto", "cargo", "पद",
];
const SALARY_WORDS: &[&str] = &[
    "salary", "compensation", "ctc", "pay", "gehalt", "salaire", "rémunération", "salario",
    "salário", "वेतन",
];
const CURRENCY_WORDS: &[&str] = &["currency", "währung", "devise", "moneda", "moeda"];
const CITY_WORDS: &[&str] = &["city", "town", "stadt", "ort", "ville", "ciudad", "cidade", "शहर"];
const STATE_WORDS: &[&str] = &["state", "region", "province", "bundesland", "région", "estado", "provincia", "राज्य"];
const POSTAL_WORDS: &[&str] = &["zip", "postal", "postcode", "plz", "postleitzahl", "code postal", "código postal", "cep", "पिन"];
const COUNTRY_WORDS: &[&str] = &["country", "land", "pays", "país", "देश"];
const STREET_WORDS: &[&str] = &["address", "street", "straße", "strasse", "adresse", "dirección", "endereço", "पता"];
const EMAIL_WORDS: &[&str] = &["email", "e-mail", "courriel", "correo", "ईमेल"];
const PHONE_WORDS: &[&str] = &["phone", "telephone", "mobile", "telefon", "téléphone", "teléfono", "telefone", "फ़ोन", "फोन"];
const GIVEN_WORDS: &[&str] = &["first name", "given name", "forename", "vorname", "prénom", "nombre", "nome", "पहला नाम"];
const FAMILY_WORDS: &[&str] = &["last name", "surname", "family name", "nachname", "nom de famille", "apellido", "sobrenome", "उपनाम"];

const SCHEMA_TABLE: &[SchemaMapping] = &[
    SchemaMapping {
        owner_types: &["JobPosting"],
        path: &["hiringOrganization", "name"],
        field_type: FieldType::CurrentCompany,
        confidence: 0.90,
        context: SemanticContext::Company,
        label_keywords: COMPANY_WORDS,
    },
    SchemaMapping {
        owner_types: &["Organization", "Corporation", "LocalBusiness"],
        path: &["name"],
        field_type: FieldType::CurrentCompany,
        confidence: 0.85,
        context: SemanticContext::Company,
        label_keywords: COMPANY_WORDS,
    },
    SchemaMapping {
        owner_types: &["JobPosting"],
        path: &["title"],
        field_type: FieldType::JobTitle,
        confidence: 0.85,
        context: SemanticContext::Job,
        label_keywords: JOB_WORDS,
    },
    SchemaMapping {
        owner_types: &["JobPosting"],
        path: &["baseSalary"],
        field_type: FieldType::ExpectedCompensation,
        confidence: 0.85,
        context: SemanticContext::Salary,
        label_keywords: SALARY_WORDS,
    },
    SchemaMapping {
        owner_types: &["JobPosting", "Occupation"],
        path: &["estimatedSalary"],
        field_type: FieldType::ExpectedCompensation,
        confidence: 0.80,
        context: SemanticContext::Salary,
        label_keywords: SALARY_WORDS,
    },
    SchemaMapping {
        owner_types: &["JobPosting"],
        path: &["baseSalary", "currency"],
        field_type: FieldType::SalaryCurrency,
        confidence: 0.80,
        context: SemanticContext::Salary,
        label_keywords: CURRENCY_WORDS,
    },
    SchemaMapping {
        owner_types: &["JobPosting"],
        path: &["salaryCurrency"],
        field_type: FieldType::SalaryCurrency,
        confidence: 0.80,
        context: SemanticContext::Salary,
        label_keywords: CURRENCY_WORDS,
    },
    SchemaMapping {
        owner_types: &["PostalAddress"],
        path: &["addressLocality"],
        field_type: FieldType::City,
        confidence: 0.80,
        context: SemanticContext::Address,
        label_keywords: CITY_WORDS,
    },
    SchemaMapping {
        owner_types: &["PostalAddress"],
        path: &["addressRegion"],
        field_type: FieldType::State,
        confidence: 0.80,
        context: SemanticContext::Address,
        label_keywords: STATE_WORDS,
    },
    SchemaMapping {
        owner_types: &["PostalAddress"],
        path: &["postalCode"],
        field_type: FieldType::PostalCode,
        confidence: 0.80,
        context: SemanticContext::Address,
        label_keywords: POSTAL_WORDS,
    },
    SchemaMapping {
        owner_types: &["PostalAddress"],
        path: &["addressCountry"],
        field_type: FieldType::Country,
        confidence: 0.80,
        context: SemanticContext::Address,
        label_keywords: COUNTRY_WORDS,
    },
    SchemaMapping {
        owner_types: &["PostalAddress"],
        path: &["streetAddress"],
        field_type: FieldType::Address,
        confidence: 0.80,
        context: SemanticContext::Address,
        label_keywords: STREET_WORDS,
    },
    SchemaMapping {
        owner_types: &["Organization", "ContactPoint", "Person", "Corporation"],
        path: &["email"],
        field_type: FieldType::Email,
        confidence: 0.85,
        context: SemanticContext::Contact,
        label_keywords: EMAIL_WORDS,
    },
    SchemaMapping {
        owner_types: &["Organization", "ContactPoint", "Person", "Corporation"],
        path: &["telephone"],
        field_type: FieldType::Phone,
        confidence: 0.85,
        context: SemanticContext::Contact,
        label_keywords: PHONE_WORDS,
    },
    SchemaMapping {
        owner_types: &["Person"],
        path: &["givenName"],
        field_type: FieldType::FirstName,
        confidence: 0.85,
        context: SemanticContext::Personal,
        label_keywords: GIVEN_WORDS,
    },
    SchemaMapping {
        owner_types: &["Person"],
        path: &["familyName"],
        field_type: FieldType::LastName,
        confidence: 0.85,
        context: SemanticContext::Personal,
        label_keywords: FAMILY_WORDS,
    },
];

fn context_keywords(context: SemanticContext) -> &'static [&'static str] {
    match context {
        SemanticContext::Company => COMPANY_WORDS,
        SemanticContext::Contact => &[
            "email", "e-mail", "phone", "telephone", "mobile", "contact", "courriel", "telefon",
            "téléphone", "teléfono", "telefone", "ईमेल", "फ़ोन",
        ],
        SemanticContext::Address => &[
            "address", "street", "city", "town", "state", "province", "zip", "postal", "postcode",
            "country", "adresse", "straße", "stadt", "plz", "land", "ville", "pays", "dirección",
            "ciudad", "país", "endereço", "cidade", "पता", "शहर",
        ],
        SemanticContext::Salary => &[
            "salary", "compensation", "ctc", "pay", "currency", "gehalt", "salaire",
            "rémunération", "salario", "salário", "वेतन",
        ],
        SemanticContext::Job => JOB_WORDS,
        SemanticContext::Personal => &[
            "first name", "last name", "given name", "family name", "surname", "forename",
            "vorname", "nachname", "prénom", "nom de famille", "nombre", "apellido", "nome",
            "sobrenome",
        ],
    }
}

/// One present schema property mapped to a field type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaHint {
    pub field_type: FieldType,
    pub confidence: f64,
    pub property: String,
    pub context: SemanticContext,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct JobPostingSummary {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

/// Field hints extracted from every JSON-LD block of a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StructuredHints {
    /// One entry per field type, first-seen order, highest confidence kept.
    pub hints: Vec<SchemaHint>,
    pub job_posting: Option<JobPostingSummary>,
    pub blocks: usize,
    pub rejected_blocks: usize,
}

impl StructuredHints {
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn get(&self, field_type: FieldType) -> Option<&SchemaHint> {
        self.hints.iter().find(|hint| hint.field_type == field_type)
    }

    fn record(&mut self, hint: SchemaHint) {
        match self.hints.iter_mut().find(|h| h.field_type == hint.field_type) {
            Some(existing) if existing.confidence < hint.confidence => *existing = hint,
            Some(_) => {}
            None => self.hints.push(hint),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StructuredDataSource;

impl StructuredDataSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse every JSON-LD block of `doc`. Malformed blocks are skipped.
    pub fn extract(&self, doc: &Arc<PageDocument>) -> StructuredHints {
        let mut hints = StructuredHints::default();
        for raw in doc.json_ld_blocks() {
            hints.blocks += 1;
            match parse_block(&raw) {
                Ok(value) => walk(&value, None, 0, &mut hints),
                Err(err) => {
                    hints.rejected_blocks += 1;
                    debug!(target: "fieldsense::structured", error = %err, "skipping structured data block");
                }
            }
        }
        debug!(
            target: "fieldsense::structured",
            hints = hints.hints.len(),
            blocks = hints.blocks,
            rejected = hints.rejected_blocks,
            "structured data extracted"
        );
        hints
    }

    /// Signal for an element whose resolved label is `label`.
    pub fn hint(&self, label: &str, hints: &StructuredHints) -> Option<Signal> {
        if hints.is_empty() {
            return None;
        }
        let lowered = label.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        let candidates: Vec<&SchemaHint> = hints
            .hints
            .iter()
            .filter(|hint| mentions_any(&lowered, context_keywords(hint.context)))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let direct = candidates
            .iter()
            .filter(|hint| {
                SCHEMA_TABLE
                    .iter()
                    .filter(|m| m.field_type == hint.field_type)
                    .any(|m| mentions_any(&lowered, m.label_keywords))
            })
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence));

        let chosen = match direct {
            Some(hint) => *hint,
            None if candidates
                .iter()
                .all(|hint| hint.field_type == candidates[0].field_type) =>
            {
                candidates[0]
            }
            None => return None,
        };

        Some(
            Signal::proposing(chosen.field_type, chosen.confidence, SourceId::StructuredData)
                .with_evidence(Evidence::Schema {
                    property: chosen.property.clone(),
                    context: chosen.context,
                }),
        )
    }
}

pub fn parse_block(raw: &str) -> Result<Value> {
    let trimmed = raw
        .trim()
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim();
    serde_json::from_str(trimmed).map_err(|err| StructuralError::StructuredData(err.to_string()))
}

fn walk(value: &Value, implied_type: Option<&str>, depth: usize, hints: &mut StructuredHints) {
    if depth > MAX_DEPTH {
        return;
    }
    match value {
        Value::Array(items) => {
            for item in items {
                walk(item, implied_type, depth + 1, hints);
            }
        }
        Value::Object(object) => {
            let types = schema_types(object, implied_type);
            for mapping in SCHEMA_TABLE {
                if !mapping.owner_types.iter().any(|owner| types.iter().any(|t| t == owner)) {
                    continue;
                }
                if let Some(text) = resolve_path(object, mapping.path) {
                    hints.record(SchemaHint {
                        field_type: mapping.field_type,
                        confidence: mapping.confidence,
                        property: format!("{}.{}", types.first().map(String::as_str).unwrap_or("Thing"), mapping.path.join(".")),
                        context: mapping.context,
                        value: text,
                    });
                }
            }
            if types.iter().any(|t| t == "JobPosting") && hints.job_posting.is_none() {
                hints.job_posting = Some(JobPostingSummary {
                    title: resolve_path(object, &["title"]),
                    company: resolve_path(object, &["hiringOrganization", "name"]),
                    location: resolve_path(object, &["jobLocation", "address", "addressLocality"])
                        .or_else(|| {
                            object
                                .get("jobLocation")
                                .and_then(Value::as_array)
                                .and_then(|locations| locations.first())
                                .and_then(|loc| loc.pointer("/address/addressLocality"))
                                .and_then(value_text)
                        }),
                });
            }
            for (key, child) in object {
                let implied = match key.as_str() {
                    "address" => Some("PostalAddress"),
                    "hiringOrganization" => Some("Organization"),
                    "contactPoint" => Some("ContactPoint"),
                    "@graph" => None,
                    _ => None,
                };
                walk(child, implied, depth + 1, hints);
            }
        }
        _ => {}
    }
}

/// `@type` values with any schema.org URL prefix removed.
fn schema_types(object: &JsonMap<String, Value>, implied: Option<&str>) -> Vec<String> {
    let strip = |raw: &str| raw.rsplit('/').next().unwrap_or(raw).to_string();
    let mut types: Vec<String> = match object.get("@type") {
        Some(Value::String(ty)) => vec![strip(ty)],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(strip).collect(),
        _ => Vec::new(),
    };
    if types.is_empty() {
        if let Some(implied) = implied {
            types.push(implied.to_string());
        }
    }
    types
}

fn resolve_path(object: &JsonMap<String, Value>, path: &[&str]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    let mut current = object.get(*first)?;
    for segment in rest {
        current = match current {
            Value::Array(items) => items.first()?.get(*segment)?,
            other => other.get(*segment)?,
        };
    }
    value_text(current)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        Value::Number(num) => Some(num.to_string()),
        Value::Object(object) => object
            .get("name")
            .or_else(|| object.get("value"))
            .and_then(value_text)
            .or_else(|| (!object.is_empty()).then(|| "present".to_string())),
        Value::Array(items) => items.first().and_then(value_text),
        _ => None,
    }
}

fn mentions_any(label: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| {
        label.match_indices(keyword).any(|(start, _)| {
            let end = start + keyword.len();
            let before = label[..start].chars().next_back();
            let after = label[end..].chars().next();
            before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_PAGE: &str = r#"<html><head>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@type": "JobPosting",
          "title": "Senior Rust Engineer",
          "hiringOrganization": {"@type": "Organization", "name": "Acme Robotics"},
          "jobLocation": {"@type": "Place", "address": {"addressLocality": "Berlin", "addressCountry": "DE"}},
          "baseSalary": {"@type": "MonetaryAmount", "currency": "EUR", "value": {"minValue": 80000}}
        }
        </script>
        <script type="application/ld+json">{ not json </script>
        </head><body></body></html>"#;

    fn hints() -> StructuredHints {
        let doc = PageDocument::parse(JOB_PAGE, None).unwrap();
        StructuredDataSource::new().extract(&doc)
    }

    #[test]
    fn extracts_job_posting_hints_and_skips_bad_blocks() {
        let hints = hints();
        assert_eq!(hints.blocks, 2);
        assert_eq!(hints.rejected_blocks, 1);
        let company = hints.get(FieldType::CurrentCompany).unwrap();
        assert_eq!(company.value, "Acme Robotics");
        assert_eq!(company.confidence, 0.90);
        assert_eq!(hints.get(FieldType::City).unwrap().value, "Berlin");
        assert_eq!(hints.get(FieldType::SalaryCurrency).unwrap().value, "EUR");

        let summary = hints.job_posting.unwrap();
        assert_eq!(summary.title.as_deref(), Some("Senior Rust Engineer"));
        assert_eq!(summary.company.as_deref(), Some("Acme Robotics"));
        assert_eq!(summary.location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn company_label_gets_structured_signal() {
        let signal = StructuredDataSource::new()
            .hint("Company", &hints())
            .unwrap();
        assert_eq!(signal.field_type, Some(FieldType::CurrentCompany));
        assert_eq!(signal.source, SourceId::StructuredData);
        assert!((0.80..=0.90).contains(&signal.confidence));
    }

    #[test]
    fn label_picks_the_matching_hint_within_a_context() {
        let source = StructuredDataSource::new();
        let hints = hints();
        let city = source.hint("City", &hints).unwrap();
        assert_eq!(city.field_type, Some(FieldType::City));
        let country = source.hint("Country of residence", &hints).unwrap();
        assert_eq!(country.field_type, Some(FieldType::Country));
    }

    #[test]
    fn unrelated_or_empty_label_abstains() {
        let source = StructuredDataSource::new();
        let hints = hints();
        assert!(source.hint("Favourite colour", &hints).is_none());
        assert!(source.hint("", &hints).is_none());
        assert!(source.hint("Company", &StructuredHints::default()).is_none());
    }

    #[test]
    fn graph_arrays_and_url_types_are_walked() {
        let html = r#"<script type="application/ld+json">
            {"@graph": [{"@type": "https://schema.org/Person", "givenName": "Ada", "familyName": "Lovelace",
                         "email": "ada@example.com"}]}
        </script>"#;
        let doc = PageDocument::parse(html, None).unwrap();
        let hints = StructuredDataSource::new().extract(&doc);
        assert_eq!(hints.get(FieldType::FirstName).unwrap().value, "Ada");
        assert_eq!(hints.get(FieldType::Email).unwrap().value, "ada@example.com");
        assert!(hints.job_posting.is_none());
    }
}
