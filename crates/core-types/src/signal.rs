use std::fmt;

use crate::field_type::FieldType;

/// Identifies which signal source produced an opinion.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    StructuredData,
    SemanticMapping,
    KeywordPattern,
    Attribute,
    SectionContext,
}

impl SourceId {
    pub const ALL: &'static [SourceId] = &[
        SourceId::StructuredData,
        SourceId::SemanticMapping,
        SourceId::KeywordPattern,
        SourceId::Attribute,
        SourceId::SectionContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::StructuredData => "structured-data",
            SourceId::SemanticMapping => "semantic-mapping",
            SourceId::KeywordPattern => "keyword-pattern",
            SourceId::Attribute => "attribute",
            SourceId::SectionContext => "section-context",
        }
    }

    /// Weight applied by the aggregator unless configuration overrides it.
    pub fn default_weight(&self) -> f64 {
        match self {
            SourceId::StructuredData => 1.2,
            SourceId::SemanticMapping => 1.0,
            SourceId::KeywordPattern => 1.0,
            SourceId::Attribute => 1.0,
            SourceId::SectionContext => 0.6,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution tier of a text rule. Order is escalation order.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Fuzzy,
    Keyword,
}

/// Coarse structural region of a form.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SectionType {
    Personal,
    Experience,
    Education,
    Skills,
    Compensation,
    Diversity,
    Application,
}

impl SectionType {
    pub const ALL: &'static [SectionType] = &[
        SectionType::Personal,
        SectionType::Experience,
        SectionType::Education,
        SectionType::Skills,
        SectionType::Compensation,
        SectionType::Diversity,
        SectionType::Application,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Personal => "personal",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
            SectionType::Skills => "skills",
            SectionType::Compensation => "compensation",
            SectionType::Diversity => "diversity",
            SectionType::Application => "application",
        }
    }
}

/// Semantic neighbourhood a structured-data hint belongs to.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SemanticContext {
    Company,
    Contact,
    Address,
    Salary,
    Job,
    Personal,
}

/// Source-specific explanation attached to a signal.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Clone, Debug, PartialEq)]
pub enum Evidence {
    Phrase {
        text: String,
        matched: String,
        tier: MatchTier,
        question: bool,
    },
    Schema {
        property: String,
        context: SemanticContext,
    },
    Section {
        section: SectionType,
        heading: String,
        expected: Vec<FieldType>,
    },
    Attribute {
        attribute: String,
        value: String,
    },
    None,
}

/// One source's opinion about an element.
///
/// `field_type = None` never votes; such signals only carry context.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    pub field_type: Option<FieldType>,
    pub confidence: f64,
    pub source: SourceId,
    pub evidence: Evidence,
}

impl Signal {
    pub fn new(
        field_type: Option<FieldType>,
        confidence: f64,
        source: SourceId,
        evidence: Evidence,
    ) -> Self {
        Self {
            field_type,
            confidence: clamp_unit(confidence),
            source,
            evidence,
        }
    }

    pub fn proposing(field_type: FieldType, confidence: f64, source: SourceId) -> Self {
        Self::new(Some(field_type), confidence, source, Evidence::None)
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Field types a section signal marks as plausible.
    pub fn expected_field_types(&self) -> &[FieldType] {
        match &self.evidence {
            Evidence::Section { expected, .. } => expected,
            _ => &[],
        }
    }
}

/// The engine's decision for one element.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AggregationResult {
    pub field_type: FieldType,
    pub confidence: f64,
    pub contributing_signals: Vec<Signal>,
}

impl AggregationResult {
    pub fn sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = Vec::new();
        for signal in &self.contributing_signals {
            if !sources.contains(&signal.source) {
                sources.push(signal.source);
            }
        }
        sources
    }
}

/// Clamp into `[0, 1]`, mapping NaN to zero.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped_on_construction() {
        let high = Signal::proposing(FieldType::Email, 1.7, SourceId::Attribute);
        let low = Signal::proposing(FieldType::Email, -0.2, SourceId::Attribute);
        let nan = Signal::proposing(FieldType::Email, f64::NAN, SourceId::Attribute);
        assert_eq!(high.confidence, 1.0);
        assert_eq!(low.confidence, 0.0);
        assert_eq!(nan.confidence, 0.0);
    }

    #[test]
    fn expected_types_only_come_from_section_evidence() {
        let section = Signal::new(
            None,
            0.5,
            SourceId::SectionContext,
            Evidence::Section {
                section: SectionType::Education,
                heading: "Education".into(),
                expected: vec![FieldType::School, FieldType::Degree],
            },
        );
        assert_eq!(section.expected_field_types(), &[FieldType::School, FieldType::Degree]);

        let plain = Signal::proposing(FieldType::School, 0.8, SourceId::SemanticMapping);
        assert!(plain.expected_field_types().is_empty());
    }

    #[test]
    fn sources_are_deduplicated_in_order() {
        let result = AggregationResult {
            field_type: FieldType::Phone,
            confidence: 0.9,
            contributing_signals: vec![
                Signal::proposing(FieldType::Phone, 0.8, SourceId::Attribute),
                Signal::proposing(FieldType::Phone, 0.8, SourceId::SemanticMapping),
                Signal::proposing(FieldType::Phone, 0.7, SourceId::Attribute),
            ],
        };
        assert_eq!(
            result.sources(),
            vec![SourceId::Attribute, SourceId::SemanticMapping]
        );
    }
}
