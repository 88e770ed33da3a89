//! Weighted fusion of per-source signals into one field-type decision.

use fieldsense_core_types::{clamp_unit, AggregationResult, FieldType, Signal, SourceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-source multipliers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub structured_data: f64,
    pub semantic_mapping: f64,
    pub keyword_pattern: f64,
    pub attribute: f64,
    pub section_context: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            structured_data: SourceId::StructuredData.default_weight(),
            semantic_mapping: SourceId::SemanticMapping.default_weight(),
            keyword_pattern: SourceId::KeywordPattern.default_weight(),
            attribute: SourceId::Attribute.default_weight(),
            section_context: SourceId::SectionContext.default_weight(),
        }
    }
}

impl SourceWeights {
    pub fn weight(&self, source: SourceId) -> f64 {
        match source {
            SourceId::StructuredData => self.structured_data,
            SourceId::SemanticMapping => self.semantic_mapping,
            SourceId::KeywordPattern => self.keyword_pattern,
            SourceId::Attribute => self.attribute,
            SourceId::SectionContext => self.section_context,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Scores below this (before capping) produce no decision.
    pub min_confidence: f64,
    /// Ceiling of the reported confidence.
    pub max_confidence: f64,
    pub agreement_step: f64,
    pub agreement_cap: f64,
    pub context_boost: f64,
    pub weights: SourceWeights,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.60,
            max_confidence: 0.95,
            agreement_step: 0.05,
            agreement_cap: 0.10,
            context_boost: 0.10,
            weights: SourceWeights::default(),
        }
    }
}

/// Score of one field type before the context boost.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldScore {
    pub field_type: FieldType,
    pub weighted: f64,
    pub agreement_bonus: f64,
    pub signals: usize,
}

impl FieldScore {
    pub fn score(&self) -> f64 {
        self.weighted + self.agreement_bonus
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignalAggregator {
    config: AggregatorConfig,
}

impl SignalAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Per-field scores in first-seen order. Signals without a field type are skipped.
    pub fn score(&self, signals: &[Signal]) -> Vec<FieldScore> {
        let mut partition: Vec<(FieldType, Vec<&Signal>)> = Vec::new();
        for signal in signals {
            let Some(field_type) = signal.field_type else {
                continue;
            };
            match partition.iter_mut().find(|(ft, _)| *ft == field_type) {
                Some((_, group)) => group.push(signal),
                None => partition.push((field_type, vec![signal])),
            }
        }

        partition
            .into_iter()
            .map(|(field_type, group)| {
                let weighted: f64 = group
                    .iter()
                    .map(|s| clamp_unit(s.confidence) * self.config.weights.weight(s.source))
                    .sum();
                let agreement_bonus = self.agreement_bonus(group.len());
                FieldScore {
                    field_type,
                    weighted,
                    agreement_bonus,
                    signals: group.len(),
                }
            })
            .collect()
    }

    pub fn agreement_bonus(&self, count: usize) -> f64 {
        let extra = count.saturating_sub(1) as f64;
        (extra * self.config.agreement_step).min(self.config.agreement_cap)
    }

    /// `classify(signals)`: the best field type, or `None` when no proposal
    /// clears the minimum confidence.
    pub fn classify(&self, signals: &[Signal]) -> Option<AggregationResult> {
        let scores = self.score(signals);
        let mut winner: Option<&FieldScore> = None;
        for candidate in &scores {
            // Strict comparison keeps the first-seen field type on ties.
            if winner.map_or(true, |best| candidate.score() > best.score()) {
                winner = Some(candidate);
            }
        }
        let winner = winner?;

        let section = signals.iter().find(|signal| {
            signal.field_type.is_none()
                && signal.expected_field_types().contains(&winner.field_type)
        });
        let boost = section.map_or(0.0, |section| {
            (clamp_unit(section.confidence) * self.config.weights.weight(section.source))
                .min(self.config.context_boost)
        });
        let final_score = winner.score() + boost;

        if final_score < self.config.min_confidence {
            debug!(
                target: "fieldsense::aggregator",
                field_type = %winner.field_type,
                score = final_score,
                threshold = self.config.min_confidence,
                "best candidate rejected"
            );
            return None;
        }

        let mut contributing: Vec<Signal> = signals
            .iter()
            .filter(|signal| signal.field_type == Some(winner.field_type))
            .cloned()
            .collect();
        if let Some(section) = section {
            contributing.push(section.clone());
        }
        let confidence = clamp_unit(final_score.min(self.config.max_confidence));
        debug!(
            target: "fieldsense::aggregator",
            field_type = %winner.field_type,
            weighted = winner.weighted,
            bonus = winner.agreement_bonus,
            boost,
            confidence,
            "field classified"
        );
        Some(AggregationResult {
            field_type: winner.field_type,
            confidence,
            contributing_signals: contributing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsense_core_types::{Evidence, SectionType};

    fn signal(field_type: FieldType, confidence: f64, source: SourceId) -> Signal {
        Signal::proposing(field_type, confidence, source)
    }

    fn section(confidence: f64, expected: Vec<FieldType>) -> Signal {
        Signal::new(
            None,
            confidence,
            SourceId::SectionContext,
            Evidence::Section {
                section: SectionType::Compensation,
                heading: "Compensation".into(),
                expected,
            },
        )
    }

    #[test]
    fn no_proposals_no_decision() {
        let aggregator = SignalAggregator::default();
        assert!(aggregator.classify(&[]).is_none());
        assert!(aggregator
            .classify(&[section(0.6, vec![FieldType::ExpectedCompensation])])
            .is_none());
    }

    #[test]
    fn single_strong_signal_passes() {
        let result = SignalAggregator::default()
            .classify(&[signal(FieldType::ExpectedCompensation, 0.85, SourceId::SemanticMapping)])
            .unwrap();
        assert_eq!(result.field_type, FieldType::ExpectedCompensation);
        assert!((result.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn structured_outranks_keyword_for_other_field() {
        let result = SignalAggregator::default()
            .classify(&[
                signal(FieldType::JobTitle, 0.65, SourceId::KeywordPattern),
                signal(FieldType::CurrentCompany, 0.90, SourceId::StructuredData),
            ])
            .unwrap();
        assert_eq!(result.field_type, FieldType::CurrentCompany);
        assert_eq!(result.sources(), vec![SourceId::StructuredData]);
        assert!(result.confidence <= 0.95);
    }

    #[test]
    fn keyword_plus_section_clears_threshold() {
        let aggregator = SignalAggregator::default();
        let keyword = signal(FieldType::NoticePeriod, 0.55, SourceId::KeywordPattern);
        let context = section(0.50, vec![FieldType::NoticePeriod]);

        assert!(aggregator.classify(&[keyword.clone()]).is_none());
        assert!(aggregator.classify(&[context.clone()]).is_none());

        let result = aggregator.classify(&[keyword, context]).unwrap();
        assert_eq!(result.field_type, FieldType::NoticePeriod);
        assert!((result.confidence - 0.65).abs() < 1e-9);
        assert_eq!(result.contributing_signals.len(), 2);
    }

    #[test]
    fn boost_only_for_expected_winner() {
        let aggregator = SignalAggregator::default();
        let result = aggregator.classify(&[
            signal(FieldType::Email, 0.55, SourceId::KeywordPattern),
            section(0.60, vec![FieldType::School]),
        ]);
        assert!(result.is_none());
    }

    #[test]
    fn agreement_bonus_is_capped() {
        let aggregator = SignalAggregator::default();
        assert_eq!(aggregator.agreement_bonus(0), 0.0);
        assert_eq!(aggregator.agreement_bonus(1), 0.0);
        assert!((aggregator.agreement_bonus(2) - 0.05).abs() < 1e-9);
        assert!((aggregator.agreement_bonus(7) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn ties_go_to_first_seen_field() {
        let result = SignalAggregator::default()
            .classify(&[
                signal(FieldType::City, 0.70, SourceId::Attribute),
                signal(FieldType::State, 0.70, SourceId::Attribute),
            ])
            .unwrap();
        assert_eq!(result.field_type, FieldType::City);
    }

    #[test]
    fn threshold_uses_uncapped_score_and_report_is_capped() {
        let result = SignalAggregator::default()
            .classify(&[
                signal(FieldType::Email, 0.85, SourceId::Attribute),
                signal(FieldType::Email, 0.85, SourceId::SemanticMapping),
            ])
            .unwrap();
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn custom_weights_apply() {
        let aggregator = SignalAggregator::new(AggregatorConfig {
            weights: SourceWeights {
                keyword_pattern: 2.0,
                ..SourceWeights::default()
            },
            ..AggregatorConfig::default()
        });
        let result = aggregator
            .classify(&[signal(FieldType::Skills, 0.40, SourceId::KeywordPattern)])
            .unwrap();
        assert!((result.confidence - 0.80).abs() < 1e-9);
    }
}
