use fieldsense_core_types::{Evidence, FieldType, SectionType, Signal, SourceId};
use perceiver_hub::{AggregatorConfig, SignalAggregator};
use proptest::prelude::*;

const VOTING_SOURCES: &[SourceId] = &[
    SourceId::StructuredData,
    SourceId::SemanticMapping,
    SourceId::KeywordPattern,
    SourceId::Attribute,
];

const FIELDS: &[FieldType] = &[
    FieldType::FirstName,
    FieldType::Email,
    FieldType::NoticePeriod,
    FieldType::ExpectedCompensation,
    FieldType::CurrentCompany,
];

fn proposal() -> impl Strategy<Value = Signal> {
    (0..FIELDS.len(), 0..VOTING_SOURCES.len(), 0.0f64..=1.0)
        .prop_map(|(f, s, c)| Signal::proposing(FIELDS[f], c, VOTING_SOURCES[s]))
}

fn section() -> impl Strategy<Value = Signal> {
    (0.5f64..=0.6, prop::sample::subsequence(FIELDS.to_vec(), 0..=FIELDS.len())).prop_map(
        |(confidence, expected)| {
            Signal::new(
                None,
                confidence,
                SourceId::SectionContext,
                Evidence::Section {
                    section: SectionType::Experience,
                    heading: "Experience".into(),
                    expected,
                },
            )
        },
    )
}

proptest! {
    #[test]
    fn context_only_signals_never_decide(sections in prop::collection::vec(section(), 0..4)) {
        prop_assert!(SignalAggregator::default().classify(&sections).is_none());
    }

    #[test]
    fn reported_confidence_is_bounded(signals in prop::collection::vec(proposal(), 1..8)) {
        let aggregator = SignalAggregator::default();
        let config = AggregatorConfig::default();
        if let Some(result) = aggregator.classify(&signals) {
            prop_assert!(result.confidence <= config.max_confidence);
            prop_assert!(result.confidence >= config.min_confidence.min(config.max_confidence));
            let best = aggregator
                .score(&signals)
                .iter()
                .map(|score| score.weighted)
                .fold(f64::MIN, f64::max);
            prop_assert!(result.confidence + 1e-9 >= best.min(config.max_confidence));
        }
    }

    #[test]
    fn corroboration_never_lowers_the_winner(signals in prop::collection::vec(proposal(), 1..6), extra in 0.0f64..=1.0) {
        let aggregator = SignalAggregator::default();
        let before = aggregator.score(&signals);
        let winner = before
            .iter()
            .fold(None::<&perceiver_hub::FieldScore>, |best, s| match best {
                Some(b) if b.score() >= s.score() => Some(b),
                _ => Some(s),
            })
            .unwrap();

        let mut more = signals.clone();
        more.push(Signal::proposing(winner.field_type, extra, SourceId::Attribute));
        let after = aggregator.score(&more);
        let grown = after.iter().find(|s| s.field_type == winner.field_type).unwrap();
        prop_assert!(grown.score() >= winner.score());
        prop_assert!(grown.agreement_bonus <= AggregatorConfig::default().agreement_cap + 1e-12);
    }

    #[test]
    fn context_boost_applies_once(signals in prop::collection::vec(proposal(), 1..6), ctx in section(), copies in 1usize..4) {
        let aggregator = SignalAggregator::default();
        let mut once = signals.clone();
        once.push(ctx.clone());
        let mut repeated = signals.clone();
        repeated.extend(std::iter::repeat(ctx).take(copies));

        let a = aggregator.classify(&once).map(|r| (r.field_type, r.confidence));
        let b = aggregator.classify(&repeated).map(|r| (r.field_type, r.confidence));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn classification_is_deterministic(signals in prop::collection::vec(proposal(), 0..8)) {
        let aggregator = SignalAggregator::default();
        prop_assert_eq!(aggregator.classify(&signals), aggregator.classify(&signals));
    }
}
