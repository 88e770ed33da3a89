//! Three-tier label matcher.
//!
//! Tier 1 compares the normalized label against phrase rules (exact, then
//! bounded containment). Tier 2 strips interrogative filler and re-runs tier 1
//! with a lower ceiling. Tier 3 falls back to coarse keyword patterns. The
//! first tier that produces a match answers; lower tiers never out-vote it.

use std::sync::Arc;

use fieldsense_core_types::{Evidence, FieldType, Locale, MatchTier, Signal, SourceId};
use tracing::debug;

use crate::keywords::{looks_like_question, normalize, strip_question};
use crate::patterns::{PatternRegistry, RuleMatcher};

pub const EXACT_CONFIDENCE: f64 = 0.85;
pub const FUZZY_FLOOR: f64 = 0.75;
pub const FUZZY_SPAN: f64 = 0.09;
pub const QUESTION_CEILING: f64 = 0.80;
pub const KEYWORD_FLOOR: f64 = 0.55;
pub const KEYWORD_SPAN: f64 = 0.10;

const MIN_FUZZY_PHRASE_CHARS: usize = 3;
const MIN_PHRASE_COVERAGE: f64 = 0.6;
const MAX_LABEL_TO_PHRASE_RATIO: usize = 4;
const FUZZY_LABEL_ALLOWANCE: usize = 40;
const MAX_LABEL_TO_WORD_RATIO: usize = 3;

#[derive(Clone, Debug, PartialEq)]
struct Candidate {
    field_type: FieldType,
    confidence: f64,
    matched: String,
    tier: MatchTier,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        self.confidence > other.confidence
            || (self.confidence == other.confidence && self.matched.len() > other.matched.len())
    }
}

fn keep_best(best: &mut Option<Candidate>, candidate: Candidate) {
    if best.as_ref().map_or(true, |current| candidate.beats(current)) {
        *best = Some(candidate);
    }
}

/// Maps cleaned labels to field types using an injected [`PatternRegistry`].
#[derive(Clone)]
pub struct SemanticMatcher {
    registry: Arc<PatternRegistry>,
}

impl SemanticMatcher {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    /// `match(labelText)` against `locales`, tried in the given order.
    pub fn match_label(&self, label: &str, locales: &[Locale]) -> Option<Signal> {
        let normalized = normalize(label);
        if normalized.is_empty() || locales.is_empty() {
            return None;
        }

        if let Some(hit) = self.phrase_tier(&normalized, locales) {
            return Some(self.finish(label, hit, SourceId::SemanticMapping, false));
        }

        if let Some(stripped) = strip_question(&normalized) {
            if let Some(mut hit) = self.phrase_tier(&stripped, locales) {
                hit.confidence = hit.confidence.min(QUESTION_CEILING);
                return Some(self.finish(label, hit, SourceId::SemanticMapping, true));
            }
        }

        self.keyword_tier(&normalized, locales).map(|hit| {
            let question = looks_like_question(label);
            self.finish(label, hit, SourceId::KeywordPattern, question)
        })
    }

    fn finish(&self, label: &str, hit: Candidate, source: SourceId, question: bool) -> Signal {
        debug!(
            target: "fieldsense::matcher",
            label,
            field_type = %hit.field_type,
            confidence = hit.confidence,
            tier = ?hit.tier,
            "label matched"
        );
        Signal::proposing(hit.field_type, hit.confidence, source).with_evidence(Evidence::Phrase {
            text: label.to_string(),
            matched: hit.matched,
            tier: hit.tier,
            question,
        })
    }

    fn phrase_tier(&self, text: &str, locales: &[Locale]) -> Option<Candidate> {
        let mut exact: Option<Candidate> = None;
        let mut fuzzy: Option<Candidate> = None;
        let text_chars = text.chars().count();

        for field_type in self.registry.field_types() {
            let field_exact = self
                .registry
                .tier_rules(*field_type, locales, MatchTier::Exact)
                .find_map(|rule| match &rule.matcher {
                    RuleMatcher::Phrase(phrase) if phrase == text => Some(phrase.clone()),
                    _ => None,
                });
            if let Some(matched) = field_exact {
                keep_best(
                    &mut exact,
                    Candidate {
                        field_type: *field_type,
                        confidence: EXACT_CONFIDENCE,
                        matched,
                        tier: MatchTier::Exact,
                    },
                );
                continue;
            }
            if exact.is_some() {
                continue;
            }

            let field_fuzzy = self
                .registry
                .tier_rules(*field_type, locales, MatchTier::Fuzzy)
                .filter_map(|rule| match &rule.matcher {
                    RuleMatcher::Phrase(phrase) => fuzzy_score(text, text_chars, phrase)
                        .map(|confidence| (confidence, phrase.clone())),
                    RuleMatcher::Keyword(_) => None,
                })
                .fold(None::<(f64, String)>, |best, (confidence, phrase)| match best {
                    Some((c, _)) if c >= confidence => best,
                    _ => Some((confidence, phrase)),
                });
            if let Some((confidence, matched)) = field_fuzzy {
                keep_best(
                    &mut fuzzy,
                    Candidate {
                        field_type: *field_type,
                        confidence,
                        matched,
                        tier: MatchTier::Fuzzy,
                    },
                );
            }
        }
        exact.or(fuzzy)
    }

    fn keyword_tier(&self, text: &str, locales: &[Locale]) -> Option<Candidate> {
        let text_chars = text.chars().count().max(1);
        let mut best: Option<Candidate> = None;
        for field_type in self.registry.field_types() {
            let hit = self
                .registry
                .tier_rules(*field_type, locales, MatchTier::Keyword)
                .find_map(|rule| match &rule.matcher {
                    RuleMatcher::Keyword(regex) => regex.find(text).map(|m| m.as_str().to_string()),
                    RuleMatcher::Phrase(_) => None,
                });
            if let Some(matched) = hit {
                let coverage = matched.chars().count() as f64 / text_chars as f64;
                keep_best(
                    &mut best,
                    Candidate {
                        field_type: *field_type,
                        confidence: KEYWORD_FLOOR + KEYWORD_SPAN * coverage.min(1.0),
                        matched,
                        tier: MatchTier::Keyword,
                    },
                );
            }
        }
        best
    }
}

/// Bounded containment score, or `None` when the phrase and text do not
/// overlap closely enough.
fn fuzzy_score(text: &str, text_chars: usize, phrase: &str) -> Option<f64> {
    let phrase_chars = phrase.chars().count();
    if phrase_chars < MIN_FUZZY_PHRASE_CHARS || text_chars == 0 {
        return None;
    }
    let coverage = if phrase_chars <= text_chars {
        // single words get no allowance: "position" must not match inside a question
        let limit = if phrase.contains(' ') {
            FUZZY_LABEL_ALLOWANCE.max(phrase_chars * MAX_LABEL_TO_PHRASE_RATIO)
        } else {
            phrase_chars * MAX_LABEL_TO_WORD_RATIO
        };
        if text_chars > limit || !contains_words(text, phrase) {
            return None;
        }
        phrase_chars as f64 / text_chars as f64
    } else {
        let coverage = text_chars as f64 / phrase_chars as f64;
        if coverage < MIN_PHRASE_COVERAGE || !contains_words(phrase, text) {
            return None;
        }
        coverage
    };
    Some((FUZZY_FLOOR + FUZZY_SPAN * coverage).min(EXACT_CONFIDENCE - 0.01))
}

/// Whole-word containment on space-joined normalized text.
fn contains_words(haystack: &str, needle: &str) -> bool {
    let padded = format!(" {haystack} ");
    padded.contains(&format!(" {needle} "))
}
