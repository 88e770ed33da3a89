//! Pattern registry: per-locale phrase and keyword rules for every field type.
//!
//! The registry is built once and handed to consumers behind an `Arc`; it is
//! immutable afterwards, so lookups are pure functions of their inputs.

use std::collections::HashMap;

use fieldsense_core_types::{FieldType, Locale, MatchTier};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::errors::{Result, SemanticError};
use crate::keywords::normalize;
use crate::tables::locale_table;

/// How a rule tests normalized label text.
#[derive(Clone, Debug)]
pub enum RuleMatcher {
    /// Normalized phrase, compared by equality (exact tier) or bounded
    /// containment (fuzzy tier).
    Phrase(String),
    Keyword(Regex),
}

impl RuleMatcher {
    pub fn pattern(&self) -> &str {
        match self {
            RuleMatcher::Phrase(phrase) => phrase,
            RuleMatcher::Keyword(regex) => regex.as_str(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PatternRule {
    pub field_type: FieldType,
    pub locale: Locale,
    pub tier: MatchTier,
    pub matcher: RuleMatcher,
}

impl PatternRule {
    pub fn exact(field_type: FieldType, locale: Locale, phrase: &str) -> Self {
        Self {
            field_type,
            locale,
            tier: MatchTier::Exact,
            matcher: RuleMatcher::Phrase(normalize(phrase)),
        }
    }

    pub fn fuzzy(field_type: FieldType, locale: Locale, phrase: &str) -> Self {
        Self {
            field_type,
            locale,
            tier: MatchTier::Fuzzy,
            matcher: RuleMatcher::Phrase(normalize(phrase)),
        }
    }

    /// Keyword rule from a regex fragment, anchored on word boundaries.
    pub fn keyword(field_type: FieldType, locale: Locale, fragment: &str) -> Result<Self> {
        let regex = Regex::new(&format!(r"\b(?:{fragment})\b"))
            .map_err(|err| SemanticError::InvalidPattern(format!("{fragment}: {err}")))?;
        Ok(Self {
            field_type,
            locale,
            tier: MatchTier::Keyword,
            matcher: RuleMatcher::Keyword(regex),
        })
    }

    pub fn view(&self) -> RuleView {
        RuleView {
            field_type: self.field_type,
            locale: self.locale,
            tier: self.tier,
            pattern: self.matcher.pattern().to_string(),
        }
    }
}

/// Serializable description of a rule, for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleView {
    pub field_type: FieldType,
    pub locale: Locale,
    pub tier: MatchTier,
    pub pattern: String,
}

#[derive(Debug, Default)]
pub struct PatternRegistry {
    rules: HashMap<(FieldType, Locale), Vec<PatternRule>>,
    field_types: Vec<FieldType>,
}

impl PatternRegistry {
    /// Build from arbitrary rules. Rules are grouped per (field type, locale)
    /// and ordered exact, fuzzy, keyword; insertion order is kept within a tier.
    pub fn from_rules(rules: impl IntoIterator<Item = PatternRule>) -> Self {
        let mut grouped: HashMap<(FieldType, Locale), Vec<PatternRule>> = HashMap::new();
        for rule in rules {
            grouped
                .entry((rule.field_type, rule.locale))
                .or_default()
                .push(rule);
        }
        for group in grouped.values_mut() {
            group.sort_by_key(|rule| rule.tier);
        }
        let field_types = FieldType::ALL
            .iter()
            .copied()
            .filter(|ft| Locale::ALL.iter().any(|locale| grouped.contains_key(&(*ft, *locale))))
            .collect();
        Self {
            rules: grouped,
            field_types,
        }
    }

    /// The built-in multilingual tables.
    pub fn builtin() -> Result<Self> {
        let mut rules = Vec::new();
        for locale in Locale::ALL {
            for entry in locale_table(*locale) {
                for phrase in entry.phrases {
                    rules.push(PatternRule::exact(entry.field_type, *locale, phrase));
                }
                for phrase in entry.phrases {
                    rules.push(PatternRule::fuzzy(entry.field_type, *locale, phrase));
                }
                for fragment in entry.keywords {
                    rules.push(PatternRule::keyword(entry.field_type, *locale, fragment)?);
                }
            }
        }
        let registry = Self::from_rules(rules);
        debug!(
            target: "fieldsense::patterns",
            rules = registry.len(),
            field_types = registry.field_types.len(),
            "pattern registry built"
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Field types with at least one rule, in catalog order.
    pub fn field_types(&self) -> &[FieldType] {
        &self.field_types
    }

    /// `getPatterns(fieldType, locale)`: ordered rules for one locale.
    pub fn get_patterns(&self, field_type: FieldType, locale: Locale) -> &[PatternRule] {
        self.rules
            .get(&(field_type, locale))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `getAllPatterns(fieldType)`: rules across every locale, catalog locale order.
    pub fn get_all_patterns(&self, field_type: FieldType) -> Vec<&PatternRule> {
        Locale::ALL
            .iter()
            .flat_map(|locale| self.get_patterns(field_type, *locale))
            .collect()
    }

    /// Rules of one tier for `field_type` across `locales`, in the given locale order.
    pub fn tier_rules<'a>(
        &'a self,
        field_type: FieldType,
        locales: &'a [Locale],
        tier: MatchTier,
    ) -> impl Iterator<Item = &'a PatternRule> + 'a {
        locales
            .iter()
            .flat_map(move |locale| self.get_patterns(field_type, *locale))
            .filter(move |rule| rule.tier == tier)
    }
}
