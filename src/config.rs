//! Configuration for the `fieldsense` binary.
//!
//! Loaded from YAML; every section falls back to defaults. A few values can
//! be overridden from the environment.

use std::time::Duration;

use fieldsense_core_types::Locale;
use perceiver_hub::{AggregatorConfig, EngineConfig, LocaleConfig};
use perceiver_structural::CacheTtls;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_MIN_CONFIDENCE: &str = "FIELDSENSE_MIN_CONFIDENCE";
pub const ENV_DEFAULT_LOCALE: &str = "FIELDSENSE_DEFAULT_LOCALE";
const ENV_LANG: &str = "LANG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: String, value: String },

    #[error("{0} must be within [0, 1]")]
    OutOfRange(&'static str),

    #[error("max_confidence must not be below min_confidence")]
    InvertedBounds,
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSenseConfig {
    /// Scoring parameters
    pub aggregator: AggregatorConfig,

    /// Result cache time-to-live per category
    pub cache: CacheTtls,

    /// Locale detection options
    pub locale: LocaleSection,

    /// Engine behaviour
    pub engine: EngineSection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSection {
    /// Explicit fallback locale. When unset, `LANG` decides, then English.
    pub default_locale: Option<Locale>,

    /// Below this detection confidence the matcher consults every locale
    pub low_confidence_threshold: f64,
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            default_locale: None,
            low_confidence_threshold: LocaleConfig::default().low_confidence_threshold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Skip controls judged not visible during batch classification
    pub skip_hidden: bool,

    /// Bound for building the page context, in milliseconds
    pub context_timeout_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            skip_hidden: true,
            context_timeout_ms: 2_000,
        }
    }
}

impl FieldSenseConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<Vec<&'static str>, ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; returns the keys that were applied.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<Vec<&'static str>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        if let Some(raw) = lookup(ENV_MIN_CONFIDENCE) {
            let value: f64 = raw.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_MIN_CONFIDENCE.to_string(),
                value: raw.clone(),
            })?;
            self.aggregator.min_confidence = value;
            applied.push(ENV_MIN_CONFIDENCE);
        }
        if let Some(raw) = lookup(ENV_DEFAULT_LOCALE) {
            let locale = Locale::from_tag(&raw).ok_or_else(|| ConfigError::InvalidOverride {
                key: ENV_DEFAULT_LOCALE.to_string(),
                value: raw.clone(),
            })?;
            self.locale.default_locale = Some(locale);
            applied.push(ENV_DEFAULT_LOCALE);
        }
        if self.locale.default_locale.is_none() {
            self.locale.default_locale = lookup(ENV_LANG).and_then(|lang| Locale::from_tag(&lang));
        }
        self.validate()?;
        Ok(applied)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |value: f64| (0.0..=1.0).contains(&value);
        if !unit(self.aggregator.min_confidence) {
            return Err(ConfigError::OutOfRange("aggregator.min_confidence"));
        }
        if !unit(self.aggregator.max_confidence) {
            return Err(ConfigError::OutOfRange("aggregator.max_confidence"));
        }
        if !unit(self.locale.low_confidence_threshold) {
            return Err(ConfigError::OutOfRange("locale.low_confidence_threshold"));
        }
        if self.aggregator.max_confidence < self.aggregator.min_confidence {
            return Err(ConfigError::InvertedBounds);
        }
        Ok(())
    }

    pub fn default_locale(&self) -> Locale {
        self.locale.default_locale.unwrap_or_default()
    }

    pub fn context_timeout(&self) -> Duration {
        Duration::from_millis(self.engine.context_timeout_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            aggregator: self.aggregator.clone(),
            cache: self.cache.clone(),
            locale: LocaleConfig {
                default_locale: self.default_locale(),
                low_confidence_threshold: self.locale.low_confidence_threshold,
            },
            skip_hidden: self.engine.skip_hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: FieldSenseConfig = serde_yaml::from_str(
            "aggregator:\n  min_confidence: 0.7\nengine:\n  context_timeout_ms: 500\n",
        )
        .unwrap();
        assert_eq!(config.aggregator.min_confidence, 0.7);
        assert_eq!(config.aggregator.max_confidence, 0.95);
        assert_eq!(config.aggregator.weights.structured_data, 1.2);
        assert!(config.engine.skip_hidden);
        assert_eq!(config.context_timeout(), Duration::from_millis(500));
        assert_eq!(config.cache.label_ms, 5_000);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = FieldSenseConfig::default();
        let applied = config
            .apply_overrides_from(lookup(&[
                (ENV_MIN_CONFIDENCE, "0.65"),
                (ENV_DEFAULT_LOCALE, "fr-CA"),
            ]))
            .unwrap();
        assert_eq!(applied, vec![ENV_MIN_CONFIDENCE, ENV_DEFAULT_LOCALE]);
        assert_eq!(config.aggregator.min_confidence, 0.65);
        assert_eq!(config.engine_config().locale.default_locale, Locale::Fr);
    }

    #[test]
    fn lang_is_the_fallback_locale() {
        let mut config = FieldSenseConfig::default();
        config
            .apply_overrides_from(lookup(&[("LANG", "de_DE.UTF-8")]))
            .unwrap();
        assert_eq!(config.default_locale(), Locale::De);

        let mut config = FieldSenseConfig::default();
        config.apply_overrides_from(lookup(&[("LANG", "C")])).unwrap();
        assert_eq!(config.default_locale(), Locale::En);
    }

    #[test]
    fn bad_overrides_are_rejected() {
        let mut config = FieldSenseConfig::default();
        assert!(matches!(
            config.apply_overrides_from(lookup(&[(ENV_MIN_CONFIDENCE, "high")])),
            Err(ConfigError::InvalidOverride { .. })
        ));
        let mut config = FieldSenseConfig::default();
        assert!(matches!(
            config.apply_overrides_from(lookup(&[(ENV_MIN_CONFIDENCE, "1.5")])),
            Err(ConfigError::OutOfRange(_))
        ));
        let mut config = FieldSenseConfig::default();
        assert!(config
            .apply_overrides_from(lookup(&[(ENV_DEFAULT_LOCALE, "klingon")]))
            .is_err());
    }
}
