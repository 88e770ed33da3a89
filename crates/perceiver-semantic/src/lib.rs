//! Text-driven signal sources: the pattern registry, locale detection, the
//! three-tier label matcher and attribute matching.
pub mod attributes;
pub mod errors;
pub mod keywords;
pub mod language;
pub mod matcher;
pub mod patterns;
mod tables;

pub use attributes::AttributeSource;
pub use errors::{Result, SemanticError};
pub use language::{detect_text, DetectionSource, LocaleDetection, LocaleDetector};
pub use matcher::SemanticMatcher;
pub use patterns::{PatternRegistry, PatternRule, RuleMatcher, RuleView};
