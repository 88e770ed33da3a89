//! Shared primitives for the FieldSense classification engine.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

pub mod field_type;
pub mod locale;
pub mod signal;

pub use field_type::FieldType;
pub use locale::Locale;
pub use signal::{
    clamp_unit, AggregationResult, Evidence, MatchTier, SectionType, SemanticContext, Signal,
    SourceId,
};

/// Errors raised while interpreting shared identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
}

/// Identity of one parsed document view.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PageId(pub String);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
