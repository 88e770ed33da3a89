//! Error types for the semantic sources.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("language detection failed: {0}")]
    LanguageDetectionFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for semantic operations
pub type Result<T> = std::result::Result<T, SemanticError>;
