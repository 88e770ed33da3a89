//! Error types for the field engine.

use fieldsense_core_types::SourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("semantic error: {0}")]
    Semantic(#[from] perceiver_semantic::SemanticError),

    #[error("page context error: {0}")]
    Context(String),

    #[error("signal source {source_id} failed: {message}")]
    Source { source_id: SourceId, message: String },

    #[error("no signal source available: {0}")]
    Unavailable(String),

    #[error("no page loaded")]
    NoPage,

    #[error("timed out: {0}")]
    Timeout(String),
}

impl HubError {
    pub fn source_failed(source_id: SourceId, message: impl Into<String>) -> Self {
        Self::Source {
            source_id,
            message: message.into(),
        }
    }
}

/// Result type for hub operations
pub type Result<T> = std::result::Result<T, HubError>;
