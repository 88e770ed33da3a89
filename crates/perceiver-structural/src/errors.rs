use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("invalid page url: {0}")]
    InvalidUrl(String),
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("element not referenceable: {0}")]
    InvalidElement(String),
    #[error("structured data block rejected: {0}")]
    StructuredData(String),
}

pub type Result<T> = std::result::Result<T, StructuralError>;
