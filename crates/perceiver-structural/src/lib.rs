//! Structural signal sources: the owned DOM view, control judges, caption
//! resolution, form sections, embedded schema metadata and the result cache.

pub mod cache;
pub mod dom;
pub mod errors;
pub mod judges;
pub mod label;
pub mod metrics;
pub mod sections;
pub mod structured;

pub use cache::{CacheCategory, CacheTtls, CachedValue, ResultCache};
pub use dom::{Element, ElementKey, NodeId, PageDocument};
pub use errors::{Result, StructuralError};
pub use judges::{JudgeReport, StyleHints};
pub use label::{clean_label, LabelExtractor, LabelSource, ResolvedLabel};
pub use metrics::{CacheMetric, CacheStats};
pub use sections::{expected_field_types, PageSection, SectionContext, SectionSource};
pub use structured::{JobPostingSummary, SchemaHint, StructuredDataSource, StructuredHints};
