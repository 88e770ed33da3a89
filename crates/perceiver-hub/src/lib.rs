//! Field classification engine.
//!
//! Collects signals from every configured source for one form control,
//! fuses them with the [`SignalAggregator`] and answers a single
//! `(field type, confidence)` decision or nothing.
//!
//! # Example
//!
//! ```rust,no_run
//! use perceiver_hub::{EngineConfig, FieldEngine, FieldEngineImpl};
//! use perceiver_structural::PageDocument;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = FieldEngineImpl::builtin(EngineConfig::default())?;
//! let doc = PageDocument::parse(r#"<label for="c">Expected CTC</label><input id="c">"#, None)?;
//! engine.load_page(doc.clone()).await;
//!
//! for control in doc.form_controls() {
//!     if let Some(result) = engine.classify_field(&control, None).await {
//!         println!("{} {:.2}", result.field_type, result.confidence);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod context;
pub mod errors;
pub mod hub;
pub mod models;
pub mod sources;

pub use aggregator::{AggregatorConfig, FieldScore, SignalAggregator, SourceWeights};
pub use context::PageContext;
pub use errors::{HubError, Result};
pub use hub::{element_path, FieldEngine, FieldEngineImpl};
pub use models::*;
pub use sources::{
    default_slots, AttributeSignalSource, PhraseSignalSource, SectionSignalSource, SignalSource,
    SourceSlot, StructuredSignalSource,
};
