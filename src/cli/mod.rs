pub mod app;
pub mod classify;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod inspect;
pub mod output;
pub mod patterns;
pub mod runtime;

pub use classify::{cmd_classify, ClassifyArgs};
pub use inspect::{cmd_context, ContextArgs};
pub use patterns::{cmd_patterns, PatternsArgs};
