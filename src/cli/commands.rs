use clap::Subcommand;

use super::classify::ClassifyArgs;
use super::inspect::ContextArgs;
use super::patterns::PatternsArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Classify the form controls of an HTML file
    Classify(ClassifyArgs),

    /// Show the derived page context (locale, sections, structured hints)
    Context(ContextArgs),

    /// List the ordered matching rules of a field type
    Patterns(PatternsArgs),
}
