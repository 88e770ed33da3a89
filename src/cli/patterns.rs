use anyhow::{Context, Result};
use clap::Args;
use fieldsense_core_types::{FieldType, Locale};
use perceiver_semantic::RuleView;

use crate::cli::context::CliContext;
use crate::cli::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct PatternsArgs {
    /// Field type identifier, e.g. `expectedCompensation`
    pub field_type: String,

    /// Restrict to one locale (`en`, `de`, `fr`, `es`, `pt`, `hi`)
    #[arg(long)]
    pub locale: Option<String>,
}

pub async fn cmd_patterns(args: PatternsArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let field_type: FieldType = args
        .field_type
        .parse()
        .with_context(|| format!("unknown field type {}", args.field_type))?;
    let locale: Option<Locale> = args
        .locale
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("unsupported locale")?;

    let registry = ctx.registry().await?;
    let rules: Vec<RuleView> = match locale {
        Some(locale) => registry
            .get_patterns(field_type, locale)
            .iter()
            .map(|rule| rule.view())
            .collect(),
        None => registry
            .get_all_patterns(field_type)
            .into_iter()
            .map(|rule| rule.view())
            .collect(),
    };

    emit(&output, &rules, |rules| {
        if rules.is_empty() {
            println!("No rules for {}", field_type);
            return;
        }
        println!("{:<4} {:<8} {}", "LOC", "TIER", "PATTERN");
        for rule in rules {
            println!(
                "{:<4} {:<8} {}",
                rule.locale.code(),
                format!("{:?}", rule.tier).to_lowercase(),
                rule.pattern
            );
        }
    })
}
