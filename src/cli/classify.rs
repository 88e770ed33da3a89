use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use perceiver_hub::{element_path, ClassifiedField, EngineStats, FieldEngine};
use perceiver_structural::{clean_label, LabelSource};
use serde::Serialize;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// HTML file to classify
    pub file: PathBuf,

    /// URL the markup was served from
    #[arg(long)]
    pub url: Option<String>,

    /// Only classify controls matching this CSS selector
    #[arg(long)]
    pub selector: Option<String>,

    /// Use this caption instead of the one found in the markup
    #[arg(long)]
    pub label: Option<String>,

    /// Shorthand for `--output json`
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ClassifyReport {
    file: String,
    application_like: bool,
    fields: Vec<ClassifiedField>,
    stats: EngineStats,
}

pub async fn cmd_classify(args: ClassifyArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let output = if args.json { OutputFormat::Json } else { output };
    let doc = ctx.read_page(&args.file, args.url.as_deref()).await?;
    let engine = ctx.engine().await?;
    engine.load_page(doc.clone()).await;
    let application_like = engine
        .page_context_within(ctx.config().context_timeout())
        .await
        .context("building page context")?
        .application_like;

    let controls = match args.selector.as_deref() {
        Some(css) => doc
            .select(css)
            .with_context(|| format!("invalid selector {css}"))?
            .into_iter()
            .filter(|el| el.is_fillable_control())
            .collect(),
        None => doc.form_controls(),
    };
    info!(controls = controls.len(), file = %args.file.display(), "classifying controls");

    let fields = match args.label.as_deref() {
        Some(label) => {
            let mut fields = Vec::with_capacity(controls.len());
            for control in &controls {
                let result = engine.classify_field(control, Some(label)).await;
                fields.push(ClassifiedField {
                    path: element_path(control),
                    label: clean_label(label),
                    label_source: LabelSource::Override,
                    result,
                });
            }
            fields
        }
        None => engine.describe_fields(&controls).await,
    };


    let report = ClassifyReport {
        file: args.file.display().to_string(),
        application_like,
        fields,
        stats: engine.stats(),
    };
    emit(&output, &report, print_table)
}

fn print_table(report: &ClassifyReport) {
    println!("{}", report.file);
    println!(
        "application-like: {}",
        if report.application_like { "yes" } else { "no" }
    );
    println!();
    println!(
        "{:<40} {:<32} {:<22} {:>6}  {}",
        "CONTROL", "LABEL", "FIELD TYPE", "CONF", "SOURCES"
    );
    for field in &report.fields {
        let label = truncate(&field.label, 32);
        match &field.result {
            Some(result) => {
                let sources = result
                    .sources()
                    .iter()
                    .map(|source| source.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                println!(
                    "{:<40} {:<32} {:<22} {:>6.2}  {}",
                    truncate(&field.path, 40),
                    label,
                    result.field_type,
                    result.confidence,
                    sources
                );
            }
            None => println!(
                "{:<40} {:<32} {:<22} {:>6}  -",
                truncate(&field.path, 40),
                label,
                "-",
                "-"
            ),
        }
    }
    let decided = report.fields.iter().filter(|f| f.result.is_some()).count();
    println!();
    println!("{} of {} controls classified", decided, report.fields.len());
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
