use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use perceiver_hub::{FieldEngine, PageContext};

use crate::cli::context::CliContext;
use crate::cli::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ContextArgs {
    /// HTML file to inspect
    pub file: PathBuf,

    /// URL the markup was served from
    #[arg(long)]
    pub url: Option<String>,
}

pub async fn cmd_context(args: ContextArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let doc = ctx.read_page(&args.file, args.url.as_deref()).await?;
    let engine = ctx.engine().await?;
    engine.load_page(doc).await;

    let context = engine
        .page_context_within(ctx.config().context_timeout())
        .await?;
    emit(&output, context.as_ref(), print_summary)
}

fn print_summary(context: &PageContext) {
    println!("=== Page context ===");
    if let Some(url) = &context.url {
        println!("URL: {}", url);
    }
    println!(
        "Locale: {} ({:.0}%, {:?})",
        context.locale.locale,
        context.locale.confidence * 100.0,
        context.locale.source
    );
    let locales: Vec<&str> = context.match_locales.iter().map(|l| l.code()).collect();
    println!("Matching locales: {}", locales.join(", "));
    println!(
        "Application-like: {} ({} visible controls)",
        context.application_like, context.visible_controls
    );

    if context.sections.is_empty() {
        println!("\nSections: none");
    } else {
        println!("\nSections:");
        for section in &context.sections {
            println!(
                "- {} \"{}\" ({:.2})",
                section.section_type.as_str(),
                section.heading,
                section.confidence
            );
        }
    }

    let structured = &context.structured;
    println!(
        "\nStructured data: {} block(s), {} rejected",
        structured.blocks, structured.rejected_blocks
    );
    if let Some(posting) = &structured.job_posting {
        println!(
            "Job posting: {} at {}",
            posting.title.as_deref().unwrap_or("?"),
            posting.company.as_deref().unwrap_or("?")
        );
    }
    for hint in &structured.hints {
        println!(
            "- {} <- {} = \"{}\" ({:.2})",
            hint.field_type, hint.property, hint.value, hint.confidence
        );
    }
}
