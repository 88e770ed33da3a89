use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Print `value` as JSON or YAML; `human` renders the default view.
pub fn emit<T, F>(format: &OutputFormat, value: &T, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Human => human(value),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).context("serializing output")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value).context("serializing output")?;
            print!("{yaml}");
        }
    }
    Ok(())
}
