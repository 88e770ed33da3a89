use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use perceiver_hub::FieldEngineImpl;
use perceiver_semantic::PatternRegistry;
use perceiver_structural::PageDocument;
use tokio::fs;
use tokio::sync::OnceCell;

use crate::config::FieldSenseConfig;

pub struct CliContext {
    config: Arc<FieldSenseConfig>,
    config_path: PathBuf,
    registry: OnceCell<Arc<PatternRegistry>>,
}

impl CliContext {
    pub fn new(config: FieldSenseConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            registry: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &FieldSenseConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub async fn registry(&self) -> Result<Arc<PatternRegistry>> {
        self.registry
            .get_or_try_init(|| async {
                PatternRegistry::builtin()
                    .map(Arc::new)
                    .context("Failed to build pattern registry")
            })
            .await
            .map(Arc::clone)
    }

    /// Fresh engine over the shared registry.
    pub async fn engine(&self) -> Result<FieldEngineImpl> {
        let registry = self.registry().await?;
        let engine = FieldEngineImpl::new(self.config.engine_config(), registry);
        engine.ensure_available()?;
        Ok(engine)
    }

    pub async fn read_page(&self, file: &Path, url: Option<&str>) -> Result<Arc<PageDocument>> {
        let html = fs::read_to_string(file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        PageDocument::parse(&html, url).with_context(|| format!("parsing {}", file.display()))
    }
}
