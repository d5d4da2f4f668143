use std::path::Path;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use backend_domain::{Catalog, CatalogOverrides, CatalogRepository};

/// Reads catalog overrides from JSON, or YAML when the extension says so.
pub struct CatalogFileRepository;

impl CatalogFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CatalogFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for CatalogFileRepository {
    async fn load_catalog(&self, path: &str) -> anyhow::Result<Catalog> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read catalog {}", path))?;
        let overrides: CatalogOverrides = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|err| anyhow!("invalid catalog {}: {}", path, err))?
        } else {
            serde_json::from_str(&content).map_err(|err| anyhow!("invalid catalog {}: {}", path, err))?
        };
        let catalog = overrides.apply_to(Catalog::builtin());
        info!(
            path,
            categories = catalog.categories.len(),
            stats = catalog.stats.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

fn is_yaml(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
