use async_trait::async_trait;

use crate::entities::Catalog;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Reads reference tables from `path`, falling back to the built-in catalog
    /// for sections the file does not define.
    async fn load_catalog(&self, path: &str) -> anyhow::Result<Catalog>;
}
