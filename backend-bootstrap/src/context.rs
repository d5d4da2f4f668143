use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::{AppState, Metrics};
use backend_domain::{Catalog, CatalogRepository};
use backend_infrastructure::{AppConfig, CatalogFileRepository, TradeApiClient};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let trade_api = TradeApiClient::new(&config.to_trade_api_config())?;

        let catalog = match &config.catalog_path {
            Some(path) => CatalogFileRepository::new().load_catalog(path).await?,
            None => Catalog::builtin(),
        };
        info!(
            base_url = %config.trade_api_base_url,
            league = %runtime_config.default_league,
            realm = %runtime_config.default_realm,
            "trade api configured"
        );

        let state = AppState {
            config: runtime_config,
            trade_api: Arc::new(trade_api),
            catalog: Arc::new(catalog),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
