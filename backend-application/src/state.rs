use std::sync::Arc;

use backend_domain::ports::TradeApi;
use backend_domain::{Catalog, RuntimeConfig};

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub trade_api: Arc<dyn TradeApi>,
    pub catalog: Arc<Catalog>,
    pub metrics: Arc<Metrics>,
}
