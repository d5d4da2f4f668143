use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{RuntimeConfig, TradeApiConfig};

pub const CONFIG_PATH_ENV: &str = "TRADE_SEARCH_CONFIG";
const ENV_PREFIX: &str = "TRADE_SEARCH_";
// The marketplace resolves at most this many ids per fetch call.
const MAX_FETCH_BATCH: usize = 10;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub trade_api_base_url: String,
    pub user_agent: String,
    pub default_league: String,
    pub default_realm: String,
    pub fetch_batch_size: usize,
    pub max_fetch_results: usize,
    pub fetch_retries: u32,
    pub upstream_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub catalog_path: Option<String>,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3235".to_string(),
            api_token: None,
            trade_api_base_url: "https://www.pathofexile.com".to_string(),
            user_agent: concat!("trade-search-backend/", env!("CARGO_PKG_VERSION")).to_string(),
            default_league: "Standard".to_string(),
            default_realm: "poe2".to_string(),
            fetch_batch_size: MAX_FETCH_BATCH,
            max_fetch_results: 100,
            fetch_retries: 0,
            upstream_timeout_seconds: 20,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            catalog_path: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `TRADE_SEARCH_CONFIG`, or `./config.toml`. A missing file means defaults.
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let path = path
            .map(ToString::to_string)
            .or_else(|| env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", path, err))?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.catalog_path = non_blank(self.catalog_path.take());
        self.log_dir = non_blank(self.log_dir.take());
        self.trade_api_base_url = self.trade_api_base_url.trim().trim_end_matches('/').to_string();
        self.user_agent = self.user_agent.trim().to_string();
        self.default_league = self.default_league.trim().to_string();
        self.default_realm = self.default_realm.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if !self.trade_api_base_url.starts_with("http://")
            && !self.trade_api_base_url.starts_with("https://")
        {
            return Err(anyhow!("trade_api_base_url must be an http(s) url"));
        }
        if self.user_agent.is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }
        if self.default_league.is_empty() || self.default_realm.is_empty() {
            return Err(anyhow!("default_league and default_realm must not be empty"));
        }
        if self.fetch_batch_size == 0 || self.fetch_batch_size > MAX_FETCH_BATCH {
            return Err(anyhow!(
                "fetch_batch_size must be between 1 and {}",
                MAX_FETCH_BATCH
            ));
        }
        if self.max_fetch_results == 0 {
            return Err(anyhow!("max_fetch_results must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 || self.upstream_timeout_seconds == 0 {
            return Err(anyhow!("timeouts must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            default_league: self.default_league.clone(),
            default_realm: self.default_realm.clone(),
            fetch_batch_size: self.fetch_batch_size,
            max_fetch_results: self.max_fetch_results,
            fetch_retries: self.fetch_retries,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_trade_api_config(&self) -> TradeApiConfig {
        TradeApiConfig {
            base_url: self.trade_api_base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout_seconds: self.upstream_timeout_seconds,
        }
    }

    /// Applies `TRADE_SEARCH_*` overrides; unparsable numbers keep the current value.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = var("API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = var("TRADE_API_BASE_URL") {
            self.trade_api_base_url = value;
        }
        if let Some(value) = var("USER_AGENT") {
            self.user_agent = value;
        }
        if let Some(value) = var("DEFAULT_LEAGUE") {
            self.default_league = value;
        }
        if let Some(value) = var("DEFAULT_REALM") {
            self.default_realm = value;
        }
        if let Some(value) = var("FETCH_BATCH_SIZE") {
            self.fetch_batch_size = value.parse().unwrap_or(self.fetch_batch_size);
        }
        if let Some(value) = var("MAX_FETCH_RESULTS") {
            self.max_fetch_results = value.parse().unwrap_or(self.max_fetch_results);
        }
        if let Some(value) = var("FETCH_RETRIES") {
            self.fetch_retries = value.parse().unwrap_or(self.fetch_retries);
        }
        if let Some(value) = var("UPSTREAM_TIMEOUT_SECONDS") {
            self.upstream_timeout_seconds = value.parse().unwrap_or(self.upstream_timeout_seconds);
        }
        if let Some(value) = var("MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = var("REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = var("CATALOG_PATH") {
            self.catalog_path = Some(value);
        }
        if let Some(value) = var("LOG_DIR") {
            self.log_dir = Some(value);
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.catalog_path = self.catalog_path.as_deref().map(|path| resolve_path(base, path));
        self.log_dir = self.log_dir.as_deref().map(|path| resolve_path(base, path));
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
