// Runtime configuration handed to the application layer

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub default_league: String,
    pub default_realm: String,
    pub fetch_batch_size: usize,
    pub max_fetch_results: usize,
    pub fetch_retries: u32,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3235".to_string(),
            api_token: None,
            default_league: "Standard".to_string(),
            default_realm: "poe2".to_string(),
            fetch_batch_size: 10,
            max_fetch_results: 100,
            fetch_retries: 0,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TradeApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}
