pub mod trade_api_client;

pub use trade_api_client::*;
