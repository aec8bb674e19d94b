//! Price ticker client

use serde::Deserialize;

use crate::clients::{ClientError, Http};

const SERVICE: &str = "Ticker";
const BASE_URL: &str = "https://www.binance.com/api";

/// Latest price for a trading symbol
#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub price: String,
    pub symbol: String,
}

pub struct TickerClient {
    http: Http,
}

impl TickerClient {
    pub fn new() -> Self {
        Self {
            http: Http::new(SERVICE, BASE_URL),
        }
    }

    /// Client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Http::new(SERVICE, base_url),
        }
    }

    pub async fn find_price(&self, symbol: &str) -> Result<Price, ClientError> {
        self.http
            .get("v3/ticker/price", &[("symbol", symbol.to_string())])
            .await
    }
}

impl Default for TickerClient {
    fn default() -> Self {
        Self::new()
    }
}
