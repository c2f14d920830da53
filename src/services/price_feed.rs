use crate::errors::FetchError;
use crate::models::ExchangeRateTable;
use crate::services::http::HttpFetcher;
use chrono::Utc;
use log::info;
use std::sync::Arc;

/// Spot price of the native token from a CoinGecko-compatible API.
#[derive(Clone)]
pub struct PriceFeed {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
    asset_id: String,
}

impl PriceFeed {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, base_url: &str, asset_id: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            asset_id: asset_id.to_string(),
        }
    }

    pub fn price_url(&self) -> String {
        format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd,eur",
            self.base_url, self.asset_id
        )
    }

    pub async fn fetch_rates(&self) -> Result<ExchangeRateTable, FetchError> {
        let body = self.fetcher.get_json(&self.price_url()).await?;
        let quote = &body[self.asset_id.as_str()];
        let rate = |currency: &str| {
            quote[currency].as_f64().ok_or_else(|| {
                FetchError::Decode(format!("no {} price for {}", currency, self.asset_id))
            })
        };

        let table = ExchangeRateTable {
            usd: rate("usd")?,
            eur: rate("eur")?,
            fetched_at: Utc::now(),
        };
        info!(
            "1 {} = {} USD / {} EUR",
            self.asset_id, table.usd, table.eur
        );
        Ok(table)
    }
}
