use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateRefreshError {
    #[error("exchange rate request failed: {0}")]
    Transport(String),
    #[error("exchange rate provider returned HTTP {0}")]
    Status(u16),
    #[error("exchange rate provider reported `{0}`")]
    Provider(String),
    #[error("exchange rate response could not be decoded: {0}")]
    Decode(String),
}

/// Source of USD-relative rates, keyed by currency code.
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_usd_rates(&self) -> Result<HashMap<String, Decimal>, RateRefreshError>;
}

pub const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://v6.exchangerate-api.com/v6";

/// Client for the exchangerate-api.com v6 `latest` endpoint.
pub struct ExchangeRateApiProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: HashMap<String, Decimal>,
}

impl ExchangeRateApiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, RateRefreshError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| RateRefreshError::Transport(error.to_string()))?;
        Ok(Self { client, base_url: base_url.into(), api_key })
    }

    fn latest_url(&self) -> String {
        format!("{}/{}/latest/USD", self.base_url.trim_end_matches('/'), self.api_key.expose_secret())
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    fn name(&self) -> &'static str {
        "exchangerate-api"
    }

    async fn fetch_usd_rates(&self) -> Result<HashMap<String, Decimal>, RateRefreshError> {
        let response = self
            .client
            .get(self.latest_url())
            .send()
            .await
            .map_err(|error| RateRefreshError::Transport(error.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateRefreshError::Status(status.as_u16()));
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|error| RateRefreshError::Decode(error.without_url().to_string()))?;

        parse_latest(body)
    }
}

fn parse_latest(body: LatestRatesResponse) -> Result<HashMap<String, Decimal>, RateRefreshError> {
    if body.result != "success" {
        return Err(RateRefreshError::Provider(body.error_type.unwrap_or(body.result)));
    }
    Ok(body.conversion_rates)
}
