use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::core::config::ConverterConfig;
use crate::core::{ConversionError, CurrencyConverter, CurrencyMapping};

const USER_AGENT: &str = concat!("ratebot/", env!("CARGO_PKG_VERSION"));

/// Converter backed by an HTTP rate provider that answers `GET ?q=SRC_TGT`
/// with a JSON object such as `{"SRC_TGT": 1.23}`.
pub struct RateApiConverter {
    url: String,
    params: BTreeMap<String, String>,
    mapping: CurrencyMapping,
    client: reqwest::Client,
}

impl RateApiConverter {
    pub fn new(
        url: &str,
        params: BTreeMap<String, String>,
        mapping: CurrencyMapping,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(RateApiConverter {
            url: url.to_string(),
            params,
            mapping,
            client,
        })
    }

    pub fn from_config(config: &ConverterConfig) -> anyhow::Result<Self> {
        Self::new(&config.url, config.params.clone(), config.mapping())
    }

    async fn fetch_rate(&self, query: &str) -> Result<f64, ConversionError> {
        let mut params = self.params.clone();
        params.insert("q".to_string(), query.to_string());

        debug!("Requesting rate for {} from {}", query, self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the configured params, API keys included
                let e = e.without_url();
                ConversionError::ProviderUnavailable(format!("request error for {query}: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(ConversionError::ProviderUnavailable(format!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                query
            )));
        }

        let text = response.text().await.map_err(|e| {
            let e = e.without_url();
            ConversionError::ProviderUnavailable(format!("failed to read response for {query}: {e}"))
        })?;

        let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .map_err(|e| {
                ConversionError::MalformedResponse(format!(
                    "failed to parse JSON response for {query}: {e}"
                ))
            })?;

        let value = data.get(query).ok_or_else(|| {
            ConversionError::MalformedResponse(format!("no rate found for {query}"))
        })?;

        value.as_f64().ok_or_else(|| {
            ConversionError::MalformedResponse(format!("rate for {query} is not a number: {value}"))
        })
    }
}

#[async_trait]
impl CurrencyConverter for RateApiConverter {
    #[instrument(name = "RateApiConvert", skip(self), fields(source = %source, target = %target))]
    async fn convert(
        &self,
        source: &str,
        target: &str,
        amount: f64,
    ) -> Result<f64, ConversionError> {
        let query = self.mapping.query(source, target)?;
        let rate = self.fetch_rate(query.as_str()).await?;
        debug!(%query, rate, amount, "Converted amount");
        Ok(rate * amount)
    }
}
