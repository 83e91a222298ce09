//! Currency names, provider codes and conversion requests

use super::error::ConversionError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Converts an amount between two user-facing currency names.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    async fn convert(&self, source: &str, target: &str, amount: f64)
    -> Result<f64, ConversionError>;
}

/// Maps user-facing currency names to the codes a rate provider expects.
///
/// Names are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyMapping {
    codes: BTreeMap<String, String>,
}

impl CurrencyMapping {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let codes = entries
            .into_iter()
            .map(|(name, code)| (name.as_ref().to_lowercase(), code.into()))
            .collect();
        Self { codes }
    }

    /// Returns the provider code for `name`.
    pub fn resolve(&self, name: &str) -> Result<&str, ConversionError> {
        self.codes
            .get(&name.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| ConversionError::UnknownCurrency(name.to_string()))
    }

    /// Builds the provider query for a currency pair, checking `source` first.
    pub fn query(&self, source: &str, target: &str) -> Result<ProviderQuery, ConversionError> {
        let source_code = self.resolve(source)?;
        let target_code = self.resolve(target)?;
        Ok(ProviderQuery::new(source_code, target_code))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }
}

/// Pair key such as `USD_EUR`, sent as `q` and read back from the response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderQuery(String);

impl ProviderQuery {
    pub fn new(source_code: &str, target_code: &str) -> Self {
        ProviderQuery(format!("{source_code}_{target_code}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProviderQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub source: String,
    pub target: String,
    pub amount: f64,
    /// Amount as the user typed it, echoed back in the reply.
    pub amount_text: String,
}
