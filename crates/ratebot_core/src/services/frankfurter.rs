use async_trait::async_trait;

use crate::{RateSource, RateTable, Result};

use super::fetch_json;

const SERVICE: &str = "frankfurter";

/// Daily reference rates from the Frankfurter API.
#[derive(Debug, Clone)]
pub struct FrankfurterClient {
    http: reqwest::Client,
    endpoint: String,
}

impl FrankfurterClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Query parameters for a lookup. The amount is never sent; scaling is
    /// done locally so the listing matches what the user typed.
    fn query(base: &str, target: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![("base", base.to_uppercase())];
        if let Some(target) = target {
            query.push(("to", target.to_uppercase()));
        }
        query
    }
}

#[async_trait]
impl RateSource for FrankfurterClient {
    async fn latest(&self, base: &str, target: Option<&str>) -> Result<RateTable> {
        let request = self
            .http
            .get(&self.endpoint)
            .query(&Self::query(base, target));
        let table: RateTable = fetch_json(SERVICE, &self.endpoint, request).await?;

        tracing::info!(
            "Fetched {} rate(s) for {} as of {}",
            table.rates.len(),
            table.base,
            table.date
        );
        Ok(table)
    }
}
