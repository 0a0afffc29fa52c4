//! Bank Negara Malaysia Kuala Lumpur USD/MYR reference rate

use serde::Deserialize;

use crate::Result;

use super::fetch_json;

const SERVICE: &str = "bnm";
const ACCEPT: &str = "application/vnd.BNM.API.v1+json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceRateResponse {
    #[serde(default)]
    pub data: ReferenceRateData,
    #[serde(default)]
    pub meta: ReferenceRateMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReferenceRateData {
    pub date: Option<String>,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReferenceRateMeta {
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReferenceRateClient {
    http: reqwest::Client,
    url: String,
}

impl ReferenceRateClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn latest(&self) -> Result<ReferenceRateResponse> {
        let request = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, ACCEPT);
        fetch_json(SERVICE, &self.url, request).await
    }
}

/// Status line sent before the lookup.
pub const FETCHING: &str = "Fetching the latest USD/MYR rate...";

/// Sent when BNM cannot be reached.
pub const UNAVAILABLE: &str = "Could not connect to the BNM API. Please try again later.";

pub fn render(response: &ReferenceRateResponse) -> Vec<String> {
    let na = || "N/A".to_string();
    let rate = response
        .data
        .rate
        .map(|r| r.to_string())
        .unwrap_or_else(na);

    vec![
        "**USD/MYR Reference Rate**".to_string(),
        "The latest Kuala Lumpur USD/MYR reference rate.".to_string(),
        format!("**1 USD = {rate} MYR**"),
        format!("Date: {}", response.data.date.clone().unwrap_or_else(na)),
        format!(
            "Last Updated: {}",
            response.meta.last_updated.clone().unwrap_or_else(na)
        ),
        "Source: Bank Negara Malaysia (BNM)".to_string(),
    ]
}
