//! Live mid-market rates from the Wise API
//!
//! Unlike the daily Frankfurter rates this service needs a token. Without
//! one the client reports itself as unconfigured and never sends a request.

use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::{CoreError, Result};

use super::fetch_json;

const SERVICE: &str = "wise";

lazy_static! {
    /// An amount glued to a 3-4 letter code, e.g. `100eur`.
    static ref AMOUNT_WITH_CODE: Regex =
        Regex::new(r"^(\d*\.?\d+)([a-zA-Z]{3,4})$").unwrap();
}

/// A parsed `liverate` request.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRateRequest {
    pub amount: f64,
    pub source: String,
    pub target: String,
}

/// Why `liverate` arguments were rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveRateInput {
    /// No arguments at all.
    Missing,
    /// One argument, or more than three.
    WrongShape,
    /// Three arguments whose first is not a number.
    BadAmount,
}

impl LiveRateRequest {
    /// Read `[amount] <source> <target>`. With two arguments the amount may
    /// be glued to the source code (`100eur usd`); codes are upper-cased but
    /// not otherwise checked.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> std::result::Result<Self, LiveRateInput> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        let (amount, source, target) = match args.as_slice() {
            [] => return Err(LiveRateInput::Missing),
            [first, target] => match AMOUNT_WITH_CODE.captures(first) {
                Some(caps) => {
                    let amount = caps[1]
                        .parse::<f64>()
                        .map_err(|_| LiveRateInput::BadAmount)?;
                    (amount, caps[2].to_string(), *target)
                }
                None => (1.0, first.to_string(), *target),
            },
            [amount, source, target] => {
                let amount = amount
                    .parse::<f64>()
                    .ok()
                    .filter(|a| a.is_finite())
                    .ok_or(LiveRateInput::BadAmount)?;
                (amount, source.to_string(), *target)
            }
            _ => return Err(LiveRateInput::WrongShape),
        };

        Ok(Self {
            amount,
            source: source.to_uppercase(),
            target: target.to_uppercase(),
        })
    }
}

/// One quote as Wise returns it. `time` looks like `2024-05-17T10:43:31+0000`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LiveRate {
    pub rate: Option<f64>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub time: Option<String>,
}

impl LiveRate {
    /// Unix seconds of `time`, accepting offsets with or without a colon.
    pub fn timestamp(&self) -> Option<i64> {
        let time = self.time.as_deref()?;
        DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%z")
            .or_else(|_| DateTime::parse_from_rfc3339(time))
            .ok()
            .map(|dt| dt.timestamp())
    }
}

#[derive(Debug, Clone)]
pub struct LiveRateClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl LiveRateClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    pub async fn latest(&self, source: &str, target: &str) -> Result<Vec<LiveRate>> {
        let Some(token) = &self.token else {
            return Err(CoreError::invalid_response(SERVICE, "no API token configured"));
        };

        let request = self
            .http
            .get(&self.url)
            .bearer_auth(token)
            .query(&[("source", source), ("target", target)]);
        fetch_json(SERVICE, &self.url, request).await
    }
}

pub const NOT_CONFIGURED: &str = "Sorry, the live rate feature is not configured by the bot owner.";
pub const LOOKUP_FAILED: &str = "An unexpected error occurred.";
pub const MISSING_FIELDS: &str = "The API response was missing the rate or time.";

pub fn usage(prefix: &str) -> String {
    format!(
        "Usage: `{prefix}liverate [amount] <source> <target>`\n(e.g., `{prefix}liverate 100 EUR USD` or `{prefix}liverate EUR USD`)"
    )
}

pub fn input_error(prefix: &str, input: LiveRateInput) -> String {
    match input {
        LiveRateInput::Missing => usage(prefix),
        LiveRateInput::WrongShape => {
            format!("Invalid format. Please use `{prefix}liverate [amount] <source> <target>`.")
        }
        LiveRateInput::BadAmount => format!(
            "I couldn't understand your input. Please use a valid format like `{prefix}liverate 100 EUR USD`."
        ),
    }
}

/// Reply when Wise refuses the pair, usually because a code is unknown.
pub fn rejected(request: &LiveRateRequest) -> String {
    format!(
        "Sorry, I couldn't get a rate for **{}** to **{}**. Please check if the currency codes are valid.",
        request.source, request.target
    )
}

pub fn empty(request: &LiveRateRequest) -> String {
    format!(
        "The Wise API returned an unexpected response for {} to {}.",
        request.source, request.target
    )
}

/// `1234567.891` → `1,234,567.89`
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(formatted.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// The conversion, or `None` when the quote lacks a rate or a parseable time.
pub fn render(request: &LiveRateRequest, quote: &LiveRate) -> Option<String> {
    let rate = quote.rate?;
    let timestamp = quote.timestamp()?;

    let lines = [
        "**Live Rate**".to_string(),
        format!(
            "**{} {}** is equal to",
            group_thousands(request.amount),
            request.source
        ),
        format!(
            "# **`{} {}`**",
            group_thousands(request.amount * rate),
            request.target
        ),
        format!("**Live Rate:** 1 {} = {rate} {}", request.source, request.target),
        format!("**Rate As Of:** <t:{timestamp}:f>"),
        "-# Rates from Wise".to_string(),
    ];
    Some(lines.join("\n"))
}
