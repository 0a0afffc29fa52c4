//! Exchange-rate tables and their chat rendering

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ChunkFormatter, CurrencyIntent, Result};

/// Latest rates for one unit of `base`, as returned by the rate service.
///
/// `rates` keeps the order the service sent them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub date: String,
    #[serde(default)]
    pub rates: IndexMap<String, f64>,
}

impl RateTable {
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Something that can look up the latest rates for a base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch rates for one unit of `base`, optionally narrowed to `target`.
    async fn latest(&self, base: &str, target: Option<&str>) -> Result<RateTable>;
}

/// Progress message sent while the lookup is in flight.
pub fn status_line(intent: &CurrencyIntent) -> String {
    format!(
        "Fetching exchange rates for {} (amount: {:.2}), please wait...",
        intent.base_currency, intent.amount
    )
}

/// Message sent when the rate service could not be reached.
pub const LOOKUP_FAILED: &str =
    "Sorry, I couldn't fetch the exchange rates at this moment. Please try again later.";

/// One display line per rate, scaled by `amount`, in table order.
pub fn render_lines(table: &RateTable, amount: f64) -> Vec<String> {
    table
        .rates
        .iter()
        .map(|(currency, rate_for_one)| format!("  - {}: {:.4}", currency, rate_for_one * amount))
        .collect()
}

/// Build every message answering `intent` from `table`.
pub fn render_reply(
    intent: &CurrencyIntent,
    table: &RateTable,
    formatter: &ChunkFormatter,
) -> Vec<String> {
    if table.is_empty() {
        return vec![format!(
            "No rates found for {base}. Please ensure '{base}' is a valid currency code supported by the Frankfurter API.",
            base = table.base
        )];
    }

    let header = format!(
        "**Exchange Rates for {:.2} {} (as of {}):**",
        intent.amount, table.base, table.date
    );

    match &intent.target_currency {
        Some(target) => {
            let line = match table.rate_for(target) {
                Some(rate_for_one) => format!(
                    "**{:.2} {} = {:.4} {}**",
                    intent.amount,
                    table.base,
                    intent.convert(rate_for_one),
                    target
                ),
                None => format!(
                    "Could not find rate for {target}. Please ensure '{target}' is a valid currency code."
                ),
            };
            vec![format!("{header}\n{line}")]
        }
        None => formatter.compose(Some(&header), &render_lines(table, intent.amount)),
    }
}

/// Look up and render a full reply. Lookup failures become [`LOOKUP_FAILED`].
pub async fn answer(
    source: &dyn RateSource,
    intent: &CurrencyIntent,
    formatter: &ChunkFormatter,
) -> Vec<String> {
    match source
        .latest(&intent.base_currency, intent.target_currency.as_deref())
        .await
    {
        Ok(table) => render_reply(intent, &table, formatter),
        Err(e) => {
            tracing::warn!("Rate lookup for {} failed: {:?}", intent.base_currency, e);
            vec![LOOKUP_FAILED.to_string()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use pretty_assertions::assert_eq;

    fn table(rates: &[(&str, f64)]) -> RateTable {
        RateTable {
            base: "USD".to_string(),
            date: "2024-05-17".to_string(),
            rates: rates.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_decode_keeps_service_order() {
        let json = r#"{"amount":1.0,"base":"USD","date":"2024-05-17","rates":{"ZAR":18.2,"AUD":1.5,"MYR":4.69}}"#;
        let table: RateTable = serde_json::from_str(json).unwrap();
        let codes: Vec<&str> = table.rates.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["ZAR", "AUD", "MYR"]);
    }

    #[test]
    fn test_render_lines_scales_amount() {
        let lines = render_lines(&table(&[("EUR", 0.92), ("JPY", 155.5)]), 10.0);
        assert_eq!(
            lines,
            vec!["  - EUR: 9.2000".to_string(), "  - JPY: 1555.0000".to_string()]
        );
    }

    #[test]
    fn test_reply_for_target() {
        let intent = CurrencyIntent::new("usd").with_amount(100.0).with_target("myr");
        let reply = render_reply(&intent, &table(&[("MYR", 4.69)]), &ChunkFormatter::default());
        assert_eq!(
            reply,
            vec![
                "**Exchange Rates for 100.00 USD (as of 2024-05-17):**\n**100.00 USD = 469.0000 MYR**"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_reply_for_unknown_target() {
        let intent = CurrencyIntent::new("usd").with_target("xyz");
        let reply = render_reply(&intent, &table(&[("MYR", 4.69)]), &ChunkFormatter::default());
        assert_eq!(reply.len(), 1);
        assert!(reply[0].ends_with("Could not find rate for XYZ. Please ensure 'XYZ' is a valid currency code."));
    }

    #[test]
    fn test_reply_for_empty_table() {
        let intent = CurrencyIntent::new("usd");
        let reply = render_reply(&intent, &table(&[]), &ChunkFormatter::default());
        assert_eq!(
            reply,
            vec!["No rates found for USD. Please ensure 'USD' is a valid currency code supported by the Frankfurter API.".to_string()]
        );
    }

    #[test]
    fn test_reply_all_rates_fits_one_message() {
        let intent = CurrencyIntent::new("usd");
        let reply = render_reply(
            &intent,
            &table(&[("EUR", 0.5), ("GBP", 0.25)]),
            &ChunkFormatter::default(),
        );
        assert_eq!(
            reply,
            vec![
                "**Exchange Rates for 1.00 USD (as of 2024-05-17):**\n```\n  - EUR: 0.5000\n  - GBP: 0.2500\n```"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_status_line() {
        let intent = CurrencyIntent::new("usd").with_amount(100.0);
        assert_eq!(
            status_line(&intent),
            "Fetching exchange rates for USD (amount: 100.00), please wait..."
        );
    }

    /// Fixed table; records the last query it saw.
    struct StaticRates {
        table: Option<RateTable>,
        seen: parking_lot::Mutex<Option<(String, Option<String>)>>,
    }

    impl StaticRates {
        fn new(table: Option<RateTable>) -> Self {
            Self {
                table,
                seen: parking_lot::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RateSource for StaticRates {
        async fn latest(&self, base: &str, target: Option<&str>) -> Result<RateTable> {
            *self.seen.lock() = Some((base.to_string(), target.map(str::to_string)));
            self.table
                .clone()
                .ok_or_else(|| CoreError::invalid_response("frankfurter", "boom"))
        }
    }

    #[tokio::test]
    async fn test_answer_passes_target_to_source() {
        let source = StaticRates::new(Some(table(&[("MYR", 4.0)])));

        let intent = CurrencyIntent::new("usd").with_amount(2.0).with_target("myr");
        let reply = answer(&source, &intent, &ChunkFormatter::default()).await;

        assert!(reply[0].ends_with("**2.00 USD = 8.0000 MYR**"));
        assert_eq!(
            source.seen.lock().clone(),
            Some(("USD".to_string(), Some("MYR".to_string())))
        );
    }

    #[tokio::test]
    async fn test_answer_reports_lookup_failure() {
        let source = StaticRates::new(None);

        let reply = answer(&source, &CurrencyIntent::new("usd"), &ChunkFormatter::default()).await;
        assert_eq!(reply, vec![LOOKUP_FAILED.to_string()]);
    }
}
