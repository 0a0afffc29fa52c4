use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use ratebot_core::RatebotConfig;
use ratebot_discord::{Author, MessageRouter, Routed};

use crate::output::{Output, StdoutSink};

/// Print how `text` parses, as the bot would read it after the prefix.
pub fn parse(text: &str) -> Result<()> {
    let output = Output::new();

    match ratebot_core::parse(text) {
        Some(intent) => {
            output.section("Currency Request");
            output.info("Base:", &intent.base_currency);
            output.info("Amount:", &format!("{:.2}", intent.amount));
            output.info(
                "Target:",
                intent.target_currency.as_deref().unwrap_or("(all rates)"),
            );
            println!();
            println!(
                "{}",
                serde_json::to_string_pretty(&intent).into_diagnostic()?
            );
        }
        None => {
            output.warning(&format!(
                "'{}' is not a currency request",
                text.bright_yellow()
            ));
        }
    }

    Ok(())
}

/// Run a currency request against the live rate service and print every
/// message the bot would send.
pub async fn rates(config: &RatebotConfig, query: &str) -> Result<()> {
    let router = MessageRouter::from_config(config)?;

    let sink = StdoutSink::new();
    let routed = router
        .route_query(&Author::new(0, "cli"), query, &sink)
        .await?;

    if let Routed::Currency(intent) = routed {
        tracing::debug!("Answered {}", intent);
    }
    Ok(())
}
