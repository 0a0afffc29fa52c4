use std::sync::Arc;

use miette::Result;
use owo_colors::OwoColorize;
use ratebot_core::RatebotConfig;
use ratebot_discord::{DiscordBotConfig, MessageRouter, run_discord_bot};

use crate::output::Output;

/// Connect to Discord and serve until the client stops.
pub async fn run(config: &RatebotConfig) -> Result<()> {
    let output = Output::new();

    config.validate_for_bot()?;
    let bot_config = DiscordBotConfig::from_settings(&config.discord)?;
    let router = Arc::new(MessageRouter::from_config(config)?);

    output.section("Starting Ratebot");
    output.info("Prefix:", &router.prefix().bright_yellow().to_string());
    output.info("Commands:", &router.registry().names().join(", "));
    output.info("Rates:", &config.rates.endpoint);
    if bot_config.register_slash_commands {
        output.status("The /rate slash command will be registered once connected");
    }
    println!();

    run_discord_bot(bot_config, router).await?;
    Ok(())
}
