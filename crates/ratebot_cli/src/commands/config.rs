use std::path::Path;

use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use ratebot_core::{RatebotConfig, config};

use crate::output::Output;

/// Show current configuration
pub async fn show(config: &RatebotConfig) -> Result<()> {
    let output = Output::new();

    output.section("Current Configuration");
    if !config.discord.token.is_empty() {
        output.status("(discord.token is set and not shown)");
    }
    if config.services.live_rate_token.is_some() {
        output.status("(services.live_rate_token is set and not shown)");
    }
    println!();

    let shown = config.without_secrets();
    let toml_str = toml::to_string_pretty(&shown).into_diagnostic()?;
    println!("{}", toml_str);

    Ok(())
}

/// Save current configuration to file. Tokens are left out so the file can
/// be shared; they are read from `DISCORD_TOKEN` and `WISE_SANDBOX_TOKEN`.
pub async fn save(config: &RatebotConfig, path: &Path) -> Result<()> {
    let output = Output::new();

    output.info(
        "💾",
        &format!("Saving configuration to: {}", path.display()),
    );

    config::save_config(&config.without_secrets(), path).await?;

    output.success("Configuration saved successfully!");
    println!();
    println!("To use this configuration, run:");
    println!(
        "  {} --config {} run",
        "ratebot".bright_green(),
        path.display()
    );

    Ok(())
}
