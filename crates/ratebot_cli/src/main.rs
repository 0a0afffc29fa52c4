mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use ratebot_core::config;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ratebot")]
#[command(about = "Currency exchange and utility bot for Discord")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Connect to Discord and serve commands
    Run,
    /// Show how a command would be understood, without any lookup
    Parse {
        /// Command text without the prefix, e.g. "usd100 myr"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Look up exchange rates and print the replies the bot would send
    Rates {
        /// Currency request, e.g. "usd 100 myr"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "ratebot.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    // The bot keeps a rolling log file; one-shot commands only log to stderr
    let _log_guard = match cli.command {
        Commands::Run => Some(init_bot_logging(cli.debug)),
        _ => {
            init_cli_logging(cli.debug);
            None
        }
    };

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {:?}", config_path);
        config::load_config(config_path).await?
    } else {
        info!("Loading config from standard locations");
        config::load_config_from_standard_locations().await?
    };

    // Environment wins over the file
    config.apply_env_overrides();
    config.validate()?;

    match &cli.command {
        Commands::Run => commands::bot::run(&config).await?,
        Commands::Parse { text } => commands::currency::parse(&text.join(" "))?,
        Commands::Rates { query } => commands::currency::rates(&config, &query.join(" ")).await?,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => commands::config::show(&config).await?,
            ConfigCommands::Save { path } => commands::config::save(&config, path).await?,
        },
    }

    Ok(())
}

fn log_filter(debug: bool) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    if debug {
        // Only show debug output from ratebot crates
        EnvFilter::new("ratebot_core=debug,ratebot_discord=debug,ratebot=debug,serenity=info,warn")
    } else {
        // Show info level for ratebot crates, warn for everything else
        EnvFilter::new("ratebot_core=info,ratebot_discord=info,ratebot=info,warn")
    }
}

fn init_cli_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug))
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .compact()
        .init();
}

/// Console plus a daily rolling file under `logs/`. The returned guard must
/// live as long as the bot so buffered lines reach the file.
fn init_bot_logging(debug: bool) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let file_appender = tracing_appender::rolling::daily("logs", "ratebot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log_filter(debug));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            // Console output
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
                .compact(),
        )
        .with(
            // File output
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .init();

    guard
}
