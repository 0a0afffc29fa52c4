//! Ratebot Discord - Discord front-end
//!
//! Connects the command parser and service clients from `ratebot-core` to
//! Discord: prefix messages and the `/rate` slash command are routed to
//! registered commands or the currency lookup, and replies go back through
//! channel, DM or interaction followup destinations.

pub mod bot;
pub mod commands;
pub mod endpoints;
pub mod error;
pub mod routing;

pub use bot::{DiscordBotConfig, RatebotHandler, create_discord_client, run_discord_bot};
pub use commands::{Author, CommandHandler, CommandRegistry, Invocation};
pub use error::{DiscordError, Result};
pub use routing::{MessageRouter, Routed};

// Re-export serenity for convenience
pub use serenity;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        Author, CommandHandler, CommandRegistry, DiscordBotConfig, DiscordError, Invocation,
        MessageRouter, Result, Routed,
    };
}
