//! Ratebot Core - command parsing and reply formatting
//!
//! This crate turns chat commands such as `!usd100 myr` into structured
//! currency intents, renders exchange-rate tables into message-sized
//! chunks, and provides the HTTP clients and state collaborators the bot
//! front-ends build on.

pub mod chunk;
pub mod command;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod rates;
pub mod send;
pub mod services;
pub mod store;

pub use chunk::{ChunkFormatter, DEFAULT_CHUNK_SIZE, DISCORD_MESSAGE_LIMIT, chunk};
pub use command::{CurrencyIntent, RawCommand, parse};
pub use config::RatebotConfig;
pub use cooldown::Cooldown;
pub use error::{CoreError, Result};
pub use rates::{RateSource, RateTable};
pub use send::{Sendable, deliver};
pub use store::{MemoryStore, StateStore};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ChunkFormatter, CoreError, CurrencyIntent, MemoryStore, RateSource, RateTable,
        RatebotConfig, RawCommand, Result, Sendable, StateStore, chunk, deliver, parse,
    };
}
