//! Routing incoming text to a registered command or the currency path

use std::sync::Arc;
use std::time::Duration;

use ratebot_core::{
    ChunkFormatter, CurrencyIntent, RateSource, RatebotConfig, RawCommand, Sendable, deliver,
    parse,
    cooldown::Cooldown,
    rates,
    services::{FrankfurterClient, Services, http_client},
};
use tracing::{debug, info};

use crate::{
    Result,
    commands::{Author, CommandRegistry, HomeCurrencies, Invocation, UserState},
};

/// What a message was routed to.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// A registered command ran.
    Command(&'static str),
    /// A currency lookup was answered.
    Currency(CurrencyIntent),
    /// A currency lookup was refused; the author must wait this long.
    CoolingDown(Duration),
    /// Not addressed to the bot, or not a command it understands.
    Ignored,
}

pub struct MessageRouter {
    prefix: String,
    registry: CommandRegistry,
    rates: Arc<dyn RateSource>,
    cooldown: Cooldown<u64>,
    formatter: ChunkFormatter,
    homes: Option<HomeCurrencies>,
    owner_id: Option<u64>,
}

impl MessageRouter {
    pub fn new(
        prefix: impl Into<String>,
        registry: CommandRegistry,
        rates: Arc<dyn RateSource>,
        cooldown: Cooldown<u64>,
        formatter: ChunkFormatter,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            registry,
            rates,
            cooldown,
            formatter,
            homes: None,
            owner_id: None,
        }
    }

    /// Convert target-less lookups into each author's home currency.
    pub fn with_home_currencies(mut self, homes: HomeCurrencies) -> Self {
        self.homes = Some(homes);
        self
    }

    /// The only user allowed to run owner commands.
    pub fn with_owner(mut self, owner_id: Option<u64>) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Wire up the standard commands and the Frankfurter rate source.
    pub fn from_config(config: &RatebotConfig) -> Result<Self> {
        let http = http_client(config.services.request_timeout())?;
        let services = Services::new(http.clone(), &config.services);
        let formatter = ChunkFormatter::new(config.rates.chunk_size);

        let state = UserState::in_memory();
        let registry = CommandRegistry::standard(&services, &state, formatter);
        info!("Registered commands: {}", registry.names().join(", "));
        if config.discord.owner_id.is_none() {
            info!("No bot owner configured; owner commands are disabled");
        }

        Ok(Self::new(
            config.discord.prefix.clone(),
            registry,
            Arc::new(FrankfurterClient::new(http, &config.rates.endpoint)),
            Cooldown::new(config.rates.cooldown()),
            formatter,
        )
        .with_home_currencies(state.homes)
        .with_owner(config.discord.owner_id))
    }

    fn is_owner(&self, author: &Author) -> bool {
        self.owner_id == Some(author.id)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle a chat message. Text without the prefix is ignored.
    pub async fn route_message(
        &self,
        author: &Author,
        content: &str,
        reply: &dyn Sendable,
    ) -> Result<Routed> {
        match RawCommand::from_message(content, &self.prefix) {
            Some(command) => self.route_command(author, command, reply).await,
            None => Ok(Routed::Ignored),
        }
    }

    /// Dispatch text that already had its prefix removed. Registered commands
    /// are tried first; anything else goes to the currency parser.
    pub async fn route_command(
        &self,
        author: &Author,
        command: RawCommand,
        reply: &dyn Sendable,
    ) -> Result<Routed> {
        if let Some(handler) = self.registry.get(command.name()) {
            let name = handler.name();
            let is_owner = self.is_owner(author);
            if handler.owner_only() && !is_owner {
                debug!("Ignoring owner command '{}' from user {}", name, author.id);
                return Ok(Routed::Ignored);
            }
            debug!("Running '{}' for user {}", name, author.id);

            let invocation =
                Invocation::new(author.clone(), self.prefix.clone(), command).by_owner(is_owner);
            handler.execute(&invocation, reply).await?;
            return Ok(Routed::Command(name));
        }

        match parse(command.as_str()) {
            Some(intent) => self.answer_currency(author, intent, reply).await,
            None => {
                debug!("Ignoring unrecognised command '{}'", command);
                Ok(Routed::Ignored)
            }
        }
    }

    /// Handle the `/rate` slash command, where a bad query gets a usage hint
    /// instead of silence.
    pub async fn route_query(
        &self,
        author: &Author,
        query: &str,
        reply: &dyn Sendable,
    ) -> Result<Routed> {
        match parse(query) {
            Some(intent) => self.answer_currency(author, intent, reply).await,
            None => {
                reply.send(&query_usage(query)).await?;
                Ok(Routed::Ignored)
            }
        }
    }

    async fn answer_currency(
        &self,
        author: &Author,
        intent: CurrencyIntent,
        reply: &dyn Sendable,
    ) -> Result<Routed> {
        if let Err(wait) = self.cooldown.try_acquire(author.id) {
            reply.send(&cooldown_notice(author, wait)).await?;
            return Ok(Routed::CoolingDown(wait));
        }

        let intent = match &self.homes {
            Some(homes) => homes.default_target(author.id, intent),
            None => intent,
        };

        info!("Currency request from user {}: {}", author.id, intent);
        reply.send(&rates::status_line(&intent)).await?;

        let messages = rates::answer(self.rates.as_ref(), &intent, &self.formatter).await;
        deliver(reply, &messages).await?;

        Ok(Routed::Currency(intent))
    }
}

fn cooldown_notice(author: &Author, wait: Duration) -> String {
    format!(
        "Slow down, {}! You can look up rates again in {:.1}s.",
        author.mention(),
        wait.as_secs_f64()
    )
}

fn query_usage(query: &str) -> String {
    format!(
        "I couldn't read `{}` as a currency request. Try something like `usd 100 myr`.",
        query.trim()
    )
}
