use std::sync::Arc;

use ratebot_core::config::DiscordSettings;
use serenity::{
    all::{
        Command, CommandDataOptionValue, CommandInteraction, CommandOptionType,
        CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
    },
    async_trait,
    builder::CreateCommand,
    client::{Context, EventHandler},
    model::{application::Interaction, channel::Message, gateway::Ready},
    prelude::*,
};
use tracing::{debug, error, info, warn};

use crate::{
    DiscordError, MessageRouter, Result,
    commands::Author,
    endpoints::{ChannelTarget, InteractionTarget, UserTarget, WithFallback},
};

/// Name of the slash command mirroring the prefix currency syntax.
pub const RATE_COMMAND: &str = "rate";

/// Configuration for the Discord bot
#[derive(Debug, Clone)]
pub struct DiscordBotConfig {
    pub token: String,
    pub intents: GatewayIntents,
    pub application_id: Option<u64>,
    pub allowed_channels: Option<Vec<u64>>,
    pub register_slash_commands: bool,
}

impl DiscordBotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: GatewayIntents::GUILD_MESSAGES
                | GatewayIntents::DIRECT_MESSAGES
                | GatewayIntents::MESSAGE_CONTENT,
            application_id: None,
            allowed_channels: None,
            register_slash_commands: true,
        }
    }

    pub fn from_settings(settings: &DiscordSettings) -> Result<Self> {
        if settings.token.is_empty() {
            return Err(DiscordError::missing_token());
        }

        Ok(Self {
            application_id: settings.application_id,
            allowed_channels: settings.allowed_channels.clone(),
            register_slash_commands: settings.register_slash_commands,
            ..Self::new(settings.token.clone())
        })
    }

    /// DMs are always answered; guild channels only when allowed.
    pub fn accepts_channel(&self, channel_id: u64, is_dm: bool) -> bool {
        is_dm
            || self
                .allowed_channels
                .as_ref()
                .is_none_or(|allowed| allowed.contains(&channel_id))
    }
}

/// The `/rate` command definition.
pub fn rate_command() -> CreateCommand {
    CreateCommand::new(RATE_COMMAND)
        .description("Look up exchange rates, e.g. usd 100 myr")
        .dm_permission(true)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "query",
                "Currency request such as `usd`, `usd myr` or `usd 100 myr`",
            )
            .required(true),
        )
}

/// Serenity event handler that feeds messages and interactions to the router.
pub struct RatebotHandler {
    config: DiscordBotConfig,
    router: Arc<MessageRouter>,
}

impl RatebotHandler {
    pub fn new(config: DiscordBotConfig, router: Arc<MessageRouter>) -> Self {
        Self { config, router }
    }

    async fn handle_rate_command(&self, ctx: &Context, command: &CommandInteraction) {
        // Defer so the lookup can take longer than the interaction deadline
        if let Err(why) = command
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
            )
            .await
        {
            let error = DiscordError::InteractionFailed {
                interaction_name: command.data.name.clone(),
                user_id: command.user.id.get(),
                cause: why,
            };
            error!("Cannot defer response: {:?}", error);
            return;
        }

        let query = command
            .data
            .options
            .iter()
            .find(|opt| opt.name == "query")
            .and_then(|opt| match &opt.value {
                CommandDataOptionValue::String(text) => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or_default();

        let author = Author::new(command.user.id.get(), command.user.name.clone());
        let reply = InteractionTarget::new(ctx.http.clone(), command.clone());

        match self.router.route_query(&author, query, &reply).await {
            Ok(routed) => debug!("/{} routed to {:?}", RATE_COMMAND, routed),
            Err(e) => error!("Error handling /{}: {:?}", RATE_COMMAND, e),
        }
    }
}

#[async_trait]
impl EventHandler for RatebotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        if !self.config.register_slash_commands {
            return;
        }

        match Command::create_global_command(&ctx.http, rate_command()).await {
            Ok(command) => info!("Registered slash command /{}", command.name),
            Err(why) => {
                let error = DiscordError::CommandRegistrationFailed {
                    command_name: RATE_COMMAND.to_string(),
                    cause: why,
                };
                error!("Cannot create slash command: {:?}", error);
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore bots, including ourselves
        if msg.author.bot {
            return;
        }

        if !self
            .config
            .accepts_channel(msg.channel_id.get(), msg.guild_id.is_none())
        {
            return;
        }

        let author = Author::new(msg.author.id.get(), msg.author.name.clone());
        let reply = WithFallback::new(
            ChannelTarget::new(ctx.http.clone(), msg.channel_id),
            UserTarget::new(ctx.http.clone(), msg.author.id),
        );

        match self.router.route_message(&author, &msg.content, &reply).await {
            Ok(routed) => debug!("Message {} routed to {:?}", msg.id, routed),
            Err(e) => error!("Error processing message {}: {:?}", msg.id, e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            info!(
                "Received slash command: {} from user {}",
                command.data.name, command.user.name
            );
            match command.data.name.as_str() {
                RATE_COMMAND => self.handle_rate_command(&ctx, &command).await,
                _ => {
                    warn!("Unknown command: {}", command.data.name);
                }
            }
        }
    }
}

/// Create the Discord client (without starting it)
pub async fn create_discord_client(
    config: DiscordBotConfig,
    router: Arc<MessageRouter>,
) -> Result<Client> {
    let token = config.token.clone();
    let intents = config.intents;
    let application_id = config.application_id;

    let mut client_builder =
        Client::builder(&token, intents).event_handler(RatebotHandler::new(config, router));

    if let Some(app_id) = application_id {
        client_builder = client_builder.application_id(app_id.into());
    }

    client_builder
        .await
        .map_err(|e| DiscordError::auth_failed(e, &token))
}

/// Create and run the Discord bot
pub async fn run_discord_bot(config: DiscordBotConfig, router: Arc<MessageRouter>) -> Result<()> {
    let mut client = create_discord_client(config, router).await?;

    info!("Starting Discord bot...");
    client
        .start()
        .await
        .map_err(|cause| DiscordError::ClientStopped { cause })
}
