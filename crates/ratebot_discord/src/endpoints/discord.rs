use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ratebot_core::{CoreError, DISCORD_MESSAGE_LIMIT, Result, Sendable};
use serenity::all::{CommandInteraction, CreateInteractionResponseFollowup};
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};
use tracing::{debug, error};

use crate::DiscordError;

/// Discord API calls that take longer than this are reported as failed.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Refuse content Discord would reject, before spending a request on it.
fn check_length(destination: &str, content: &str) -> Result<()> {
    if content.chars().count() > DISCORD_MESSAGE_LIMIT {
        return Err(CoreError::send_failed(
            destination,
            content,
            DiscordError::message_too_long(content),
        ));
    }
    Ok(())
}

async fn with_timeout<T, F>(destination: &str, content: &str, call: F) -> Result<T>
where
    F: std::future::Future<Output = serenity::Result<T>>,
{
    match tokio::time::timeout(SEND_TIMEOUT, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!("Discord API error for {}: {}", destination, e);
            Err(CoreError::send_failed(destination, content, e))
        }
        Err(_) => {
            error!(
                "Discord API TIMEOUT for {} after {} seconds",
                destination,
                SEND_TIMEOUT.as_secs()
            );
            Err(CoreError::send_failed(
                destination,
                content,
                format!("timed out after {}s", SEND_TIMEOUT.as_secs()),
            ))
        }
    }
}

/// A guild or DM channel the message came from.
#[derive(Clone)]
pub struct ChannelTarget {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelTarget {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl Sendable for ChannelTarget {
    async fn send(&self, content: &str) -> Result<()> {
        let destination = self.describe();
        check_length(&destination, content)?;
        with_timeout(&destination, content, self.channel_id.say(&self.http, content)).await?;
        debug!("Sent message to Discord channel {}", self.channel_id);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("channel {}", self.channel_id)
    }
}

/// A user's direct messages.
#[derive(Clone)]
pub struct UserTarget {
    http: Arc<Http>,
    user_id: UserId,
}

impl UserTarget {
    pub fn new(http: Arc<Http>, user_id: UserId) -> Self {
        Self { http, user_id }
    }
}

#[async_trait]
impl Sendable for UserTarget {
    async fn send(&self, content: &str) -> Result<()> {
        let destination = self.describe();
        check_length(&destination, content)?;

        let dm_channel = with_timeout(
            &destination,
            content,
            self.user_id.create_dm_channel(&self.http),
        )
        .await?;
        with_timeout(&destination, content, dm_channel.say(&self.http, content)).await?;

        debug!("Sent DM to Discord user {}", self.user_id);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("DM with user {}", self.user_id)
    }
}

/// Followup messages on a deferred slash command.
#[derive(Clone)]
pub struct InteractionTarget {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

impl InteractionTarget {
    pub fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl Sendable for InteractionTarget {
    async fn send(&self, content: &str) -> Result<()> {
        let destination = self.describe();
        check_length(&destination, content)?;

        let followup = CreateInteractionResponseFollowup::new().content(content);
        with_timeout(
            &destination,
            content,
            self.interaction.create_followup(&self.http, followup),
        )
        .await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "/{} followup for user {}",
            self.interaction.data.name, self.interaction.user.id
        )
    }
}
