use async_trait::async_trait;
use ratebot_core::{
    ChunkFormatter, Sendable, deliver,
    services::{DealsClient, deals},
};

use super::{CommandHandler, Invocation};
use crate::Result;

pub struct DealsCommand {
    client: DealsClient,
    formatter: ChunkFormatter,
}

impl DealsCommand {
    pub fn new(client: DealsClient, formatter: ChunkFormatter) -> Self {
        Self { client, formatter }
    }
}

#[async_trait]
impl CommandHandler for DealsCommand {
    fn name(&self) -> &'static str {
        "deals"
    }

    fn description(&self) -> &'static str {
        "Top Steam Deals"
    }

    async fn execute(&self, _invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        match self.client.top().await {
            Ok(top) => {
                let messages = self.formatter.chunk(deals::render_top(&top));
                deliver(reply, &messages).await?;
            }
            Err(e) => {
                tracing::warn!("Deals lookup failed: {:?}", e);
                reply.send(deals::DEALS_FAILED).await?;
            }
        }
        Ok(())
    }
}

pub struct PriceCommand {
    client: DealsClient,
}

impl PriceCommand {
    pub fn new(client: DealsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandHandler for PriceCommand {
    fn name(&self) -> &'static str {
        "price"
    }

    fn description(&self) -> &'static str {
        "Check Game Price"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[game name]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let title = invocation.command.rest();
        if title.is_empty() {
            reply.send(deals::PRICE_USAGE).await?;
            return Ok(());
        }

        let message = match self.client.price(title).await {
            Ok(check) => deals::render_price(title, &check).join("\n"),
            Err(e) => {
                tracing::warn!("Price lookup for '{}' failed: {:?}", title, e);
                deals::PRICE_FAILED.to_string()
            }
        };
        reply.send(&message).await?;
        Ok(())
    }
}
