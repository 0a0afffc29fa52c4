use async_trait::async_trait;
use ratebot_core::{
    Sendable,
    services::{ReferenceRateClient, reference_rate},
};

use super::{CommandHandler, Invocation};
use crate::Result;

/// `rm`: the Kuala Lumpur USD/MYR reference rate from Bank Negara Malaysia.
pub struct ReferenceRateCommand {
    client: ReferenceRateClient,
}

impl ReferenceRateCommand {
    pub fn new(client: ReferenceRateClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandHandler for ReferenceRateCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn description(&self) -> &'static str {
        "USD/MYR reference rate (BNM)"
    }

    async fn execute(&self, _invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        reply.send(reference_rate::FETCHING).await?;

        match self.client.latest().await {
            Ok(response) => reply.send(&reference_rate::render(&response).join("\n")).await?,
            Err(e) => {
                tracing::warn!("BNM lookup failed: {:?}", e);
                reply.send(reference_rate::UNAVAILABLE).await?;
            }
        }
        Ok(())
    }
}
