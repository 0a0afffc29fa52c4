use async_trait::async_trait;
use ratebot_core::{
    Sendable,
    services::{CatClient, cats},
};

use super::{CommandHandler, Invocation};
use crate::Result;

pub struct CatFactCommand {
    client: CatClient,
}

impl CatFactCommand {
    pub fn new(client: CatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandHandler for CatFactCommand {
    fn name(&self) -> &'static str {
        "cf"
    }

    fn description(&self) -> &'static str {
        "Cat Fact"
    }

    async fn execute(&self, _invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let message = match self.client.fact().await {
            Ok(facts) => cats::render_fact(&facts),
            Err(e) => {
                tracing::warn!("Cat fact lookup failed: {:?}", e);
                cats::FACT_FAILED.to_string()
            }
        };
        reply.send(&message).await?;
        Ok(())
    }
}

pub struct CatImageCommand {
    client: CatClient,
}

impl CatImageCommand {
    pub fn new(client: CatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandHandler for CatImageCommand {
    fn name(&self) -> &'static str {
        "c"
    }

    fn description(&self) -> &'static str {
        "Cat Picture"
    }

    async fn execute(&self, _invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let message = match self.client.images().await {
            Ok(images) => cats::render_image(&images),
            Err(e) => {
                tracing::warn!("Cat image lookup failed: {:?}", e);
                cats::IMAGE_FAILED.to_string()
            }
        };
        reply.send(&message).await?;
        Ok(())
    }
}
