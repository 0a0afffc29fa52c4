use async_trait::async_trait;
use ratebot_core::{
    ChunkFormatter, Sendable, deliver,
    services::{DictionaryClient, dictionary},
};

use super::{CommandHandler, Invocation};
use crate::Result;

pub struct DictionaryCommand {
    client: DictionaryClient,
    formatter: ChunkFormatter,
}

impl DictionaryCommand {
    pub fn new(client: DictionaryClient, formatter: ChunkFormatter) -> Self {
        Self { client, formatter }
    }
}

#[async_trait]
impl CommandHandler for DictionaryCommand {
    fn name(&self) -> &'static str {
        "dict"
    }

    fn description(&self) -> &'static str {
        "Dictionary"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[word]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let word = invocation.command.rest();
        if word.is_empty() {
            reply.send(dictionary::USAGE).await?;
            return Ok(());
        }

        match self.client.lookup(word).await {
            Ok(Some(entries)) => {
                let messages = self.formatter.chunk(dictionary::render(&entries[0]));
                deliver(reply, &messages).await?;
            }
            Ok(None) => reply.send(&dictionary::not_found(word)).await?,
            Err(e) => {
                tracing::warn!("Dictionary lookup for '{}' failed: {:?}", word, e);
                reply.send(dictionary::LOOKUP_FAILED).await?;
            }
        }
        Ok(())
    }
}
