//! Reply destinations on Discord
//!
//! The concrete targets wrap serenity calls; [`WithFallback`] tries a
//! second destination when the first one refuses a message.

pub mod discord;

use async_trait::async_trait;
use ratebot_core::{Result, Sendable};
use tracing::warn;

pub use discord::{ChannelTarget, InteractionTarget, UserTarget};

/// Send to `primary`, and to `secondary` when that fails.
#[derive(Debug, Clone)]
pub struct WithFallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> WithFallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: Sendable, S: Sendable> Sendable for WithFallback<P, S> {
    async fn send(&self, content: &str) -> Result<()> {
        match self.primary.send(content).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    "Failed to send to {}, falling back to {}: {}",
                    self.primary.describe(),
                    self.secondary.describe(),
                    e
                );
                self.secondary.send(content).await
            }
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} (fallback {})",
            self.primary.describe(),
            self.secondary.describe()
        )
    }
}
