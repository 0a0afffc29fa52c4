//! Reply destinations
//!
//! A channel, a user's DMs and an interaction followup all accept text the
//! same way, so handlers only ever see a [`Sendable`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// Somewhere a text message can be delivered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sendable: Send + Sync {
    async fn send(&self, content: &str) -> Result<()>;

    /// Short human-readable name used in logs and errors.
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: Sendable + ?Sized> Sendable for Arc<T> {
    async fn send(&self, content: &str) -> Result<()> {
        (**self).send(content).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<T: Sendable + ?Sized> Sendable for &T {
    async fn send(&self, content: &str) -> Result<()> {
        (**self).send(content).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Send `messages` in order, stopping at the first failure.
pub async fn deliver<S, M>(destination: &S, messages: &[M]) -> Result<()>
where
    S: Sendable + ?Sized,
    M: AsRef<str> + Sync,
{
    for message in messages {
        destination.send(message.as_ref()).await?;
    }
    tracing::debug!(
        "Delivered {} message(s) to {}",
        messages.len(),
        destination.describe()
    );
    Ok(())
}

/// Collects everything sent to it. Used by the CLI dry run and in tests.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: parking_lot::Mutex<Vec<String>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Sendable for Transcript {
    async fn send(&self, content: &str) -> Result<()> {
        self.messages.lock().push(content.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "transcript".to_string()
    }
}
