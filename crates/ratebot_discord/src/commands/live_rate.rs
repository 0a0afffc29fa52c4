use async_trait::async_trait;
use ratebot_core::{
    CoreError, Sendable,
    services::{
        LiveRateClient,
        live_rate::{self, LiveRateRequest},
    },
};

use super::{CommandHandler, Invocation};
use crate::Result;

/// `liverate [amount] <source> <target>`: a mid-market quote from Wise.
pub struct LiveRateCommand {
    client: LiveRateClient,
}

impl LiveRateCommand {
    pub fn new(client: LiveRateClient) -> Self {
        Self { client }
    }
}

/// The reply for a finished lookup.
fn answer(
    request: &LiveRateRequest,
    outcome: ratebot_core::Result<Vec<live_rate::LiveRate>>,
) -> String {
    match outcome {
        Ok(quotes) => match quotes.first() {
            None => live_rate::empty(request),
            Some(quote) => live_rate::render(request, quote)
                .unwrap_or_else(|| live_rate::MISSING_FIELDS.to_string()),
        },
        Err(CoreError::ServiceRequestFailed { cause, .. }) if cause.is_status() => {
            tracing::info!(
                "Wise refused {} to {}: {}",
                request.source,
                request.target,
                cause
            );
            live_rate::rejected(request)
        }
        Err(e) => {
            tracing::warn!(
                "Live rate lookup for {} to {} failed: {:?}",
                request.source,
                request.target,
                e
            );
            live_rate::LOOKUP_FAILED.to_string()
        }
    }
}

#[async_trait]
impl CommandHandler for LiveRateCommand {
    fn name(&self) -> &'static str {
        "liverate"
    }

    fn description(&self) -> &'static str {
        "Live mid-market rate (Wise)"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[amount] <source> <target>")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        if !self.client.is_configured() {
            reply.send(live_rate::NOT_CONFIGURED).await?;
            return Ok(());
        }

        let request = match LiveRateRequest::parse(invocation.command.args()) {
            Ok(request) => request,
            Err(input) => {
                reply
                    .send(&live_rate::input_error(&invocation.prefix, input))
                    .await?;
                return Ok(());
            }
        };

        let outcome = self.client.latest(&request.source, &request.target).await;
        reply.send(&answer(&request, outcome)).await?;
        Ok(())
    }
}
