use std::sync::Arc;

use async_trait::async_trait;
use ratebot_core::{CurrencyIntent, MemoryStore, Sendable, StateStore};

use super::{CommandHandler, Invocation};
use crate::Result;

/// Per-user home currencies, keyed by Discord user ID. A currency lookup
/// without a target converts into the author's home currency.
#[derive(Clone)]
pub struct HomeCurrencies {
    store: Arc<dyn StateStore<u64, String>>,
}

impl HomeCurrencies {
    pub fn new(store: Arc<dyn StateStore<u64, String>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get(&self, user_id: u64) -> Option<String> {
        self.store.get(&user_id)
    }

    /// Store `currency`, returning the one it replaced.
    pub fn set(&self, user_id: u64, currency: String) -> Option<String> {
        self.store.put(user_id, currency)
    }

    pub fn remove(&self, user_id: u64) -> Option<String> {
        self.store.delete(&user_id)
    }

    /// `intent` with the author's home currency as target, when it has no
    /// target of its own and the home currency differs from the base.
    pub fn default_target(&self, user_id: u64, intent: CurrencyIntent) -> CurrencyIntent {
        if intent.target_currency.is_some() {
            return intent;
        }
        match self.get(user_id) {
            Some(home) if home != intent.base_currency => intent.with_target(home),
            _ => intent,
        }
    }
}

/// A bare currency code, accepted when the parser reads it as a code with
/// no amount and no target.
fn currency_code(token: &str) -> Option<String> {
    ratebot_core::parse(token)
        .filter(|intent| intent.base_currency.len() == token.len())
        .map(|CurrencyIntent { base_currency, .. }| base_currency)
}

/// `home myr` sets, `home` shows, `home clear` forgets.
pub struct HomeCommand {
    homes: HomeCurrencies,
}

impl HomeCommand {
    pub fn new(homes: HomeCurrencies) -> Self {
        Self { homes }
    }
}

#[async_trait]
impl CommandHandler for HomeCommand {
    fn name(&self) -> &'static str {
        "home"
    }

    fn description(&self) -> &'static str {
        "Set your home currency"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[currency | clear]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let author = &invocation.author;
        let prefix = &invocation.prefix;

        let message = match invocation.command.args().first().map(String::as_str) {
            None => match self.homes.get(author.id) {
                Some(code) => format!(
                    "{}, your home currency is **{code}**. `{prefix}usd` now converts straight into {code}.",
                    author.mention()
                ),
                None => format!(
                    "You have no home currency yet, {}. Use `{prefix}home [currency]` to set one.",
                    author.mention()
                ),
            },
            Some(word) if word.eq_ignore_ascii_case("clear") => {
                match self.homes.remove(author.id) {
                    Some(code) => format!(
                        "✅ Your home currency **{code}** has been cleared, {}.",
                        author.mention()
                    ),
                    None => format!(
                        "You do not have a home currency to clear, {}.",
                        author.mention()
                    ),
                }
            }
            Some(token) => match currency_code(token) {
                None => format!(
                    "'{token}' doesn't look like a currency code. Use 2 to 4 letters, like `{prefix}home myr`."
                ),
                Some(code) => {
                    tracing::info!("User {} set home currency {}", author.id, code);
                    match self.homes.set(author.id, code.clone()) {
                        Some(previous) if previous == code => format!(
                            "Your home currency is already **{code}**, {}!",
                            author.mention()
                        ),
                        Some(previous) => format!(
                            "✅ Your home currency has been updated from **{previous}** to **{code}**, {}!",
                            author.mention()
                        ),
                        None => format!(
                            "✅ Your home currency has been set to **{code}**, {}!",
                            author.mention()
                        ),
                    }
                }
            },
        };

        reply.send(&message).await?;
        Ok(())
    }
}
