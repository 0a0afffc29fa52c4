//! Registered prefix commands
//!
//! Every command the bot knows by name implements [`CommandHandler`]. The
//! [`CommandRegistry`] is consulted before the currency parser, so a name
//! registered here always wins over a lookalike currency code.

mod dictionary;
mod fun;
mod games;
mod home;
mod horoscope;
mod live_rate;
mod music;
mod reference_rate;

use std::sync::Arc;

use async_trait::async_trait;
use ratebot_core::{
    ChunkFormatter, RawCommand, Sendable,
    services::{HoroscopeClient, MusicClient, Services},
};

use crate::Result;

pub use dictionary::DictionaryCommand;
pub use fun::{CatFactCommand, CatImageCommand};
pub use games::{DealsCommand, PriceCommand};
pub use home::{HomeCommand, HomeCurrencies};
pub use horoscope::{
    ListCommand, LuckCommand, ModifySignCommand, ModifyTimezoneCommand, OwnerListCommand,
    RegisterCommand, Registration, Registrations, RemoveCommand,
};
pub use live_rate::LiveRateCommand;
pub use music::{DownloadCommand, SearchCommand, SearchResults};
pub use reference_rate::ReferenceRateCommand;

/// Who sent a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub name: String,
}

impl Author {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A registered command about to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub author: Author,
    /// Prefix in use, for usage hints in replies.
    pub prefix: String,
    pub command: RawCommand,
    /// Whether the author is the configured bot owner.
    pub is_owner: bool,
}

impl Invocation {
    pub fn new(author: Author, prefix: impl Into<String>, command: RawCommand) -> Self {
        Self {
            author,
            prefix: prefix.into(),
            command,
            is_owner: false,
        }
    }

    pub fn by_owner(mut self, is_owner: bool) -> Self {
        self.is_owner = is_owner;
        self
    }
}

/// Per-user state the stateful commands share.
#[derive(Clone)]
pub struct UserState {
    pub homes: HomeCurrencies,
    pub registrations: Registrations,
    pub searches: SearchResults,
}

impl UserState {
    pub fn in_memory() -> Self {
        Self {
            homes: HomeCurrencies::in_memory(),
            registrations: Registrations::in_memory(),
            searches: SearchResults::in_memory(),
        }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Name matched against the first token, compared case-insensitively.
    fn name(&self) -> &'static str;

    /// One-line summary for the help listing.
    fn description(&self) -> &'static str;

    /// Argument hint shown after the name in the help listing.
    fn arguments(&self) -> Option<&'static str> {
        None
    }

    /// Only the bot owner may run it; anyone else is ignored.
    fn owner_only(&self) -> bool {
        false
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()>;
}

/// Named commands, in registration order.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: Vec<Arc<dyn CommandHandler>>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command the bot ships with, `help` last so it can list the rest.
    pub fn standard(
        services: &Services,
        state: &UserState,
        formatter: ChunkFormatter,
    ) -> Self {
        Self::new()
            .with(ReferenceRateCommand::new(services.reference_rate.clone()))
            .with(LiveRateCommand::new(services.live_rate.clone()))
            .with(CatFactCommand::new(services.cats.clone()))
            .with(CatImageCommand::new(services.cats.clone()))
            .with(DealsCommand::new(services.deals.clone(), formatter))
            .with(PriceCommand::new(services.deals.clone()))
            .with(DictionaryCommand::new(services.dictionary.clone(), formatter))
            .with_music_commands(services.music.clone(), state.searches.clone(), formatter)
            .with_horoscope_commands(
                services.horoscope.clone(),
                state.registrations.clone(),
                formatter,
            )
            .with_home_commands(state.homes.clone())
            .with_help()
    }

    pub fn with_home_commands(self, homes: HomeCurrencies) -> Self {
        self.with(HomeCommand::new(homes))
    }

    /// The zodiac commands, all sharing `registrations`.
    pub fn with_horoscope_commands(
        self,
        client: HoroscopeClient,
        registrations: Registrations,
        formatter: ChunkFormatter,
    ) -> Self {
        self.with(RegisterCommand::new(registrations.clone()))
            .with(ModifySignCommand::new(registrations.clone()))
            .with(ModifyTimezoneCommand::new(registrations.clone()))
            .with(RemoveCommand::new(registrations.clone()))
            .with(ListCommand::new(registrations.clone(), client.clone()))
            .with(LuckCommand::new(registrations.clone(), client))
            .with(OwnerListCommand::new(registrations, formatter))
    }

    /// `s` and `d`, sharing each user's latest results.
    pub fn with_music_commands(
        self,
        client: MusicClient,
        searches: SearchResults,
        formatter: ChunkFormatter,
    ) -> Self {
        self.with(SearchCommand::new(client.clone(), searches.clone(), formatter))
            .with(DownloadCommand::new(client, searches))
    }

    /// Add `help`, listing everything registered so far.
    pub fn with_help(self) -> Self {
        let help = HelpCommand::for_handlers(&self.handlers);
        self.with(help)
    }

    /// Register `handler`, replacing any command with the same name.
    pub fn with(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.register(Arc::new(handler));
        self
    }

    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers
            .retain(|existing| !existing.name().eq_ignore_ascii_case(handler.name()));
        self.handlers.push(handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.name().eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Debug, Clone)]
struct HelpEntry {
    name: &'static str,
    arguments: Option<&'static str>,
    description: &'static str,
    owner_only: bool,
}

/// Lists the currency syntax and every registered command.
#[derive(Debug, Clone)]
pub struct HelpCommand {
    entries: Vec<HelpEntry>,
}

impl HelpCommand {
    fn for_handlers(handlers: &[Arc<dyn CommandHandler>]) -> Self {
        Self {
            entries: handlers
                .iter()
                .map(|handler| HelpEntry {
                    name: handler.name(),
                    arguments: handler.arguments(),
                    description: handler.description(),
                    owner_only: handler.owner_only(),
                })
                .collect(),
        }
    }

    /// The help text. Owner commands are listed only when `is_owner`.
    pub fn render(&self, prefix: &str, is_owner: bool) -> String {
        let mut lines = vec![
            "**Ratebot Help**".to_string(),
            String::new(),
            format!("💱 **Currency Exchange** (prefix: `{prefix}`)"),
            format!("**Get Daily Rates:** `{prefix}usd`"),
            format!("**Convert:** `{prefix}usd 100 myr` or `{prefix}usd100 myr`"),
            "**Slash command:** `/rate query:usd 100 myr`".to_string(),
            String::new(),
            "📚 **Commands**".to_string(),
        ];

        let line = |entry: &HelpEntry| {
            let usage = match entry.arguments {
                Some(args) => format!("{prefix}{} {args}", entry.name),
                None => format!("{prefix}{}", entry.name),
            };
            format!("**{}:** `{usage}`", entry.description)
        };

        let (owner, public): (Vec<&HelpEntry>, Vec<&HelpEntry>) =
            self.entries.iter().partition(|entry| entry.owner_only);
        lines.extend(public.into_iter().map(line));
        lines.push(format!("**Show this message:** `{prefix}help`"));

        if is_owner && !owner.is_empty() {
            lines.push(String::new());
            lines.push("👑 **Owner Commands**".to_string());
            lines.extend(owner.into_iter().map(line));
        }

        lines.join("\n")
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show this message"
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        reply
            .send(&self.render(&invocation.prefix, invocation.is_owner))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratebot_core::MemoryStore;

    struct Echo(&'static str);

    #[async_trait]
    impl CommandHandler for Echo {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "Echo"
        }

        fn arguments(&self) -> Option<&'static str> {
            Some("[text]")
        }

        async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
            reply.send(invocation.command.rest()).await?;
            Ok(())
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = CommandRegistry::new().with(Echo("echo"));
        assert!(registry.get("ECHO").is_some());
        assert!(registry.get("Echo").is_some());
        assert!(registry.get("usd").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = CommandRegistry::new().with(Echo("echo")).with(Echo("ECHO"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["ECHO"]);
    }

    #[test]
    fn test_help_lists_registered_commands() {
        let homes = HomeCurrencies::new(Arc::new(MemoryStore::new()));
        let registry = CommandRegistry::new()
            .with(Echo("echo"))
            .with_home_commands(homes)
            .with_help();

        assert_eq!(registry.names(), vec!["echo", "home", "help"]);

        let help = HelpCommand::for_handlers(&registry.handlers);
        let text = help.render("$", false);
        assert!(text.contains("**Echo:** `$echo [text]`"));
        assert!(text.contains("`$home [currency | clear]`"));
        assert!(text.contains("**Get Daily Rates:** `$usd`"));
    }

    #[test]
    fn test_help_shows_owner_commands_to_owner() {
        let registry = CommandRegistry::new()
            .with(Echo("echo"))
            .with(OwnerListCommand::new(
                Registrations::in_memory(),
                ChunkFormatter::default(),
            ))
            .with_help();
        let help = HelpCommand::for_handlers(&registry.handlers);

        let public = help.render("!", false);
        assert!(!public.contains("olist"));
        assert!(!public.contains("Owner Commands"));

        let owner = help.render("!", true);
        assert!(
            owner.ends_with("👑 **Owner Commands**\n**List all horoscope users:** `!olist`")
        );
    }

    #[test]
    fn test_invocation_defaults_to_non_owner() {
        let command = RawCommand::new("help").unwrap();
        let invocation = Invocation::new(Author::new(1, "sam"), "!", command);
        assert!(!invocation.is_owner);
        assert!(invocation.by_owner(true).is_owner);
    }
}
