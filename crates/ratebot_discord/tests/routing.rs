use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use ratebot_core::{
    ChunkFormatter, CoreError, CurrencyIntent, RateSource, RateTable, cooldown::Cooldown,
    rates::LOOKUP_FAILED, send::Transcript,
};
use ratebot_discord::{
    Author, CommandHandler, CommandRegistry, Invocation, MessageRouter, Routed,
    commands::{HomeCurrencies, OwnerListCommand, Registrations},
};

/// Answers every lookup from a fixed table and records what was asked.
#[derive(Default)]
struct FixedRates {
    rates: Vec<(String, f64)>,
    fail: bool,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FixedRates {
    fn with(rates: &[(&str, f64)]) -> Self {
        Self {
            rates: rates
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RateSource for FixedRates {
    async fn latest(&self, base: &str, target: Option<&str>) -> ratebot_core::Result<RateTable> {
        self.calls
            .lock()
            .push((base.to_string(), target.map(str::to_string)));

        if self.fail {
            return Err(CoreError::invalid_response("fixed", "configured to fail"));
        }

        Ok(RateTable {
            base: base.to_string(),
            date: "2024-05-17".to_string(),
            rates: self
                .rates
                .iter()
                .filter(|(code, _)| target.is_none_or(|t| t == code.as_str()))
                .map(|(code, rate)| (code.clone(), *rate))
                .collect(),
        })
    }
}

/// Registered under a name that also parses as a currency code.
struct Usd;

#[async_trait]
impl CommandHandler for Usd {
    fn name(&self) -> &'static str {
        "usd"
    }

    fn description(&self) -> &'static str {
        "Not a currency"
    }

    async fn execute(
        &self,
        _invocation: &Invocation,
        reply: &dyn ratebot_core::Sendable,
    ) -> ratebot_discord::Result<()> {
        reply.send("registered usd").await?;
        Ok(())
    }
}

fn router(rates: Arc<FixedRates>, registry: CommandRegistry) -> MessageRouter {
    MessageRouter::new(
        "!",
        registry,
        rates,
        Cooldown::new(Duration::from_secs(3)),
        ChunkFormatter::default(),
    )
}

fn author() -> Author {
    Author::new(42, "jenny")
}

#[tokio::test]
async fn currency_with_target() {
    let rates = Arc::new(FixedRates::with(&[("EUR", 0.92), ("MYR", 4.7)]));
    let router = router(rates.clone(), CommandRegistry::new());
    let transcript = Transcript::new();

    let routed = router
        .route_message(&author(), "!usd100 myr", &transcript)
        .await
        .unwrap();

    let intent = CurrencyIntent::new("usd").with_amount(100.0).with_target("myr");
    assert_eq!(routed, Routed::Currency(intent));
    assert_eq!(
        *rates.calls.lock(),
        vec![("USD".to_string(), Some("MYR".to_string()))]
    );
    assert_eq!(
        transcript.messages(),
        vec![
            "Fetching exchange rates for USD (amount: 100.00), please wait...".to_string(),
            "**Exchange Rates for 100.00 USD (as of 2024-05-17):**\n**100.00 USD = 470.0000 MYR**"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn registered_command_beats_currency_parser() {
    let rates = Arc::new(FixedRates::with(&[("EUR", 0.92)]));
    let router = router(rates.clone(), CommandRegistry::new().with(Usd));
    let transcript = Transcript::new();

    let routed = router
        .route_message(&author(), "!USD 100", &transcript)
        .await
        .unwrap();

    assert_eq!(routed, Routed::Command("usd"));
    assert!(rates.calls.lock().is_empty());
    assert_eq!(transcript.messages(), vec!["registered usd".to_string()]);
}

#[tokio::test]
async fn messages_without_prefix_are_ignored() {
    let rates = Arc::new(FixedRates::with(&[("EUR", 0.92)]));
    let router = router(rates.clone(), CommandRegistry::new());
    let transcript = Transcript::new();

    for content in ["usd 100 myr", "hello there", "!", "!123", "!   "] {
        let routed = router
            .route_message(&author(), content, &transcript)
            .await
            .unwrap();
        assert_eq!(routed, Routed::Ignored, "{content}");
    }
    assert!(transcript.messages().is_empty());
    assert!(rates.calls.lock().is_empty());
}

#[tokio::test]
async fn second_lookup_within_window_is_refused() {
    let rates = Arc::new(FixedRates::with(&[("EUR", 0.92)]));
    let router = router(rates.clone(), CommandRegistry::new());
    let transcript = Transcript::new();

    router
        .route_message(&author(), "!usd", &transcript)
        .await
        .unwrap();
    let routed = router
        .route_message(&author(), "!usd", &transcript)
        .await
        .unwrap();

    assert!(matches!(routed, Routed::CoolingDown(wait) if wait <= Duration::from_secs(3)));
    assert_eq!(rates.calls.lock().len(), 1);
    assert!(
        transcript
            .messages()
            .last()
            .is_some_and(|m| m.starts_with("Slow down, <@42>!"))
    );

    // Another user is not affected
    let routed = router
        .route_message(&Author::new(7, "sam"), "!usd", &transcript)
        .await
        .unwrap();
    assert!(matches!(routed, Routed::Currency(_)));
}

#[tokio::test]
async fn lookup_failure_becomes_apology() {
    let router = router(Arc::new(FixedRates::failing()), CommandRegistry::new());
    let transcript = Transcript::new();

    router
        .route_message(&author(), "!eur", &transcript)
        .await
        .unwrap();

    assert_eq!(transcript.messages()[1], LOOKUP_FAILED);
}

#[tokio::test]
async fn long_listing_is_chunked() {
    let rates = FixedRates {
        rates: (0..200).map(|i| (format!("C{i:03}"), 1.2345)).collect(),
        ..FixedRates::default()
    };
    let router = router(Arc::new(rates), CommandRegistry::new());
    let transcript = Transcript::new();

    router
        .route_message(&author(), "!usd", &transcript)
        .await
        .unwrap();

    let messages = transcript.messages();
    assert_eq!(messages[1], "**Exchange Rates for 1.00 USD (as of 2024-05-17):**");
    assert!(messages.len() > 3);
    let listed: usize = messages[2..]
        .iter()
        .map(|m| m.lines().filter(|l| l.starts_with("  - ")).count())
        .sum();
    assert_eq!(listed, 200);
}

#[tokio::test]
async fn slash_query_gets_usage_hint() {
    let router = router(Arc::new(FixedRates::default()), CommandRegistry::new());
    let transcript = Transcript::new();

    let routed = router
        .route_query(&author(), "123", &transcript)
        .await
        .unwrap();

    assert_eq!(routed, Routed::Ignored);
    assert_eq!(
        transcript.messages(),
        vec!["I couldn't read `123` as a currency request. Try something like `usd 100 myr`."
            .to_string()]
    );
}

#[tokio::test]
async fn home_currency_commands_share_state() {
    let homes = HomeCurrencies::in_memory();
    let registry = CommandRegistry::new()
        .with_home_commands(homes.clone())
        .with_help();
    let router = router(Arc::new(FixedRates::default()), registry);
    let transcript = Transcript::new();

    let routed = router
        .route_message(&author(), "!home myr", &transcript)
        .await
        .unwrap();
    assert_eq!(routed, Routed::Command("home"));
    assert_eq!(homes.get(42), Some("MYR".to_string()));

    let routed = router
        .route_message(&author(), "!help", &transcript)
        .await
        .unwrap();
    assert_eq!(routed, Routed::Command("help"));
    assert!(transcript.messages()[1].contains("`!home [currency | clear]`"));
}

#[tokio::test]
async fn home_currency_becomes_default_target() {
    let rates = Arc::new(FixedRates::with(&[("EUR", 0.92), ("MYR", 4.7)]));
    let homes = HomeCurrencies::in_memory();
    let registry = CommandRegistry::new().with_home_commands(homes.clone());
    let router = router(rates.clone(), registry).with_home_currencies(homes);
    let transcript = Transcript::new();

    router
        .route_message(&author(), "!home myr", &transcript)
        .await
        .unwrap();
    let routed = router
        .route_message(&author(), "!usd 10", &transcript)
        .await
        .unwrap();

    let intent = CurrencyIntent::new("usd").with_amount(10.0).with_target("myr");
    assert_eq!(routed, Routed::Currency(intent));
    assert_eq!(
        *rates.calls.lock(),
        vec![("USD".to_string(), Some("MYR".to_string()))]
    );
    assert_eq!(
        transcript.messages()[2],
        "**Exchange Rates for 10.00 USD (as of 2024-05-17):**\n**10.00 USD = 47.0000 MYR**"
    );

    // Someone without a home currency still gets the full listing
    let other = Author::new(7, "sam");
    let routed = router
        .route_message(&other, "!usd", &transcript)
        .await
        .unwrap();
    assert_eq!(routed, Routed::Currency(CurrencyIntent::new("usd")));
    assert_eq!(rates.calls.lock()[1], ("USD".to_string(), None));
}

#[tokio::test]
async fn owner_commands_ignore_everyone_else() {
    let registry = CommandRegistry::new()
        .with(OwnerListCommand::new(
            Registrations::in_memory(),
            ChunkFormatter::default(),
        ))
        .with_help();
    let router = router(Arc::new(FixedRates::default()), registry).with_owner(Some(1));

    let transcript = Transcript::new();
    let routed = router
        .route_message(&author(), "!olist", &transcript)
        .await
        .unwrap();
    assert_eq!(routed, Routed::Ignored);
    assert!(transcript.messages().is_empty());

    router
        .route_message(&author(), "!help", &transcript)
        .await
        .unwrap();
    assert!(!transcript.messages()[0].contains("olist"));

    let owner = Author::new(1, "boss");
    let transcript = Transcript::new();
    let routed = router
        .route_message(&owner, "!olist", &transcript)
        .await
        .unwrap();
    assert_eq!(routed, Routed::Command("olist"));
    assert_eq!(
        transcript.messages(),
        vec!["No users have registered for horoscopes yet.".to_string()]
    );

    router
        .route_message(&owner, "!help", &transcript)
        .await
        .unwrap();
    assert!(transcript.messages()[1].contains("`!olist`"));
}
