//! Zodiac registrations and on-demand horoscopes

use std::sync::Arc;

use async_trait::async_trait;
use ratebot_core::{
    ChunkFormatter, MemoryStore, Sendable, StateStore, deliver,
    services::{
        HoroscopeClient,
        horoscope::{self, UtcOffset, ZodiacSign},
    },
};

use super::{Author, CommandHandler, Invocation};
use crate::Result;

/// What a user registered with `reg`.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Display name at registration time, for the owner listing.
    pub name: String,
    pub sign: ZodiacSign,
    pub utc_offset: UtcOffset,
}

/// Zodiac registrations keyed by Discord user ID.
#[derive(Clone)]
pub struct Registrations {
    store: Arc<dyn StateStore<u64, Registration>>,
}

impl Registrations {
    pub fn new(store: Arc<dyn StateStore<u64, Registration>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get(&self, user_id: u64) -> Option<Registration> {
        self.store.get(&user_id)
    }

    /// Register `user_id` unless it already is, returning the existing
    /// registration on refusal.
    pub fn register(
        &self,
        user_id: u64,
        registration: Registration,
    ) -> std::result::Result<(), Registration> {
        self.store.put_if(user_id, registration, &|_| false)
    }

    /// Apply `change` to an existing registration. `false` when there is none.
    pub fn update(&self, user_id: u64, change: impl FnOnce(&mut Registration)) -> bool {
        match self.store.get(&user_id) {
            Some(mut registration) => {
                change(&mut registration);
                self.store.put(user_id, registration);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, user_id: u64) -> Option<Registration> {
        self.store.delete(&user_id)
    }

    /// Every registration, ordered by user ID.
    pub fn all(&self) -> Vec<(u64, Registration)> {
        let mut entries = self.store.entries();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }
}

fn sign_hint(prefix: &str) -> String {
    format!(
        "Use `{prefix}reg [sign] [utc offset]`, e.g. `{prefix}reg leo +8`.\nSigns: {}",
        ZodiacSign::listing()
    )
}

fn offset_hint(text: &str) -> String {
    format!("'{text}' is not a UTC offset between UTC-12 and UTC+14. Try `+8`, `-5` or `+5:30`.")
}

fn unknown_sign(text: &str) -> String {
    format!(
        "'{text}' is not a zodiac sign. Choose one of: {}",
        ZodiacSign::listing()
    )
}

/// Status line, then the reading for `sign` on today's date at `offset`.
async fn send_reading(
    client: &HoroscopeClient,
    author: &Author,
    sign: ZodiacSign,
    offset: UtcOffset,
    reply: &dyn Sendable,
) -> Result<()> {
    reply
        .send(&horoscope::fetching(&author.mention(), sign))
        .await?;

    let date = offset.today();
    let message = match client.daily(sign, date).await {
        Ok(Some(reading)) => horoscope::render(sign, &reading, date).join("\n"),
        Ok(None) => horoscope::UNAVAILABLE.to_string(),
        Err(e) => {
            tracing::warn!("Horoscope lookup for {} failed: {:?}", sign, e);
            horoscope::LOOKUP_FAILED.to_string()
        }
    };

    reply.send(&message).await?;
    Ok(())
}

pub struct RegisterCommand {
    registrations: Registrations,
}

impl RegisterCommand {
    pub fn new(registrations: Registrations) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl CommandHandler for RegisterCommand {
    fn name(&self) -> &'static str {
        "reg"
    }

    fn description(&self) -> &'static str {
        "Register your zodiac sign"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[sign] [utc offset]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let author = &invocation.author;
        let prefix = &invocation.prefix;
        let args = invocation.command.args();

        if self.registrations.get(author.id).is_some() {
            reply
                .send(&format!(
                    "You are already registered, {}! Use `{prefix}mod` to change your sign or `{prefix}modtz` to change your timezone.",
                    author.mention()
                ))
                .await?;
            return Ok(());
        }

        let Some(sign_text) = args.first() else {
            reply
                .send(&format!(
                    "Welcome, {}! Tell me your zodiac sign to get started. {}",
                    author.mention(),
                    sign_hint(prefix)
                ))
                .await?;
            return Ok(());
        };

        let Ok(sign) = sign_text.parse::<ZodiacSign>() else {
            reply.send(&unknown_sign(sign_text)).await?;
            return Ok(());
        };

        let utc_offset = match args.get(1) {
            None => UtcOffset::UTC,
            Some(text) => match text.parse::<UtcOffset>() {
                Ok(offset) => offset,
                Err(_) => {
                    reply.send(&offset_hint(text)).await?;
                    return Ok(());
                }
            },
        };

        let registration = Registration {
            name: author.name.clone(),
            sign,
            utc_offset,
        };
        let message = match self.registrations.register(author.id, registration) {
            Ok(()) => {
                tracing::info!("User {} registered as {} ({})", author.id, sign, utc_offset);
                format!(
                    "✅ You are registered as **{sign}** with timezone **{utc_offset}**, {}! Use `{prefix}list` for today's horoscope.",
                    author.mention()
                )
            }
            Err(_) => format!(
                "You are already registered, {}! Use `{prefix}mod` to change your sign or `{prefix}modtz` to change your timezone.",
                author.mention()
            ),
        };

        reply.send(&message).await?;
        Ok(())
    }
}

pub struct ModifySignCommand {
    registrations: Registrations,
}

impl ModifySignCommand {
    pub fn new(registrations: Registrations) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl CommandHandler for ModifySignCommand {
    fn name(&self) -> &'static str {
        "mod"
    }

    fn description(&self) -> &'static str {
        "Modify Sign"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[sign]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let author = &invocation.author;
        let prefix = &invocation.prefix;

        if self.registrations.get(author.id).is_none() {
            reply
                .send(&format!(
                    "You haven't registered yet, {}. Please use `{prefix}reg` to get started.",
                    author.mention()
                ))
                .await?;
            return Ok(());
        }

        let message = match invocation.command.args().first() {
            None => format!(
                "{}, please tell me your new zodiac sign: `{prefix}mod [sign]`\nSigns: {}",
                author.mention(),
                ZodiacSign::listing()
            ),
            Some(text) => match text.parse::<ZodiacSign>() {
                Err(_) => unknown_sign(text),
                Ok(sign) => {
                    self.registrations.update(author.id, |r| r.sign = sign);
                    format!("✅ Your zodiac sign has been updated to **{sign}**!")
                }
            },
        };

        reply.send(&message).await?;
        Ok(())
    }
}

pub struct ModifyTimezoneCommand {
    registrations: Registrations,
}

impl ModifyTimezoneCommand {
    pub fn new(registrations: Registrations) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl CommandHandler for ModifyTimezoneCommand {
    fn name(&self) -> &'static str {
        "modtz"
    }

    fn description(&self) -> &'static str {
        "Modify Timezone"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[utc offset]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let prefix = &invocation.prefix;

        if self.registrations.get(invocation.author.id).is_none() {
            reply
                .send(&format!(
                    "You need to register with `{prefix}reg` first before changing your timezone."
                ))
                .await?;
            return Ok(());
        }

        let message = match invocation.command.args().first() {
            None => format!(
                "Please tell me your new timezone offset: `{prefix}modtz [utc offset]`, e.g. `{prefix}modtz +8`."
            ),
            Some(text) => match text.parse::<UtcOffset>() {
                Err(_) => offset_hint(text),
                Ok(offset) => {
                    self.registrations
                        .update(invocation.author.id, |r| r.utc_offset = offset);
                    format!("✅ Your timezone has been set to **{offset}**! All set.")
                }
            },
        };

        reply.send(&message).await?;
        Ok(())
    }
}

pub struct RemoveCommand {
    registrations: Registrations,
}

impl RemoveCommand {
    pub fn new(registrations: Registrations) -> Self {
        Self { registrations }
    }
}

#[async_trait]
impl CommandHandler for RemoveCommand {
    fn name(&self) -> &'static str {
        "remove"
    }

    fn description(&self) -> &'static str {
        "Remove your record"
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let author = &invocation.author;
        let prefix = &invocation.prefix;

        let message = match self.registrations.remove(author.id) {
            Some(_) => format!(
                "✅ Your record has been deleted, {}. Use `{prefix}reg` to register again.",
                author.mention()
            ),
            None => format!(
                "You do not have a registered sign to delete, {}.",
                author.mention()
            ),
        };

        reply.send(&message).await?;
        Ok(())
    }
}

/// `list`: today's horoscope for the author's registered sign.
pub struct ListCommand {
    registrations: Registrations,
    client: HoroscopeClient,
}

impl ListCommand {
    pub fn new(registrations: Registrations, client: HoroscopeClient) -> Self {
        Self {
            registrations,
            client,
        }
    }
}

#[async_trait]
impl CommandHandler for ListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn description(&self) -> &'static str {
        "Show your horoscope"
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let author = &invocation.author;

        match self.registrations.get(author.id) {
            Some(registration) => {
                send_reading(
                    &self.client,
                    author,
                    registration.sign,
                    registration.utc_offset,
                    reply,
                )
                .await
            }
            None => {
                reply
                    .send(&format!(
                        "You haven't registered your sign yet, {}. Use `{}reg` to get started.",
                        author.mention(),
                        invocation.prefix
                    ))
                    .await?;
                Ok(())
            }
        }
    }
}

/// `luck [sign]`: a horoscope for any sign, defaulting to the registered one.
pub struct LuckCommand {
    registrations: Registrations,
    client: HoroscopeClient,
}

impl LuckCommand {
    pub fn new(registrations: Registrations, client: HoroscopeClient) -> Self {
        Self {
            registrations,
            client,
        }
    }
}

#[async_trait]
impl CommandHandler for LuckCommand {
    fn name(&self) -> &'static str {
        "luck"
    }

    fn description(&self) -> &'static str {
        "Horoscope for any sign"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[sign]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let author = &invocation.author;
        let registration = self.registrations.get(author.id);
        let offset = registration
            .as_ref()
            .map_or(UtcOffset::UTC, |r| r.utc_offset);

        let sign = match (invocation.command.args().first(), &registration) {
            (Some(text), _) => match text.parse::<ZodiacSign>() {
                Ok(sign) => sign,
                Err(_) => {
                    reply.send(&unknown_sign(text)).await?;
                    return Ok(());
                }
            },
            (None, Some(registration)) => registration.sign,
            (None, None) => {
                reply
                    .send(&format!(
                        "Which sign, {}? {}",
                        author.mention(),
                        sign_hint(&invocation.prefix)
                    ))
                    .await?;
                return Ok(());
            }
        };

        send_reading(&self.client, author, sign, offset, reply).await
    }
}

/// `olist`: every registration, for the bot owner.
pub struct OwnerListCommand {
    registrations: Registrations,
    formatter: ChunkFormatter,
}

impl OwnerListCommand {
    pub fn new(registrations: Registrations, formatter: ChunkFormatter) -> Self {
        Self {
            registrations,
            formatter,
        }
    }
}

#[async_trait]
impl CommandHandler for OwnerListCommand {
    fn name(&self) -> &'static str {
        "olist"
    }

    fn description(&self) -> &'static str {
        "List all horoscope users"
    }

    fn owner_only(&self) -> bool {
        true
    }

    async fn execute(&self, _invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let registrations = self.registrations.all();
        if registrations.is_empty() {
            reply
                .send("No users have registered for horoscopes yet.")
                .await?;
            return Ok(());
        }

        let mut lines = vec!["**Horoscope Registered User List**".to_string()];
        for (n, (id, registration)) in registrations.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("**{}. {}** `(ID: {id})`", n + 1, registration.name));
            lines.push(format!("   - **Sign:** {}", registration.sign));
            lines.push(format!("   - **Timezone:** {}", registration.utc_offset));
        }
        lines.push(String::new());
        lines.push(format!("Total Registered Users: {}", registrations.len()));

        deliver(reply, &self.formatter.chunk(lines)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratebot_core::{RawCommand, send::Transcript, services::http_client};
    use std::time::Duration;

    fn invocation(text: &str) -> Invocation {
        Invocation::new(Author::new(42, "jenny"), "!", RawCommand::new(text).unwrap())
    }

    /// Nothing listens on the discard port, so every lookup fails fast.
    fn unreachable_client() -> HoroscopeClient {
        let http = http_client(Duration::from_secs(2)).unwrap();
        HoroscopeClient::new(http, "http://127.0.0.1:9/v1")
    }

    async fn run(command: &dyn CommandHandler, text: &str) -> Vec<String> {
        let transcript = Transcript::new();
        command
            .execute(&invocation(text), &transcript)
            .await
            .unwrap();
        transcript.messages()
    }

    #[tokio::test]
    async fn test_register_then_modify() {
        let registrations = Registrations::in_memory();
        let reg = RegisterCommand::new(registrations.clone());

        assert_eq!(
            run(&reg, "reg leo +8").await,
            vec![
                "✅ You are registered as **Leo** with timezone **UTC+8**, <@42>! Use `!list` for today's horoscope."
                    .to_string()
            ]
        );
        assert_eq!(
            run(&reg, "reg virgo").await,
            vec![
                "You are already registered, <@42>! Use `!mod` to change your sign or `!modtz` to change your timezone."
                    .to_string()
            ]
        );

        let modify = ModifySignCommand::new(registrations.clone());
        assert_eq!(
            run(&modify, "mod Pisces").await,
            vec!["✅ Your zodiac sign has been updated to **Pisces**!".to_string()]
        );

        let modtz = ModifyTimezoneCommand::new(registrations.clone());
        assert_eq!(
            run(&modtz, "modtz -3:30").await,
            vec!["✅ Your timezone has been set to **UTC-3:30**! All set.".to_string()]
        );

        assert_eq!(
            registrations.get(42),
            Some(Registration {
                name: "jenny".to_string(),
                sign: ZodiacSign::Pisces,
                utc_offset: "-3.5".parse().unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn test_register_input_errors() {
        let registrations = Registrations::in_memory();
        let reg = RegisterCommand::new(registrations.clone());

        assert!(run(&reg, "reg").await[0].starts_with("Welcome, <@42>!"));
        assert!(run(&reg, "reg dragon").await[0].starts_with("'dragon' is not a zodiac sign."));
        assert!(
            run(&reg, "reg leo +20").await[0]
                .starts_with("'+20' is not a UTC offset between UTC-12 and UTC+14.")
        );
        assert_eq!(registrations.get(42), None);

        // The offset is optional
        run(&reg, "reg aries").await;
        assert_eq!(registrations.get(42).map(|r| r.utc_offset), Some(UtcOffset::UTC));
    }

    #[tokio::test]
    async fn test_changes_need_registration() {
        let registrations = Registrations::in_memory();

        assert_eq!(
            run(&ModifySignCommand::new(registrations.clone()), "mod leo").await,
            vec!["You haven't registered yet, <@42>. Please use `!reg` to get started.".to_string()]
        );
        assert_eq!(
            run(&ModifyTimezoneCommand::new(registrations.clone()), "modtz +1").await,
            vec!["You need to register with `!reg` first before changing your timezone.".to_string()]
        );
        assert_eq!(
            run(&RemoveCommand::new(registrations.clone()), "remove").await,
            vec!["You do not have a registered sign to delete, <@42>.".to_string()]
        );
        assert_eq!(
            run(
                &ListCommand::new(registrations.clone(), unreachable_client()),
                "list"
            )
            .await,
            vec!["You haven't registered your sign yet, <@42>. Use `!reg` to get started.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_record() {
        let registrations = Registrations::in_memory();
        run(&RegisterCommand::new(registrations.clone()), "reg leo").await;

        assert_eq!(
            run(&RemoveCommand::new(registrations.clone()), "remove").await,
            vec!["✅ Your record has been deleted, <@42>. Use `!reg` to register again.".to_string()]
        );
        assert!(registrations.all().is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_lookup_failure() {
        let registrations = Registrations::in_memory();
        run(&RegisterCommand::new(registrations.clone()), "reg leo").await;

        let messages = run(
            &ListCommand::new(registrations.clone(), unreachable_client()),
            "list",
        )
        .await;
        assert_eq!(
            messages,
            vec![
                "<@42>, fetching today's horoscope for **Leo**...".to_string(),
                horoscope::LOOKUP_FAILED.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_luck_takes_any_sign() {
        let luck = LuckCommand::new(Registrations::in_memory(), unreachable_client());

        let messages = run(&luck, "luck gemini").await;
        assert_eq!(messages[0], "<@42>, fetching today's horoscope for **Gemini**...");

        assert!(run(&luck, "luck").await[0].starts_with("Which sign, <@42>?"));
        assert!(run(&luck, "luck dragon").await[0].starts_with("'dragon' is not a zodiac sign."));
    }

    #[tokio::test]
    async fn test_owner_listing() {
        let registrations = Registrations::in_memory();
        let olist = OwnerListCommand::new(registrations.clone(), ChunkFormatter::default());
        assert!(olist.owner_only());

        assert_eq!(
            run(&olist, "olist").await,
            vec!["No users have registered for horoscopes yet.".to_string()]
        );

        registrations
            .register(
                9,
                Registration {
                    name: "sam".to_string(),
                    sign: ZodiacSign::Leo,
                    utc_offset: "+8".parse().unwrap(),
                },
            )
            .unwrap();
        registrations
            .register(
                3,
                Registration {
                    name: "jenny".to_string(),
                    sign: ZodiacSign::Aries,
                    utc_offset: UtcOffset::UTC,
                },
            )
            .unwrap();

        assert_eq!(
            run(&olist, "olist").await,
            vec![
                "**Horoscope Registered User List**\n\
                 \n\
                 **1. jenny** `(ID: 3)`\n   - **Sign:** Aries\n   - **Timezone:** UTC+0\n\
                 \n\
                 **2. sam** `(ID: 9)`\n   - **Sign:** Leo\n   - **Timezone:** UTC+8\n\
                 \n\
                 Total Registered Users: 2"
                    .to_string()
            ]
        );
    }
}
