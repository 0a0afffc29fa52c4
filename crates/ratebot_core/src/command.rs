//! Command text handling
//!
//! A chat message such as `!usd 100 myr` reaches this module with the
//! prefix already stripped. [`RawCommand`] tokenises the text for the
//! registered-command dispatcher, and [`parse`] recognises the free-form
//! currency shape that is tried only after no registered command matched.
//!
//! The currency grammar:
//!
//! ```text
//! command  := first (WS amount (WS target)? | WS target)? (WS any)*
//! first    := LETTER{2,4} suffix?        ; next char must not be a letter
//! suffix   := DIGIT* ('.' DIGIT*)? any*  ; only the numeric prefix is read
//! amount   := DIGIT+ ('.' DIGIT+)?
//! target   := any non-whitespace token
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Leading currency code; the remainder (if any) must start with a non-letter.
    static ref CODE_WITH_SUFFIX: Regex =
        Regex::new(r"^([A-Za-z]{2,4})([^\p{Alphabetic}].*)?$").unwrap();
    /// Numeric prefix of an attached suffix. Always matches, possibly empty.
    static ref ATTACHED_AMOUNT: Regex = Regex::new(r"^[0-9]*(?:\.[0-9]*)?").unwrap();
    /// A standalone amount token.
    static ref EXPLICIT_AMOUNT: Regex = Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").unwrap();
}

/// Amount used when the user gives none (or an unusable one).
pub const DEFAULT_AMOUNT: f64 = 1.0;

/// Text typed after the command prefix, split into whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    text: String,
    tokens: Vec<String>,
}

impl RawCommand {
    /// Tokenise `text`. Returns `None` when it holds no tokens at all.
    pub fn new(text: &str) -> Option<Self> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return None;
        }

        Some(Self {
            text: text.trim().to_string(),
            tokens,
        })
    }

    /// Strip `prefix` from a chat message and tokenise what follows.
    pub fn from_message(content: &str, prefix: &str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }
        content.strip_prefix(prefix).and_then(Self::new)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The first token, as typed.
    pub fn name(&self) -> &str {
        &self.tokens[0]
    }

    /// Tokens after the first.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// Everything after the first token with surrounding whitespace removed,
    /// inner spacing preserved (`!dict ice cream` -> `ice cream`).
    pub fn rest(&self) -> &str {
        self.text
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A recognised currency-conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyIntent {
    /// Currency converted from, upper-cased.
    pub base_currency: String,
    /// How many units of the base currency. Always finite and positive.
    pub amount: f64,
    /// Currency converted to; `None` means "show every rate".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_currency: Option<String>,
}

impl CurrencyIntent {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into().to_uppercase(),
            amount: DEFAULT_AMOUNT,
            target_currency: None,
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_currency = Some(target.into().to_uppercase());
        self
    }

    /// See [`parse`].
    pub fn parse(raw: &str) -> Option<Self> {
        parse(raw)
    }

    /// Apply a per-unit rate to this intent's amount.
    pub fn convert(&self, rate_for_one: f64) -> f64 {
        rate_for_one * self.amount
    }
}

impl fmt::Display for CurrencyIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.base_currency)?;
        match &self.target_currency {
            Some(target) => write!(f, " -> {}", target),
            None => write!(f, " -> *"),
        }
    }
}

/// Recognise a currency command, or `None` when the text is not one.
///
/// Never fails: malformed amounts fall back to [`DEFAULT_AMOUNT`].
pub fn parse(raw: &str) -> Option<CurrencyIntent> {
    let command = RawCommand::new(raw)?;
    let tokens = command.tokens();

    let captures = CODE_WITH_SUFFIX.captures(&tokens[0])?;
    let mut intent = CurrencyIntent::new(&captures[1]);

    if let Some(amount) = captures
        .get(2)
        .and_then(|suffix| attached_amount(suffix.as_str()))
    {
        intent.amount = amount;
    }

    if let Some(second) = tokens.get(1) {
        if EXPLICIT_AMOUNT.is_match(second) {
            if let Some(amount) = positive(second) {
                intent.amount = amount;
            }
            if let Some(third) = tokens.get(2) {
                intent.target_currency = Some(third.to_uppercase());
            }
        } else {
            intent.target_currency = Some(second.to_uppercase());
        }
    }

    Some(intent)
}

fn attached_amount(suffix: &str) -> Option<f64> {
    let numeric = ATTACHED_AMOUNT.find(suffix)?.as_str();
    positive(numeric)
}

fn positive(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
