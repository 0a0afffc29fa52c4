//! HTTP clients for the services the bot relays
//!
//! Each client decodes the service's JSON into typed structs; rendering
//! into chat lines is kept in plain functions next to the types so it can
//! be tested without a network.

pub mod cats;
pub mod deals;
pub mod dictionary;
pub mod frankfurter;
pub mod horoscope;
pub mod live_rate;
pub mod music;
pub mod reference_rate;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::{CoreError, Result, config::ServicesConfig};

pub use cats::CatClient;
pub use deals::DealsClient;
pub use dictionary::DictionaryClient;
pub use frankfurter::FrankfurterClient;
pub use horoscope::HoroscopeClient;
pub use live_rate::LiveRateClient;
pub use music::MusicClient;
pub use reference_rate::ReferenceRateClient;

const USER_AGENT: &str = concat!("ratebot/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CoreError::request_failed("http client", "<builder>", e))
}

/// Every service client, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Services {
    pub reference_rate: ReferenceRateClient,
    pub cats: CatClient,
    pub deals: DealsClient,
    pub dictionary: DictionaryClient,
    pub horoscope: HoroscopeClient,
    pub live_rate: LiveRateClient,
    pub music: MusicClient,
}

impl Services {
    pub fn new(http: reqwest::Client, config: &ServicesConfig) -> Self {
        Self {
            reference_rate: ReferenceRateClient::new(http.clone(), &config.reference_rate_url),
            cats: CatClient::new(http.clone(), &config.cat_facts_url, &config.cat_images_url),
            deals: DealsClient::new(http.clone(), &config.deals_url, &config.games_url),
            dictionary: DictionaryClient::new(http.clone(), &config.dictionary_url),
            horoscope: HoroscopeClient::new(http.clone(), &config.horoscope_url),
            live_rate: LiveRateClient::new(
                http.clone(),
                &config.live_rate_url,
                config.live_rate_token.clone(),
            ),
            music: MusicClient::new(
                http,
                &config.music_search_url,
                &config.music_download_url,
            ),
        }
    }
}

/// Send `request`, require a success status and decode the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    url: &str,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    tracing::debug!("GET {} ({})", url, service);

    let response = request
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| CoreError::request_failed(service, url, e))?;

    response
        .json::<T>()
        .await
        .map_err(|e| CoreError::invalid_response(service, e.to_string()))
}

/// Capitalise the first letter of every space-separated word and lower-case
/// the rest.
pub(crate) fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a loosely typed JSON scalar: strings without quotes,
/// numbers as written, anything else absent.
pub(crate) fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
