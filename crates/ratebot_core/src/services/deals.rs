//! Steam deals from CheapShark

use serde::Deserialize;

use crate::Result;

use super::fetch_json;

const SERVICE: &str = "cheapshark";
const STEAM_STORE_ID: &str = "1";
const TOP_DEALS: &str = "5";

/// CheapShark sends prices and scores as strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deal {
    pub title: Option<String>,
    #[serde(rename = "dealID")]
    pub deal_id: Option<String>,
    #[serde(rename = "steamAppID")]
    pub steam_app_id: Option<String>,
    pub normal_price: Option<String>,
    pub sale_price: Option<String>,
    pub savings: Option<String>,
    pub metacritic_score: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameListing {
    pub external: Option<String>,
    pub cheapest: Option<String>,
    #[serde(rename = "steamAppID")]
    pub steam_app_id: Option<String>,
}

/// Result of a single-title price check.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceCheck {
    OnSale(Deal),
    NotOnSale(GameListing),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct DealsClient {
    http: reqwest::Client,
    deals_url: String,
    games_url: String,
}

impl DealsClient {
    pub fn new(
        http: reqwest::Client,
        deals_url: impl Into<String>,
        games_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            deals_url: deals_url.into(),
            games_url: games_url.into(),
        }
    }

    /// Top Steam deals by savings.
    pub async fn top(&self) -> Result<Vec<Deal>> {
        let request = self.http.get(&self.deals_url).query(&[
            ("storeID", STEAM_STORE_ID),
            ("sortBy", "Savings"),
            ("pageSize", TOP_DEALS),
        ]);
        fetch_json(SERVICE, &self.deals_url, request).await
    }

    /// Look a game up by exact title: a current deal first, then the catalogue.
    pub async fn price(&self, title: &str) -> Result<PriceCheck> {
        let request = self.http.get(&self.deals_url).query(&[
            ("storeID", STEAM_STORE_ID),
            ("onSale", "1"),
            ("exact", "1"),
            ("title", title),
        ]);
        let deals: Vec<Deal> = fetch_json(SERVICE, &self.deals_url, request).await?;
        if let Some(deal) = deals.into_iter().next() {
            return Ok(PriceCheck::OnSale(deal));
        }

        let request = self
            .http
            .get(&self.games_url)
            .query(&[("title", title), ("exact", "1")]);
        let games: Vec<GameListing> = fetch_json(SERVICE, &self.games_url, request).await?;
        Ok(games
            .into_iter()
            .next()
            .map(PriceCheck::NotOnSale)
            .unwrap_or(PriceCheck::NotFound))
    }
}

pub const DEALS_FAILED: &str = "Sorry, an unexpected error stopped me from getting game deals. 😿";
pub const PRICE_FAILED: &str =
    "Sorry, an unexpected error stopped me from checking the price. 😿";
pub const PRICE_USAGE: &str =
    "Please tell me which game you want to check! Usage: `!price [game name]`";

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn discount(deal: &Deal) -> i64 {
    deal.savings
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .map(|s| s.round() as i64)
        .unwrap_or(0)
}

fn store_link(app_id: &Option<String>) -> Option<String> {
    app_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| format!("<https://store.steampowered.com/app/{id}>"))
}

pub fn render_top(deals: &[Deal]) -> Vec<String> {
    if deals.is_empty() {
        return vec!["I couldn't find any hot deals on Steam right now.".to_string()];
    }

    let mut lines = vec![
        "🔥 **Top 5 Steam Deals Right Now**".to_string(),
        "Here are the hottest deals, sorted by discount!".to_string(),
    ];
    for deal in deals {
        lines.push(String::new());
        lines.push(format!("**{}**", deal.title.as_deref().unwrap_or("Unknown Game")));
        lines.push(format!(
            "Price: ~~${}~~ → **${}**",
            or_na(&deal.normal_price),
            or_na(&deal.sale_price)
        ));
        lines.push(format!("Discount: `{}%`", discount(deal)));
        if let Some(id) = deal.deal_id.as_deref() {
            lines.push(format!("<https://www.cheapshark.com/redirect?dealID={id}>"));
        }
    }
    lines
}

pub fn render_price(title: &str, check: &PriceCheck) -> Vec<String> {
    match check {
        PriceCheck::OnSale(deal) => {
            let mut lines = vec![
                format!(
                    "🔥 **Deal Found for: {}**",
                    deal.title.as_deref().unwrap_or("Unknown Game")
                ),
                format!(
                    "Price: ~~${}~~ → **${}**",
                    or_na(&deal.normal_price),
                    or_na(&deal.sale_price)
                ),
                format!("Discount: **{}% OFF**", discount(deal)),
                format!("Metacritic Score: `{}`", or_na(&deal.metacritic_score)),
            ];
            lines.extend(store_link(&deal.steam_app_id));
            lines
        }
        PriceCheck::NotOnSale(game) => {
            let mut lines = vec![
                format!(
                    "**Price Check for: {}**",
                    game.external.as_deref().unwrap_or("Unknown Game")
                ),
                "This game is **not currently on sale** on Steam.".to_string(),
                format!("Current Price: **${}**", or_na(&game.cheapest)),
            ];
            lines.extend(store_link(&game.steam_app_id));
            lines
        }
        PriceCheck::NotFound => vec![format!(
            "Sorry, I couldn't find a game with the exact name **'{title}'**."
        )],
    }
}
