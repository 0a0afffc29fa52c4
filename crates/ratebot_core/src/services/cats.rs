use serde::Deserialize;

use crate::Result;

use super::fetch_json;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatFacts {
    #[serde(default)]
    pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatImage {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CatClient {
    http: reqwest::Client,
    facts_url: String,
    images_url: String,
}

impl CatClient {
    pub fn new(
        http: reqwest::Client,
        facts_url: impl Into<String>,
        images_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            facts_url: facts_url.into(),
            images_url: images_url.into(),
        }
    }

    pub async fn fact(&self) -> Result<CatFacts> {
        fetch_json("meowfacts", &self.facts_url, self.http.get(&self.facts_url)).await
    }

    pub async fn images(&self) -> Result<Vec<CatImage>> {
        fetch_json("thecatapi", &self.images_url, self.http.get(&self.images_url)).await
    }
}

pub const FACT_FAILED: &str = "Sorry, an unexpected error stopped me from getting a cat fact. 😿";
pub const IMAGE_FAILED: &str = "Sorry, an unexpected error stopped me from getting a cat. 😿";

pub fn render_fact(facts: &CatFacts) -> String {
    match facts.data.first().filter(|fact| !fact.trim().is_empty()) {
        Some(fact) => format!("🐱 **Did You Know?**\n{fact}"),
        None => "The cat fact API is empty. 😿".to_string(),
    }
}

pub fn render_image(images: &[CatImage]) -> String {
    match images.first() {
        Some(image) => format!("Meow! Here's a cat for you 🐱\n{}", image.url),
        None => "The cat API returned no cats. 😿".to_string(),
    }
}
