//! English definitions from dictionaryapi.dev

use serde::Deserialize;

use crate::{CoreError, Result};

use super::title_case;

const SERVICE: &str = "dictionaryapi";
const DEFINITIONS_PER_MEANING: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub word: String,
    pub phonetics: Vec<Phonetic>,
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Phonetic {
    pub text: Option<String>,
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: Option<String>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Definition {
    pub definition: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DictionaryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DictionaryClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn entry_url(&self, word: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(word)
        )
    }

    /// Entries for `word`, or `None` when the dictionary has no definitions.
    pub async fn lookup(&self, word: &str) -> Result<Option<Vec<Entry>>> {
        let url = self.entry_url(word);
        tracing::debug!("GET {} ({})", url, SERVICE);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::request_failed(SERVICE, &url, e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| CoreError::request_failed(SERVICE, &url, e))?;
        let entries: Vec<Entry> = response
            .json()
            .await
            .map_err(|e| CoreError::invalid_response(SERVICE, e.to_string()))?;

        Ok(if entries.is_empty() { None } else { Some(entries) })
    }
}

pub const USAGE: &str = "Please provide a word to look up. Usage: `!dict [word]`";
pub const LOOKUP_FAILED: &str =
    "An unexpected error occurred while looking up the word. 😿";

pub fn not_found(word: &str) -> String {
    format!("Sorry, I couldn't find a definition for **'{word}'**. Please check the spelling.")
}

/// Lines describing the first entry: phonetic, audio link and up to three
/// definitions per part of speech.
pub fn render(entry: &Entry) -> Vec<String> {
    let mut lines = vec![format!("**{}**", title_case(&entry.word))];

    if let Some(text) = entry.phonetics.iter().find_map(|p| p.text.as_deref()) {
        lines.push(format!("**Phonetic:** `{text}`"));
    }
    if let Some(audio) = entry
        .phonetics
        .iter()
        .find_map(|p| p.audio.as_deref().filter(|a| !a.is_empty()))
    {
        lines.push(format!("**Pronunciation:** <{audio}>"));
    }

    for meaning in &entry.meanings {
        let definitions: Vec<String> = meaning
            .definitions
            .iter()
            .take(DEFINITIONS_PER_MEANING)
            .enumerate()
            .map(|(i, d)| {
                format!(
                    "**{}.** {}",
                    i + 1,
                    d.definition.as_deref().unwrap_or("No definition available.")
                )
            })
            .collect();

        if definitions.is_empty() {
            continue;
        }

        let part = meaning.part_of_speech.as_deref().unwrap_or("N/A");
        lines.push(String::new());
        lines.push(format!("__As a {}__", title_case(part)));
        lines.extend(definitions);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ENTRY_JSON: &str = r#"[{
        "word": "ice cream",
        "phonetics": [{"audio": ""}, {"text": "/ˌaɪs ˈkɹiːm/", "audio": "https://example.test/ice.mp3"}],
        "meanings": [
            {"partOfSpeech": "noun", "definitions": [
                {"definition": "A frozen dessert."},
                {"definition": "A serving of it."},
                {"definition": "Something else."},
                {"definition": "A fourth one."}
            ]},
            {"partOfSpeech": "verb", "definitions": []}
        ]
    }]"#;

    #[test]
    fn test_render_entry() {
        let entries: Vec<Entry> = serde_json::from_str(ENTRY_JSON).unwrap();
        let lines = render(&entries[0]);

        assert_eq!(
            lines,
            vec![
                "**Ice Cream**".to_string(),
                "**Phonetic:** `/ˌaɪs ˈkɹiːm/`".to_string(),
                "**Pronunciation:** <https://example.test/ice.mp3>".to_string(),
                String::new(),
                "__As a Noun__".to_string(),
                "**1.** A frozen dessert.".to_string(),
                "**2.** A serving of it.".to_string(),
                "**3.** Something else.".to_string(),
            ]
        );
    }

    #[test]
    fn test_entry_url_encodes_word() {
        let client = DictionaryClient::new(reqwest::Client::new(), "https://dict.test/en/");
        assert_eq!(client.entry_url("ice cream"), "https://dict.test/en/ice%20cream");
    }
}
