//! Song search against a JOOX mirror

use serde::Deserialize;

use crate::Result;

use super::{fetch_json, value_text};

const SERVICE: &str = "joox";
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct SearchData {
    data: Vec<Song>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Song {
    #[serde(rename = "ID")]
    pub id: serde_json::Value,
    pub title: Option<String>,
    pub singers: Vec<Singer>,
    pub album: Album,
    #[serde(rename = "fileLinks")]
    pub file_links: Vec<FileLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Singer {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Album {
    pub name: Option<String>,
}

/// Quality is a bitrate the mirror sends as a number or a string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileLink {
    pub format: Option<String>,
    pub quality: serde_json::Value,
}

impl FileLink {
    fn quality_rank(&self) -> f64 {
        value_text(&self.quality)
            .and_then(|q| q.parse().ok())
            .unwrap_or(f64::INFINITY)
    }
}

impl Song {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown Title")
    }

    pub fn artists(&self) -> String {
        self.singers
            .iter()
            .filter_map(|s| s.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The smallest mp3 or m4a file on offer.
    pub fn smallest_download(&self) -> Option<&FileLink> {
        self.file_links
            .iter()
            .filter(|link| matches!(link.format.as_deref(), Some("mp3" | "m4a")))
            .min_by(|a, b| a.quality_rank().total_cmp(&b.quality_rank()))
    }
}

#[derive(Debug, Clone)]
pub struct MusicClient {
    http: reqwest::Client,
    search_url: String,
    download_url: String,
}

impl MusicClient {
    pub fn new(
        http: reqwest::Client,
        search_url: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            search_url: search_url.into(),
            download_url: download_url.into(),
        }
    }

    /// Up to [`MAX_RESULTS`] songs matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Song>> {
        let request = self.http.get(&self.search_url).query(&[("key", query)]);
        let response: SearchResponse = fetch_json(SERVICE, &self.search_url, request).await?;

        let mut songs = response.data.data;
        songs.truncate(MAX_RESULTS);
        Ok(songs)
    }

    /// Link to the smallest downloadable file of `song`.
    pub fn download_link(&self, song: &Song) -> Option<String> {
        let link = song.smallest_download()?;
        let id = value_text(&song.id)?;
        let quality = value_text(&link.quality)?;
        let format = link.format.as_deref()?;

        Some(format!(
            "{}?ID={}&quality={}&format={}",
            self.download_url,
            urlencoding::encode(&id),
            urlencoding::encode(&quality),
            urlencoding::encode(format)
        ))
    }
}

pub const SEARCH_FAILED: &str = "Sorry, an error occurred while searching for music.";
pub const NO_SONGS: &str = "No songs found for that query. Please try again.";
pub const INVALID_NUMBER: &str =
    "Invalid song number. Please choose a number from the search results.";
pub const NO_FORMAT: &str = "No compatible download format found for this song.";

pub fn search_usage(prefix: &str) -> String {
    format!("Please tell me what to search for. Usage: `{prefix}s [query]`")
}

pub fn search_first(prefix: &str) -> String {
    format!("Please use `{prefix}s [query]` first to get a list of songs.")
}

pub fn render_results(prefix: &str, songs: &[Song]) -> Vec<String> {
    let mut lines = vec![
        "🎧 **Search Results**".to_string(),
        format!(
            "Found **{}** songs. Use `{prefix}d [number]` to get a download link.",
            songs.len()
        ),
    ];

    for (i, song) in songs.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("**{}. {}**", i + 1, song.title()));
        lines.push(format!(
            "**Artist:** {} | **Album:** {}",
            song.artists(),
            song.album.name.as_deref().unwrap_or("N/A")
        ));
    }

    lines
}

pub fn render_download(song: &Song, link: &str) -> String {
    format!(
        "🎵 **{}** by **{}**\n{link}",
        song.title(),
        song.artists()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEARCH_JSON: &str = r#"{"data": {"data": [
        {
            "ID": "abc==",
            "title": "Blue",
            "singers": [{"name": "Ana"}, {"name": "Ben"}],
            "album": {"name": "Colours"},
            "fileLinks": [
                {"format": "flac", "quality": 999},
                {"format": "mp3", "quality": 320},
                {"format": "m4a", "quality": "96"},
                {"format": "mp3", "quality": 128}
            ]
        },
        {"ID": 7, "title": null, "fileLinks": [{"format": "ogg", "quality": 64}]}
    ]}}"#;

    fn songs() -> Vec<Song> {
        serde_json::from_str::<SearchResponse>(SEARCH_JSON)
            .unwrap()
            .data
            .data
    }

    #[test]
    fn test_smallest_download() {
        let songs = songs();
        let link = songs[0].smallest_download().unwrap();
        assert_eq!(link.format.as_deref(), Some("m4a"));
        assert!(songs[1].smallest_download().is_none());
    }

    #[test]
    fn test_download_link() {
        let client = MusicClient::new(
            reqwest::Client::new(),
            "https://music.test/search",
            "https://music.test/url",
        );
        let songs = songs();

        assert_eq!(
            client.download_link(&songs[0]).as_deref(),
            Some("https://music.test/url?ID=abc%3D%3D&quality=96&format=m4a")
        );
        assert_eq!(client.download_link(&songs[1]), None);
    }

    #[test]
    fn test_render_results() {
        let lines = render_results("!", &songs());

        assert_eq!(
            lines,
            vec![
                "🎧 **Search Results**".to_string(),
                "Found **2** songs. Use `!d [number]` to get a download link.".to_string(),
                String::new(),
                "**1. Blue**".to_string(),
                "**Artist:** Ana, Ben | **Album:** Colours".to_string(),
                String::new(),
                "**2. Unknown Title**".to_string(),
                "**Artist:**  | **Album:** N/A".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(response.data.data.is_empty());
    }
}
