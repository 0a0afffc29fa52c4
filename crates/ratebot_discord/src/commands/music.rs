use std::sync::Arc;

use async_trait::async_trait;
use ratebot_core::{
    ChunkFormatter, MemoryStore, Sendable, StateStore, deliver,
    services::{
        MusicClient,
        music::{self, Song},
    },
};

use super::{CommandHandler, Invocation};
use crate::Result;

/// Each user's latest search, so `d 3` can pick from it.
#[derive(Clone)]
pub struct SearchResults {
    store: Arc<dyn StateStore<u64, Vec<Song>>>,
}

impl SearchResults {
    pub fn new(store: Arc<dyn StateStore<u64, Vec<Song>>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get(&self, user_id: u64) -> Option<Vec<Song>> {
        self.store.get(&user_id)
    }

    pub fn set(&self, user_id: u64, songs: Vec<Song>) {
        self.store.put(user_id, songs);
    }
}

pub struct SearchCommand {
    client: MusicClient,
    results: SearchResults,
    formatter: ChunkFormatter,
}

impl SearchCommand {
    pub fn new(client: MusicClient, results: SearchResults, formatter: ChunkFormatter) -> Self {
        Self {
            client,
            results,
            formatter,
        }
    }
}

#[async_trait]
impl CommandHandler for SearchCommand {
    fn name(&self) -> &'static str {
        "s"
    }

    fn description(&self) -> &'static str {
        "Search for a song"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[query]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let query = invocation.command.rest();
        if query.is_empty() {
            reply.send(&music::search_usage(&invocation.prefix)).await?;
            return Ok(());
        }

        match self.client.search(query).await {
            Ok(songs) if songs.is_empty() => reply.send(music::NO_SONGS).await?,
            Ok(songs) => {
                let lines = music::render_results(&invocation.prefix, &songs);
                self.results.set(invocation.author.id, songs);
                deliver(reply, &self.formatter.chunk(lines)).await?;
            }
            Err(e) => {
                tracing::warn!("Music search for '{}' failed: {:?}", query, e);
                reply.send(music::SEARCH_FAILED).await?;
            }
        }
        Ok(())
    }
}

pub struct DownloadCommand {
    client: MusicClient,
    results: SearchResults,
}

impl DownloadCommand {
    pub fn new(client: MusicClient, results: SearchResults) -> Self {
        Self { client, results }
    }
}

#[async_trait]
impl CommandHandler for DownloadCommand {
    fn name(&self) -> &'static str {
        "d"
    }

    fn description(&self) -> &'static str {
        "Download link for a search result"
    }

    fn arguments(&self) -> Option<&'static str> {
        Some("[number]")
    }

    async fn execute(&self, invocation: &Invocation, reply: &dyn Sendable) -> Result<()> {
        let Some(songs) = self.results.get(invocation.author.id) else {
            reply.send(&music::search_first(&invocation.prefix)).await?;
            return Ok(());
        };

        let picked = invocation
            .command
            .args()
            .first()
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| songs.get(i));

        let message = match picked {
            None => music::INVALID_NUMBER.to_string(),
            Some(song) => match self.client.download_link(song) {
                Some(link) => music::render_download(song, &link),
                None => music::NO_FORMAT.to_string(),
            },
        };

        reply.send(&message).await?;
        Ok(())
    }
}
