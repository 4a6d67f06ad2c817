use anyhow::Result;
use reqwest::Client;
use sqlx::PgPool;

use storytime_clients::{LlmClient, PostgresClient, StorageClient};
use storytime_common::ModuleClient;
use storytime_runtime::{agents::{StoryChaptersAgent, StoryTitlesAgent}, Illustrator};

#[derive(Clone)]
pub struct GlobalState {
    pub db: PostgresClient,
    pub llm: LlmClient,
    pub storage: StorageClient,
    pub http_client: Client,
}

impl GlobalState {
    /// Connects the generation and storage clients around an existing database client.
    pub async fn new(db: PostgresClient) -> Result<Self> {
        let llm = LlmClient::setup_connection().await?;
        let storage = StorageClient::setup_connection().await?;
        Ok(Self::from_clients(db, llm, storage))
    }

    pub fn from_clients(db: PostgresClient, llm: LlmClient, storage: StorageClient) -> Self {
        Self {
            db,
            llm,
            storage,
            http_client: Client::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    pub fn story_titles_agent(&self) -> StoryTitlesAgent {
        StoryTitlesAgent::new(self.llm.clone())
    }

    pub fn story_chapters_agent(&self) -> StoryChaptersAgent {
        StoryChaptersAgent::new(self.llm.clone())
    }

    pub fn illustrator(&self) -> Illustrator {
        Illustrator::new(self.llm.clone(), self.storage.clone(), self.http_client.clone())
    }
}
