//! Topic store: topic name → forum thread id, backed by the `topic_mappings` table.
//!
//! A lookup hit never touches the transport. A miss creates the forum topic in the target chat
//! and records the returned thread id. Stores opened from one [`TopicStoreFactory`] share a
//! creation guard, so concurrent sessions never create the same topic twice.

use std::sync::{Arc, Mutex};
use storage::{StorageError, TopicRepository};
use thiserror::Error;
use topicbot_core::Bot;
use tracing::{error, info, instrument};

#[derive(Error, Debug)]
pub enum TopicCreationError {
    #[error("topic store error: {0}")]
    Store(#[from] StorageError),
    #[error("create forum topic '{topic_name}' failed: {message}")]
    Transport { topic_name: String, message: String },
    #[error("forum topic '{0}' was created without a usable thread id")]
    MissingThreadId(String),
    #[error("stored thread id {0} is out of range")]
    InvalidThreadId(i64),
}

/// Opens per-chat [`TopicStore`]s over one shared repository.
#[derive(Clone)]
pub struct TopicStoreFactory {
    repo: TopicRepository,
    bot: Arc<dyn Bot>,
    create_guard: Arc<tokio::sync::Mutex<()>>,
}

impl TopicStoreFactory {
    pub fn new(repo: TopicRepository, bot: Arc<dyn Bot>) -> Self {
        Self {
            repo,
            bot,
            create_guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// A store that creates missing topics in `chat_id`.
    pub fn open(&self, chat_id: i64) -> TopicStore {
        TopicStore {
            chat_id,
            bot: self.bot.clone(),
            repo: Mutex::new(Some(self.repo.clone())),
            create_guard: self.create_guard.clone(),
        }
    }
}

/// Topic cache for one manifest run against one target chat.
pub struct TopicStore {
    chat_id: i64,
    bot: Arc<dyn Bot>,
    repo: Mutex<Option<TopicRepository>>,
    create_guard: Arc<tokio::sync::Mutex<()>>,
}

impl TopicStore {
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Returns the thread id for `topic_name`, creating the forum topic on first use.
    ///
    /// On error nothing is persisted, so a later call retries the creation.
    #[instrument(skip(self), fields(chat_id = self.chat_id))]
    pub async fn get_or_create(&self, topic_name: &str) -> Result<i32, TopicCreationError> {
        let repo = self.repository()?;

        if let Some(id) = repo.find(topic_name).await? {
            info!(topic_name = %topic_name, topic_id = id, "Using existing topic");
            return thread_id(id);
        }

        let _guard = self.create_guard.lock().await;
        // Another session may have created it while we waited.
        if let Some(id) = repo.find(topic_name).await? {
            info!(topic_name = %topic_name, topic_id = id, "Topic created concurrently, reusing");
            return thread_id(id);
        }

        info!(topic_name = %topic_name, "Creating forum topic");
        let created = self
            .bot
            .create_forum_topic(self.chat_id, topic_name)
            .await
            .map_err(|e| {
                error!(error = %e, topic_name = %topic_name, "Failed to create forum topic");
                TopicCreationError::Transport {
                    topic_name: topic_name.to_string(),
                    message: e.to_string(),
                }
            })?;
        let topic_id =
            created.ok_or_else(|| TopicCreationError::MissingThreadId(topic_name.to_string()))?;

        repo.upsert(topic_name, i64::from(topic_id)).await?;
        info!(topic_name = %topic_name, topic_id = topic_id, "Created new topic");
        Ok(topic_id)
    }

    /// Releases this store's handle on the repository. Safe to call more than once; later
    /// lookups fail with [`StorageError::Closed`].
    pub fn close(&self) {
        let mut repo = self.repo.lock().unwrap_or_else(|e| e.into_inner());
        if repo.take().is_some() {
            info!(chat_id = self.chat_id, "Topic store closed");
        }
    }

    fn repository(&self) -> Result<TopicRepository, StorageError> {
        self.repo
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(StorageError::Closed)
    }
}

fn thread_id(stored: i64) -> Result<i32, TopicCreationError> {
    i32::try_from(stored).map_err(|_| TopicCreationError::InvalidThreadId(stored))
}
