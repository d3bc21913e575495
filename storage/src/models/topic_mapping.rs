//! Topic mapping model for persistence.
//!
//! Maps to the `topic_mappings` table and is used by TopicRepository.

use serde::{Deserialize, Serialize};

/// One forum topic known to the bot: exact topic name → forum thread id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopicMapping {
    pub topic_name: String,
    pub topic_id: i64,
}

impl TopicMapping {
    pub fn new(topic_name: impl Into<String>, topic_id: i64) -> Self {
        Self {
            topic_name: topic_name.into(),
            topic_id,
        }
    }
}
