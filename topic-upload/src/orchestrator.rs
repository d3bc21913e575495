//! Upload orchestrator: runs manifest entries one at a time against a target forum chat.
//!
//! Per entry: resolve the topic, download, upload, remove the local file. A failing entry is
//! reported and skipped; it never aborts the run. Nothing is rolled back.

use crate::collaborators::{Downloader, Uploader};
use crate::manifest::{ManifestEntry, ParsedLine};
use crate::topic_store::TopicStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use topicbot_core::{Bot, Chat};
use tracing::{error, info, instrument, warn};

/// Counts for one manifest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Non-blank, non-comment lines.
    pub seen: usize,
    /// Lines that did not follow the manifest grammar.
    pub rejected: usize,
    /// Parsed entries that were attempted.
    pub processed: usize,
    pub succeeded: usize,
    /// The run stopped early because the session was cancelled.
    pub cancelled: bool,
}

impl Summary {
    pub fn failed(&self) -> usize {
        self.processed - self.succeeded
    }
}

/// Why a single entry did not end up in the forum.
#[derive(Debug)]
enum EntryFailure {
    Topic(String),
    Download(String),
    Upload(String),
}

pub struct UploadOrchestrator {
    bot: Arc<dyn Bot>,
    downloader: Arc<dyn Downloader>,
    uploader: Arc<dyn Uploader>,
    entry_delay: Duration,
}

impl UploadOrchestrator {
    pub fn new(bot: Arc<dyn Bot>, downloader: Arc<dyn Downloader>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            bot,
            downloader,
            uploader,
            entry_delay: Duration::ZERO,
        }
    }

    /// Pause between entries; keeps bursts of uploads under Telegram's rate limits.
    pub fn with_entry_delay(mut self, delay: Duration) -> Self {
        self.entry_delay = delay;
        self
    }

    /// Processes `entries` in file order into the chat of `topics`, reporting to `notify`.
    /// Closes `topics` when done and sends one summary notice.
    #[instrument(skip_all, fields(chat_id = topics.chat_id(), entries = entries.len()))]
    pub async fn process(
        &self,
        topics: TopicStore,
        entries: &[ManifestEntry],
        notify: &Chat,
        cancel: &CancellationToken,
    ) -> Summary {
        let chat_id = topics.chat_id();
        let mut summary = Summary {
            seen: entries.len(),
            ..Summary::default()
        };

        if entries.is_empty() {
            self.notice(notify, "No valid lines found in the file.").await;
            topics.close();
            return summary;
        }

        let total = entries.len();
        for (idx, entry) in entries.iter().enumerate() {
            if idx > 0 && !self.entry_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.entry_delay) => {}
                    _ = cancel.cancelled() => {}
                }
            }
            if cancel.is_cancelled() {
                info!(line_number = entry.line_number, "Run cancelled, stopping before entry");
                summary.cancelled = true;
                break;
            }

            let Some(parsed) = &entry.parsed else {
                summary.rejected += 1;
                warn!(line_number = entry.line_number, raw = %entry.raw_text, "Invalid manifest line");
                self.notice(notify, &format!("Line {}: invalid format", entry.line_number))
                    .await;
                continue;
            };

            summary.processed += 1;
            let progress = self
                .bot
                .send_message_and_return_id(notify, &format!("Processing {}/{}", idx + 1, total))
                .await
                .ok();

            match self.run_entry(&topics, chat_id, parsed).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    self.notice(notify, &format!("Uploaded to '{}'", parsed.topic_name))
                        .await;
                }
                Err(failure) => {
                    error!(line_number = entry.line_number, failure = ?failure, "Manifest entry failed");
                    self.notice(notify, &failure_text(entry.line_number, &failure))
                        .await;
                }
            }

            if let Some(message_id) = progress {
                if let Err(e) = self.bot.delete_message(notify, &message_id).await {
                    warn!(error = %e, "Failed to delete progress message");
                }
            }
        }

        topics.close();
        info!(
            seen = summary.seen,
            rejected = summary.rejected,
            processed = summary.processed,
            succeeded = summary.succeeded,
            cancelled = summary.cancelled,
            "Manifest run finished"
        );
        self.notice(notify, &summary_text(&summary)).await;
        summary
    }

    async fn run_entry(
        &self,
        topics: &TopicStore,
        chat_id: i64,
        entry: &ParsedLine,
    ) -> Result<(), EntryFailure> {
        let topic_id = topics
            .get_or_create(&entry.topic_name)
            .await
            .map_err(|e| EntryFailure::Topic(e.to_string()))?;

        let path = self
            .downloader
            .download(&entry.video_url, &entry.video_name)
            .await
            .map_err(|e| EntryFailure::Download(e.to_string()))?;

        let result = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            self.uploader
                .upload(chat_id, topic_id, &path, &entry.video_name)
                .await
                .map_err(|e| EntryFailure::Upload(e.to_string()))
        } else {
            Err(EntryFailure::Download(format!(
                "file not found after download: {}",
                path.display()
            )))
        };

        remove_quietly(&path).await;
        result
    }

    async fn notice(&self, chat: &Chat, text: &str) {
        if let Err(e) = self.bot.send_message(chat, text).await {
            warn!(error = %e, chat_id = chat.id, "Failed to send notice");
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, path = %path.display(), "Failed to remove downloaded file");
        }
    }
}

fn failure_text(line_number: usize, failure: &EntryFailure) -> String {
    match failure {
        EntryFailure::Topic(e) => format!("Line {}: could not create topic ({})", line_number, e),
        EntryFailure::Download(e) => format!("Line {}: download failed ({})", line_number, e),
        EntryFailure::Upload(e) => format!("Line {}: upload failed ({})", line_number, e),
    }
}

/// Final notice of a run.
pub fn summary_text(summary: &Summary) -> String {
    let mut text = format!(
        "Complete!\n\nSuccess: {}/{}",
        summary.succeeded, summary.processed
    );
    if summary.rejected > 0 {
        text.push_str(&format!("\nInvalid lines: {}", summary.rejected));
    }
    if summary.cancelled {
        text.push_str("\nStopped early: cancelled.");
    }
    text.push_str("\nCheck your group for topics!");
    text
}
