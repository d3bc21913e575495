//! The topic upload conversation: one state machine shared by all users.
//!
//! Inbound input is routed by a single table over (current step, input kind); see [`route`].
//! Malformed chat ids and wrong file types keep the session for a retry. A failed chat lookup or
//! a chat without forum topics ends the session, and so does every manifest run.

use crate::manifest;
use crate::orchestrator::UploadOrchestrator;
use crate::session::{BeginProcessing, Session, SessionStep, SessionStore};
use crate::topic_store::TopicStoreFactory;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use topicbot_core::{Bot, Chat, Command, Document, HandlerError, Result, TopicbotError};
use tracing::{error, info, instrument, warn};

/// Prefix of supergroup (and therefore forum) chat ids.
const SUPERGROUP_PREFIX: &str = "-100";

pub const MANIFEST_EXTENSION: &str = ".txt";

/// What a user sent, as far as the workflow cares.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Command(Command),
    Text(&'a str),
    Document(&'a Document),
}

/// Result of routing one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Start,
    Cancel,
    Help,
    ChatId,
    Manifest,
    /// Not for this workflow; left to other handlers.
    Ignore,
}

/// The dispatch table. Commands work in any state; text only counts while awaiting a chat id,
/// documents only while awaiting a manifest.
pub fn route(step: Option<&SessionStep>, input: &Input<'_>) -> Route {
    match (step, input) {
        (_, Input::Command(Command::TopicUpload)) => Route::Start,
        (_, Input::Command(Command::Cancel)) => Route::Cancel,
        (_, Input::Command(Command::Help)) => Route::Help,
        (Some(SessionStep::AwaitingChatId), Input::Text(_)) => Route::ChatId,
        (Some(SessionStep::AwaitingManifest { .. }), Input::Document(_)) => Route::Manifest,
        _ => Route::Ignore,
    }
}

/// Parses a `-100<digits>` chat id.
pub fn parse_chat_id(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text.strip_prefix(SUPERGROUP_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Whether the workflow consumed the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Ignored,
}

pub struct TopicUploadFlow {
    bot: Arc<dyn Bot>,
    sessions: Arc<SessionStore>,
    topics: TopicStoreFactory,
    orchestrator: Arc<UploadOrchestrator>,
    work_dir: PathBuf,
}

impl TopicUploadFlow {
    pub fn new(
        bot: Arc<dyn Bot>,
        sessions: Arc<SessionStore>,
        topics: TopicStoreFactory,
        orchestrator: Arc<UploadOrchestrator>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bot,
            sessions,
            topics,
            orchestrator,
            work_dir: work_dir.into(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Routes one input from `user_id` (replies go to `reply`) and runs the matching transition.
    #[instrument(skip(self, reply, input), fields(chat_id = reply.id))]
    pub async fn dispatch(&self, user_id: i64, reply: &Chat, input: Input<'_>) -> Result<Outcome> {
        let session = self.sessions.get(user_id).await;
        let route = route(session.as_ref().map(|s| &s.step), &input);
        info!(route = ?route, has_session = session.is_some(), "step: topic upload routed");

        match (route, session, input) {
            (Route::Start, _, _) => self.start(user_id, reply).await?,
            (Route::Cancel, _, _) => self.cancel(user_id, reply).await?,
            (Route::Help, _, _) => self.bot.send_message(reply, &help_text()).await?,
            (Route::ChatId, Some(session), Input::Text(text)) => {
                self.on_chat_id(&session, reply, text).await?
            }
            (Route::Manifest, Some(session), Input::Document(doc)) => {
                self.on_manifest(&session, reply, doc).await?
            }
            _ => return Ok(Outcome::Ignored),
        }
        Ok(Outcome::Handled)
    }

    async fn start(&self, user_id: i64, reply: &Chat) -> Result<()> {
        self.sessions.start(user_id).await;
        self.bot
            .send_message(
                reply,
                "Topic Upload Mode\n\n\
                 Please send me the Group/Chat ID where you want to upload videos with topics.\n\n\
                 Format: -1001234567890\n\n\
                 Type /cancel to cancel.",
            )
            .await
    }

    async fn cancel(&self, user_id: i64, reply: &Chat) -> Result<()> {
        let text = if self.sessions.cancel(user_id).await {
            "Cancelled"
        } else {
            "Nothing to cancel"
        };
        self.bot.send_message(reply, text).await
    }

    async fn on_chat_id(&self, session: &Session, reply: &Chat, text: &str) -> Result<()> {
        let Some(chat_id) = parse_chat_id(text) else {
            return self
                .bot
                .send_message(reply, "Invalid format. Send: -1001234567890")
                .await;
        };

        self.bot.send_message(reply, "Verifying group access...").await?;

        let info = match self.bot.get_chat_info(chat_id).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, chat_id = chat_id, "Group access check failed");
                self.sessions.finish(session.user_id, session.id).await;
                return self
                    .bot
                    .send_message(
                        reply,
                        &format!(
                            "Cannot access group!\n\nEnsure:\n- Bot is admin in the group\n- Chat ID is correct\n\nError: {}",
                            e
                        ),
                    )
                    .await;
            }
        };

        let title = info.title.clone().unwrap_or_else(|| chat_id.to_string());
        if !info.is_forum {
            info!(chat_id = chat_id, "Target chat has no forum topics");
            self.sessions.finish(session.user_id, session.id).await;
            return self
                .bot
                .send_message(
                    reply,
                    &format!(
                        "Topics are not enabled in {}.\n\nEnable topics in the group settings and start again with /topicupload.",
                        title
                    ),
                )
                .await;
        }

        if !self
            .sessions
            .set_target(session.user_id, session.id, chat_id, title.clone())
            .await
        {
            // Cancelled or restarted while the lookup was in flight.
            return Ok(());
        }

        if let Err(e) = self
            .bot
            .send_message(
                &Chat::with_id(chat_id),
                "Bot Access Verified\n\nReady to upload videos with topics!",
            )
            .await
        {
            warn!(error = %e, chat_id = chat_id, "Could not post verification notice to group");
        }

        self.bot
            .send_message(
                reply,
                &format!(
                    "Ready to upload!\n\nGroup: {}\n\nSend me the TXT file with format:\n\n\
                     [TopicName] - Video Name : URL\n\
                     [Tense-1] - Tense Lesson 1 : https://example.com/video1.m3u8",
                    title
                ),
            )
            .await
    }

    async fn on_manifest(&self, session: &Session, reply: &Chat, document: &Document) -> Result<()> {
        let is_manifest = document
            .file_name
            .as_deref()
            .is_some_and(|name| name.ends_with(MANIFEST_EXTENSION));
        if !is_manifest {
            return self.bot.send_message(reply, "Please send a .txt file").await;
        }

        let (chat_id, chat_title, cancel) =
            match self.sessions.begin_processing(session.user_id, session.id).await {
                BeginProcessing::Started {
                    chat_id,
                    chat_title,
                    cancel,
                } => (chat_id, chat_title, cancel),
                BeginProcessing::Busy => {
                    return self
                        .bot
                        .send_message(reply, "Already processing a file, please wait.")
                        .await;
                }
                BeginProcessing::Unavailable => return Ok(()),
            };

        let result = self
            .run_manifest(session, reply, document, chat_id, &chat_title, &cancel)
            .await;
        self.sessions.finish(session.user_id, session.id).await;

        if let Err(e) = result {
            error!(error = %e, user_id = session.user_id, "Manifest processing failed");
            self.bot.send_message(reply, "Error processing file").await?;
        }
        Ok(())
    }

    async fn run_manifest(
        &self,
        session: &Session,
        reply: &Chat,
        document: &Document,
        chat_id: i64,
        chat_title: &str,
        cancel: &tokio_util::sync::CancellationToken,
    ) -> Result<()> {
        self.bot
            .send_message(
                reply,
                &format!(
                    "Processing file for {}...\n\nDownloading and creating topics...",
                    chat_title
                ),
            )
            .await?;

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let local = self
            .work_dir
            .join(format!("manifest-{}-{}.txt", session.user_id, session.id));

        let text = self.read_manifest(document, &local).await;
        if let Err(e) = tokio::fs::remove_file(&local).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, path = %local.display(), "Failed to remove manifest file");
            }
        }
        let entries = manifest::entries(&text?);

        info!(
            user_id = session.user_id,
            chat_id = chat_id,
            entries = entries.len(),
            "Starting manifest run"
        );
        self.orchestrator
            .process(self.topics.open(chat_id), &entries, reply, cancel)
            .await;
        Ok(())
    }

    async fn read_manifest(&self, document: &Document, local: &Path) -> Result<String> {
        self.bot.download_document(document, local).await?;
        let bytes = tokio::fs::read(local).await?;
        String::from_utf8(bytes).map_err(|_| TopicbotError::Handler(HandlerError::ManifestEncoding))
    }
}

pub fn help_text() -> String {
    "Send /topicupload to upload videos into forum topics of a group.\n\n\
     1. Send the group chat id (-100...).\n\
     2. Send a .txt file with one line per video:\n\
     [TopicName] - Video Name : URL\n\n\
     Lines starting with # are ignored. Type /cancel to stop."
        .to_string()
}
