//! Integration tests: Message → TopicUploadHandler → session transitions and bot replies.
//!
//! Drives the whole conversation (start, chat id, manifest) through [`Handler::handle`] with a
//! mock bot and fake media tools.

mod common;

use chrono::Utc;
use std::sync::Arc;
use storage::TopicRepository;
use topic_upload::{
    BeginProcessing, SessionStep, SessionStore, TopicStoreFactory, TopicUploadFlow,
    TopicUploadHandler, UploadOrchestrator,
};
use topicbot_core::{
    Chat, Command, Document, Handler, HandlerResponse, Message, MessageDirection, User,
};

use common::fakes::{FakeDownloader, FakeUploader};
use common::mock_bot::MockBot;

const USER: i64 = 42;
const GROUP: i64 = -1001234567890;

struct Harness {
    bot: Arc<MockBot>,
    sessions: Arc<SessionStore>,
    uploader: Arc<FakeUploader>,
    handler: TopicUploadHandler,
    work: tempfile::TempDir,
    _media: tempfile::TempDir,
}

async fn harness(bot: MockBot) -> Harness {
    let work = tempfile::tempdir().unwrap();
    let media = tempfile::tempdir().unwrap();
    let bot = Arc::new(bot);
    let uploader = Arc::new(FakeUploader::new());
    let sessions = Arc::new(SessionStore::new());
    let repo = TopicRepository::new("sqlite::memory:").await.unwrap();
    let orchestrator = Arc::new(UploadOrchestrator::new(
        bot.clone(),
        Arc::new(FakeDownloader::new(media.path())),
        uploader.clone(),
    ));
    let flow = TopicUploadFlow::new(
        bot.clone(),
        sessions.clone(),
        TopicStoreFactory::new(repo, bot.clone()),
        orchestrator,
        work.path(),
    );
    Harness {
        bot,
        sessions,
        uploader,
        handler: TopicUploadHandler::new(Arc::new(flow)),
        work,
        _media: media,
    }
}

/// What the Telegram layer recognises for this bot.
fn command_of(content: &str) -> Option<Command> {
    match content {
        "/topicupload" => Some(Command::TopicUpload),
        "/cancel" => Some(Command::Cancel),
        "/start" | "/help" => Some(Command::Help),
        _ => None,
    }
}

fn message(chat_type: &str, content: &str, document: Option<Document>) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: USER,
            username: Some("uploader".to_string()),
            first_name: Some("Up".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: USER,
            chat_type: chat_type.to_string(),
        },
        content: content.to_string(),
        message_type: if document.is_some() { "document" } else { "text" }.to_string(),
        document,
        command: command_of(content),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
    }
}

fn text(content: &str) -> Message {
    message("private", content, None)
}

fn file(file_id: &str, name: &str) -> Message {
    message(
        "private",
        "",
        Some(Document {
            file_id: file_id.to_string(),
            file_name: Some(name.to_string()),
            file_size: Some(120),
        }),
    )
}

impl Harness {
    async fn send(&self, message: Message) -> HandlerResponse {
        self.handler.handle(&message).await.unwrap()
    }

    fn last_reply(&self) -> String {
        self.bot.last_text_to(USER).unwrap_or_default()
    }
}

/// **Given** a forum group titled Physics, **when** the user runs the whole conversation,
/// **then** the title is echoed, entries are uploaded into one topic and the session ends.
#[tokio::test]
async fn test_full_conversation_uploads_into_topic() {
    let bot = MockBot::new().with_chat(GROUP, "Physics", true).with_document(
        "manifest-1",
        "[Algebra] - Lesson 1 : https://example.com/a.mp4\n\
         # comment\n\
         [Algebra] - Lesson 2 : https://example.com/b.mp4\n\
         not a valid line\n",
    );
    let h = harness(bot).await;

    assert_eq!(h.send(text("/topicupload")).await, HandlerResponse::Stop);
    assert_eq!(h.sessions.step(USER).await, Some(SessionStep::AwaitingChatId));

    assert_eq!(h.send(text("-1001234567890")).await, HandlerResponse::Stop);
    assert_eq!(
        h.sessions.step(USER).await,
        Some(SessionStep::AwaitingManifest {
            chat_id: GROUP,
            chat_title: "Physics".to_string()
        })
    );
    assert!(h.last_reply().contains("Physics"));
    assert!(h
        .bot
        .texts_to(GROUP)
        .iter()
        .any(|t| t.contains("Bot Access Verified")));

    assert_eq!(h.send(file("manifest-1", "list.txt")).await, HandlerResponse::Stop);

    assert_eq!(h.bot.created_topics(), vec![(GROUP, "Algebra".to_string())]);
    assert_eq!(h.uploader.uploads().len(), 2);
    let replies = h.bot.texts_to(USER);
    assert!(replies.contains(&"Line 4: invalid format".to_string()));
    assert!(h.last_reply().contains("Success: 2/2"));
    assert!(h.sessions.get(USER).await.is_none());
    // The downloaded manifest does not outlive the run.
    assert_eq!(std::fs::read_dir(h.work.path()).unwrap().count(), 0);
}

/// A second manifest while the first is still running is rejected; the running session survives.
#[tokio::test]
async fn test_manifest_while_busy_is_rejected() {
    let bot = MockBot::new()
        .with_chat(GROUP, "Physics", true)
        .with_document("manifest-2", "[Algebra] - Lesson 1 : https://example.com/a.mp4\n");
    let h = harness(bot).await;
    h.send(text("/topicupload")).await;
    h.send(text("-1001234567890")).await;

    let session = h.sessions.get(USER).await.unwrap();
    assert!(matches!(
        h.sessions.begin_processing(USER, session.id).await,
        BeginProcessing::Started { .. }
    ));

    assert_eq!(h.send(file("manifest-2", "more.txt")).await, HandlerResponse::Stop);

    assert_eq!(h.last_reply(), "Already processing a file, please wait.");
    let still_running = h.sessions.get(USER).await.unwrap();
    assert_eq!(still_running.id, session.id);
    assert!(still_running.busy);
    assert!(h.uploader.uploads().is_empty());
    assert!(h.bot.created_topics().is_empty());
}

#[tokio::test]
async fn test_start_then_cancel_leaves_no_session() {
    let h = harness(MockBot::new()).await;

    h.send(text("/topicupload")).await;
    assert_eq!(h.send(text("/cancel")).await, HandlerResponse::Stop);

    assert!(h.sessions.is_empty().await);
    assert_eq!(h.last_reply(), "Cancelled");

    h.send(text("/cancel")).await;
    assert_eq!(h.last_reply(), "Nothing to cancel");
}

#[tokio::test]
async fn test_malformed_chat_id_keeps_session() {
    let h = harness(MockBot::new()).await;
    h.send(text("/topicupload")).await;

    for bad in ["1234", "-123456", "-100abc", "-100"] {
        assert_eq!(h.send(text(bad)).await, HandlerResponse::Stop);
        assert_eq!(h.last_reply(), "Invalid format. Send: -1001234567890");
    }
    assert_eq!(h.sessions.step(USER).await, Some(SessionStep::AwaitingChatId));
}

#[tokio::test]
async fn test_unreachable_chat_ends_session() {
    let h = harness(MockBot::new()).await;
    h.send(text("/topicupload")).await;

    h.send(text("-1009999")).await;

    assert!(h.sessions.get(USER).await.is_none());
    assert!(h.last_reply().starts_with("Cannot access group!"));
    assert!(h.last_reply().contains("chat not found"));
}

#[tokio::test]
async fn test_chat_without_topics_ends_session() {
    let h = harness(MockBot::new().with_chat(GROUP, "Plain Group", false)).await;
    h.send(text("/topicupload")).await;

    h.send(text("-1001234567890")).await;

    assert!(h.sessions.get(USER).await.is_none());
    assert!(h.last_reply().contains("Topics are not enabled in Plain Group"));
}

#[tokio::test]
async fn test_wrong_file_type_keeps_session() {
    let h = harness(MockBot::new().with_chat(GROUP, "Physics", true)).await;
    h.send(text("/topicupload")).await;
    h.send(text("-1001234567890")).await;

    assert_eq!(h.send(file("pdf-1", "notes.pdf")).await, HandlerResponse::Stop);

    assert_eq!(h.last_reply(), "Please send a .txt file");
    assert!(matches!(
        h.sessions.step(USER).await,
        Some(SessionStep::AwaitingManifest { .. })
    ));
}

#[tokio::test]
async fn test_undecodable_manifest_ends_session() {
    let bot = MockBot::new()
        .with_chat(GROUP, "Physics", true)
        .with_document("bad", vec![0xff, 0xfe, 0x00, 0x80]);
    let h = harness(bot).await;
    h.send(text("/topicupload")).await;
    h.send(text("-1001234567890")).await;

    h.send(file("bad", "list.txt")).await;

    assert_eq!(h.last_reply(), "Error processing file");
    assert!(h.sessions.get(USER).await.is_none());
    assert!(h.uploader.uploads().is_empty());
}

#[tokio::test]
async fn test_unrelated_input_continues_chain() {
    let h = harness(MockBot::new().with_chat(GROUP, "Physics", true)).await;

    // No session: plain text and documents are not ours.
    assert_eq!(h.send(text("hello")).await, HandlerResponse::Continue);
    assert_eq!(h.send(file("x", "list.txt")).await, HandlerResponse::Continue);
    // Unknown commands belong to other handlers.
    assert_eq!(h.send(text("/stats")).await, HandlerResponse::Continue);
    // Group chats are ignored even for known commands.
    assert_eq!(
        h.send(message("supergroup", "/topicupload", None)).await,
        HandlerResponse::Continue
    );
    assert!(h.sessions.is_empty().await);

    // Text while awaiting a manifest is not consumed.
    h.send(text("/topicupload")).await;
    h.send(text("-1001234567890")).await;
    assert_eq!(h.send(text("-1001234567890")).await, HandlerResponse::Continue);
}

#[tokio::test]
async fn test_restart_replaces_session() {
    let h = harness(MockBot::new().with_chat(GROUP, "Physics", true)).await;
    h.send(text("/topicupload")).await;
    h.send(text("-1001234567890")).await;

    h.send(text("/topicupload")).await;

    assert_eq!(h.sessions.step(USER).await, Some(SessionStep::AwaitingChatId));
    assert_eq!(h.sessions.len().await, 1);
}
