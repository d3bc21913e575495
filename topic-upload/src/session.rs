//! Per-user sessions of the topic upload workflow.
//!
//! A session is created by the start command, moved forward only through the transition
//! methods below, and removed on cancel or on any terminal outcome. Each session gets a
//! process-unique id: terminal transitions name the session they belong to, so a run that
//! finishes after the user cancelled and restarted never removes the newer session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Which input the session accepts next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    /// Waiting for a `-100…` chat id as text.
    AwaitingChatId,
    /// Chat verified; waiting for a `.txt` manifest document.
    AwaitingManifest { chat_id: i64, chat_title: String },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: u64,
    pub user_id: i64,
    pub step: SessionStep,
    /// Set while a manifest of this session is being processed.
    pub busy: bool,
    pub cancel: CancellationToken,
}

/// Outcome of [`SessionStore::begin_processing`].
#[derive(Debug, Clone)]
pub enum BeginProcessing {
    Started {
        chat_id: i64,
        chat_title: String,
        cancel: CancellationToken,
    },
    /// A manifest of this session is already running.
    Busy,
    /// The session is gone or no longer waiting for a manifest.
    Unavailable,
}

/// Process-wide map of live sessions keyed by user id.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh session at [`SessionStep::AwaitingChatId`], discarding (and cancelling) any previous one.
    pub async fn start(&self, user_id: i64) -> Session {
        let session = Session {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id,
            step: SessionStep::AwaitingChatId,
            busy: false,
            cancel: CancellationToken::new(),
        };

        let previous = self
            .sessions
            .lock()
            .await
            .insert(user_id, session.clone());
        if let Some(previous) = previous {
            previous.cancel.cancel();
            info!(user_id = user_id, previous_session = previous.id, "Replaced existing session");
        }
        info!(user_id = user_id, session_id = session.id, "Session started");
        session
    }

    pub async fn get(&self, user_id: i64) -> Option<Session> {
        self.sessions.lock().await.get(&user_id).cloned()
    }

    pub async fn step(&self, user_id: i64) -> Option<SessionStep> {
        self.get(user_id).await.map(|s| s.step)
    }

    /// Records the verified target chat. Only applies to the same session while it still awaits a chat id.
    pub async fn set_target(
        &self,
        user_id: i64,
        session_id: u64,
        chat_id: i64,
        chat_title: String,
    ) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&user_id) {
            Some(s) if s.id == session_id && s.step == SessionStep::AwaitingChatId => {
                s.step = SessionStep::AwaitingManifest {
                    chat_id,
                    chat_title,
                };
                info!(user_id = user_id, session_id = session_id, chat_id = chat_id, "Session awaiting manifest");
                true
            }
            _ => false,
        }
    }

    /// Marks the session busy before a manifest run and hands out its target and cancel token.
    pub async fn begin_processing(&self, user_id: i64, session_id: u64) -> BeginProcessing {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&user_id).filter(|s| s.id == session_id) else {
            return BeginProcessing::Unavailable;
        };
        if session.busy {
            return BeginProcessing::Busy;
        }
        match &session.step {
            SessionStep::AwaitingManifest {
                chat_id,
                chat_title,
            } => {
                session.busy = true;
                BeginProcessing::Started {
                    chat_id: *chat_id,
                    chat_title: chat_title.clone(),
                    cancel: session.cancel.clone(),
                }
            }
            SessionStep::AwaitingChatId => BeginProcessing::Unavailable,
        }
    }

    /// Removes the session if it is still `session_id`. Returns whether anything was removed.
    pub async fn finish(&self, user_id: i64, session_id: u64) -> bool {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(&user_id).is_some_and(|s| s.id == session_id) {
            sessions.remove(&user_id);
            info!(user_id = user_id, session_id = session_id, "Session finished");
            true
        } else {
            false
        }
    }

    /// Removes the user's session whatever its step and fires its cancel token.
    pub async fn cancel(&self, user_id: i64) -> bool {
        let removed = self.sessions.lock().await.remove(&user_id);
        match removed {
            Some(session) => {
                session.cancel.cancel();
                info!(user_id = user_id, session_id = session.id, "Session cancelled");
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_replaces_and_cancels_previous() {
        let store = SessionStore::new();
        let first = store.start(7).await;
        let second = store.start(7).await;

        assert_ne!(first.id, second.id);
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert_eq!(store.len().await, 1);
        assert_eq!(store.step(7).await, Some(SessionStep::AwaitingChatId));
    }

    #[tokio::test]
    async fn test_set_target_requires_same_session() {
        let store = SessionStore::new();
        let old = store.start(7).await;
        let current = store.start(7).await;

        assert!(!store.set_target(7, old.id, -100, "Old".into()).await);
        assert!(store.set_target(7, current.id, -100, "New".into()).await);
        assert_eq!(
            store.step(7).await,
            Some(SessionStep::AwaitingManifest {
                chat_id: -100,
                chat_title: "New".into()
            })
        );
        // Already past the chat id step.
        assert!(!store.set_target(7, current.id, -200, "Again".into()).await);
    }

    #[tokio::test]
    async fn test_begin_processing_marks_busy() {
        let store = SessionStore::new();
        let s = store.start(1).await;
        assert!(matches!(
            store.begin_processing(1, s.id).await,
            BeginProcessing::Unavailable
        ));

        store.set_target(1, s.id, -1001, "G".into()).await;
        assert!(matches!(
            store.begin_processing(1, s.id).await,
            BeginProcessing::Started { chat_id: -1001, .. }
        ));
        assert!(matches!(
            store.begin_processing(1, s.id).await,
            BeginProcessing::Busy
        ));
    }

    #[tokio::test]
    async fn test_finish_ignores_newer_session() {
        let store = SessionStore::new();
        let old = store.start(3).await;
        let new = store.start(3).await;

        assert!(!store.finish(3, old.id).await);
        assert_eq!(store.get(3).await.map(|s| s.id), Some(new.id));
        assert!(store.finish(3, new.id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel() {
        let store = SessionStore::new();
        assert!(!store.cancel(9).await);

        let s = store.start(9).await;
        assert!(store.cancel(9).await);
        assert!(s.cancel.is_cancelled());
        assert!(store.get(9).await.is_none());
    }
}
