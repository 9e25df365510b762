//! Session lifecycle on top of a [`SessionStore`].

use std::sync::Arc;

use chrono::Utc;
use tcommon::SessionId;
use tokio::sync::Mutex;
use tprovider::Message;
use uuid::Uuid;

use crate::error::MemoryError;
use crate::store::{MemorySessionStore, SessionStore};
use crate::types::SessionData;

/// Messages kept per persisted session; older entries are dropped first.
pub const MAX_PERSISTED_MESSAGES: usize = 50;

const SESSION_SUFFIX_LEN: usize = 9;

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    write_lock: Mutex<()>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Saves an empty session under `session_id`, or a generated id.
    pub async fn create_session(
        &self,
        session_id: Option<SessionId>,
    ) -> Result<SessionData, MemoryError> {
        let _guard = self.write_lock.lock().await;
        self.create_unlocked(session_id.unwrap_or_else(generate_session_id))
            .await
    }

    /// Returns `None` when the session is missing or cannot be read.
    pub async fn get_session(&self, session_id: &SessionId) -> Option<SessionData> {
        self.read(session_id).await
    }

    /// Appends to the session, creating it first when absent.
    pub async fn add_message(
        &self,
        session_id: &SessionId,
        message: Message,
    ) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        let mut session = match self.read(session_id).await {
            Some(session) => session,
            None => self.create_unlocked(session_id.clone()).await?,
        };

        session.push_capped(message, MAX_PERSISTED_MESSAGES);
        self.store.save(session_id, session).await
    }

    /// Most recent `limit` messages, oldest first; all of them when `limit` is `None` or zero.
    pub async fn get_messages(&self, session_id: &SessionId, limit: Option<usize>) -> Vec<Message> {
        let Some(session) = self.read(session_id).await else {
            return Vec::new();
        };

        let mut messages = session.messages;
        if let Some(limit) = limit.filter(|limit| *limit > 0)
            && messages.len() > limit
        {
            messages.drain(..messages.len() - limit);
        }
        messages
    }

    pub async fn delete_session(&self, session_id: &SessionId) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        self.store.delete(session_id).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionId>, MemoryError> {
        self.store.list().await
    }

    pub async fn clear_all_sessions(&self) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;
        self.store.clear().await
    }

    async fn create_unlocked(&self, session_id: SessionId) -> Result<SessionData, MemoryError> {
        let session = SessionData::new(session_id.clone());
        self.store.save(&session_id, session.clone()).await?;
        Ok(session)
    }

    async fn read(&self, session_id: &SessionId) -> Option<SessionData> {
        match self.store.get(session_id).await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %error,
                    "session read failed; treating session as absent"
                );
                None
            }
        }
    }
}

/// `session_{unix millis}_{9 random lowercase alphanumerics}`.
pub fn generate_session_id() -> SessionId {
    let random = Uuid::new_v4().simple().to_string();
    SessionId::new(format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        &random[..SESSION_SUFFIX_LEN]
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tcommon::BoxFuture;

    use super::*;
    use crate::MemoryErrorKind;

    #[test]
    fn generated_ids_follow_session_pattern() {
        let id = generate_session_id();
        let parts = id.as_str().split('_').collect::<Vec<_>>();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(generate_session_id(), id);
    }

    #[tokio::test]
    async fn add_message_creates_session_and_caps_history() {
        let manager = SessionManager::default();
        let id = SessionId::from("session-a");

        for index in 0..(MAX_PERSISTED_MESSAGES + 1) {
            manager
                .add_message(&id, Message::user(format!("m{index}")))
                .await
                .expect("add should succeed");
        }

        let messages = manager.get_messages(&id, None).await;
        assert_eq!(messages.len(), MAX_PERSISTED_MESSAGES);
        assert_eq!(messages[0].content, "m1");
        assert_eq!(messages[MAX_PERSISTED_MESSAGES - 1].content, "m50");
    }

    #[tokio::test]
    async fn get_messages_honours_limit() {
        let manager = SessionManager::default();
        let id = SessionId::from("s");
        for content in ["a", "b", "c"] {
            manager
                .add_message(&id, Message::user(content))
                .await
                .expect("add");
        }

        let last_two = manager.get_messages(&id, Some(2)).await;
        assert_eq!(last_two, vec![Message::user("b"), Message::user("c")]);
        assert_eq!(manager.get_messages(&id, Some(0)).await.len(), 3);
        assert!(manager.get_messages(&SessionId::from("missing"), None).await.is_empty());
    }

    #[tokio::test]
    async fn create_session_generates_id_when_absent() {
        let manager = SessionManager::default();

        let session = manager.create_session(None).await.expect("create");
        assert!(session.id.as_str().starts_with("session_"));
        assert!(session.messages.is_empty());
        assert_eq!(manager.list_sessions().await.expect("list"), vec![session.id]);
    }

    #[tokio::test]
    async fn delete_and_clear_sessions() {
        let manager = SessionManager::default();
        let a = SessionId::from("a");
        manager.create_session(Some(a.clone())).await.expect("create a");
        manager
            .create_session(Some(SessionId::from("b")))
            .await
            .expect("create b");

        manager.delete_session(&a).await.expect("delete");
        manager.delete_session(&a).await.expect("delete again");
        assert!(manager.get_session(&a).await.is_none());

        manager.clear_all_sessions().await.expect("clear");
        assert!(manager.list_sessions().await.expect("list").is_empty());
    }

    struct UnreadableStore {
        saved: AtomicBool,
    }

    impl SessionStore for UnreadableStore {
        fn get<'a>(
            &'a self,
            _session_id: &'a SessionId,
        ) -> BoxFuture<'a, Result<Option<SessionData>, MemoryError>> {
            Box::pin(async { Err(MemoryError::storage("disk on fire")) })
        }

        fn save<'a>(
            &'a self,
            _session_id: &'a SessionId,
            _session: SessionData,
        ) -> BoxFuture<'a, Result<(), MemoryError>> {
            Box::pin(async move {
                self.saved.store(true, Ordering::SeqCst);
                Err(MemoryError::storage("read-only"))
            })
        }

        fn delete<'a>(
            &'a self,
            _session_id: &'a SessionId,
        ) -> BoxFuture<'a, Result<(), MemoryError>> {
            Box::pin(async { Ok(()) })
        }

        fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionId>, MemoryError>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[tokio::test]
    async fn read_errors_degrade_and_write_errors_propagate() {
        let store = Arc::new(UnreadableStore {
            saved: AtomicBool::new(false),
        });
        let manager = SessionManager::new(store.clone());
        let id = SessionId::from("s");

        assert!(manager.get_session(&id).await.is_none());
        assert!(manager.get_messages(&id, Some(10)).await.is_empty());

        let err = manager
            .add_message(&id, Message::user("hi"))
            .await
            .expect_err("write failure should propagate");
        assert_eq!(err.kind, MemoryErrorKind::Storage);
        assert!(store.saved.load(Ordering::SeqCst));
    }
}
