//! Session store trait, in-process store and store construction.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tcommon::{BoxFuture, SessionId};

use crate::error::MemoryError;
use crate::types::SessionData;

pub use crate::stores::file::FileSessionStore;

/// Persistence seam for session history.
///
/// `save` refreshes `updated_at`; `delete` of an unknown id is not an error.
pub trait SessionStore: Send + Sync {
    fn get<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<SessionData>, MemoryError>>;

    fn save<'a>(
        &'a self,
        session_id: &'a SessionId,
        session: SessionData,
    ) -> BoxFuture<'a, Result<(), MemoryError>>;

    fn delete<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, Result<(), MemoryError>>;

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionId>, MemoryError>>;

    fn clear<'a>(&'a self) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            for session_id in self.list().await? {
                self.delete(&session_id).await?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStoreConfig {
    File {
        root: PathBuf,
    },
    #[default]
    InMemory,
}

impl SessionStoreConfig {
    pub fn file(root: impl Into<PathBuf>) -> Self {
        Self::File { root: root.into() }
    }

    /// File store under `root`, or the in-process store when no root is configured.
    pub fn from_root(root: Option<PathBuf>) -> Self {
        root.map(Self::file).unwrap_or_default()
    }
}

pub fn create_session_store(
    config: SessionStoreConfig,
) -> Result<Arc<dyn SessionStore>, MemoryError> {
    match config {
        SessionStoreConfig::File { root } => Ok(Arc::new(FileSessionStore::new(root)?)),
        SessionStoreConfig::InMemory => Ok(Arc::new(MemorySessionStore::new())),
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, MemoryError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool, MemoryError> {
        Ok(self.len()? == 0)
    }
}

impl SessionStore for MemorySessionStore {
    fn get<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<SessionData>, MemoryError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            Ok(sessions.get(session_id).cloned())
        })
    }

    fn save<'a>(
        &'a self,
        session_id: &'a SessionId,
        mut session: SessionData,
    ) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            session.touch();
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            sessions.insert(session_id.clone(), session);
            Ok(())
        })
    }

    fn delete<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            sessions.remove(session_id);
            Ok(())
        })
    }

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionId>, MemoryError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            let mut ids = sessions.keys().cloned().collect::<Vec<_>>();
            ids.sort();
            Ok(ids)
        })
    }

    fn clear<'a>(&'a self) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            sessions.clear();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tprovider::Message;

    use super::*;

    #[tokio::test]
    async fn save_then_get_refreshes_updated_at() {
        let store = MemorySessionStore::new();
        let id = SessionId::from("session-a");
        let mut session = SessionData::new(id.clone())
            .with_metadata("panel", json!("sidebar"))
            .with_metadata("turns", json!(3));
        session.messages.push(Message::user("chào"));
        session.messages.push(Message::model("Xin chào bạn!"));
        let saved_at = session.updated_at;

        store
            .save(&id, session.clone())
            .await
            .expect("save should succeed");
        let loaded = store
            .get(&id)
            .await
            .expect("get should succeed")
            .expect("session should exist");

        assert!(loaded.updated_at >= saved_at);
        assert_eq!(
            loaded,
            SessionData {
                updated_at: loaded.updated_at,
                ..session
            }
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_clear_empties_store() {
        let store = MemorySessionStore::new();
        let a = SessionId::from("a");
        let b = SessionId::from("b");
        store
            .save(&b, SessionData::new(b.clone()))
            .await
            .expect("save b");
        store
            .save(&a, SessionData::new(a.clone()))
            .await
            .expect("save a");

        assert_eq!(store.list().await.expect("list"), vec![a.clone(), b.clone()]);

        store.delete(&a).await.expect("first delete");
        store.delete(&a).await.expect("second delete");
        assert!(store.get(&a).await.expect("get").is_none());

        store.clear().await.expect("clear");
        assert!(store.is_empty().expect("len"));
    }

    #[test]
    fn config_selects_backing_from_root() {
        assert_eq!(SessionStoreConfig::from_root(None), SessionStoreConfig::InMemory);
        assert_eq!(
            SessionStoreConfig::from_root(Some(PathBuf::from("/tmp/s"))),
            SessionStoreConfig::file("/tmp/s")
        );
    }
}
