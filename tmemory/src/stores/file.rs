use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tcommon::{BoxFuture, SessionId};

use crate::error::MemoryError;
use crate::store::SessionStore;
use crate::types::SessionData;

const SESSION_EXTENSION: &str = "json";

/// One pretty-printed JSON file per session, `{root}/{session_id}.json`.
#[derive(Debug)]
pub struct FileSessionStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|error| {
            MemoryError::storage(format!("failed to create session directory: {error}"))
        })?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, session_id: &SessionId) -> Result<PathBuf, MemoryError> {
        let id = session_id.as_str();
        if id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\'])
            || id.contains('\0')
        {
            return Err(MemoryError::invalid_request(format!(
                "session id '{id}' cannot be used as a file name"
            )));
        }
        Ok(self.root.join(format!("{id}.{SESSION_EXTENSION}")))
    }

    fn load(&self, session_id: &SessionId) -> Result<Option<SessionData>, MemoryError> {
        let path = self.session_path(session_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(MemoryError::storage(format!(
                    "failed to read session file: {error}"
                )));
            }
        };
        let session = serde_json::from_slice::<SessionData>(&bytes).map_err(|error| {
            MemoryError::storage(format!("failed to deserialize session file: {error}"))
        })?;
        Ok(Some(session))
    }

    fn store(&self, session_id: &SessionId, session: &SessionData) -> Result<(), MemoryError> {
        let path = self.session_path(session_id)?;
        let bytes = serde_json::to_vec_pretty(session).map_err(|error| {
            MemoryError::storage(format!("failed to serialize session: {error}"))
        })?;
        write_atomic(&path, &bytes)
    }

    fn remove(&self, session_id: &SessionId) -> Result<(), MemoryError> {
        let path = self.session_path(session_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(MemoryError::storage(format!(
                "failed to delete session file: {error}"
            ))),
        }
    }

    fn session_ids(&self) -> Result<Vec<SessionId>, MemoryError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(MemoryError::storage(format!(
                    "failed to list session directory: {error}"
                )));
            }
        };

        let mut ids = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|extension| extension == SESSION_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(SessionId::from)
            })
            .collect::<Vec<_>>();
        ids.sort();
        Ok(ids)
    }
}

impl SessionStore for FileSessionStore {
    fn get<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<SessionData>, MemoryError>> {
        Box::pin(async move {
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("file session store lock poisoned"))?;
            self.load(session_id)
        })
    }

    fn save<'a>(
        &'a self,
        session_id: &'a SessionId,
        mut session: SessionData,
    ) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            session.touch();
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("file session store lock poisoned"))?;
            self.store(session_id, &session)
        })
    }

    fn delete<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("file session store lock poisoned"))?;
            self.remove(session_id)
        })
    }

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<SessionId>, MemoryError>> {
        Box::pin(async move {
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("file session store lock poisoned"))?;
            self.session_ids()
        })
    }

    fn clear<'a>(&'a self) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("file session store lock poisoned"))?;
            for session_id in self.session_ids()? {
                self.remove(&session_id)?;
            }
            Ok(())
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MemoryError> {
    let Some(parent) = path.parent() else {
        return Err(MemoryError::storage("session file missing parent directory"));
    };
    fs::create_dir_all(parent).map_err(|error| {
        MemoryError::storage(format!("failed to create session directory: {error}"))
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|error| {
        MemoryError::storage(format!("failed to write temporary session file: {error}"))
    })?;

    fs::rename(&tmp, path)
        .map_err(|error| MemoryError::storage(format!("failed to finalize session file: {error}")))
}
