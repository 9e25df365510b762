//! Session history persistence: a [`SessionStore`] seam with in-process and
//! JSON-file backings, and the [`SessionManager`] the chat coordinator uses.
//!
//! ```rust
//! use tmemory::{SessionData, SessionStoreConfig, create_session_store};
//!
//! let store = create_session_store(SessionStoreConfig::InMemory)
//!     .expect("in-memory store should build");
//! let session = SessionData::new("session-1");
//! assert!(session.messages.is_empty());
//! # let _ = store;
//! ```

mod error;
mod manager;
mod store;
mod stores;
mod types;

pub mod prelude {
    pub use crate::{
        FileSessionStore, MemoryError, MemoryErrorKind, MemorySessionStore, SessionData,
        SessionManager, SessionStore, SessionStoreConfig, create_session_store,
    };
}

pub use error::{MemoryError, MemoryErrorKind};
pub use manager::{MAX_PERSISTED_MESSAGES, SessionManager, generate_session_id};
pub use store::{
    FileSessionStore, MemorySessionStore, SessionStore, SessionStoreConfig, create_session_store,
};
pub use types::SessionData;
