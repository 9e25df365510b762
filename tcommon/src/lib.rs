//! Shared identifiers, generation knobs and small containers used across the
//! TomiChat crates.
//!
//! ```rust
//! use tcommon::{GenerationOptions, MetadataMap, SessionId, TraceId};
//!
//! let session = SessionId::from("session-1");
//! let trace = TraceId::new("turn-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("panel".to_string(), "sidebar".to_string());
//!
//! let options = GenerationOptions::default()
//!     .with_temperature(0.8)
//!     .with_top_p(0.9)
//!     .enable_streaming();
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(trace.to_string(), "turn-1");
//! assert!(options.stream);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use tcommon::BoxFuture;
    //!
    //! fn char_count<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.chars().count() })
    //! }
    //!
    //! let _future = char_count("xin chào");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Metadata map and identifier newtypes shared by sessions and turns.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    use serde::{Deserialize, Serialize};

    pub type MetadataMap = HashMap<String, String>;

    /// Stable identifier of a conversation session.
    ///
    /// Serializes as a bare string so persisted session files keep the host's
    /// `"id": "..."` layout.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    /// Correlates log lines, hook callbacks and tool calls belonging to one turn.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct TraceId(String);

    impl TraceId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for TraceId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for TraceId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for TraceId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Sampling settings carried by every model request.
    //!
    //! ```rust
    //! use tcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.8)
    //!     .with_max_tokens(1000)
    //!     .with_top_k(40);
    //!
    //! assert_eq!(options.max_tokens, Some(1000));
    //! assert_eq!(options.top_k, Some(40));
    //! assert!(!options.stream);
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub top_p: Option<f32>,
        pub top_k: Option<u32>,
        pub stream: bool,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }

        pub fn with_top_k(mut self, top_k: u32) -> Self {
            self.top_k = Some(top_k);
            self
        }

        pub fn with_streaming(mut self, stream: bool) -> Self {
            self.stream = stream;
            self
        }

        pub fn enable_streaming(self) -> Self {
            self.with_streaming(true)
        }
    }
}

pub mod registry {
    //! Keyed lookup table backing the tool dispatch table.
    //!
    //! ```rust
    //! use tcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("createCharacter".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("createCharacter"), Some(&1));
    //! assert!(registry.contains_key("createCharacter"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, SessionId, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
