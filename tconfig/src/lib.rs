//! Layered settings for the chat panel.
//!
//! Explicit values (builder or a camelCase JSON document) win over the
//! environment, which wins over built-in defaults.
//!
//! ```rust
//! use tconfig::{SettingsLoader, SettingsOverrides};
//!
//! let settings = SettingsLoader::new()
//!     .with_overrides(SettingsOverrides::default().with_max_tokens(256))
//!     .with_env_lookup(|name| (name == "GEMINI_API_KEY").then(|| "demo-key".to_string()))
//!     .load()
//!     .expect("settings should resolve");
//!
//! assert!(settings.is_configured());
//! assert_eq!(settings.max_tokens, 256);
//! assert_eq!(format!("{:?}", settings.api_key), "Some([REDACTED])");
//! ```

mod error;
mod loader;
mod secret;
mod settings;

pub use error::{ConfigError, ConfigErrorKind};
pub use loader::{EnvLookup, SettingsLoader, SettingsOverrides};
pub use secret::SecretString;
pub use settings::{
    API_KEY_ENV_VARS, ChatSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    MAX_TEMPERATURE, StreamingStrategy,
};
