//! Persisted session record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tcommon::SessionId;
use tprovider::Message;

/// History of one conversation as written to a store.
///
/// Field names follow the on-disk layout `{id, messages, createdAt, updatedAt, metadata?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id: SessionId,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl SessionData {
    pub fn new(id: impl Into<SessionId>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    /// Appends `message` and drops the oldest entries beyond `cap`.
    pub fn push_capped(&mut self, message: Message, cap: usize) {
        self.messages.push(message);
        if self.messages.len() > cap {
            let excess = self.messages.len() - cap;
            self.messages.drain(..excess);
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_camel_case_timestamps() {
        let session = SessionData::new("session-a").with_metadata("panel", json!("sidebar"));
        let value = serde_json::to_value(&session).expect("session should serialize");

        assert_eq!(value["id"], json!("session-a"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["metadata"]["panel"], json!("sidebar"));
    }

    #[test]
    fn metadata_is_omitted_when_absent() {
        let value = serde_json::to_value(SessionData::new("s")).expect("session should serialize");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn push_capped_keeps_most_recent_messages() {
        let mut session = SessionData::new("s");
        for index in 0..5 {
            session.push_capped(Message::user(format!("m{index}")), 3);
        }

        let contents = session
            .messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }
}
