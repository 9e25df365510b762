use std::sync::Arc;

use tcommon::SessionId;
use tmemory::{
    FileSessionStore, MAX_PERSISTED_MESSAGES, SessionManager, SessionStoreConfig,
    create_session_store,
};
use tprovider::Message;

#[tokio::test]
async fn history_survives_a_new_manager_over_the_same_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let id = SessionId::from("session_1700000000000_abcdefghi");

    {
        let store = create_session_store(SessionStoreConfig::file(dir.path()))
            .expect("file store should build");
        let manager = SessionManager::new(store);
        manager
            .add_message(&id, Message::user("Kể cho tôi nghe về rồng"))
            .await
            .expect("user message");
        manager
            .add_message(&id, Message::model("Ngày xửa ngày xưa có một con rồng..."))
            .await
            .expect("model message");
    }

    let manager = SessionManager::new(Arc::new(
        FileSessionStore::new(dir.path()).expect("reopen file store"),
    ));
    let messages = manager.get_messages(&id, None).await;

    assert_eq!(
        messages,
        vec![
            Message::user("Kể cho tôi nghe về rồng"),
            Message::model("Ngày xửa ngày xưa có một con rồng..."),
        ]
    );
    assert_eq!(manager.list_sessions().await.expect("list"), vec![id]);
}

#[tokio::test]
async fn file_backed_history_is_truncated_oldest_first() {
    let dir = tempfile::tempdir().expect("temp dir");
    let manager = SessionManager::new(Arc::new(
        FileSessionStore::new(dir.path()).expect("file store"),
    ));
    let id = SessionId::from("long-session");

    for index in 0..(MAX_PERSISTED_MESSAGES + 5) {
        manager
            .add_message(&id, Message::user(format!("tin nhắn {index}")))
            .await
            .expect("add");
    }

    let session = manager.get_session(&id).await.expect("session should exist");
    assert_eq!(session.messages.len(), MAX_PERSISTED_MESSAGES);
    assert_eq!(session.messages[0].content, "tin nhắn 5");
    assert!(session.updated_at >= session.created_at);
}
