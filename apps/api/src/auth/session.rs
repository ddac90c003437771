//! In-memory session store.
//!
//! Sessions are keyed by a random id carried in the `session` cookie and expire
//! after a configurable idle period. Nothing survives a restart.

use std::time::Duration;

use axum::http::{header, HeaderMap};
use moka::future::Cache;
use moka::ops::compute::Op;
use uuid::Uuid;

use crate::llm_client::ChatMessage;
use crate::models::post::{ChatEntry, CurrentPost};

pub const SESSION_COOKIE: &str = "session";

const MAX_SESSIONS: u64 = 10_000;

/// Everything the app remembers about one browser between requests.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub username: String,
    pub authenticated: bool,
    pub post: Option<CurrentPost>,
    pub chat_history: Vec<ChatEntry>,
    /// Model-facing conversation used for conversational edits.
    pub conversation: Vec<ChatMessage>,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }

    /// Starts an authenticated session and returns its id.
    pub async fn create(&self, username: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let session = Session {
            username: username.to_string(),
            authenticated: true,
            ..Session::default()
        };
        self.sessions.insert(id.clone(), session).await;
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).await
    }

    /// Applies `change` to the live session in one atomic step and returns its
    /// output. A session that was destroyed or expired is left alone and
    /// `None` is returned.
    pub async fn modify<T>(&self, id: &str, change: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut output = None;
        self.sessions
            .entry_by_ref(id)
            .and_compute_with(|entry| {
                let op = match entry {
                    Some(entry) => {
                        let mut session = entry.into_value();
                        output = Some(change(&mut session));
                        Op::Put(session)
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        output
    }

    pub async fn destroy(&self, id: &str) {
        self.sessions.invalidate(id).await;
    }
}

/// Reads the session id from the request's `Cookie` header.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|s| s.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .filter(|v| !v.is_empty())
                .map(String::from)
        })
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_create_get_destroy() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create("admin").await;

        let session = store.get(&id).await.unwrap();
        assert!(session.authenticated);
        assert_eq!(session.username, "admin");
        assert!(session.post.is_none());

        store.destroy(&id).await;
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_modify_changes_live_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create("admin").await;
        let len = store
            .modify(&id, |s| {
                s.chat_history.push(ChatEntry::blog("draft"));
                s.chat_history.len()
            })
            .await;

        assert_eq!(len, Some(1));
        assert_eq!(store.get(&id).await.unwrap().chat_history.len(), 1);
    }

    #[tokio::test]
    async fn test_modify_does_not_revive_destroyed_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create("admin").await;
        let stale = store.get(&id).await.unwrap();
        store.destroy(&id).await;

        let applied = store.modify(&id, |s| *s = stale).await;
        assert!(applied.is_none());
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_modify_applies_on_top_of_concurrent_change() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create("admin").await;
        store.modify(&id, |s| s.chat_history.push(ChatEntry::note("saved"))).await;
        store.modify(&id, |s| s.chat_history.push(ChatEntry::user("edit"))).await;

        let history = store.get(&id).await.unwrap().chat_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "saved");
    }

    #[tokio::test]
    async fn test_unknown_id_has_no_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get("not-a-session").await.is_none());
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; other=1"),
        );
        assert_eq!(session_id(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_session_id_ignores_similar_names_and_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("sessionx=nope; session="),
        );
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }
}
