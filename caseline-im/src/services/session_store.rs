//! In-memory import session store
//!
//! Sessions are process-local and expire after a fixed TTL measured
//! from creation. Expiry is enforced lazily on read and by an explicit
//! sweep at upload time; there is no background reaper task.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::ImportSession;

pub struct ImportSessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, ImportSession>>,
}

impl ImportSessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a session under its own id
    pub async fn put(&self, session: ImportSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_id, session);
    }

    /// Fetch a session by id. An expired session reads as absent.
    pub async fn get(&self, session_id: Uuid) -> Option<ImportSession> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&session_id)?;
        if Utc::now() - session.created_at > self.ttl {
            return None;
        }
        Some(session.clone())
    }

    pub async fn remove(&self, session_id: Uuid) -> Option<ImportSession> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&session_id)
    }

    /// Drop every expired session, returning how many were removed
    pub async fn sweep_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.created_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Shift a stored session's creation time into the past
    #[cfg(test)]
    pub async fn backdate(&self, session_id: Uuid, secs: i64) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&session_id) {
            session.created_at = session.created_at - Duration::seconds(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTable;

    fn session() -> ImportSession {
        ImportSession::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "a.csv".to_string(),
            RawTable {
                headers: vec!["Date".to_string()],
                rows: vec![],
            },
        )
    }

    #[tokio::test]
    async fn put_get_remove_round_trip() {
        let store = ImportSessionStore::new(3600);
        let s = session();
        let id = s.session_id;

        store.put(s).await;
        assert!(store.get(id).await.is_some());

        store.remove(id).await;
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn expired_session_reads_as_absent() {
        let store = ImportSessionStore::new(3600);
        let s = session();
        let id = s.session_id;
        store.put(s).await;

        store.backdate(id, 3601).await;
        assert!(store.get(id).await.is_none());
        // Lazy expiry: the entry is still physically present until a sweep
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired() {
        let store = ImportSessionStore::new(3600);
        let stale = session();
        let stale_id = stale.session_id;
        let fresh = session();
        let fresh_id = fresh.session_id;

        store.put(stale).await;
        store.put(fresh).await;
        store.backdate(stale_id, 7200).await;

        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(fresh_id).await.is_some());
        assert!(store.get(stale_id).await.is_none());
    }
}
