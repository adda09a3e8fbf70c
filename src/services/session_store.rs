use crate::models::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local session map. Sessions are lost on restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) {
        self.inner.write().await.insert(session.id, session);
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Runs `f` against the session under the write lock. `f` must not await.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut guard = self.inner.write().await;
        guard.get_mut(&id).map(f)
    }

    pub async fn completed(&self) -> Vec<Session> {
        let guard = self.inner.read().await;
        let mut sessions: Vec<Session> = guard.values().filter(|s| s.completed).cloned().collect();
        sessions.sort_by_key(|s| s.created_at);
        sessions
    }

    pub async fn active_ids(&self) -> Vec<Uuid> {
        self.inner
            .read()
            .await
            .values()
            .filter(|s| !s.completed)
            .map(|s| s.id)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
