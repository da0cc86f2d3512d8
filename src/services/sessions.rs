use crate::core::Session;
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Errors that can occur with session operations
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Session not found or expired: {0}")]
    NotFound(Uuid),

    #[error("Session {0} has no search yet")]
    NoSearch(Uuid),
}

type SharedSession = Arc<Mutex<Session>>;

/// In-memory store of form sessions
///
/// Each user owns one session; entries expire after `idle_ttl` without access.
/// Every session sits behind its own lock, so concurrent requests on one
/// session apply one after the other. Updates mutate the stored entry in
/// place and never re-insert it, so a removed session stays removed.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, SharedSession>,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(capacity: u64, idle_ttl: Duration) -> Self {
        let sessions = moka::future::CacheBuilder::new(capacity)
            .time_to_idle(idle_ttl)
            .build();

        Self { sessions }
    }

    /// Open a fresh session
    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.sessions
            .insert(session.id, Arc::new(Mutex::new(session.clone())))
            .await;
        tracing::debug!("Session created: {}", session.id);
        session
    }

    async fn entry(&self, id: Uuid) -> Result<SharedSession, SessionError> {
        self.sessions.get(&id).await.ok_or(SessionError::NotFound(id))
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Result<Session, SessionError> {
        let entry = self.entry(id).await?;
        let session = entry.lock().await.clone();
        Ok(session)
    }

    /// Apply `f` to a session under its lock
    ///
    /// Returns a snapshot taken before the lock is released.
    pub async fn update<F, T>(&self, id: Uuid, f: F) -> Result<(Session, T), SessionError>
    where
        F: FnOnce(&mut Session) -> T,
    {
        let entry = self.entry(id).await?;
        let mut session = entry.lock().await;
        let out = f(&mut session);
        tracing::trace!("Session updated: {}", id);
        Ok((session.clone(), out))
    }

    /// Like [`SessionStore::update`], for operations that need a recorded search
    pub async fn update_searched<F, T>(&self, id: Uuid, f: F) -> Result<(Session, T), SessionError>
    where
        F: FnOnce(&mut Session) -> T,
    {
        let entry = self.entry(id).await?;
        let mut session = entry.lock().await;
        if session.result.is_none() {
            return Err(SessionError::NoSearch(id));
        }
        let out = f(&mut session);
        tracing::trace!("Session updated: {}", id);
        Ok((session.clone(), out))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        match self.sessions.remove(&id).await {
            Some(_) => {
                tracing::debug!("Session removed: {}", id);
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    /// Get store statistics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            active: self.sessions.entry_count(),
        }
    }
}

/// Session store statistics
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub active: u64,
}
