use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{SessionData, SessionError, SessionStore};

/// In-process session store. Entries expire `ttl` after their last save.
pub struct MemorySessionStore {
    sessions: DashMap<String, (SessionData, Instant)>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops every entry whose TTL has elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.sessions.retain(|_, (_, expires)| *expires > now);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError> {
        let expired = match self.sessions.get(id) {
            Some(entry) if entry.1 > Instant::now() => return Ok(Some(entry.0.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.sessions.remove(id);
        }
        Ok(None)
    }

    async fn save(&self, id: &str, data: &SessionData) -> Result<(), SessionError> {
        // Abandoned sessions are never loaded again; sweep them here.
        self.purge_expired();
        self.sessions
            .insert(id.to_string(), (data.clone(), Instant::now() + self.ttl));
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.sessions.remove(id);
        Ok(())
    }
}
