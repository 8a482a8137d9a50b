//! Session storage.
//!
//! Each session sits behind its own mutex, so operations on one game are
//! serialized while different games never contend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::code::SessionCode;
use super::game::GameSession;

/// A stored session, locked per operation.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Keyed session storage.
pub trait SessionStore: Send + Sync {
    /// Store a new session.
    ///
    /// Fails, handing the session back, when a live session already holds
    /// the code. An expired record under the same code is replaced.
    fn insert_new(&self, session: GameSession, now: DateTime<Utc>) -> Result<SharedSession, GameSession>;

    fn get(&self, code: &SessionCode) -> Option<SharedSession>;

    /// Check if an unexpired session holds `code`.
    fn contains_live(&self, code: &str, now: DateTime<Utc>) -> bool;

    /// Drop expired sessions. Returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: DashMap<String, SharedSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn insert_new(&self, session: GameSession, now: DateTime<Utc>) -> Result<SharedSession, GameSession> {
        match self.sessions.entry(session.code().as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().lock().is_expired(now) {
                    return Err(session);
                }
                tracing::debug!(code = %session.code(), "replacing expired session");
                let shared = Arc::new(Mutex::new(session));
                entry.insert(Arc::clone(&shared));
                Ok(shared)
            }
            Entry::Vacant(entry) => {
                let shared = Arc::new(Mutex::new(session));
                entry.insert(Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    fn get(&self, code: &SessionCode) -> Option<SharedSession> {
        self.sessions.get(code.as_str()).map(|s| Arc::clone(&s))
    }

    fn contains_live(&self, code: &str, now: DateTime<Utc>) -> bool {
        self.sessions
            .get(code)
            .is_some_and(|s| !s.lock().is_expired(now))
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.lock().is_expired(now));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, "purged expired sessions");
        }
        removed
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
