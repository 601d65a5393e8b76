//! In-memory chat session store for the HTTP layer.
//!
//! A session is lent to one request at a time. While lent, its slot is
//! marked leased and any other request for it gets `SessionError::Busy`
//! instead of waiting, so turns from two requests never interleave. The lease
//! puts the session back when dropped, including when the request future is
//! cancelled.
//!
//! Sessions left idle past the configured timeout are dropped by a periodic
//! sweep. A leased session is never swept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::llm_client::ChatSession;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Chat session {0} not found")]
    NotFound(Uuid),

    #[error("Chat session {0} is busy with another request")]
    Busy(Uuid),
}

/// Session metadata returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub turns: usize,
}

struct StoredSession {
    session: ChatSession,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl StoredSession {
    fn info(&self, session_id: Uuid) -> SessionInfo {
        SessionInfo {
            session_id,
            created_at: self.created_at,
            last_active_at: self.last_active_at,
            turns: self.session.transcript().len(),
        }
    }
}

enum Slot {
    Idle(StoredSession),
    Leased,
}

type Sessions = Arc<Mutex<HashMap<Uuid, Slot>>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Sessions,
}

fn lock(sessions: &Sessions) -> MutexGuard<'_, HashMap<Uuid, Slot>> {
    // Critical sections never panic midway, so a poisoned map is still consistent.
    sessions.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: ChatSession) -> SessionInfo {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let stored = StoredSession {
            session,
            created_at: now,
            last_active_at: now,
        };
        let info = stored.info(id);
        lock(&self.sessions).insert(id, Slot::Idle(stored));
        info
    }

    /// Takes the session out for exclusive use until the lease is dropped.
    pub fn lease(&self, id: Uuid) -> Result<SessionLease, SessionError> {
        let mut sessions = lock(&self.sessions);
        let slot = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        match std::mem::replace(slot, Slot::Leased) {
            Slot::Idle(stored) => Ok(SessionLease {
                sessions: Arc::clone(&self.sessions),
                id,
                stored: Some(stored),
            }),
            Slot::Leased => Err(SessionError::Busy(id)),
        }
    }

    pub fn clear_history(&self, id: Uuid) -> Result<SessionInfo, SessionError> {
        let mut lease = self.lease(id)?;
        lease.session_mut().clear_history();
        Ok(lease.info())
    }

    /// Removes the session. A session removed while leased is discarded when
    /// its lease ends.
    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        lock(&self.sessions)
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    /// Drops idle sessions last active at or before `cutoff`. Leased
    /// sessions are kept. Returns how many were dropped.
    pub fn remove_idle_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, slot| match slot {
            Slot::Idle(stored) => stored.last_active_at > cutoff,
            Slot::Leased => true,
        });
        before - sessions.len()
    }

    pub fn remove_idle(&self, max_idle: Duration) -> usize {
        self.remove_idle_before(Utc::now() - max_idle)
    }

    /// Sweeps sessions idle for longer than `max_idle` once per `every`.
    pub fn spawn_idle_sweeper(
        &self,
        max_idle: Duration,
        every: std::time::Duration,
    ) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = store.remove_idle(max_idle);
                if removed > 0 {
                    info!("Expired {removed} idle chat session(s)");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }
}

/// Exclusive access to one stored session.
pub struct SessionLease {
    sessions: Sessions,
    id: Uuid,
    stored: Option<StoredSession>,
}

impl SessionLease {
    // `stored` is only taken in `drop`.
    const HELD: &'static str = "lease holds its session until dropped";

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.stored.as_mut().expect(Self::HELD).session
    }

    pub fn info(&self) -> SessionInfo {
        self.stored.as_ref().expect(Self::HELD).info(self.id)
    }

    pub fn touch(&mut self) {
        if let Some(stored) = self.stored.as_mut() {
            stored.last_active_at = Utc::now();
        }
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        let Some(mut stored) = self.stored.take() else {
            return;
        };
        // Any use counts as activity, failed sends included.
        stored.last_active_at = Utc::now();
        let mut sessions = lock(&self.sessions);
        if let Some(slot) = sessions.get_mut(&self.id) {
            *slot = Slot::Idle(stored);
        }
    }
}
