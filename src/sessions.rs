//! In-memory session registry.
//!
//! A process-wide map from session id to session record. State lives for
//! the lifetime of the process only; a multi-instance deployment would need
//! this moved behind shared storage, which is why the surface is kept to
//! create/validate/end on an opaque registry handle.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// A tutoring session between a tutor and an optional tutee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub tutor_id: String,
    pub tutee_id: Option<String>,
    pub status: SessionStatus,
    /// Video-call channel name derived from the session id
    pub channel_name: String,
    /// Whiteboard room id derived from the session id
    pub room_id: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// What to do when a session is created with an id that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Replace the existing record (historical behavior)
    #[default]
    Overwrite,
    /// Refuse the creation
    Reject,
}

/// Errors from registry operations.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A session with this id already exists (reject policy only)
    DuplicateId,
    /// No session with this id
    NotFound,
    /// The caller is not the session's tutor
    NotTutor,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::DuplicateId => write!(f, "Session id already exists"),
            SessionError::NotFound => write!(f, "Session not found"),
            SessionError::NotTutor => write!(f, "Only the tutor can end a session"),
        }
    }
}

impl std::error::Error for SessionError {}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Process-wide session store. Lock scope is a single map operation; no
/// guard is held across an await point.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    policy: DuplicatePolicy,
}

impl SessionRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Create a session owned by `tutor_id`. Channel and room names are
    /// derived deterministically from the session id. Under the default
    /// overwrite policy a repeated id silently replaces the prior record.
    pub fn create(
        &self,
        id: &str,
        tutor_id: &str,
        tutee_id: Option<String>,
    ) -> Result<Session, SessionError> {
        let now = now_secs();
        let session = Session {
            id: id.to_string(),
            tutor_id: tutor_id.to_string(),
            tutee_id,
            status: SessionStatus::Active,
            channel_name: format!("channel_{}", id),
            room_id: format!("room_{}", id),
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.sessions.write().unwrap();
        if self.policy == DuplicatePolicy::Reject && sessions.contains_key(id) {
            return Err(SessionError::DuplicateId);
        }
        sessions.insert(id.to_string(), session.clone());
        Ok(session)
    }

    /// Check whether `user_id` may join the session. Returns the session
    /// when the caller is its tutor or tutee; `None` for an unknown id or
    /// an unrelated caller. Never an error.
    pub fn validate(&self, id: &str, user_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().unwrap();
        let session = sessions.get(id)?;

        let is_tutor = session.tutor_id == user_id;
        let is_tutee = session.tutee_id.as_deref() == Some(user_id);
        if is_tutor || is_tutee {
            Some(session.clone())
        } else {
            None
        }
    }

    /// Mark a session completed. Tutor-only; idempotent, so ending an
    /// already-completed session succeeds and bumps `updated_at` again.
    pub fn end(&self, id: &str, user_id: &str) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;

        if session.tutor_id != user_id {
            return Err(SessionError::NotTutor);
        }

        session.status = SessionStatus::Completed;
        session.updated_at = now_secs();
        Ok(session.clone())
    }

    /// Fetch a session by id without an access check.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().unwrap().get(id).cloned()
    }
}
