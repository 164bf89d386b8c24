//! User aggregate and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque access token minted at login.
///
/// The repository never inspects or generates token contents; it only
/// stores and compares them verbatim. Uniqueness and unforgeability are the
/// token generator's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Token issued for this login
    token: AccessToken,
    /// Last successful validation of this session's token; absent until the
    /// token is first validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_seen: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a fresh session that has never been validated
    pub fn new(token: AccessToken) -> Self {
        Self {
            token,
            last_seen: None,
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }
}

/// Persisted user record, one per registered principal.
///
/// Records are read and written whole; the username doubles as the storage
/// key and never changes after creation. Sessions are kept in login order
/// and never pruned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, also the storage key
    username: String,
    /// Opaque hash produced by the password hasher; only ever compared
    /// through the hasher
    password_hash: String,
    /// Login sessions, oldest first
    #[serde(default)]
    sessions: Vec<Session>,
}

impl User {
    /// Create a new user with no sessions
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            sessions: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Record a successful login
    pub fn append_session(&mut self, token: AccessToken) {
        self.sessions.push(Session::new(token));
    }

    /// Mark the session holding `token` as seen now. Returns false when no
    /// session matches.
    pub fn touch_session(&mut self, token: &AccessToken) -> bool {
        for session in &mut self.sessions {
            if session.token == *token {
                session.last_seen = Some(Utc::now());
                return true;
            }
        }
        false
    }

    /// Remove the session holding `token`. Returns false when no session
    /// matches.
    pub fn remove_session(&mut self, token: &AccessToken) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.token != *token);
        self.sessions.len() != before
    }

    /// Minimal view safe to hand to callers
    pub fn to_view(&self) -> UserView {
        UserView {
            username: self.username.clone(),
        }
    }
}

/// What token validation exposes about a user: the username and nothing
/// else. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    username: String,
}

impl UserView {
    pub fn username(&self) -> &str {
        &self.username
    }
}
