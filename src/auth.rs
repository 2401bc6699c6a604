//! Login gate and sessions
//!
//! Credential checking sits behind the `Authenticator` trait so handlers
//! never compare literals themselves; the only implementation compares the
//! single username/password pair from config. Sessions are opaque UUID
//! tokens held in process memory and die with the process.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Capability to verify a login attempt.
pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single static credential pair from config.
pub struct StaticAuthenticator {
    username: String,
    password: String,
}

impl StaticAuthenticator {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl Authenticator for StaticAuthenticator {
    fn verify(&self, username: &str, password: &str) -> bool {
        !self.password.is_empty() && username == self.username && password == self.password
    }
}

/// Active session tokens.
#[derive(Default)]
pub struct Sessions {
    active: Mutex<HashSet<String>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session and return its token.
    pub fn open(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.active.lock().insert(token.clone());
        token
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.active.lock().contains(token)
    }

    pub fn close(&self, token: &str) {
        self.active.lock().remove(token);
    }
}
