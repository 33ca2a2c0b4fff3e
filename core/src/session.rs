//! Session handling and the pluggable credential-verification seam.
//!
//! # Design
//! The core never contains a credential policy: `CredentialVerifier` is the
//! seam through which "given credentials, obtain token-or-error" flows in.
//! `SessionManager` only installs or drops the resulting `Session` and
//! serves the current token to the auth interceptor. Nothing is persisted;
//! a session lives exactly from a successful login to the next logout.

use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Authentication failure reported by a `CredentialVerifier`.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The verifier itself failed (remote policy unreachable, etc).
    #[error("verification failed: {0}")]
    Verification(String),
}

/// Pluggable credential policy. The core only ever consumes the token.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Result<String, AuthError>;
}

/// Fixed single-user verifier for demos and tests.
#[derive(Debug, Clone)]
pub struct StaticVerifier {
    username: String,
    password: String,
    token: String,
}

impl StaticVerifier {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: token.into(),
        }
    }
}

impl CredentialVerifier for StaticVerifier {
    fn verify(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username == self.username && password == self.password {
            Ok(self.token.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Source of the current bearer token, consumed by the auth interceptor.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// An authenticated session. Exists only while logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

/// Thread-safe holder of the optional current session.
///
/// Cheap to clone; all clones share the same session slot.
#[derive(Clone)]
pub struct SessionManager {
    verifier: Arc<dyn CredentialVerifier>,
    session: Arc<RwLock<Option<Session>>>,
}

impl SessionManager {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Verify credentials and install a session on success.
    ///
    /// A failed login leaves any existing session untouched.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let token = self.verifier.verify(username, password)?;
        let session = Session {
            username: username.to_string(),
            token,
        };
        tracing::info!(username, "session installed");
        *self.session.write().expect("session lock poisoned") = Some(session.clone());
        Ok(session)
    }

    /// Drop the current session. Returns the session that was active, if any.
    pub fn logout(&self) -> Option<Session> {
        let previous = self.session.write().expect("session lock poisoned").take();
        if previous.is_some() {
            tracing::info!("session dropped");
        }
        previous
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }
}

impl TokenProvider for SessionManager {
    fn current_token(&self) -> Option<String> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.token.clone())
    }
}
