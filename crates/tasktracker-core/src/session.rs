use std::fmt;
use std::sync::Mutex;

use crate::error::CoreError;

/// Opaque credential proving the user's identity to the remote service. No
/// client-side validation of format or expiry; the service is authoritative.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SessionToken").field(&"<redacted>").finish()
    }
}

/// The session context object: read, set, and clear are the only operations.
/// At most one token is held at a time; presence is necessary but not
/// sufficient for validity.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Result<Option<SessionToken>, CoreError>;
    fn set(&self, token: &SessionToken) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// In-memory store, used by tests and available for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<SessionToken>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<SessionToken>, CoreError> {
        let guard = self
            .token
            .lock()
            .map_err(|_| CoreError::Persistence("session store lock poisoned".to_owned()))?;
        Ok(guard.clone())
    }

    fn set(&self, token: &SessionToken) -> Result<(), CoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| CoreError::Persistence("session store lock poisoned".to_owned()))?;
        *guard = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| CoreError::Persistence("session store lock poisoned".to_owned()))?;
        *guard = None;
        Ok(())
    }
}
