use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Message suitable for direct display in the UI. Server-provided
    /// messages are carried through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Unauthenticated => "You are not signed in.".to_owned(),
            CoreError::Unauthorized(message)
            | CoreError::RequestFailed(message)
            | CoreError::NetworkFailure(message)
            | CoreError::MalformedResponse(message)
            | CoreError::Configuration(message)
            | CoreError::Persistence(message) => message.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CoreError::Unauthorized(_) | CoreError::Unauthenticated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_carries_server_message_verbatim() {
        let error = CoreError::Unauthorized("Unauthorized: Invalid email or password.".to_owned());
        assert_eq!(
            error.user_message(),
            "Unauthorized: Invalid email or password."
        );
    }

    #[test]
    fn only_auth_variants_count_as_unauthorized() {
        assert!(CoreError::Unauthenticated.is_unauthorized());
        assert!(CoreError::Unauthorized("rejected".to_owned()).is_unauthorized());
        assert!(!CoreError::NetworkFailure("connection reset".to_owned()).is_unauthorized());
        assert!(!CoreError::RequestFailed("server error".to_owned()).is_unauthorized());
    }
}
