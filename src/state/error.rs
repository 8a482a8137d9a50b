//! Session errors and their failure responses.

use super::code::CodeError;

/// Error classes surfaced to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

/// Errors from lobby operations.
///
/// A rejected operation never leaves a session partially updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("Game not found or invalid session")]
    NotFound,

    #[error("Game has expired")]
    Expired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Failed to generate unique game code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound | Self::Expired => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::GenerationExhausted { .. } => ErrorKind::Internal,
        }
    }

    /// Structured failure response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "kind": self.kind().as_str()
        })
    }
}

impl From<CodeError> for SessionError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::Exhausted { attempts } => Self::GenerationExhausted { attempts },
            CodeError::Empty | CodeError::InvalidCharacter { .. } => {
                Self::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kinds() {
        assert_eq!(SessionError::Expired.kind(), ErrorKind::NotFound);
        assert_eq!(
            SessionError::Forbidden("Not your turn".into()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            SessionError::GenerationExhausted { attempts: 50 }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_failure_response() {
        let err = SessionError::Conflict("Game is not waiting for players".into());
        assert_eq!(
            err.to_json(),
            serde_json::json!({
                "success": false,
                "error": "Game is not waiting for players",
                "kind": "conflict"
            })
        );
    }

    #[test]
    fn test_code_errors_convert() {
        assert_eq!(
            SessionError::from(CodeError::Empty),
            SessionError::Validation("game code is required".into())
        );
        assert_eq!(
            SessionError::from(CodeError::Exhausted { attempts: 50 }),
            SessionError::GenerationExhausted { attempts: 50 }
        );
    }
}
