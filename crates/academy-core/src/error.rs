//! # Error Types
//!
//! Typed error handling for the academy registration API.
//! Every service operation returns `Result<T, AcademyError>`.

use thiserror::Error;

/// External collaborators whose absence degrades the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Database,
    PaymentGateway,
    Mail,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Database => "database",
            Dependency::PaymentGateway => "payment gateway",
            Dependency::Mail => "mail",
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for all service operations
#[derive(Debug, Error)]
pub enum AcademyError {
    /// Missing or malformed required fields
    #[error("{0}")]
    Validation(String),

    /// Unknown admin email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or foreign bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Entity lookup by id failed
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// Payment callback signature did not match
    #[error("Invalid signature")]
    InvalidSignature,

    /// Password reset token unknown or past its expiry
    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,

    /// Database, gateway or mail transport is down or unconfigured
    #[error("{dependency} unavailable: {message}")]
    DependencyUnavailable {
        dependency: Dependency,
        message: String,
    },

    /// Anything unanticipated; detail is logged, never sent to clients
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AcademyError {
    pub fn validation(message: impl Into<String>) -> Self {
        AcademyError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AcademyError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn unavailable(dependency: Dependency, message: impl Into<String>) -> Self {
        AcademyError::DependencyUnavailable {
            dependency,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AcademyError::Validation(_) => 400,
            AcademyError::InvalidCredentials => 401,
            AcademyError::Unauthorized(_) => 401,
            AcademyError::NotFound { .. } => 404,
            AcademyError::InvalidSignature => 400,
            AcademyError::InvalidOrExpiredToken => 400,
            AcademyError::DependencyUnavailable { .. } => 503,
            AcademyError::Internal(_) => 500,
        }
    }

    /// Message that is safe to show to a client
    pub fn public_message(&self) -> String {
        match self {
            AcademyError::Internal(_) => "Internal server error".to_string(),
            AcademyError::DependencyUnavailable { dependency, .. } => {
                format!("Service temporarily unavailable ({dependency})")
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type AcademyResult<T> = Result<T, AcademyError>;
