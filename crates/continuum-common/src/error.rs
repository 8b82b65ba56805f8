//! Centralized error types for the record layer.
//!
//! Uses `thiserror` for ergonomic error definitions. Transport failures live in
//! `continuum-client`; everything here is raised before a request is sent or
//! while a payload is being turned into typed records.

use crate::validation::DanglingReference;

/// Core error type for record validation, integrity and permission checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LootError {
    // === Validation errors ===
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid priority list on {owner}: {message}")]
    InvalidPriority { owner: String, message: String },

    // === Integrity errors ===
    #[error("{kind} {id} appears more than once")]
    DuplicateId { kind: &'static str, id: i64 },

    #[error("{0}")]
    DanglingReference(DanglingReference),

    #[error("Data integrity check failed: {} dangling reference(s)", .0.len())]
    Integrity(Vec<DanglingReference>),

    // === Permission errors ===
    #[error("Forbidden: {action}")]
    Forbidden { action: String },

    // === Resource errors ===
    #[error("{resource} not found")]
    NotFound { resource: String },
}

impl LootError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    /// Error code string for programmatic handling by callers.
    pub fn error_code(&self) -> &str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::InvalidPriority { .. } => "INVALID_PRIORITY",
            Self::DuplicateId { .. } => "DUPLICATE_ID",
            Self::DanglingReference(_) | Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// Whether this error was raised before anything was sent to the backend.
    pub fn is_client_side(&self) -> bool {
        !matches!(self, Self::Integrity(_) | Self::DuplicateId { .. })
    }
}

/// Convenience type alias for Results using LootError.
pub type LootResult<T> = Result<T, LootError>;
