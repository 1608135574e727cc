//! Crate-wide error taxonomy.
//!
//! Every fallible operation returns `Result<_, IntakeError>`; callers
//! branch on the variant, not on message text. Configuration problems are
//! fatal at startup, validation problems never reach the network, store
//! problems carry the remote failure message, and not-found is a
//! successful-but-empty read rather than a transport fault.

use thiserror::Error;

use crate::db::workflow::SaveStep;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{context}: {message}")]
    Store { context: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

impl IntakeError {
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn store(context: &str, message: impl Into<String>) -> Self {
        Self::Store {
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    /// Tag an error with the aggregate-save step it occurred in, so the
    /// caller can tell which of the four operations failed. Validation
    /// errors keep their own variant; everything else becomes a store
    /// failure prefixed with the step name.
    pub fn in_step(self, step: SaveStep) -> Self {
        match self {
            Self::Validation { .. } => self,
            other => Self::Store {
                context: format!("{step} failed"),
                message: other.to_string(),
            },
        }
    }
}
