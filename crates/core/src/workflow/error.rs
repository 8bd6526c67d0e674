//! Status transition errors.

use tallybook_shared::ErrorKind;
use thiserror::Error;

use crate::document::{DocumentKind, DocumentStatus};

/// Errors raised by the status state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// The kind never uses this status.
    #[error("Status {status} is not valid for a {kind}")]
    NotAllowedForKind {
        /// Document kind.
        kind: DocumentKind,
        /// Requested status.
        status: DocumentStatus,
    },

    /// The transition is not in the kind's table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: DocumentStatus,
        /// Requested status.
        to: DocumentStatus,
    },

    /// Only payments and conversions may set this status.
    #[error("Status {0} can only be reached through its own operation")]
    ReservedTransition(DocumentStatus),

    /// The document is closed for edits.
    #[error("Cannot modify a document in status {0}")]
    NotEditable(DocumentStatus),
}

impl StatusError {
    /// Returns the error code for display layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAllowedForKind { .. } => "STATUS_NOT_ALLOWED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ReservedTransition(_) => "RESERVED_TRANSITION",
            Self::NotEditable(_) => "DOCUMENT_NOT_EDITABLE",
        }
    }

    /// All status errors are validation errors.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
