use crate::overlay::model::OverlayId;

/// Result alias used across the crate.
pub type CollageResult<T> = Result<T, CollageError>;

/// Errors reported by the overlay model, compositor and editing session.
#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    /// A caller passed an argument that violates an invariant, such as empty text.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation referenced an overlay id that is not part of the session.
    #[error("overlay not found: {0}")]
    NotFound(OverlayId),

    /// The operation is not allowed in the session's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The export sink rejected or failed the write. The message is passed through as-is.
    #[error("export failed: {0}")]
    ExportFailed(String),

    /// An in-flight export was abandoned before completion.
    #[error("export cancelled")]
    Cancelled,

    /// IO, decode and other external failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollageError {
    /// Build an [`CollageError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build an [`CollageError::InvalidState`].
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build an [`CollageError::ExportFailed`].
    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::ExportFailed(msg.into())
    }

    /// Return `true` for errors that indicate a caller bug rather than a user-facing failure.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::NotFound(_) | Self::InvalidState(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
