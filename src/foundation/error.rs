use crate::customize::validate::ValidationReport;

/// Convenience result type used across clipforge.
pub type ClipforgeResult<T> = Result<T, ClipforgeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ClipforgeError {
    /// Invalid user-provided documents or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Validation refused the input: a customization request or a scene graph about to render.
    #[error("rejected: {0}")]
    Rejected(ValidationReport),

    /// The derived scene graph cannot be composited.
    #[error("composition error: {0}")]
    Composition(String),

    /// A native encoder strategy failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Thumbnail extraction failed.
    #[error("thumbnail error: {0}")]
    Thumbnail(String),

    /// Disk read or write failure.
    #[error("io error: {0}")]
    Io(String),

    /// Errors when serializing or deserializing JSON documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClipforgeError {
    /// Build a [`ClipforgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ClipforgeError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`ClipforgeError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ClipforgeError::Thumbnail`] value.
    pub fn thumbnail(msg: impl Into<String>) -> Self {
        Self::Thumbnail(msg.into())
    }

    /// Build a [`ClipforgeError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`ClipforgeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return the itemized report when this is a rejection.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Rejected(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
