//! # Error Types
//!
//! Single error taxonomy shared by every engine in the crate.
//!
//! Every failure is scoped to one request and carries a kind plus a
//! human-readable message, so the rendering layer can map it straight
//! to a user-facing string without inspecting variant payloads.

use serde::Serialize;
use thiserror::Error;

/// Result type for all core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error type shared by registries, estimators and engines.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Unknown chain id or unregistered token.
    #[error("not found: {message}")]
    NotFound {
        /// What was looked up and missed.
        message: String,
    },

    /// Malformed or inconsistent caller input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Which input failed validation and why.
        message: String,
    },

    /// Node or RPC failure, including timeouts.
    #[error("remote unavailable: {message}")]
    RemoteUnavailable {
        /// Underlying transport or node failure.
        message: String,
    },

    /// The requested facility does not exist on the chain.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Which facility is missing.
        message: String,
    },

    /// No USD price is known for a token.
    #[error("price unknown: {message}")]
    PriceUnknown {
        /// Which token has no price.
        message: String,
    },

    /// The call was abandoned through its cancellation token.
    #[error("cancelled: {message}")]
    Cancelled {
        /// Which operation was superseded.
        message: String,
    },
}

impl CoreError {
    /// Creates a `NotFound` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a `RemoteUnavailable` error.
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
        }
    }

    /// Creates an `Unsupported` error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a `PriceUnknown` error.
    pub fn price_unknown(message: impl Into<String>) -> Self {
        Self::PriceUnknown {
            message: message.into(),
        }
    }

    /// Creates a `Cancelled` error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Returns the stable kind discriminant for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::RemoteUnavailable { .. } => ErrorKind::RemoteUnavailable,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::PriceUnknown { .. } => ErrorKind::PriceUnknown,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Returns the message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::InvalidInput { message }
            | Self::RemoteUnavailable { message }
            | Self::Unsupported { message }
            | Self::PriceUnknown { message }
            | Self::Cancelled { message } => message,
        }
    }

    /// Returns true if the call was abandoned via its cancellation token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Stable discriminant for [`CoreError`], suitable for the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Unknown chain or token.
    NotFound,
    /// Malformed or inconsistent caller input.
    InvalidInput,
    /// Node or RPC failure.
    RemoteUnavailable,
    /// Facility absent on the chain.
    Unsupported,
    /// No USD price known.
    PriceUnknown,
    /// Call abandoned by the caller.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::RemoteUnavailable => "remote_unavailable",
            Self::Unsupported => "unsupported",
            Self::PriceUnknown => "price_unknown",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}
