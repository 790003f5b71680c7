//! Errors for the sniffing drivers.

use thiserror::Error;

/// Result type for the drivers.
pub type Result<T> = core::result::Result<T, Error>;

/// Why a sniffing run ended without reaching its target.
#[derive(Debug, Error)]
pub enum Error {
    /// The handshake bytes could not be inspected.
    #[error(transparent)]
    Sniff(#[from] tlsniff_core::Error),

    /// Reading from the transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The inspection error, if this was not an I/O failure.
    pub fn sniff_error(&self) -> Option<&tlsniff_core::Error> {
        match self {
            Error::Sniff(e) => Some(e),
            Error::Io(_) => None,
        }
    }

    /// Check whether the stream ended before the target state.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Sniff(tlsniff_core::Error::Truncated { .. }))
    }
}
