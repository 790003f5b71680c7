//! Error types for tlsniff core.
//!
//! Two tiers exist. [`ParseError`] is what the [`Tokenizer`](crate::tokenizer::Tokenizer)
//! reports: either the input ran out ([`ParseError::Underrun`], recoverable once more
//! bytes arrive) or a length field contradicts its enclosing structure
//! ([`ParseError::Malformed`]). [`Error`] is what callers of
//! [`HandshakeParser::feed`](crate::parser::HandshakeParser::feed) see; an underrun
//! never reaches them as an error.

use crate::state::ParseState;
use thiserror::Error;

/// Result type for tlsniff operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Fatal handshake inspection errors.
///
/// Once [`HandshakeParser::feed`](crate::parser::HandshakeParser::feed) has returned one
/// of these, the parser keeps returning it; the connection should be passed through
/// uninspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Internally inconsistent length fields or bytes that are not TLS.
    #[error("malformed handshake: {0}")]
    Malformed(String),

    /// A message that is not legal in the current parse state.
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),

    /// Application data arrived before the handshake finished.
    #[error("application data before Finished")]
    ApplicationDataBeforeFinished,

    /// Bytes were fed after the Finished message.
    #[error("post-handshake data")]
    PostHandshakeData,

    /// The certificate capability rejected a certificate.
    #[error("certificate parse failure: {0}")]
    Certificate(String),

    /// The input stream ended before the configured target was reached.
    #[error("input ended in state {state:?} with {pending} unparsed bytes")]
    Truncated {
        /// State reached when the input ended
        state: ParseState,
        /// Bytes received but never committed
        pending: usize,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Shorthand for [`Error::Malformed`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }

    /// Shorthand for [`Error::UnexpectedMessage`].
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Error::UnexpectedMessage(msg.into())
    }
}

/// Tokenizer-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer bytes remain than requested and more may still arrive.
    #[error("need more input")]
    Underrun,

    /// A length prefix is inconsistent with its enclosing structure.
    #[error("malformed {0}")]
    Malformed(String),
}

impl ParseError {
    /// Returns true for [`ParseError::Underrun`].
    pub const fn is_underrun(&self) -> bool {
        matches!(self, ParseError::Underrun)
    }
}

/// Bounded decoders run over complete structures, so an underrun there means the
/// enclosing length lied.
impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Underrun => Error::Malformed("structure shorter than declared".into()),
            ParseError::Malformed(msg) => Error::Malformed(msg),
        }
    }
}
