//! Handshake parse state.

use core::fmt;

/// How far the handshake has been observed.
///
/// States only move forward, but not every state is visited: a ServerHello
/// followed directly by ChangeCipherSpec skips `CertificatesReceived` and
/// `HelloDoneReceived`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseState {
    /// Nothing parsed yet
    #[default]
    NoHello,

    /// The first record has started arriving
    HelloStarted,

    /// ClientHello or ServerHello decoded
    HelloReceived,

    /// Certificate message decoded
    CertificatesReceived,

    /// ServerHelloDone decoded
    HelloDoneReceived,

    /// NewSessionTicket decoded
    TicketReceived,

    /// ChangeCipherSpec received
    ChangeCipherSpecReceived,

    /// Finished received; everything after it is encrypted
    FinishReceived,
}

impl ParseState {
    /// Get the state name.
    pub const fn name(self) -> &'static str {
        match self {
            ParseState::NoHello => "no hello",
            ParseState::HelloStarted => "hello started",
            ParseState::HelloReceived => "hello received",
            ParseState::CertificatesReceived => "certificates received",
            ParseState::HelloDoneReceived => "hello done received",
            ParseState::TicketReceived => "ticket received",
            ParseState::ChangeCipherSpecReceived => "change cipher spec received",
            ParseState::FinishReceived => "finish received",
        }
    }

    /// Check whether nothing can be parsed past this state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ParseState::FinishReceived)
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a successful [`feed`](crate::parser::HandshakeParser::feed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedStatus {
    /// More bytes are needed before the target state is reached.
    Incomplete,

    /// The configured target state was reached.
    Done,
}

impl FeedStatus {
    /// Returns true for [`FeedStatus::Done`].
    pub const fn is_done(self) -> bool {
        matches!(self, FeedStatus::Done)
    }
}
