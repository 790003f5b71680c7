//! # TLSniff - Passive TLS Handshake Sniffing
//!
//! Reads the first flight of a TLS connection and reports what it says, without
//! decrypting anything or altering the stream:
//! - Server Name Indication, ALPN protocols and offered cipher suites
//! - Record and hello protocol versions, including SSLv2-compatible ClientHellos
//! - Session resumption signals (session IDs, tickets, abbreviated handshakes)
//! - The server's certificate chain, optionally decoded
//!
//! The parser lives in [`tlsniff_core`]; this crate adds drivers that pull bytes
//! from a blocking or async transport.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//! use tlsniff::{Config, Sniffer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = TcpStream::connect("127.0.0.1:8443")?;
//! let outcome = Sniffer::new(conn, Config::default()).run()?;
//! println!("SNI: {:?}", outcome.summary.sni());
//! # Ok(())
//! # }
//! ```
//!
//! ### Async
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn example(conn: tokio::net::TcpStream) -> Result<(), tlsniff::Error> {
//! use tlsniff::{AsyncSniffer, Config};
//!
//! let outcome = AsyncSniffer::new(conn, Config::default()).run().await?;
//! // Forward the hello bytes plus `outcome.trailing` to the upstream
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `async`: Enable [`AsyncSniffer`] over Tokio's `AsyncRead`
//! - `x509`: Enable full certificate decoding with `x509-parser`

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tlsniff_core::{
    self, CertificateChain, CertificateParser, ChainEntry, CipherId, Config, FeedStatus,
    HandshakeParser, HandshakeSummary, ParseState, ParsedCertificate, ProtocolVersion,
};

#[cfg(feature = "x509")]
pub use tlsniff_x509;

// Public modules
pub mod error;
pub mod sniffer;

#[cfg(feature = "async")]
pub mod stream;

// Re-exports
pub use error::{Error, Result};
pub use sniffer::{SniffOutcome, Sniffer};

#[cfg(feature = "async")]
pub use stream::AsyncSniffer;

/// TLSniff version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the TLSniff version.
pub fn version() -> &'static str {
    VERSION
}
