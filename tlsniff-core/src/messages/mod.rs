//! Handshake message decoders.
//!
//! Only the messages that carry negotiation metadata are decoded; the orchestrator
//! skips everything else by length.

pub mod client_hello;
pub mod legacy_client_hello;
pub mod server_hello;

// Re-exports
pub use client_hello::ClientHello;
pub use legacy_client_hello::LegacyClientHello;
pub use server_hello::ServerHello;
