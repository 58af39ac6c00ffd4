//! Error types for subip-dns.

use thiserror::Error;

/// Errors that can occur while configuring or running the responder.
#[derive(Debug, Error)]
pub enum DnsError {
    /// IO error (socket bind, send, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// DNS protocol error
    #[error("DNS protocol error: {0}")]
    Proto(#[from] hickory_proto::ProtoError),
}
