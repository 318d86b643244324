//! Common error types for claymore-client.
//!
//! Two kinds of failure reach callers: the transport could not complete a
//! round-trip with the daemon, or the daemon answered with a status reply
//! whose structure does not fit the fixed nine-field layout. Non-numeric
//! values inside an otherwise well-formed reply are not errors; the decoder
//! degrades them to zero.

use std::time::Duration;

use thiserror::Error;

/// Main error type for claymore-client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The RPC round-trip failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The status reply does not have the expected structure
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}

/// Failures while talking to the daemon.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connect, read, or write failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A connect or call deadline elapsed
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// The daemon closed the connection without replying
    #[error("connection closed before a reply was received")]
    Closed,

    /// The response is not a JSON-RPC response we understand
    #[error("invalid response envelope: {0}")]
    Envelope(String),

    /// The daemon answered with an error object
    #[error("daemon returned error: {0}")]
    Remote(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
