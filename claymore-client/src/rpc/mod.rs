//! JSON-RPC transport to the miner's management port.
//!
//! The daemon speaks a minimal line-delimited JSON-RPC dialect over TCP:
//! one request line, one response line, no notifications and no request
//! pipelining. A fresh connection is opened for every call.

mod envelope;
mod transport;

pub use envelope::{Envelope, JSONRPC_VERSION, REQUEST_ID, Request, parse_response};
pub use transport::call;
