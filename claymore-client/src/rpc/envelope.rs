//! Request and response framing for the management port.
//!
//! Each request is a single JSON object on one line. The fixed envelope
//! fields sit at the top level next to the method name and any method
//! arguments:
//!
//! ```text
//! {"id":"0","jsonrpc":"2.0","psw":"secret","method":"miner_getstat1"}
//! ```
//!
//! The daemon answers with `{"id":0,"result":...,"error":null}`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TransportError;
use crate::types::MinerEndpoint;

/// Request id sent with every call. The daemon echoes it but never
/// multiplexes, so it is constant.
pub const REQUEST_ID: &str = "0";

pub const JSONRPC_VERSION: &str = "2.0";

/// Fields common to every request.
///
/// Built from the endpoint for each call and consumed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub id: &'static str,
    pub jsonrpc: &'static str,
    pub psw: String,
}

impl Envelope {
    pub fn for_endpoint(endpoint: &MinerEndpoint) -> Self {
        Self {
            id: REQUEST_ID,
            jsonrpc: JSONRPC_VERSION,
            psw: endpoint.password.clone(),
        }
    }
}

/// A complete request: envelope merged with the method and its arguments.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub method: &'a str,
    #[serde(flatten)]
    pub args: Map<String, Value>,
}

impl<'a> Request<'a> {
    pub fn new(envelope: Envelope, method: &'a str, args: Map<String, Value>) -> Self {
        Self {
            envelope,
            method,
            args,
        }
    }

    /// Serialize to a single wire line, without the terminator.
    pub fn to_line(&self) -> Result<String, TransportError> {
        serde_json::to_string(self)
            .map_err(|e| TransportError::Envelope(format!("cannot encode request: {e}")))
    }
}

/// Interpret one response line.
///
/// Returns the `result` member (null when absent), or
/// [`TransportError::Remote`] when the daemon set `error`.
pub fn parse_response(line: &str) -> Result<Value, TransportError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| TransportError::Envelope(format!("response is not JSON: {e}")))?;

    let Value::Object(mut response) = value else {
        return Err(TransportError::Envelope(
            "response is not a JSON object".to_string(),
        ));
    };

    if !response.contains_key("result") && !response.contains_key("error") {
        return Err(TransportError::Envelope(
            "response has neither result nor error".to_string(),
        ));
    }

    match response.remove("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => return Err(TransportError::Remote(message)),
        Some(other) => return Err(TransportError::Remote(other.to_string())),
    }

    Ok(response.remove("result").unwrap_or(Value::Null))
}
