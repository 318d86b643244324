use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transport tuning for calls to a rig.
///
/// The daemon protocol has no deadlines of its own; these bound how long a
/// single call may block before failing with a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Limit on establishing the TCP connection.
    pub connect_timeout: Duration,

    /// Limit on writing the request and reading the reply, measured from
    /// the moment the connection is up.
    pub call_timeout: Duration,

    /// Longest reply line accepted before the call fails. A status reply
    /// is a few hundred bytes even for large rigs.
    pub max_line_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(10),
            max_line_length: 64 * 1024,
        }
    }
}
