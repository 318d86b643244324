//! Command facade for a remote rig.
//!
//! [`Client`] exposes the three operations the management port supports.
//! Every call takes a complete [`MinerEndpoint`]; the client holds only
//! transport configuration, so one instance can be shared freely across
//! tasks polling different rigs.

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::decode::decode_status;
use crate::error::{Result, TransportError};
use crate::rpc;
use crate::tracing::prelude::*;
use crate::types::{MinerEndpoint, MinerSnapshot};

/// Daemon method returning the nine-field status reply.
pub const METHOD_STATUS: &str = "miner_getstat1";

/// Daemon method restarting the mining process.
pub const METHOD_RESTART: &str = "miner_restart";

/// Daemon method rebooting the host.
pub const METHOD_REBOOT: &str = "miner_reboot";

#[derive(Debug, Clone, Default)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Create a client with default timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch and decode the rig's current status.
    pub async fn status(&self, endpoint: &MinerEndpoint) -> Result<MinerSnapshot> {
        let call = rpc::call(endpoint, &self.config, METHOD_STATUS, Map::new());
        let result = call.await?;

        let reply: Vec<String> = serde_json::from_value(result).map_err(|e| {
            TransportError::Envelope(format!("status result is not a list of strings: {e}"))
        })?;

        let snapshot = decode_status(&reply)?;
        debug!(
            rig = %endpoint,
            version = %snapshot.version,
            gpus = snapshot.gpus.len(),
            dual = snapshot.is_dual_mining(),
            "Status decoded"
        );
        Ok(snapshot)
    }

    /// Restart the mining process on the rig.
    pub async fn restart(&self, endpoint: &MinerEndpoint) -> Result<()> {
        self.command(endpoint, METHOD_RESTART).await
    }

    /// Reboot the rig's host.
    pub async fn reboot(&self, endpoint: &MinerEndpoint) -> Result<()> {
        self.command(endpoint, METHOD_REBOOT).await
    }

    // Control methods carry no result. The daemon may drop the connection
    // as it acts on the command instead of answering, which counts as
    // success.
    async fn command(&self, endpoint: &MinerEndpoint, method: &str) -> Result<()> {
        match rpc::call(endpoint, &self.config, method, Map::new()).await {
            Ok(Value::Null) => {}
            Ok(result) => trace!(rig = %endpoint, method, %result, "Ignoring command result"),
            Err(TransportError::Closed) => {
                debug!(rig = %endpoint, method, "Daemon closed without acknowledging")
            }
            Err(e) => return Err(e.into()),
        }
        info!(rig = %endpoint, method, "Command sent");
        Ok(())
    }
}
