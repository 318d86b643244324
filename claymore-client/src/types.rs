//! Miner status data model.
//!
//! These types describe a rig as reported by the daemon's status method.
//! A [`MinerSnapshot`] is produced once by the decoder and never modified
//! afterward.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Share and hash rate counters for one cryptocurrency.
///
/// Hash rates are in the unit the daemon reports (kH/s for Ethash).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CryptoStats {
    pub hash_rate: i64,
    pub shares: i64,
    pub rejected_shares: i64,
    pub invalid_shares: i64,
}

/// Pool connection as seen by the miner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolInfo {
    /// Empty when the pool is not in use.
    pub address: String,
    /// Number of times the miner failed over to another pool.
    pub switches: i64,
}

/// Per-device telemetry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GpuStats {
    pub primary_hash_rate: i64,
    /// Zero unless dual mining is active.
    pub secondary_hash_rate: i64,
    pub temperature_c: i64,
    pub fan_speed_pct: i64,
}

/// Full miner status snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MinerSnapshot {
    pub version: String,
    pub uptime_minutes: i64,
    pub primary_crypto: CryptoStats,
    /// All zero when dual mining is inactive.
    pub secondary_crypto: CryptoStats,
    pub primary_pool: PoolInfo,
    /// Address is empty when dual mining is inactive.
    pub secondary_pool: PoolInfo,
    /// Devices in the order the daemon enumerates them.
    pub gpus: Vec<GpuStats>,
}

impl MinerSnapshot {
    /// Whether the rig is mining a secondary currency.
    ///
    /// There is no explicit flag in the reply; a secondary pool address is
    /// the only signal.
    pub fn is_dual_mining(&self) -> bool {
        !self.secondary_pool.address.is_empty()
    }
}

/// Remote rig to talk to.
///
/// Supplied in full on every call; nothing is cached between calls.
#[derive(Clone, Deserialize, Serialize)]
pub struct MinerEndpoint {
    /// `host:port` of the daemon's management port.
    pub address: String,
    /// Management password; empty if the daemon runs without one.
    pub password: String,
}

impl MinerEndpoint {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
        }
    }
}

// Hand-written so the password never lands in logs.
impl fmt::Debug for MinerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinerEndpoint")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MinerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

impl fmt::Display for CryptoStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Hashrate:        {}", self.hash_rate)?;
        writeln!(f, "  Shares:          {}", self.shares)?;
        writeln!(f, "  Rejected shares: {}", self.rejected_shares)?;
        writeln!(f, "  Invalid shares:  {}", self.invalid_shares)
    }
}

impl fmt::Display for PoolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = if self.address.is_empty() {
            "(none)"
        } else {
            &self.address
        };
        writeln!(f, "  Address:  {address}")?;
        writeln!(f, "  Switches: {}", self.switches)
    }
}

impl fmt::Display for GpuStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Hashrate:           {}", self.primary_hash_rate)?;
        writeln!(f, "  Secondary hashrate: {}", self.secondary_hash_rate)?;
        writeln!(f, "  Temperature:        {} C", self.temperature_c)?;
        writeln!(f, "  Fan speed:          {} %", self.fan_speed_pct)
    }
}

impl fmt::Display for MinerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Uptime:  {} min", self.uptime_minutes)?;
        writeln!(f)?;
        writeln!(f, "Primary crypto:")?;
        write!(f, "{}", self.primary_crypto)?;
        writeln!(f, "Primary pool:")?;
        write!(f, "{}", self.primary_pool)?;
        if self.is_dual_mining() {
            writeln!(f, "Secondary crypto:")?;
            write!(f, "{}", self.secondary_crypto)?;
            writeln!(f, "Secondary pool:")?;
            write!(f, "{}", self.secondary_pool)?;
        }
        for (i, gpu) in self.gpus.iter().enumerate() {
            writeln!(f, "GPU {i}:")?;
            write!(f, "{gpu}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_debug_hides_password() {
        let endpoint = MinerEndpoint::new("10.0.0.5:3333", "hunter2");
        let debug = format!("{endpoint:?}");
        assert!(debug.contains("10.0.0.5:3333"));
        assert!(!debug.contains("hunter2"), "password leaked: {debug}");
        assert_eq!(endpoint.to_string(), "10.0.0.5:3333");
    }

    #[test]
    fn single_mining_display_omits_secondary_sections() {
        let snapshot = MinerSnapshot {
            version: "13.2".to_string(),
            uptime_minutes: 542,
            primary_pool: PoolInfo {
                address: "eu1.pool.com".to_string(),
                switches: 2,
            },
            gpus: vec![GpuStats::default(), GpuStats::default()],
            ..Default::default()
        };

        let text = snapshot.to_string();
        assert!(text.contains("Version: 13.2"));
        assert!(text.contains("eu1.pool.com"));
        assert!(text.contains("GPU 1:"));
        assert!(!text.contains("Secondary pool"));
    }

    #[test]
    fn dual_mining_follows_secondary_pool_address() {
        let mut snapshot = MinerSnapshot::default();
        assert!(!snapshot.is_dual_mining());

        snapshot.secondary_pool.address = "dcr.pool.com:3252".to_string();
        assert!(snapshot.is_dual_mining());
        assert!(snapshot.to_string().contains("Secondary pool:"));
    }
}
