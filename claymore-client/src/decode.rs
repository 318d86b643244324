//! Status reply decoder.
//!
//! The daemon answers `miner_getstat1` with nine strings. Most of them pack
//! several values separated by `;`, and their meaning is purely positional:
//!
//! ```text
//! idx  content
//!  0   miner version, e.g. "13.2 - ETH"
//!  1   uptime in minutes
//!  2   primary:   hashrate;shares;rejected
//!  3   per-GPU primary hashrates (one entry per device)
//!  4   secondary: hashrate;shares;rejected
//!  5   per-GPU secondary hashrates (meaningful only when dual mining)
//!  6   temp0;fan0;temp1;fan1;...
//!  7   primary pool[;secondary pool]
//!  8   primary invalid;primary switches;secondary invalid;secondary switches
//! ```
//!
//! Decoding is lenient about values and strict about shape. A sub-field that
//! is missing or not a number becomes zero, so one garbled counter never
//! hides the rest of the snapshot. A reply with too few fields, or with
//! per-GPU data that cannot be lined up with the device list, is rejected
//! with [`Error::MalformedReply`].

use crate::error::{Error, Result};
use crate::tracing::prelude::*;
use crate::types::{CryptoStats, GpuStats, MinerSnapshot};

/// Number of top-level fields in a status reply.
pub const STATUS_FIELD_COUNT: usize = 9;

const SEPARATOR: char = ';';

/// Currency annotation the daemon appends to its version string.
const VERSION_SUFFIX: &str = " - ETH";

const VERSION: usize = 0;
const UPTIME: usize = 1;
const PRIMARY_TOTALS: usize = 2;
const PRIMARY_GPU_RATES: usize = 3;
const SECONDARY_TOTALS: usize = 4;
const SECONDARY_GPU_RATES: usize = 5;
const GPU_TEMP_FAN: usize = 6;
const POOLS: usize = 7;
const FAULTS: usize = 8;

/// Decode a raw status reply into a snapshot.
///
/// Pure and deterministic. Fails only when the reply's structure does not
/// fit the layout above; numeric problems degrade to zero.
pub fn decode_status<S: AsRef<str>>(reply: &[S]) -> Result<MinerSnapshot> {
    if reply.len() < STATUS_FIELD_COUNT {
        return Err(Error::MalformedReply(format!(
            "expected {STATUS_FIELD_COUNT} fields, got {}",
            reply.len()
        )));
    }
    let fields: Vec<&str> = reply.iter().map(AsRef::as_ref).collect();
    let field = |idx: usize| fields[idx];

    let mut snapshot = MinerSnapshot {
        version: field(VERSION).replacen(VERSION_SUFFIX, "", 1),
        uptime_minutes: number(field(UPTIME)),
        ..Default::default()
    };

    snapshot.primary_crypto = totals(field(PRIMARY_TOTALS));
    snapshot.secondary_crypto = totals(field(SECONDARY_TOTALS));

    // The secondary pool address is the only dual-mining signal in the
    // reply, so it must be settled before field 5 is looked at.
    let pools = sub_fields(field(POOLS));
    snapshot.primary_pool.address = pools.first().copied().unwrap_or_default().to_string();
    if let Some(secondary) = pools.get(1) {
        snapshot.secondary_pool.address = secondary.to_string();
    }

    let faults = sub_fields(field(FAULTS));
    let fault = |i: usize| faults.get(i).map_or(0, |s| number(s));
    snapshot.primary_crypto.invalid_shares = fault(0);
    snapshot.primary_pool.switches = fault(1);
    snapshot.secondary_crypto.invalid_shares = fault(2);
    snapshot.secondary_pool.switches = fault(3);

    snapshot.gpus = sub_fields(field(PRIMARY_GPU_RATES))
        .into_iter()
        .map(|rate| GpuStats {
            primary_hash_rate: number(rate),
            ..Default::default()
        })
        .collect();

    apply_temperatures(&mut snapshot.gpus, field(GPU_TEMP_FAN))?;

    if snapshot.is_dual_mining() {
        apply_secondary_rates(&mut snapshot.gpus, field(SECONDARY_GPU_RATES))?;
    }

    Ok(snapshot)
}

/// Split a field into its sub-fields. An empty field is one empty sub-field,
/// so an empty field 3 still describes one GPU.
fn sub_fields(field: &str) -> Vec<&str> {
    field.split(SEPARATOR).collect()
}

/// Parse a counter, substituting zero for anything that is not a number.
/// Signed values such as `-1` are kept as reported.
fn number(raw: &str) -> i64 {
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            if !raw.is_empty() {
                warn!(value = raw, "Non-numeric value in status reply, using 0");
            }
            0
        }
    }
}

/// Decode a `hashrate;shares;rejected` group. Invalid shares arrive later
/// in the reply and are merged in by the caller.
fn totals(field: &str) -> CryptoStats {
    let group = sub_fields(field);
    let value = |i: usize| group.get(i).map_or(0, |s| number(s));
    CryptoStats {
        hash_rate: value(0),
        shares: value(1),
        rejected_shares: value(2),
        invalid_shares: 0,
    }
}

/// Fill temperature and fan speed from interleaved `temp;fan` pairs.
fn apply_temperatures(gpus: &mut [GpuStats], field: &str) -> Result<()> {
    let values = sub_fields(field);
    if values.len() % 2 != 0 || values.len() > gpus.len() * 2 {
        return Err(Error::MalformedReply(format!(
            "{} temperature/fan values for {} GPUs",
            values.len(),
            gpus.len()
        )));
    }

    for (gpu, pair) in gpus.iter_mut().zip(values.chunks_exact(2)) {
        gpu.temperature_c = number(pair[0]);
        gpu.fan_speed_pct = number(pair[1]);
    }
    Ok(())
}

/// Fill per-GPU secondary hash rates by position.
///
/// Entries that are not numbers are skipped wherever they fall and leave
/// that GPU at zero. A shorter list leaves the trailing GPUs at zero; a
/// number positioned past the last GPU cannot be paired and is rejected.
fn apply_secondary_rates(gpus: &mut [GpuStats], field: &str) -> Result<()> {
    let device_count = gpus.len();
    for (i, raw) in sub_fields(field).into_iter().enumerate() {
        let Ok(rate) = raw.parse() else {
            debug!(gpu = i, value = raw, "Skipping non-numeric secondary hashrate");
            continue;
        };
        let Some(gpu) = gpus.get_mut(i) else {
            return Err(Error::MalformedReply(format!(
                "secondary hashrate at position {i} for {device_count} GPUs"
            )));
        };
        gpu.secondary_hash_rate = rate;
    }
    Ok(())
}
