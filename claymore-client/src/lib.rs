//! Client for the Claymore miner remote management port.
//!
//! The daemon listens on a TCP port (3333 by default) and answers
//! line-delimited JSON-RPC calls. This crate issues the three calls it
//! supports and turns the positional status reply into a [`MinerSnapshot`]:
//!
//! ```rust,ignore
//! use claymore_client::{Client, MinerEndpoint};
//!
//! let rig = MinerEndpoint::new("10.0.0.21:3333", "");
//! let snapshot = Client::new().status(&rig).await?;
//! println!("{} GPUs, {} kH/s", snapshot.gpus.len(), snapshot.primary_crypto.hash_rate);
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod rpc;
pub mod tracing;
pub mod types;

pub use client::Client;
pub use config::ClientConfig;
pub use decode::decode_status;
pub use error::{Error, Result, TransportError};
pub use types::{CryptoStats, GpuStats, MinerEndpoint, MinerSnapshot, PoolInfo};
