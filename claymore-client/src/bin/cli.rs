//! Command-line interface for claymore-client.
//!
//! Queries or controls a single rig through its management port. Meant to
//! be run by hand or from a scheduler; each invocation makes exactly one
//! call.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use claymore_client::tracing::{self, prelude::*};
use claymore_client::{Client, ClientConfig, MinerEndpoint};

#[derive(Parser, Debug)]
#[command(
    name = "claymore-cli",
    about = "Query and control a Claymore mining rig"
)]
struct Args {
    /// Management port address (host:port)
    #[arg(short, long, env = "CLAYMORE_ADDR", default_value = "127.0.0.1:3333")]
    address: String,

    /// Management password, if the miner was started with -mpsw
    #[arg(
        short,
        long,
        env = "CLAYMORE_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    password: String,

    /// Seconds to wait for the connection
    #[arg(long, default_value_t = 5)]
    connect_timeout_secs: u64,

    /// Seconds to wait for the reply once connected
    #[arg(long, default_value_t = 10)]
    call_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show miner status
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restart the mining process
    Restart,
    /// Reboot the rig
    Reboot,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing::init_journald_or_stdout();

    let args = Args::parse();
    let endpoint = MinerEndpoint::new(args.address, args.password);
    let client = Client::with_config(ClientConfig {
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
        call_timeout: Duration::from_secs(args.call_timeout_secs),
        ..Default::default()
    });

    match args.command {
        Command::Status { json } => cmd_status(&client, &endpoint, json).await?,
        Command::Restart => client
            .restart(&endpoint)
            .await
            .with_context(|| format!("restarting miner at {endpoint}"))?,
        Command::Reboot => client
            .reboot(&endpoint)
            .await
            .with_context(|| format!("rebooting {endpoint}"))?,
    }

    Ok(())
}

/// Print the rig's current status.
async fn cmd_status(client: &Client, endpoint: &MinerEndpoint, json: bool) -> Result<()> {
    let snapshot = client
        .status(endpoint)
        .await
        .with_context(|| format!("fetching status from {endpoint}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{snapshot}");
    }

    if snapshot.gpus.is_empty() {
        warn!(rig = %endpoint, "Miner reports no GPUs");
    }

    Ok(())
}
