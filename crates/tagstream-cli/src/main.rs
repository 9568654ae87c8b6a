//! Tag stream bridge
//!
//! Serves the bridge routes over newline-delimited JSON/TCP. No vendor
//! driver is linked in; the radio is the mock driver fed by synthetic tag
//! traffic.
//!
//! Usage:
//!     tagstream --bind 127.0.0.1:8080 --log-level debug

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tagstream_reader::mock::{MockReader, SimulationConfig};
use tagstream_rpc::{RpcServer, RpcServerConfig};
use tagstream_service::{Bridge, BridgeConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tagstream", version, about = "RFID reader to RPC bridge")]
struct Args {
    /// Address the RPC server listens on
    #[arg(long, env = "TAGSTREAM_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Maximum simultaneous controller connections
    #[arg(long, default_value_t = 64)]
    max_connections: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "TAGSTREAM_LOG", default_value = "info")]
    log_level: String,

    /// Do not connect to the reader at startup
    #[arg(long)]
    no_auto_connect: bool,

    /// Interval between simulated inventory batches, in milliseconds
    #[arg(long, default_value_t = 500)]
    simulation_period_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = tagstream_core::VERSION, "Starting tag stream bridge");
    tracing::info!("  Bind: {}", args.bind);
    tracing::info!("  Auto-connect: {}", !args.no_auto_connect);

    let (reader, events) = MockReader::new();
    let simulation = reader.simulate(SimulationConfig {
        period: Duration::from_millis(args.simulation_period_ms.max(1)),
        ..SimulationConfig::default()
    });

    let bridge = Bridge::new(
        reader,
        BridgeConfig {
            auto_connect: !args.no_auto_connect,
        },
    );
    let rpc = bridge.rpc();
    let handle = bridge.start(events);

    let server = RpcServer::bind(RpcServerConfig {
        bind_addr: args.bind,
        max_connections: args.max_connections,
    })
    .await
    .context("starting RPC server")?;

    let outcome = tokio::select! {
        result = server.run(rpc) => result.context("RPC server failed"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for Ctrl-C")?;
            tracing::info!("Shutdown requested");
            Ok(())
        }
    };

    simulation.abort();
    handle.shutdown().await;

    outcome
}
