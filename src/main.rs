// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// - config:    Configuration from a JSON file and the environment
// - schema:    Resource and raw record definitions
// - error:     Typed classification and data contract errors
// - util:      Environment parsing helpers
// - source:    Paged RDS data sources (AWS SDK, test mock)
// - collector: Catalog, fleet collection, classification, snapshots
// - metrics:   Prometheus gauges the snapshots publish into
// - server:    HTTP /metrics endpoint
//
mod collector;
mod config;
mod error;
mod metrics;
mod schema;
mod server;
mod source;
mod util;

use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};

use collector::runner::Runner;
use config::Config;
use metrics::VersionMetrics;
use source::aws::AwsRdsSource;

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize logging
// - Load configuration
// - Build the engine version catalog (fatal on failure)
// - Start the snapshot loop
// - Serve /metrics until Ctrl-C or SIGTERM
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    info!(
        "starting: interval={}s port={} catalog_refresh={:?} classification_policy={:?}",
        config.interval_secs, config.port, config.catalog_refresh, config.classification_policy
    );

    let source = Arc::new(AwsRdsSource::from_env().await);
    let metrics = Arc::new(VersionMetrics::new()?);

    let runner = Runner::start(source, metrics.clone(), &config).await?;
    let catalog = runner.catalog();
    if catalog.is_empty() {
        warn!("engine version catalog is empty; every resource will be unclassifiable");
    } else {
        info!("catalog ready: {} engine versions", catalog.len());
    }

    // Cycles are sequential inside the runner task. Dropping the
    // runtime on exit abandons any in-flight cycle.
    tokio::spawn(runner.run());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    server::serve(addr, metrics, server::shutdown_signal()?).await?;

    info!("shutting down");
    Ok(())
}
