use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Deserialize;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::config::Config;
use crate::metrics::MetricSink;
use crate::source::RdsSource;

use super::catalog::{DeprecationCatalog, build_catalog};
use super::snapshot::{ClassificationPolicy, SnapshotReport, run_snapshot};

/// When the deprecation catalog is rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogRefresh {
    /// Build once before polling starts.
    #[default]
    Startup,

    /// Rebuild before every snapshot; on failure the previous
    /// catalog is used for that cycle.
    EveryCycle,
}

/// Drives snapshot cycles on a fixed interval.
///
/// GUARANTEES:
/// - Cycles never overlap: each one is awaited before the next tick
/// - A failed cycle is logged; the next tick runs independently
/// - The catalog is swapped only between cycles
///
pub struct Runner {
    source: Arc<dyn RdsSource>,
    sink: Arc<dyn MetricSink>,
    catalog: Arc<DeprecationCatalog>,
    period: Duration,
    refresh: CatalogRefresh,
    policy: ClassificationPolicy,
}

impl Runner {
    /// Builds the initial catalog. Failing here is fatal: polling
    /// never starts without a catalog.
    pub async fn start(
        source: Arc<dyn RdsSource>,
        sink: Arc<dyn MetricSink>,
        config: &Config,
    ) -> Result<Self> {
        let catalog = build_catalog(source.as_ref())
            .await
            .context("failed to build engine version catalog")?;

        Ok(Self::with_catalog(source, sink, catalog, config))
    }

    pub fn with_catalog(
        source: Arc<dyn RdsSource>,
        sink: Arc<dyn MetricSink>,
        catalog: DeprecationCatalog,
        config: &Config,
    ) -> Self {
        Self {
            source,
            sink,
            catalog: Arc::new(catalog),
            period: Duration::from_secs(config.interval_secs),
            refresh: config.catalog_refresh,
            policy: config.classification_policy,
        }
    }

    pub fn catalog(&self) -> Arc<DeprecationCatalog> {
        Arc::clone(&self.catalog)
    }

    /// One cycle: optional catalog refresh, then a snapshot.
    pub async fn tick(&mut self) -> Result<SnapshotReport> {
        if self.refresh == CatalogRefresh::EveryCycle {
            match build_catalog(self.source.as_ref()).await {
                Ok(catalog) => self.catalog = Arc::new(catalog),
                Err(e) => warn!("catalog refresh failed, keeping previous catalog: {e:#}"),
            }
        }

        run_snapshot(
            self.source.as_ref(),
            self.sink.as_ref(),
            &self.catalog,
            self.policy,
        )
        .await
    }

    /// Runs forever. The first cycle starts immediately.
    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.tick().await {
                Ok(report) => info!(
                    "snapshot done: clusters={} instances={} published={} skipped={}",
                    report.clusters,
                    report.instances,
                    report.published,
                    report.skipped.len()
                ),
                Err(e) => error!("snapshot failed: {e:#}"),
            }
        }
    }
}
