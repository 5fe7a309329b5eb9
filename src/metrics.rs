use anyhow::Result;
use prometheus::{Encoder, Gauge, GaugeVec, IntGauge, Opts, Registry, TextEncoder};

use crate::schema::ResourceInfo;

const NAMESPACE: &str = "aws_custom";
const SUBSYSTEM: &str = "rds";
const LABELS: [&str; 3] = ["cluster_identifier", "engine", "engine_version"];

/// Which of the two per-resource gauges to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeKind {
    Available,
    Deprecated,
}

/// Label-indexed gauge table the snapshot cycle publishes into.
///
/// CONTRACT:
/// - `reset` drops every per-resource series
/// - `set_gauge` creates the series for the resource labels if needed
/// - Written by one snapshot cycle at a time, read by the scraper
///
pub trait MetricSink: Send + Sync {
    fn reset(&self);

    fn set_gauge(&self, kind: GaugeKind, resource: &ResourceInfo, value: f64);

    /// Bookkeeping after a cycle that ran to completion. Aborted
    /// cycles never call this, so these values describe the last
    /// completed cycle.
    fn record_cycle(&self, unclassified: usize, finished_at: i64);
}

/// Prometheus-backed exporter metrics.
///
/// Owns a private registry; nothing is registered globally, so any
/// number of instances can coexist (tests rely on this).
#[derive(Clone)]
pub struct VersionMetrics {
    registry: Registry,
    available: GaugeVec,
    deprecated: GaugeVec,
    unclassified: IntGauge,
    last_snapshot: Gauge,
}

impl VersionMetrics {
    pub fn new() -> Result<Self> {
        let available = GaugeVec::new(
            opts(
                "version_available",
                "Number of instances whose version is available",
            ),
            &LABELS,
        )?;
        let deprecated = GaugeVec::new(
            opts(
                "version_deprecated",
                "Number of instances whose version is deprecated",
            ),
            &LABELS,
        )?;
        let unclassified = IntGauge::with_opts(opts(
            "unclassified_resources",
            "Resources skipped by the last completed snapshot because their engine version is not in the catalog",
        ))?;
        let last_snapshot = Gauge::with_opts(opts(
            "last_snapshot_timestamp_seconds",
            "Unix time of the last completed snapshot; unchanged by aborted snapshots",
        ))?;

        let registry = Registry::new();
        registry.register(Box::new(available.clone()))?;
        registry.register(Box::new(deprecated.clone()))?;
        registry.register(Box::new(unclassified.clone()))?;
        registry.register(Box::new(last_snapshot.clone()))?;

        Ok(Self {
            registry,
            available,
            deprecated,
            unclassified,
            last_snapshot,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricSink for VersionMetrics {
    fn reset(&self) {
        self.available.reset();
        self.deprecated.reset();
    }

    fn set_gauge(&self, kind: GaugeKind, resource: &ResourceInfo, value: f64) {
        let vec = match kind {
            GaugeKind::Available => &self.available,
            GaugeKind::Deprecated => &self.deprecated,
        };
        vec.with_label_values(&[
            resource.identifier.as_str(),
            resource.engine.as_str(),
            resource.engine_version.as_str(),
        ])
        .set(value);
    }

    fn record_cycle(&self, unclassified: usize, finished_at: i64) {
        self.unclassified.set(unclassified as i64);
        self.last_snapshot.set(finished_at as f64);
    }
}

fn opts(name: &str, help: &str) -> Opts {
    Opts::new(name, help).namespace(NAMESPACE).subsystem(SUBSYSTEM)
}

/// Value of one per-resource series in rendered exposition text.
#[cfg(test)]
pub fn sample(text: &str, metric: &str, resource: &ResourceInfo) -> Option<f64> {
    let prefix = format!(
        "{metric}{{cluster_identifier=\"{}\",engine=\"{}\",engine_version=\"{}\"}} ",
        resource.identifier, resource.engine, resource.engine_version
    );
    text.lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .and_then(|value| value.trim().parse().ok())
}

/// Value of an unlabelled metric in rendered exposition text.
#[cfg(test)]
pub fn scalar(text: &str, metric: &str) -> Option<f64> {
    let prefix = format!("{metric} ");
    text.lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .and_then(|value| value.trim().parse().ok())
}

/// Number of series of `metric` in rendered exposition text.
#[cfg(test)]
pub fn series_count(text: &str, metric: &str) -> usize {
    let prefix = format!("{metric}{{");
    text.lines().filter(|line| line.starts_with(&prefix)).count()
}
