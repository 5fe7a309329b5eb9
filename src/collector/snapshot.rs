use anyhow::{Context, Result};
use chrono::Utc;
use log::warn;
use serde::Deserialize;

use crate::error::ClassifyError;
use crate::metrics::{GaugeKind, MetricSink};
use crate::schema::ResourceInfo;
use crate::source::RdsSource;

use super::catalog::DeprecationCatalog;
use super::fleet::{collect_clusters, collect_instances};

/// What to do when a resource cannot be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPolicy {
    /// Log the resource, leave it unpublished, keep going.
    #[default]
    SkipAndContinue,

    /// Abort the cycle on the first failure. Resources handled before
    /// it stay published; the rest are not.
    FailFast,
}

/// Outcome of one completed snapshot cycle.
#[derive(Debug, Default)]
pub struct SnapshotReport {
    pub clusters: usize,
    pub instances: usize,
    pub published: usize,
    pub skipped: Vec<(ResourceInfo, ClassifyError)>,
}

// ------------------------------------------------------------
// Snapshot cycle
// ------------------------------------------------------------
//
// Idle -> reset -> clusters -> instances -> classify/publish
//      -> done | aborted
//
// Collection failures always abort. What a classification
// failure does is decided by `policy`.
//
// Callers must not run two cycles against the same sink at once.
//
pub async fn run_snapshot(
    source: &dyn RdsSource,
    sink: &dyn MetricSink,
    catalog: &DeprecationCatalog,
    policy: ClassificationPolicy,
) -> Result<SnapshotReport> {
    sink.reset();

    let clusters = collect_clusters(source)
        .await
        .context("failed to read RDS cluster infos")?;

    let instances = collect_instances(source)
        .await
        .context("failed to read RDS instance infos")?;

    let mut report = SnapshotReport {
        clusters: clusters.len(),
        instances: instances.len(),
        ..SnapshotReport::default()
    };

    for resource in clusters.into_iter().chain(instances) {
        match catalog.classify(&resource) {
            Ok(deprecated) => {
                publish(sink, &resource, deprecated);
                report.published += 1;
            }
            Err(err) => match policy {
                ClassificationPolicy::FailFast => {
                    return Err(err).with_context(|| {
                        format!("failed to export metric for {}", resource.identifier)
                    });
                }
                ClassificationPolicy::SkipAndContinue => {
                    warn!(
                        "skip {} ({} {}): {err}",
                        resource.identifier, resource.engine, resource.engine_version
                    );
                    report.skipped.push((resource, err));
                }
            },
        }
    }

    sink.record_cycle(report.skipped.len(), Utc::now().timestamp());

    Ok(report)
}

/// Exactly one of the two gauges is 1 for a classified resource.
fn publish(sink: &dyn MetricSink, resource: &ResourceInfo, deprecated: bool) {
    let (deprecated_value, available_value) = if deprecated { (1.0, 0.0) } else { (0.0, 1.0) };
    sink.set_gauge(GaugeKind::Deprecated, resource, deprecated_value);
    sink.set_gauge(GaugeKind::Available, resource, available_value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{VersionMetrics, sample, scalar, series_count};
    use crate::schema::{FleetRecord, Page};
    use crate::source::mock::{Listing, MockRds};

    const AVAILABLE: &str = "aws_custom_rds_version_available";
    const DEPRECATED: &str = "aws_custom_rds_version_deprecated";
    const UNCLASSIFIED: &str = "aws_custom_rds_unclassified_resources";
    const LAST_SNAPSHOT: &str = "aws_custom_rds_last_snapshot_timestamp_seconds";

    fn catalog() -> DeprecationCatalog {
        DeprecationCatalog::from([
            ("MySQL", "5.7.34", false),
            ("MySQL", "8.0.25", false),
            ("PostgreSQL", "9.5.24", true),
            ("PostgreSQL", "13.2", false),
        ])
    }

    fn fleet() -> MockRds {
        MockRds::new()
            .with_clusters(vec![Page::last(vec![
                FleetRecord::new("cluster-1", "MySQL", "5.7.34"),
                FleetRecord::new("cluster-1", "PostgreSQL", "9.5.24"),
            ])])
            .with_instances(vec![
                Page::new(
                    vec![FleetRecord::new("instance-1", "MySQL", "5.7.34")],
                    Some("dummy marker"),
                ),
                Page::last(vec![FleetRecord::new("instance-1", "PostgreSQL", "9.5.24")]),
            ])
    }

    #[tokio::test]
    async fn publishes_one_gauge_pair_per_resource() {
        let source = fleet();
        let metrics = VersionMetrics::new().unwrap();

        let report = run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap();

        assert_eq!((report.clusters, report.instances, report.published), (2, 2, 4));
        assert!(report.skipped.is_empty());

        let text = metrics.render().unwrap();
        assert_eq!(series_count(&text, AVAILABLE), 4);
        assert_eq!(series_count(&text, DEPRECATED), 4);

        for id in ["cluster-1", "instance-1"] {
            let mysql = ResourceInfo::new(id, "MySQL", "5.7.34");
            let postgres = ResourceInfo::new(id, "PostgreSQL", "9.5.24");
            assert_eq!(sample(&text, DEPRECATED, &mysql), Some(0.0));
            assert_eq!(sample(&text, AVAILABLE, &mysql), Some(1.0));
            assert_eq!(sample(&text, DEPRECATED, &postgres), Some(1.0));
            assert_eq!(sample(&text, AVAILABLE, &postgres), Some(0.0));
        }
    }

    #[tokio::test]
    async fn duplicate_labels_collapse_into_one_series() {
        let source = MockRds::new().with_instances(vec![Page::last(vec![
            FleetRecord::new("cluster-1", "MySQL", "8.0.25"),
            FleetRecord::new("cluster-1", "MySQL", "8.0.25"),
        ])]);
        let metrics = VersionMetrics::new().unwrap();

        let report = run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap();

        assert_eq!(report.published, 2);
        let text = metrics.render().unwrap();
        assert_eq!(series_count(&text, AVAILABLE), 1);
    }

    #[tokio::test]
    async fn cycle_replaces_previous_state() {
        let metrics = VersionMetrics::new().unwrap();
        let gone = ResourceInfo::new("decommissioned", "MySQL", "8.0.25");
        metrics.set_gauge(GaugeKind::Available, &gone, 1.0);

        run_snapshot(&fleet(), &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap();

        let text = metrics.render().unwrap();
        assert_eq!(sample(&text, AVAILABLE, &gone), None);
        assert_eq!(series_count(&text, AVAILABLE), 4);
    }

    #[tokio::test]
    async fn cluster_failure_aborts_before_instances() {
        let source = fleet().failing_at(Listing::Clusters, 0, "failed to get clusters");
        let metrics = VersionMetrics::new().unwrap();
        metrics.set_gauge(GaugeKind::Available, &ResourceInfo::new("old", "MySQL", "8.0.25"), 1.0);

        let err = run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap_err();

        assert_eq!(
            format!("{err:#}"),
            "failed to read RDS cluster infos: failed to get clusters"
        );
        assert!(source.calls().iter().all(|(l, _)| *l == Listing::Clusters));
        let text = metrics.render().unwrap();
        assert_eq!(series_count(&text, AVAILABLE), 0);
    }

    #[tokio::test]
    async fn instance_failure_leaves_state_empty() {
        let source = fleet().failing_at(Listing::Instances, 1, "failed to get instances");
        let metrics = VersionMetrics::new().unwrap();

        let err = run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::SkipAndContinue)
            .await
            .unwrap_err();

        assert_eq!(
            format!("{err:#}"),
            "failed to read RDS instance infos: failed to get instances"
        );
        let text = metrics.render().unwrap();
        assert_eq!(series_count(&text, AVAILABLE), 0);
        assert_eq!(series_count(&text, DEPRECATED), 0);
    }

    #[tokio::test]
    async fn fail_fast_keeps_resources_processed_before_failure() {
        let source = MockRds::new().with_clusters(vec![Page::last(vec![
            FleetRecord::new("a", "MySQL", "8.0.25"),
            FleetRecord::new("b", "MySQL", "9.9.9"),
            FleetRecord::new("c", "PostgreSQL", "13.2"),
        ])]);
        let metrics = VersionMetrics::new().unwrap();

        let err = run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ClassifyError>(),
            Some(&ClassifyError::UnknownVersion {
                engine: "MySQL".to_string(),
                version: "9.9.9".to_string()
            })
        );
        assert_eq!(
            format!("{err:#}"),
            "failed to export metric for b: unknown version: 9.9.9 of engine MySQL"
        );

        let text = metrics.render().unwrap();
        assert_eq!(series_count(&text, AVAILABLE), 1);
        assert_eq!(
            sample(&text, AVAILABLE, &ResourceInfo::new("a", "MySQL", "8.0.25")),
            Some(1.0)
        );
        assert_eq!(
            sample(&text, AVAILABLE, &ResourceInfo::new("c", "PostgreSQL", "13.2")),
            None
        );
    }

    #[tokio::test]
    async fn skip_and_continue_publishes_the_rest() {
        let source = MockRds::new().with_clusters(vec![Page::last(vec![
            FleetRecord::new("a", "MySQL", "8.0.25"),
            FleetRecord::new("b", "oracle-ee", "19.0"),
            FleetRecord::new("c", "PostgreSQL", "13.2"),
        ])]);
        let metrics = VersionMetrics::new().unwrap();

        let report = run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::SkipAndContinue)
            .await
            .unwrap();

        assert_eq!(report.published, 2);
        assert_eq!(
            report.skipped,
            vec![(
                ResourceInfo::new("b", "oracle-ee", "19.0"),
                ClassifyError::UnknownEngine {
                    engine: "oracle-ee".to_string()
                }
            )]
        );

        let text = metrics.render().unwrap();
        assert_eq!(series_count(&text, AVAILABLE), 2);
        assert_eq!(scalar(&text, UNCLASSIFIED), Some(1.0));
    }

    #[tokio::test]
    async fn completed_cycle_stamps_last_snapshot_time() {
        let metrics = VersionMetrics::new().unwrap();
        let before = Utc::now().timestamp() as f64;

        run_snapshot(&fleet(), &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap();

        let text = metrics.render().unwrap();
        let stamped = scalar(&text, LAST_SNAPSHOT).unwrap();
        assert!(stamped >= before);
        assert!(stamped <= Utc::now().timestamp() as f64);
        assert_eq!(scalar(&text, UNCLASSIFIED), Some(0.0));
    }

    #[tokio::test]
    async fn aborted_cycle_leaves_cycle_bookkeeping_alone() {
        let metrics = VersionMetrics::new().unwrap();
        metrics.record_cycle(3, 1_700_000_000);

        let source = fleet().failing_at(Listing::Instances, 0, "failed to get instances");
        run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::SkipAndContinue)
            .await
            .unwrap_err();

        let text = metrics.render().unwrap();
        assert_eq!(scalar(&text, LAST_SNAPSHOT), Some(1_700_000_000.0));
        assert_eq!(scalar(&text, UNCLASSIFIED), Some(3.0));
    }

    #[tokio::test]
    async fn fail_fast_abort_does_not_touch_unclassified_count() {
        let source = MockRds::new().with_clusters(vec![Page::last(vec![
            FleetRecord::new("a", "MySQL", "8.0.25"),
            FleetRecord::new("b", "oracle-ee", "19.0"),
        ])]);
        let metrics = VersionMetrics::new().unwrap();
        metrics.record_cycle(5, 1_700_000_000);

        run_snapshot(&source, &metrics, &catalog(), ClassificationPolicy::FailFast)
            .await
            .unwrap_err();

        let text = metrics.render().unwrap();
        assert_eq!(scalar(&text, UNCLASSIFIED), Some(5.0));
        assert_eq!(scalar(&text, LAST_SNAPSHOT), Some(1_700_000_000.0));
    }
}
