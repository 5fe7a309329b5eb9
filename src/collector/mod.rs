/// Collector module
///
/// This module groups everything one snapshot cycle needs:
/// - Following paged listings (paginator)
/// - Building the engine version deprecation catalog (catalog)
/// - Listing fleet clusters and instances (fleet)
/// - Resolving a resource against the catalog (classifier)
/// - One collect/classify/publish pass (snapshot)
/// - The fixed-interval loop around it (runner)
///
/// Design notes:
/// - Nothing here knows about the AWS SDK; all I/O goes through
///   `RdsSource`
/// - Nothing here knows about Prometheus; all output goes through
///   `MetricSink`
pub mod catalog;
pub mod classifier;
pub mod fleet;
pub mod paginator;
pub mod runner;
pub mod snapshot;
