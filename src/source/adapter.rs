use anyhow::Result;

use crate::schema::{EngineStatus, EngineVersionRecord, FleetRecord, Page};

/// RdsSource is the contract between the collectors and the cloud API.
///
/// Every call returns exactly one page:
/// - `Ok(Some(page))` with `page.marker` set when more pages remain
/// - `Ok(Some(page))` with `page.marker == None` on the last page
/// - `Ok(None)` when the source produced no response at all, which
///   the paginator treats as the end of the listing
///
/// The `marker` argument is the opaque token taken from the previous
/// page, `None` for the first request. Implementations own timeouts
/// and retries; callers never retry.
///
/// THREAD SAFETY:
/// - Must be Send + Sync
/// - One instance is shared between the catalog builder and the runner
///
#[async_trait::async_trait]
pub trait RdsSource: Send + Sync {
    /// Lists engine versions currently in the given status.
    async fn describe_engine_versions(
        &self,
        status: EngineStatus,
        marker: Option<String>,
    ) -> Result<Option<Page<EngineVersionRecord>>>;

    /// Lists DB clusters.
    async fn describe_clusters(
        &self,
        marker: Option<String>,
    ) -> Result<Option<Page<FleetRecord>>>;

    /// Lists DB instances.
    async fn describe_instances(
        &self,
        marker: Option<String>,
    ) -> Result<Option<Page<FleetRecord>>>;
}
