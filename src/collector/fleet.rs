use anyhow::Result;
use log::debug;

use crate::error::ContractError;
use crate::schema::{FleetRecord, ResourceClass, ResourceInfo};
use crate::source::RdsSource;

use super::paginator::paginate;

/// Lists every DB cluster as a `ResourceInfo`, in source page order.
pub async fn collect_clusters(source: &dyn RdsSource) -> Result<Vec<ResourceInfo>> {
    let records = paginate(move |marker| source.describe_clusters(marker)).await?;
    normalize(ResourceClass::Cluster, records)
}

/// Lists every DB instance as a `ResourceInfo`, in source page order.
pub async fn collect_instances(source: &dyn RdsSource) -> Result<Vec<ResourceInfo>> {
    let records = paginate(move |marker| source.describe_instances(marker)).await?;
    normalize(ResourceClass::Instance, records)
}

fn normalize(class: ResourceClass, records: Vec<FleetRecord>) -> Result<Vec<ResourceInfo>> {
    debug!("collected {} {class} records", records.len());

    records
        .into_iter()
        .map(|record| Ok(to_resource(class, record)?))
        .collect()
}

fn to_resource(class: ResourceClass, record: FleetRecord) -> Result<ResourceInfo, ContractError> {
    let missing = |field| ContractError::MissingField { class, field };

    Ok(ResourceInfo::new(
        record.identifier.ok_or_else(|| missing("identifier"))?,
        record.engine.ok_or_else(|| missing("engine"))?,
        record.engine_version.ok_or_else(|| missing("engine_version"))?,
    ))
}
