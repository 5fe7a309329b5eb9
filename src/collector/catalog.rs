use std::collections::HashMap;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::error::{ClassifyError, ContractError};
use crate::schema::{EngineStatus, EngineVersionRecord, ResourceInfo};
use crate::source::RdsSource;

use super::classifier;
use super::paginator::paginate;

/// Version string -> deprecated flag, for one engine.
pub type VersionDeprecations = HashMap<String, bool>;

/// Reference table of every known (engine, version) pair and whether
/// it is deprecated.
///
/// Built once per refresh and read-only afterwards; cycles share it
/// through an `Arc` without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecationCatalog {
    engines: HashMap<String, VersionDeprecations>,
}

impl DeprecationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a flag for (engine, version). A later insert for the
    /// same key overwrites the earlier one.
    pub fn insert(&mut self, engine: &str, version: &str, deprecated: bool) {
        self.engines
            .entry(engine.to_string())
            .or_default()
            .insert(version.to_string(), deprecated);
    }

    #[cfg(test)]
    pub fn get(&self, engine: &str, version: &str) -> Option<bool> {
        self.engines.get(engine)?.get(version).copied()
    }

    pub fn engines(&self) -> &HashMap<String, VersionDeprecations> {
        &self.engines
    }

    /// Number of (engine, version) pairs.
    pub fn len(&self) -> usize {
        self.engines.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deprecated flag for a resource's engine version; see
    /// `classifier::classify`.
    pub fn classify(&self, resource: &ResourceInfo) -> Result<bool, ClassifyError> {
        classifier::classify(resource, self)
    }
}

#[cfg(test)]
impl<const N: usize> From<[(&str, &str, bool); N]> for DeprecationCatalog {
    fn from(entries: [(&str, &str, bool); N]) -> Self {
        let mut catalog = Self::new();
        for (engine, version, deprecated) in entries {
            catalog.insert(engine, version, deprecated);
        }
        catalog
    }
}

// ------------------------------------------------------------
// Catalog builder
// ------------------------------------------------------------
//
// Two full listings against the same source: `available` first,
// then `deprecated`. The second phase wins on key collision.
// Either phase failing aborts the whole build; there is no
// half-built catalog.
//
const PHASES: [EngineStatus; 2] = [EngineStatus::Available, EngineStatus::Deprecated];

pub async fn build_catalog(source: &dyn RdsSource) -> Result<DeprecationCatalog> {
    let mut catalog = DeprecationCatalog::new();

    for status in PHASES {
        let records = paginate(move |marker| source.describe_engine_versions(status, marker))
            .await
            .with_context(|| format!("error while querying rds {status} engine versions"))?;

        debug!("catalog phase {status}: {} engine versions", records.len());

        merge(&mut catalog, status, records)
            .with_context(|| format!("error while querying rds {status} engine versions"))?;
    }

    info!(
        "built engine version catalog: {} engines, {} versions",
        catalog.engines().len(),
        catalog.len()
    );

    Ok(catalog)
}

fn merge(
    catalog: &mut DeprecationCatalog,
    status: EngineStatus,
    records: Vec<EngineVersionRecord>,
) -> Result<()> {
    for record in records {
        let engine = record
            .engine
            .ok_or(ContractError::MissingEngineVersionField { field: "Engine" })?;
        let version = record
            .engine_version
            .ok_or(ContractError::MissingEngineVersionField {
                field: "EngineVersion",
            })?;
        catalog.insert(&engine, &version, status.is_deprecated());
    }
    Ok(())
}
