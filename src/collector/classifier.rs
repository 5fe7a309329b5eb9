use crate::error::ClassifyError;
use crate::schema::ResourceInfo;

use super::catalog::DeprecationCatalog;

/// Answers "is this resource running a deprecated engine version?".
///
/// Lookup is an exact string match on engine, then on version.
/// The catalog comes from the same authority as the fleet data, so a
/// miss means the catalog is stale or the version sits in a status
/// the catalog does not track. It is reported, never guessed.
///
/// Pure function of its inputs.
pub fn classify(
    resource: &ResourceInfo,
    catalog: &DeprecationCatalog,
) -> Result<bool, ClassifyError> {
    let versions = catalog
        .engines()
        .get(&resource.engine)
        .ok_or_else(|| ClassifyError::UnknownEngine {
            engine: resource.engine.clone(),
        })?;

    versions
        .get(&resource.engine_version)
        .copied()
        .ok_or_else(|| ClassifyError::UnknownVersion {
            engine: resource.engine.clone(),
            version: resource.engine_version.clone(),
        })
}
