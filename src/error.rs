use thiserror::Error;

use crate::schema::ResourceClass;

/// Failure to resolve a resource against the deprecation catalog.
///
/// Exact string matching only. Either variant means the catalog is
/// stale or the resource runs a version in a status the catalog was
/// not built from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("unknown engine: {engine}")]
    UnknownEngine { engine: String },

    #[error("unknown version: {version} of engine {engine}")]
    UnknownVersion { engine: String, version: String },
}

/// The data source returned a record without a field the exporter
/// cannot work without.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("{class} record is missing required field `{field}`")]
    MissingField {
        class: ResourceClass,
        field: &'static str,
    },

    #[error("engine version record is missing required field `{field}`")]
    MissingEngineVersionField { field: &'static str },
}
