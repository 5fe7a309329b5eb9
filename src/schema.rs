use std::fmt;

// ------------------------------------------------------------
// Resource info
// ------------------------------------------------------------
//
// One fleet member (cluster or instance) as seen at collection
// time. Built fresh every snapshot cycle and discarded after
// classification.
//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    /// DB cluster identifier or DB instance identifier
    pub identifier: String,

    /// Engine family (e.g. "mysql", "aurora-postgresql")
    pub engine: String,

    /// Exact engine release string (e.g. "8.0.35")
    pub engine_version: String,
}

impl ResourceInfo {
    pub fn new(
        identifier: impl Into<String>,
        engine: impl Into<String>,
        engine_version: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            engine: engine.into(),
            engine_version: engine_version.into(),
        }
    }
}

// ------------------------------------------------------------
// Engine version status
// ------------------------------------------------------------
//
// The two statuses the catalog is built from. The value sent
// to the data source is the lowercase name.
//
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    Available,
    Deprecated,
}

impl EngineStatus {
    /// Status filter value understood by the RDS API.
    pub fn as_str(self) -> &'static str {
        match self {
            EngineStatus::Available => "available",
            EngineStatus::Deprecated => "deprecated",
        }
    }

    /// Catalog flag recorded for versions reported under this status.
    pub fn is_deprecated(self) -> bool {
        matches!(self, EngineStatus::Deprecated)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fleet resource class, used for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Cluster,
    Instance,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceClass::Cluster => f.write_str("cluster"),
            ResourceClass::Instance => f.write_str("instance"),
        }
    }
}

// ------------------------------------------------------------
// Raw source records
// ------------------------------------------------------------
//
// Shapes returned by the paged data source. Every field is
// optional because the cloud API declares them that way;
// presence is enforced by the collectors, never defaulted.
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineVersionRecord {
    pub engine: Option<String>,
    pub engine_version: Option<String>,
}

impl EngineVersionRecord {
    #[cfg(test)]
    pub fn new(engine: &str, engine_version: &str) -> Self {
        Self {
            engine: Some(engine.to_string()),
            engine_version: Some(engine_version.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetRecord {
    pub identifier: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
}

impl FleetRecord {
    #[cfg(test)]
    pub fn new(identifier: &str, engine: &str, engine_version: &str) -> Self {
        Self {
            identifier: Some(identifier.to_string()),
            engine: Some(engine.to_string()),
            engine_version: Some(engine_version.to_string()),
        }
    }
}

/// One page of a cursor-paged response.
///
/// `marker` is the opaque continuation token; `None` means this
/// was the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub marker: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, marker: Option<&str>) -> Self {
        Self {
            items,
            marker: marker.map(str::to_string),
        }
    }

    #[cfg(test)]
    pub fn last(items: Vec<T>) -> Self {
        Self { items, marker: None }
    }
}
