//! In-memory paged source for tests.
//!
//! Pages are chained by marker: the first request (no marker) gets
//! page 0, a request carrying marker `m` gets the page following the
//! one that handed out `m`. An unknown marker or an empty listing
//! yields `Ok(None)`.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::schema::{EngineStatus, EngineVersionRecord, FleetRecord, Page};

use super::adapter::RdsSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    EngineVersions(EngineStatus),
    Clusters,
    Instances,
}

#[derive(Default)]
pub struct MockRds {
    engine_versions: HashMap<EngineStatus, Vec<Page<EngineVersionRecord>>>,
    clusters: Vec<Page<FleetRecord>>,
    instances: Vec<Page<FleetRecord>>,
    failures: HashMap<Listing, (usize, String)>,
    calls: Mutex<Vec<(Listing, Option<String>)>>,
}

impl MockRds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine_versions(
        mut self,
        status: EngineStatus,
        pages: Vec<Page<EngineVersionRecord>>,
    ) -> Self {
        self.engine_versions.insert(status, pages);
        self
    }

    pub fn with_clusters(mut self, pages: Vec<Page<FleetRecord>>) -> Self {
        self.clusters = pages;
        self
    }

    pub fn with_instances(mut self, pages: Vec<Page<FleetRecord>>) -> Self {
        self.instances = pages;
        self
    }

    /// Makes the request for page `page` (0-based) of `listing` fail.
    pub fn failing_at(mut self, listing: Listing, page: usize, message: &str) -> Self {
        self.failures.insert(listing, (page, message.to_string()));
        self
    }

    /// Every request issued so far, in order.
    pub fn calls(&self) -> Vec<(Listing, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn serve<T: Clone>(
        &self,
        listing: Listing,
        pages: &[Page<T>],
        marker: Option<String>,
    ) -> Result<Option<Page<T>>> {
        self.calls.lock().unwrap().push((listing, marker.clone()));

        let index = match marker {
            None => Some(0),
            Some(m) => pages
                .iter()
                .position(|p| p.marker.as_deref() == Some(m.as_str()))
                .map(|i| i + 1),
        };

        if let (Some(i), Some((fail_at, message))) = (index, self.failures.get(&listing)) {
            if i == *fail_at {
                return Err(anyhow!(message.clone()));
            }
        }

        Ok(index.and_then(|i| pages.get(i).cloned()))
    }
}

#[async_trait::async_trait]
impl RdsSource for MockRds {
    async fn describe_engine_versions(
        &self,
        status: EngineStatus,
        marker: Option<String>,
    ) -> Result<Option<Page<EngineVersionRecord>>> {
        let pages = self
            .engine_versions
            .get(&status)
            .map(Vec::as_slice)
            .unwrap_or_default();
        self.serve(Listing::EngineVersions(status), pages, marker)
    }

    async fn describe_clusters(
        &self,
        marker: Option<String>,
    ) -> Result<Option<Page<FleetRecord>>> {
        self.serve(Listing::Clusters, &self.clusters, marker)
    }

    async fn describe_instances(
        &self,
        marker: Option<String>,
    ) -> Result<Option<Page<FleetRecord>>> {
        self.serve(Listing::Instances, &self.instances, marker)
    }
}
