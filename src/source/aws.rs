use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_rds::Client;
use aws_sdk_rds::types::Filter;

use crate::schema::{EngineStatus, EngineVersionRecord, FleetRecord, Page};

use super::adapter::RdsSource;

/// Amazon RDS source backed by the AWS SDK.
///
/// Credentials and region come from the default provider chain
/// (environment, shared config/profile, IMDS, ...). Timeouts and
/// retries are whatever the SDK is configured with.
#[derive(Clone)]
pub struct AwsRdsSource {
    client: Client,
}

impl AwsRdsSource {
    /// Builds a client from the ambient AWS configuration.
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl RdsSource for AwsRdsSource {
    async fn describe_engine_versions(
        &self,
        status: EngineStatus,
        marker: Option<String>,
    ) -> Result<Option<Page<EngineVersionRecord>>> {
        let filter = Filter::builder()
            .name("status")
            .values(status.as_str())
            .build();

        let output = self
            .client
            .describe_db_engine_versions()
            .filters(filter)
            .set_marker(marker)
            .send()
            .await
            .context("failed to describe db engine versions")?;

        let items = output
            .db_engine_versions()
            .iter()
            .map(|v| EngineVersionRecord {
                engine: v.engine().map(str::to_string),
                engine_version: v.engine_version().map(str::to_string),
            })
            .collect();

        Ok(Some(Page::new(items, output.marker())))
    }

    async fn describe_clusters(
        &self,
        marker: Option<String>,
    ) -> Result<Option<Page<FleetRecord>>> {
        let output = self
            .client
            .describe_db_clusters()
            .set_marker(marker)
            .send()
            .await
            .context("failed to describe DB clusters")?;

        let items = output
            .db_clusters()
            .iter()
            .map(|c| FleetRecord {
                identifier: c.db_cluster_identifier().map(str::to_string),
                engine: c.engine().map(str::to_string),
                engine_version: c.engine_version().map(str::to_string),
            })
            .collect();

        Ok(Some(Page::new(items, output.marker())))
    }

    async fn describe_instances(
        &self,
        marker: Option<String>,
    ) -> Result<Option<Page<FleetRecord>>> {
        let output = self
            .client
            .describe_db_instances()
            .set_marker(marker)
            .send()
            .await
            .context("failed to describe DB instances")?;

        let items = output
            .db_instances()
            .iter()
            .map(|i| FleetRecord {
                identifier: i.db_instance_identifier().map(str::to_string),
                engine: i.engine().map(str::to_string),
                engine_version: i.engine_version().map(str::to_string),
            })
            .collect();

        Ok(Some(Page::new(items, output.marker())))
    }
}
