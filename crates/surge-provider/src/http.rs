//! HTTP implementation of `InstanceProvider`.
//!
//! Talks to the VM service REST surface:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/v1/{region}/instances` | list instances |
//! | POST | `/v1/{region}/instances` | create instance |
//! | DELETE | `/v1/{region}/instances/{name}` | delete instance |
//!
//! Non-2xx responses become `ProviderError::Api` with the body as the
//! message. There is no retry or backoff.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use surge_core::WorkerInstance;

use crate::error::ProviderError;
use crate::{CreateInstance, InstanceProvider};

/// Listing response envelope.
#[derive(Debug, Deserialize)]
struct ListInstancesResponse {
    instances: Vec<InstanceRecord>,
}

/// One instance as the VM service reports it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceRecord {
    name: String,
    availability_zone: String,
    /// Epoch seconds; older API versions omit it.
    created_at: Option<u64>,
}

impl From<InstanceRecord> for WorkerInstance {
    fn from(record: InstanceRecord) -> Self {
        WorkerInstance {
            name: record.name,
            zone: record.availability_zone,
            created_at: record.created_at,
        }
    }
}

/// reqwest-backed VM service client.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    region: String,
    token: Option<String>,
}

impl HttpProvider {
    /// Create a client for the given service endpoint and region.
    pub fn new(
        base_url: impl Into<String>,
        region: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            region: region.into(),
            token,
        }
    }

    fn instances_url(&self) -> String {
        format!("{}/v1/{}/instances", self.base_url, self.region)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl InstanceProvider for HttpProvider {
    async fn list_instances(&self) -> Result<Vec<WorkerInstance>, ProviderError> {
        let resp = self
            .authorize(self.client.get(self.instances_url()))
            .send()
            .await?;
        let body: ListInstancesResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        debug!(count = body.instances.len(), "listed instances");
        Ok(body.instances.into_iter().map(Into::into).collect())
    }

    async fn create_instance(&self, req: &CreateInstance) -> Result<(), ProviderError> {
        let resp = self
            .authorize(self.client.post(self.instances_url()))
            .json(req)
            .send()
            .await?;
        Self::check(resp).await?;

        debug!(name = %req.name, zone = %req.availability_zone, "created instance");
        Ok(())
    }

    async fn delete_instance(&self, name: &str) -> Result<(), ProviderError> {
        let url = format!("{}/{}", self.instances_url(), name);
        let resp = self.authorize(self.client.delete(url)).send().await?;
        Self::check(resp).await?;

        debug!(%name, "deleted instance");
        Ok(())
    }
}
