//! surge-provider — client for the cloud provider's simplified VM service.
//!
//! Exposes the `InstanceProvider` trait the scaler calls through, an
//! HTTP implementation against the VM service REST surface, and a
//! recording fake for tests (behind the `test-support` feature).
//!
//! The provider is treated as an opaque remote service: three calls
//! (list, create, delete), no retries, no local recovery. Failures
//! propagate to the invocation as-is.

pub mod error;
pub mod http;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProvider, ProviderCall};

use async_trait::async_trait;
use serde::Serialize;

use surge_core::WorkerInstance;

pub use error::ProviderError;
pub use http::HttpProvider;

/// Parameters for provisioning one VM instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstance {
    pub name: String,
    pub availability_zone: String,
    pub blueprint_id: String,
    pub bundle_id: String,
    pub key_pair_name: String,
}

/// The VM service seam: list, create, delete.
#[async_trait]
pub trait InstanceProvider: Clone + Send + Sync + 'static {
    /// List all instances in the account, in the provider's order.
    async fn list_instances(&self) -> Result<Vec<WorkerInstance>, ProviderError>;

    /// Provision one instance.
    async fn create_instance(&self, req: &CreateInstance) -> Result<(), ProviderError>;

    /// Delete one instance by name.
    async fn delete_instance(&self, name: &str) -> Result<(), ProviderError>;
}
