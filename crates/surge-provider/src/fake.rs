//! Fake VM service for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use surge_core::WorkerInstance;

use crate::error::ProviderError;
use crate::{CreateInstance, InstanceProvider};

/// Recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListInstances,
    CreateInstance { name: String },
    DeleteInstance { name: String },
}

/// In-memory provider that records every call.
///
/// Seed it with `push_instance`, then assert against `calls()` and
/// `instance_names()`. `fail_mutations` makes create/delete return an
/// API error after recording the call.
#[derive(Clone, Default)]
pub struct FakeProvider {
    instances: Arc<Mutex<Vec<WorkerInstance>>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    fail_mutations: Arc<Mutex<bool>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance to the listing.
    pub fn push_instance(&self, name: &str, zone: &str, created_at: Option<u64>) {
        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(WorkerInstance {
                name: name.to_string(),
                zone: zone.to_string(),
                created_at,
            });
    }

    /// Make subsequent create/delete calls fail.
    pub fn fail_mutations(&self) {
        *self.fail_mutations.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded mutation calls only (create/delete).
    pub fn mutations(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ProviderCall::ListInstances))
            .collect()
    }

    /// Current instance names, in listing order.
    pub fn instance_names(&self) -> Vec<String> {
        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|i| i.name.clone())
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn mutation_guard(&self) -> Result<(), ProviderError> {
        if *self.fail_mutations.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(ProviderError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InstanceProvider for FakeProvider {
    async fn list_instances(&self) -> Result<Vec<WorkerInstance>, ProviderError> {
        self.record(ProviderCall::ListInstances);
        Ok(self
            .instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn create_instance(&self, req: &CreateInstance) -> Result<(), ProviderError> {
        self.record(ProviderCall::CreateInstance {
            name: req.name.clone(),
        });
        self.mutation_guard()?;

        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(WorkerInstance {
                name: req.name.clone(),
                zone: req.availability_zone.clone(),
                created_at: None,
            });
        Ok(())
    }

    async fn delete_instance(&self, name: &str) -> Result<(), ProviderError> {
        self.record(ProviderCall::DeleteInstance {
            name: name.to_string(),
        });
        self.mutation_guard()?;

        self.instances
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|i| i.name != name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let provider = FakeProvider::new();
        provider.push_instance("myproj-worker-1", "us-east-1a", None);

        provider.list_instances().await.unwrap();
        provider.delete_instance("myproj-worker-1").await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::ListInstances,
                ProviderCall::DeleteInstance {
                    name: "myproj-worker-1".to_string()
                },
            ]
        );
        assert!(provider.instance_names().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_still_records_the_call() {
        let provider = FakeProvider::new();
        provider.fail_mutations();

        let req = CreateInstance {
            name: "myproj-worker-1".to_string(),
            availability_zone: "us-east-1a".to_string(),
            blueprint_id: "ubuntu_22_04".to_string(),
            bundle_id: "small_2_0".to_string(),
            key_pair_name: "deploy-key".to_string(),
        };
        let err = provider.create_instance(&req).await.unwrap_err();

        assert!(matches!(err, ProviderError::Api { status: 500, .. }));
        assert_eq!(provider.mutations().len(), 1);
        assert!(provider.instance_names().is_empty());
    }
}
