//! Scaling policy evaluator.
//!
//! `decide` is the pure policy: alarm signal + pool size vs bounds →
//! one decision. `Scaler` executes it: list, filter, decide, issue the
//! single mutation. Overlapping invocations race exactly as documented
//! (both may read the same pool size); there is no cross-invocation
//! lock.

use tracing::{info, warn};

use surge_core::{AlarmEvent, AlarmSignal, ScalerConfig, ScalingBounds, WorkerPool};
use surge_provider::{CreateInstance, InstanceProvider, ProviderError};

/// A scaling decision for one alarm event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Create one worker with this name.
    CreateWorker(String),
    /// Delete this worker.
    DeleteWorker(String),
    /// Bounds already satisfied, or the alarm matched no known pattern.
    NoAction,
}

/// What an invocation actually did.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScalingAction {
    ScaledUp { worker: String },
    ScaledDown { worker: String },
    NoOp,
}

/// Errors from handling one alarm event.
#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Decide the scaling action for one alarm against the current pool.
pub fn decide(
    signal: AlarmSignal,
    pool: &WorkerPool,
    bounds: ScalingBounds,
    project: &str,
) -> ScaleDecision {
    match signal {
        AlarmSignal::High if pool.len() < bounds.max_workers as usize => {
            ScaleDecision::CreateWorker(pool.next_worker_name(project))
        }
        AlarmSignal::Low if pool.len() > bounds.min_workers as usize => {
            match pool.newest() {
                Some(worker) => ScaleDecision::DeleteWorker(worker.name.clone()),
                None => ScaleDecision::NoAction,
            }
        }
        _ => ScaleDecision::NoAction,
    }
}

/// Executes scaling decisions against the provider.
///
/// One invocation per alarm event: reads the pool fresh, decides, and
/// issues at most one create or delete. Provider failures propagate
/// unmodified.
pub struct Scaler<P: InstanceProvider> {
    provider: P,
    config: ScalerConfig,
}

impl<P: InstanceProvider> Scaler<P> {
    pub fn new(provider: P, config: ScalerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Handle one alarm event end to end.
    pub async fn handle_alarm(&self, event: &AlarmEvent) -> Result<ScalingAction, ScaleError> {
        info!(alarm = %event.alarm_name, "autoscaler invoked");

        let instances = self.provider.list_instances().await?;
        let pool = WorkerPool::from_listing(instances, &self.config.project_name);
        let signal = event.signal();

        match decide(signal, &pool, self.config.bounds, &self.config.project_name) {
            ScaleDecision::CreateWorker(name) => {
                info!(worker = %name, pool = pool.len(), "scaling up");
                self.provider
                    .create_instance(&CreateInstance {
                        name: name.clone(),
                        availability_zone: self.config.availability_zone.clone(),
                        blueprint_id: self.config.blueprint_id.clone(),
                        bundle_id: self.config.bundle_id.clone(),
                        key_pair_name: self.config.ssh_key_name.clone(),
                    })
                    .await?;
                info!(worker = %name, "scale-up complete");
                Ok(ScalingAction::ScaledUp { worker: name })
            }
            ScaleDecision::DeleteWorker(name) => {
                info!(worker = %name, pool = pool.len(), "scaling down");
                self.provider.delete_instance(&name).await?;
                info!(worker = %name, "scale-down complete");
                Ok(ScalingAction::ScaledDown { worker: name })
            }
            ScaleDecision::NoAction => {
                if signal == AlarmSignal::Unknown {
                    warn!(alarm = %event.alarm_name, "alarm matched no scaling pattern");
                }
                info!(pool = pool.len(), "no scaling action needed");
                Ok(ScalingAction::NoOp)
            }
        }
    }
}
