//! Domain types for the Surge autoscaler.
//!
//! The worker pool is a derived view: it is recomputed from the provider
//! listing on every invocation and never persisted. All persistent state
//! (the actual VM instances) lives with the provider and is referenced
//! by name only.

use serde::{Deserialize, Serialize};

/// One provisioned VM worker, as reported by the provider listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInstance {
    /// Instance name, unique within the account.
    pub name: String,
    /// Placement zone.
    pub zone: String,
    /// Creation time in epoch seconds, when the provider reports one.
    pub created_at: Option<u64>,
}

/// Min/max worker counts the policy must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingBounds {
    pub min_workers: u32,
    pub max_workers: u32,
}

/// An alarm notification that triggers a scaling decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEvent {
    pub alarm_name: String,
}

/// Classification of an alarm name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSignal {
    /// Name contains "high" — scale-up signal.
    High,
    /// Name contains "low" — scale-down signal.
    Low,
    /// Neither substring matched.
    Unknown,
}

impl AlarmEvent {
    /// Classify the alarm by case-insensitive substring match.
    ///
    /// "high" wins when a name contains both substrings, matching the
    /// upstream alarm naming convention (HighCpuAlarm / LowCpuAlarm).
    pub fn signal(&self) -> AlarmSignal {
        let lower = self.alarm_name.to_lowercase();
        if lower.contains("high") {
            AlarmSignal::High
        } else if lower.contains("low") {
            AlarmSignal::Low
        } else {
            AlarmSignal::Unknown
        }
    }
}

/// The current worker pool: instances whose name contains the project's
/// worker marker, in provider listing order.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    workers: Vec<WorkerInstance>,
}

impl WorkerPool {
    /// Filter a provider listing down to this project's workers.
    ///
    /// An instance belongs to the pool when its name contains
    /// `"{project}-worker"`. Listing order is preserved.
    pub fn from_listing(instances: Vec<WorkerInstance>, project: &str) -> Self {
        let marker = format!("{project}-worker");
        let workers = instances
            .into_iter()
            .filter(|i| i.name.contains(&marker))
            .collect();
        Self { workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> &[WorkerInstance] {
        &self.workers
    }

    /// Candidate name for the next worker: `"{project}-worker-{len+1}"`.
    ///
    /// Naming is positional, not content-addressed: after deleting a
    /// worker from the middle of the sequence the candidate can collide
    /// with a name that still exists. The collision is not detected here;
    /// it surfaces as a provider create failure.
    pub fn next_worker_name(&self, project: &str) -> String {
        format!("{project}-worker-{}", self.workers.len() + 1)
    }

    /// The scale-down candidate: the most recently added worker.
    ///
    /// Prefers the greatest `created_at` when the provider reported a
    /// timestamp for every pool member. Otherwise falls back to the tail
    /// of the listing order — a best-effort heuristic, since listing
    /// order is not guaranteed to equal creation order.
    pub fn newest(&self) -> Option<&WorkerInstance> {
        if self.workers.iter().all(|w| w.created_at.is_some()) {
            self.workers.iter().max_by_key(|w| w.created_at)
        } else {
            self.workers.last()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(name: &str) -> WorkerInstance {
        WorkerInstance {
            name: name.to_string(),
            zone: "us-east-1a".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn classify_high_any_case() {
        let event = AlarmEvent {
            alarm_name: "HighCpuAlarm".to_string(),
        };
        assert_eq!(event.signal(), AlarmSignal::High);

        let event = AlarmEvent {
            alarm_name: "cpu-HIGH-p99".to_string(),
        };
        assert_eq!(event.signal(), AlarmSignal::High);
    }

    #[test]
    fn classify_low_any_case() {
        let event = AlarmEvent {
            alarm_name: "LowCpuAlarm".to_string(),
        };
        assert_eq!(event.signal(), AlarmSignal::Low);
    }

    #[test]
    fn classify_unknown() {
        let event = AlarmEvent {
            alarm_name: "info-alarm".to_string(),
        };
        assert_eq!(event.signal(), AlarmSignal::Unknown);
    }

    #[test]
    fn high_wins_over_low() {
        let event = AlarmEvent {
            alarm_name: "high-then-low".to_string(),
        };
        assert_eq!(event.signal(), AlarmSignal::High);
    }

    #[test]
    fn pool_filters_by_project_marker() {
        let listing = vec![
            worker("myproj-worker-1"),
            worker("other-project-worker-1"),
            worker("myproj-worker-3"),
            worker("myproj-db"),
        ];
        let pool = WorkerPool::from_listing(listing, "myproj");

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.workers()[0].name, "myproj-worker-1");
        assert_eq!(pool.workers()[1].name, "myproj-worker-3");
    }

    #[test]
    fn next_worker_name_is_positional() {
        let pool = WorkerPool::from_listing(vec![], "myproj");
        assert_eq!(pool.next_worker_name("myproj"), "myproj-worker-1");

        let pool = WorkerPool::from_listing(
            vec![worker("myproj-worker-1"), worker("myproj-worker-2")],
            "myproj",
        );
        assert_eq!(pool.next_worker_name("myproj"), "myproj-worker-3");
    }

    #[test]
    fn newest_falls_back_to_listing_tail() {
        let pool = WorkerPool::from_listing(
            vec![worker("myproj-worker-1"), worker("myproj-worker-2")],
            "myproj",
        );
        assert_eq!(pool.newest().map(|w| w.name.as_str()), Some("myproj-worker-2"));
    }

    #[test]
    fn newest_prefers_timestamps_when_all_present() {
        let mut w1 = worker("myproj-worker-1");
        let mut w2 = worker("myproj-worker-2");
        w1.created_at = Some(2000);
        w2.created_at = Some(1000);
        // Listing order says w2 is newest; timestamps say w1.
        let pool = WorkerPool::from_listing(vec![w1, w2], "myproj");
        assert_eq!(pool.newest().map(|w| w.name.as_str()), Some("myproj-worker-1"));
    }

    #[test]
    fn newest_ignores_partial_timestamps() {
        let mut w1 = worker("myproj-worker-1");
        w1.created_at = Some(2000);
        let w2 = worker("myproj-worker-2");
        let pool = WorkerPool::from_listing(vec![w1, w2], "myproj");
        assert_eq!(pool.newest().map(|w| w.name.as_str()), Some("myproj-worker-2"));
    }

    #[test]
    fn newest_of_empty_pool_is_none() {
        let pool = WorkerPool::default();
        assert!(pool.newest().is_none());
    }
}
