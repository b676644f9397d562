//! surge-autoscale — alarm-driven worker pool scaling.
//!
//! Evaluates one alarm event against the current worker pool and issues
//! at most one provider mutation, bounded by the configured min/max
//! worker counts.
//!
//! # Scaling Algorithm
//!
//! ```text
//! workers = [i for i in list_instances() if name contains "{project}-worker"]
//!
//! if alarm contains "high" and len(workers) < max_workers:
//!     create "{project}-worker-{len(workers)+1}"
//!
//! else if alarm contains "low" and len(workers) > min_workers:
//!     delete newest(workers)
//!
//! else:
//!     no-op
//! ```
//!
//! The decision is a pure function (`decide`); `Scaler` wraps it with
//! the provider calls. There is no cooldown, no retry, and no
//! compensation on failure — each invocation is stateless and the next
//! one re-reads provider state fresh.

pub mod scaler;

pub use scaler::{decide, ScaleDecision, ScaleError, Scaler, ScalingAction};
