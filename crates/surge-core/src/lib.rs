//! surge-core — shared types and configuration for the Surge autoscaler.
//!
//! Holds the domain model (worker instances, the derived worker pool,
//! alarm classification, scaling bounds) and the environment-backed
//! `ScalerConfig`. No I/O lives here; the provider client and the
//! webhook are separate crates.

pub mod config;
pub mod types;

pub use config::{ConfigError, ScalerConfig};
pub use types::*;
