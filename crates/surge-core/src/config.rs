//! Environment-backed scaler configuration.
//!
//! All settings are read once at startup into an explicit `ScalerConfig`
//! that callers pass by reference — there is no ambient global state.
//! Missing or malformed values fail fast, before any event is processed.

use thiserror::Error;

use crate::types::ScalingBounds;

/// Default VM image when `SURGE_BLUEPRINT_ID` is unset.
pub const DEFAULT_BLUEPRINT_ID: &str = "ubuntu_22_04";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("invalid bounds: min_workers ({min}) > max_workers ({max})")]
    InvalidBounds { min: u32, max: u32 },
}

/// Scaler configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct ScalerConfig {
    /// Target provider region.
    pub region: String,
    /// Prefix for matching and creating worker names.
    pub project_name: String,
    /// VM image for new instances.
    pub blueprint_id: String,
    /// VM size/tier for new instances.
    pub bundle_id: String,
    /// Placement zone for new instances.
    pub availability_zone: String,
    /// Key pair attached to new instances.
    pub ssh_key_name: String,
    /// Pool size bounds.
    pub bounds: ScalingBounds,
    /// Base URL of the VM service.
    pub provider_endpoint: String,
    /// Optional bearer token for the VM service.
    pub provider_token: Option<String>,
}

impl ScalerConfig {
    /// Load the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load the configuration through an injected lookup.
    ///
    /// Tests pass a map-backed closure here to avoid touching the
    /// process-global environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &str| {
            lookup(var)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::Missing(var.to_string()))
        };
        let require_u32 = |var: &str| {
            require(var).and_then(|raw| {
                raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                    var: var.to_string(),
                    reason: e.to_string(),
                })
            })
        };

        let min_workers = require_u32("SURGE_MIN_WORKERS")?;
        let max_workers = require_u32("SURGE_MAX_WORKERS")?;
        if min_workers > max_workers {
            return Err(ConfigError::InvalidBounds {
                min: min_workers,
                max: max_workers,
            });
        }

        Ok(Self {
            region: require("SURGE_REGION")?,
            project_name: require("SURGE_PROJECT_NAME")?,
            blueprint_id: lookup("SURGE_BLUEPRINT_ID")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BLUEPRINT_ID.to_string()),
            bundle_id: require("SURGE_BUNDLE_ID")?,
            availability_zone: require("SURGE_AVAILABILITY_ZONE")?,
            ssh_key_name: require("SURGE_SSH_KEY_NAME")?,
            bounds: ScalingBounds {
                min_workers,
                max_workers,
            },
            provider_endpoint: require("SURGE_PROVIDER_ENDPOINT")?,
            provider_token: lookup("SURGE_PROVIDER_TOKEN").filter(|v| !v.is_empty()),
        })
    }
}
