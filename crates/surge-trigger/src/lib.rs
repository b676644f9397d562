//! surge-trigger — alarm notification intake for Surge.
//!
//! Parses the inbound alarm envelope and bridges it to the scaler.
//! Two entry points:
//!
//! - [`parse_notification`] — decode one notification body into a
//!   domain [`surge_core::AlarmEvent`] (used by the one-shot daemon
//!   mode).
//! - [`AlarmWebhook`] — an HTTP server accepting `POST /v1/alarms`,
//!   one scaler invocation per request.
//!
//! ```text
//! alarm source
//!   │  POST /v1/alarms  { "detail": { "alarmName": "HighCpuAlarm" } }
//!   ▼
//! hyper server
//!   ├── parse envelope            → 400 on malformed input
//!   ├── Scaler::handle_alarm()    → 502 on provider failure
//!   ▼
//! 202 { "action": "scaled_up", "worker": "myproj-worker-2" }
//! ```

pub mod convert;
pub mod handler;

pub use convert::{parse_notification, AlarmNotification, TriggerError};
pub use handler::AlarmWebhook;
