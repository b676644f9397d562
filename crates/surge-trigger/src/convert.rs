//! Alarm notification envelope.
//!
//! The event source delivers `{ "detail": { "alarmName": "..." } }`.
//! Anything that fails to decode is a `MalformedEvent` and fails the
//! invocation — there is no partial handling.

use serde::Deserialize;
use thiserror::Error;

use surge_core::AlarmEvent;

/// Errors from handling one inbound notification.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("malformed alarm notification: {0}")]
    MalformedEvent(String),

    #[error(transparent)]
    Scale(#[from] surge_autoscale::ScaleError),
}

/// The structured alarm notification envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct AlarmNotification {
    pub detail: AlarmDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlarmDetail {
    #[serde(rename = "alarmName")]
    pub alarm_name: String,
}

impl AlarmNotification {
    pub fn into_event(self) -> AlarmEvent {
        AlarmEvent {
            alarm_name: self.detail.alarm_name,
        }
    }
}

/// Decode one notification body into a domain alarm event.
pub fn parse_notification(body: &[u8]) -> Result<AlarmEvent, TriggerError> {
    let notification: AlarmNotification = serde_json::from_slice(body)
        .map_err(|e| TriggerError::MalformedEvent(e.to_string()))?;
    Ok(notification.into_event())
}
