//! Instance → Dispatcher messages
//!
//! The dispatcher accepts one generic envelope, `{Command, Username, Data}`,
//! whose `Data` shape depends on `Command`. On our side the envelope is decoded
//! into [`DispatchCommand`], dispatching on the command name; names we don't
//! know are carried through untouched as opaque JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{SharedError, SharedResult};

/// Command name for progress/completion updates
pub const UPDATE_ITEM: &str = "UpdateItem";

/// Username simulators identify themselves with
pub const SIMULATOR_USERNAME: &str = "simulator";

/// Timestamp layout the dispatcher parses: "02 Jan 06 15:04 -0700"
const RFC822Z: &str = "%d %b %y %H:%M %z";

pub fn format_rfc822z(ts: DateTime<Utc>) -> String {
    ts.format(RFC822Z).to_string()
}

/// Raw wire envelope
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DispatchEnvelope {
    pub command: String,
    pub username: String,
    pub data: Value,
}

/// Either the estimate or the completion time, never both
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum UpdateTimestamp {
    #[serde(rename = "DtEstimate")]
    Estimated(String),
    #[serde(rename = "DtCompleted")]
    Completed(String),
}

impl UpdateTimestamp {
    pub fn estimated(at: DateTime<Utc>) -> Self {
        UpdateTimestamp::Estimated(format_rfc822z(at))
    }

    pub fn completed(at: DateTime<Utc>) -> Self {
        UpdateTimestamp::Completed(format_rfc822z(at))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, UpdateTimestamp::Completed(_))
    }
}

/// `UpdateItem` payload: where a simulation runs and when it will be done
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DispatcherUpdate {
    #[serde(rename = "SID")]
    pub sid: i64,
    #[serde(rename = "MachineID")]
    pub machine_id: String,
    #[serde(rename = "CPUs")]
    pub cpus: usize,
    #[serde(rename = "Memory")]
    pub memory: String,
    #[serde(rename = "CPUArchitecture")]
    pub cpu_architecture: String,
    #[serde(rename = "Availability")]
    pub availability: String,
    #[serde(flatten)]
    pub timestamp: UpdateTimestamp,
}

/// Decoded payload, keyed by command name
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchPayload {
    UpdateItem(DispatcherUpdate),
    /// Any command this side doesn't model
    Opaque { command: String, data: Value },
}

/// Typed view of a [`DispatchEnvelope`]
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchCommand {
    pub username: String,
    pub payload: DispatchPayload,
}

impl DispatchCommand {
    pub fn update_item(username: impl Into<String>, update: DispatcherUpdate) -> Self {
        Self {
            username: username.into(),
            payload: DispatchPayload::UpdateItem(update),
        }
    }

    /// Command name as sent on the wire
    pub fn name(&self) -> &str {
        match &self.payload {
            DispatchPayload::UpdateItem(_) => UPDATE_ITEM,
            DispatchPayload::Opaque { command, .. } => command,
        }
    }

    pub fn to_envelope(&self) -> SharedResult<DispatchEnvelope> {
        let data = match &self.payload {
            DispatchPayload::UpdateItem(update) => {
                serde_json::to_value(update).map_err(|e| SharedError::SerializationError {
                    message: format!("{UPDATE_ITEM} payload: {e}"),
                })?
            }
            DispatchPayload::Opaque { data, .. } => data.clone(),
        };

        Ok(DispatchEnvelope {
            command: self.name().to_string(),
            username: self.username.clone(),
            data,
        })
    }

    /// Serialized envelope, ready to POST
    pub fn to_bytes(&self) -> SharedResult<Vec<u8>> {
        let envelope = self.to_envelope()?;
        serde_json::to_vec(&envelope).map_err(|e| SharedError::SerializationError {
            message: format!("dispatch envelope: {e}"),
        })
    }
}

impl TryFrom<DispatchEnvelope> for DispatchCommand {
    type Error = SharedError;

    fn try_from(envelope: DispatchEnvelope) -> SharedResult<Self> {
        let payload = match envelope.command.as_str() {
            UPDATE_ITEM => {
                let update = serde_json::from_value(envelope.data).map_err(|e| SharedError::DeserializationError {
                    message: format!("{UPDATE_ITEM} payload: {e}"),
                })?;
                DispatchPayload::UpdateItem(update)
            }
            _ => DispatchPayload::Opaque {
                command: envelope.command,
                data: envelope.data,
            },
        };

        Ok(Self {
            username: envelope.username,
            payload,
        })
    }
}
