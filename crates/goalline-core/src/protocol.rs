//! Synchronization messages exchanged with other participants.
//!
//! Outgoing events carry a typed [`GoalLineUpdate`]; inbound events arrive
//! as an `update_goalline` payload tagged by `type`:
//!
//! ```json
//! { "order": 0, "x_pos": 60.0 }                              // x_pos_update
//! { "order": 1, "orientation": 90 }                          // orientation_update
//! { "type": "x_pos", "order": 0, "new_val": 60.0 }           // update_goalline
//! { "type": "orientation", "order": 1, "new_val": 180 }      // update_goalline
//! ```

use crate::error::{GoalLineError, GoalLineResult};
use crate::token::Orientation;
use serde::{Deserialize, Serialize};

/// Outgoing event: a token's position was committed.
pub const X_POS_UPDATE: &str = "x_pos_update";
/// Outgoing event: a token was rotated.
pub const ORIENTATION_UPDATE: &str = "orientation_update";
/// Inbound event relayed from another participant's gesture.
pub const UPDATE_GOALLINE: &str = "update_goalline";

/// A single change to one token, addressed by its order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalLineUpdate {
    XPos { order: usize, x_pos: f64 },
    Orientation { order: usize, orientation: Orientation },
}

impl GoalLineUpdate {
    /// Order of the token this update addresses.
    pub fn order(&self) -> usize {
        match *self {
            GoalLineUpdate::XPos { order, .. } | GoalLineUpdate::Orientation { order, .. } => order,
        }
    }

    /// Name of the outgoing event carrying this update.
    pub fn event_name(&self) -> &'static str {
        match self {
            GoalLineUpdate::XPos { .. } => X_POS_UPDATE,
            GoalLineUpdate::Orientation { .. } => ORIENTATION_UPDATE,
        }
    }

    /// JSON payload of the outgoing event.
    pub fn to_payload(&self) -> GoalLineResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Inbound `update_goalline` payload as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteUpdate {
    XPos { order: usize, new_val: f64 },
    Orientation { order: usize, new_val: f64 },
}

impl RemoteUpdate {
    /// Decode an inbound payload.
    pub fn from_payload(payload: &serde_json::Value) -> GoalLineResult<Self> {
        serde_json::from_value(payload.clone()).map_err(|e| GoalLineError::MalformedPayload {
            event: UPDATE_GOALLINE.to_string(),
            reason: e.to_string(),
        })
    }

    /// Build from the loose `(type, order, new_val)` triple used by hosts.
    pub fn from_parts(kind: &str, order: usize, new_val: f64) -> GoalLineResult<Self> {
        match kind {
            "x_pos" => Ok(RemoteUpdate::XPos { order, new_val }),
            "orientation" => Ok(RemoteUpdate::Orientation { order, new_val }),
            other => Err(GoalLineError::MalformedPayload {
                event: UPDATE_GOALLINE.to_string(),
                reason: format!("unknown update type '{}'", other),
            }),
        }
    }
}

impl TryFrom<RemoteUpdate> for GoalLineUpdate {
    type Error = GoalLineError;

    fn try_from(update: RemoteUpdate) -> Result<Self, Self::Error> {
        match update {
            RemoteUpdate::XPos { order, new_val } => {
                if !new_val.is_finite() {
                    return Err(GoalLineError::MalformedPayload {
                        event: UPDATE_GOALLINE.to_string(),
                        reason: format!("non-finite x position {}", new_val),
                    });
                }
                Ok(GoalLineUpdate::XPos { order, x_pos: new_val })
            }
            RemoteUpdate::Orientation { order, new_val } => {
                if !new_val.is_finite() || new_val.fract() != 0.0 {
                    return Err(GoalLineError::MalformedPayload {
                        event: UPDATE_GOALLINE.to_string(),
                        reason: format!("orientation {} is not whole degrees", new_val),
                    });
                }
                let orientation = Orientation::try_from(new_val as i64)?;
                Ok(GoalLineUpdate::Orientation { order, orientation })
            }
        }
    }
}

/// One token of a goal line as stored by the server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalEntry {
    /// Resource slot the cube came from.
    pub idx: usize,
    /// Committed x position.
    pub x: f64,
    #[serde(default)]
    pub orientation: Orientation,
}
