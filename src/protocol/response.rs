//! Response definitions
//!
//! Represents lines sent by the device: replies to requests and unsolicited
//! property notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error object carried by a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceErrorBody {
    pub code: i64,
    pub message: String,
}

/// Result of one request as reported by the device
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ok(Vec<Value>),
    Err(DeviceErrorBody),
}

/// A reply to a request
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Echo of the request id
    pub id: u64,

    pub outcome: Outcome,
}

impl Response {
    /// Create a successful response
    pub fn ok(id: u64, result: Vec<Value>) -> Self {
        Self {
            id,
            outcome: Outcome::Ok(result),
        }
    }

    /// Create an error response
    pub fn error(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Err(DeviceErrorBody {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }
}

/// State change pushed by the device without a request
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Always `props` on current firmware
    pub method: String,

    pub params: Map<String, Value>,
}

impl Notification {
    pub fn props(params: Map<String, Value>) -> Self {
        Self {
            method: "props".to_string(),
            params,
        }
    }
}

/// Any line the device may send
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Response(Response),
    Notification(Notification),
}
