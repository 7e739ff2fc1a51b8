//! Protocol Module
//!
//! Defines the line-delimited JSON protocol spoken by the light.
//!
//! ## Frames
//! - Request:      `{"id": n, "method": "...", "params": [...]}` + CRLF
//! - Response:     `{"id": n, "result": [...]}`
//! - Error:        `{"id": n, "error": {"code": c, "message": "..."}}`
//! - Notification: `{"method": "props", "params": {...}}` (no id)
//!
//! ## Methods
//! `get_prop`, `toggle`, `set_bright`, `set_name`, `set_rgb`, `set_ct_abx`,
//! `set_hsv`, `set_power`, `set_default`, `start_cf`, `stop_cf`

mod command;
mod response;
pub mod codec;

pub use command::{CommandKind, Job, Property};
pub use response::{DeviceErrorBody, Message, Notification, Outcome, Response};
pub use codec::{
    decode_job, decode_message, decode_response, encode_job, encode_notification,
    encode_response, peek_request_id, write_job, write_line, write_response,
};

/// Parameter value as carried on the wire
pub use serde_json::Value;
