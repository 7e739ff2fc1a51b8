//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! One JSON object per line. Requests are terminated by CRLF; the device
//! terminates its lines with CRLF as well, but a bare LF is accepted.
//!
//! ### Request
//! ```text
//! {"id":1,"method":"set_rgb","params":[16711680,"smooth",500]}\r\n
//! ```
//!
//! ### Response
//! ```text
//! {"id":1,"result":["ok"]}\r\n
//! {"id":1,"error":{"code":-1,"message":"unsupported method"}}\r\n
//! ```
//!
//! ### Notification
//! ```text
//! {"method":"props","params":{"power":"on","bright":"10"}}\r\n
//! ```

use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CommandKind, DeviceErrorBody, Job, Message, Notification, Outcome, Response};
use crate::command;
use crate::error::{LightError, Result};

/// Frame terminator for every line we write
pub const LINE_TERMINATOR: &str = "\r\n";

/// Maximum accepted line length (16 KB)
pub const MAX_LINE_LEN: usize = 16 * 1024;

// =============================================================================
// Wire Shapes
// =============================================================================

#[derive(Deserialize)]
struct WireRequest {
    id: u64,
    method: String,
    #[serde(default)]
    params: Vec<Value>,
}

#[derive(Serialize)]
struct WireResponse<'a> {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a DeviceErrorBody>,
}

#[derive(Serialize)]
struct WireNotification<'a> {
    method: &'a str,
    params: &'a serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct WireMessage {
    id: Option<u64>,
    result: Option<Vec<Value>>,
    error: Option<DeviceErrorBody>,
    method: Option<String>,
    params: Option<Value>,
}

// =============================================================================
// Job Encoding/Decoding
// =============================================================================

/// Encode a job as one JSON request line (without terminator)
pub fn encode_job(job: &Job) -> Result<String> {
    Ok(serde_json::to_string(job)?)
}

/// Decode a request line back into a Job
///
/// The params are run through the same validation as on the client side, so
/// a decoded Job is as trustworthy as an enqueued one.
pub fn decode_job(line: &str) -> Result<Job> {
    let request: WireRequest = serde_json::from_str(line.trim_end())?;
    let kind = CommandKind::from_str(&request.method)?;
    let command = command::validate(kind, &request.params)?;
    Ok(Job::new(request.id, &command))
}

/// Extract only the request id of a line, if it has one
///
/// Used to address an error reply when the rest of the request is invalid.
pub fn peek_request_id(line: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(line.trim_end()).ok()?;
    value.get("id")?.as_u64()
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response as one JSON line (without terminator)
pub fn encode_response(response: &Response) -> Result<String> {
    let wire = match &response.outcome {
        Outcome::Ok(result) => WireResponse {
            id: response.id,
            result: Some(result.as_slice()),
            error: None,
        },
        Outcome::Err(error) => WireResponse {
            id: response.id,
            result: None,
            error: Some(error),
        },
    };
    Ok(serde_json::to_string(&wire)?)
}

/// Encode a notification as one JSON line (without terminator)
pub fn encode_notification(notification: &Notification) -> Result<String> {
    Ok(serde_json::to_string(&WireNotification {
        method: &notification.method,
        params: &notification.params,
    })?)
}

/// Decode any device line
pub fn decode_message(line: &str) -> Result<Message> {
    let trimmed = line.trim_end();
    if trimmed.len() > MAX_LINE_LEN {
        return Err(LightError::Protocol(format!(
            "Line too long: {} bytes (max {})",
            trimmed.len(),
            MAX_LINE_LEN
        )));
    }

    let wire: WireMessage = serde_json::from_str(trimmed)?;

    match wire.id {
        Some(id) => {
            // An error object wins over a result, the device never sends both
            if let Some(error) = wire.error {
                Ok(Message::Response(Response {
                    id,
                    outcome: Outcome::Err(error),
                }))
            } else if let Some(result) = wire.result {
                Ok(Message::Response(Response::ok(id, result)))
            } else {
                Err(LightError::Protocol(format!(
                    "Response {} has neither result nor error",
                    id
                )))
            }
        }
        None => match (wire.method, wire.params) {
            (Some(method), Some(Value::Object(params))) => {
                Ok(Message::Notification(Notification { method, params }))
            }
            _ => Err(LightError::Protocol(format!(
                "Line is neither a response nor a notification: {}",
                trimmed
            ))),
        },
    }
}

/// Decode a line that must be a response
pub fn decode_response(line: &str) -> Result<Response> {
    match decode_message(line)? {
        Message::Response(response) => Ok(response),
        Message::Notification(n) => Err(LightError::Protocol(format!(
            "Expected a response, got a '{}' notification",
            n.method
        ))),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write one payload followed by CRLF and flush
pub fn write_line<W: Write>(writer: &mut W, payload: &str) -> Result<()> {
    let mut frame = Vec::with_capacity(payload.len() + LINE_TERMINATOR.len());
    frame.extend_from_slice(payload.as_bytes());
    frame.extend_from_slice(LINE_TERMINATOR.as_bytes());
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Write a job as a request frame
pub fn write_job<W: Write>(writer: &mut W, job: &Job) -> Result<()> {
    write_line(writer, &encode_job(job)?)
}

/// Write a response frame
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_line(writer, &encode_response(response)?)
}
