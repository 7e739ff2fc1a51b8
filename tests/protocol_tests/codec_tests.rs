//! Codec Tests
//!
//! Tests for request, response and notification encoding/decoding.

use std::io::Cursor;

use serde_json::{json, Map, Value};

use lightwire::protocol::{
    decode_job, decode_message, decode_response, encode_job, encode_notification,
    encode_response, peek_request_id, write_job, write_response, DeviceErrorBody, Message,
    Notification, Outcome, Response,
};
use lightwire::{ColorSpec, Command, CommandKind, FadeEffect, FlowAction, FlowExpression, Job, Power, Property};

// =============================================================================
// Job Encoding Tests
// =============================================================================

#[test]
fn test_encode_job_set_rgb() {
    let command = Command::set_color(ColorSpec::rgb(0xFF0000).unwrap(), FadeEffect::smooth(500).unwrap()).unwrap();
    let job = Job::new(0, &command);

    let line = encode_job(&job).unwrap();
    let value: Value = serde_json::from_str(&line).unwrap();

    assert_eq!(
        value,
        json!({"id": 0, "method": "set_rgb", "params": [16711680, "smooth", 500]})
    );
}

#[test]
fn test_encode_job_has_no_terminator() {
    let job = Job::new(3, &Command::toggle());
    let line = encode_job(&job).unwrap();

    assert!(!line.contains('\n'));
    assert_eq!(line, r#"{"id":3,"method":"toggle","params":[]}"#);
}

#[test]
fn test_encode_job_sudden_sends_zero_duration() {
    let command = Command::set_power(Power::Off, FadeEffect::sudden()).unwrap();
    let job = Job::new(1, &command);
    let value: Value = serde_json::from_str(&encode_job(&job).unwrap()).unwrap();

    assert_eq!(value["params"], json!(["off", "sudden", 0]));
}

#[test]
fn test_encode_job_get_prop() {
    let command = Command::get_props(&[Property::Power, Property::Bright]).unwrap();
    let job = Job::new(1, &command);
    let value: Value = serde_json::from_str(&encode_job(&job).unwrap()).unwrap();

    assert_eq!(value["method"], "get_prop");
    assert_eq!(value["params"], json!(["power", "bright"]));
}

// =============================================================================
// Job Decoding Tests
// =============================================================================

#[test]
fn test_decode_job_matches_encoded() {
    let commands = vec![
        Command::set_bright(42, FadeEffect::default()).unwrap(),
        Command::set_color(ColorSpec::ct(2700).unwrap(), FadeEffect::sudden()).unwrap(),
        Command::set_color(ColorSpec::hsv(120, Some(80)).unwrap(), FadeEffect::smooth(1000).unwrap()).unwrap(),
        Command::set_name("desk lamp"),
        Command::start_flow(
            FlowExpression::parse("1000,1,255,50,200,7,0,-1").unwrap(),
            FlowAction::TurnOff,
        ),
        Command::stop_flow(),
    ];

    for (id, command) in commands.iter().enumerate() {
        let job = Job::new(id as u64, command);
        let decoded = decode_job(&encode_job(&job).unwrap()).unwrap();

        assert_eq!(decoded.id(), job.id());
        assert_eq!(decoded.method(), job.method());
        assert_eq!(decoded.params(), job.params());
    }
}

#[test]
fn test_decode_job_accepts_crlf() {
    let job = decode_job("{\"id\":9,\"method\":\"set_default\",\"params\":[]}\r\n").unwrap();

    assert_eq!(job.id(), 9);
    assert_eq!(job.method(), CommandKind::SetDefault);
}

#[test]
fn test_decode_job_validates_params() {
    let err = decode_job(r#"{"id":1,"method":"set_ct_abx","params":[9000,"smooth",500]}"#).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_decode_job_unknown_method() {
    let err = decode_job(r#"{"id":1,"method":"set_music","params":[1]}"#).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("set_music"));
}

#[test]
fn test_decode_job_malformed_json() {
    let err = decode_job("{\"id\":1,").unwrap_err();
    assert!(err.is_protocol());
}

#[test]
fn test_peek_request_id() {
    assert_eq!(peek_request_id(r#"{"id":12,"method":"nope"}"#), Some(12));
    assert_eq!(peek_request_id(r#"{"method":"props"}"#), None);
    assert_eq!(peek_request_id("garbage"), None);
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_decode_result_response() {
    let message = decode_message(r#"{"id":0,"result":["ok"]}"#).unwrap();

    match message {
        Message::Response(response) => {
            assert_eq!(response.id, 0);
            assert_eq!(response.outcome, Outcome::Ok(vec![json!("ok")]));
            assert!(response.is_ok());
        }
        _ => panic!("Expected a response"),
    }
}

#[test]
fn test_decode_error_response() {
    let response = decode_response(r#"{"id":4,"error":{"code":-1,"message":"unsupported method"}}"#).unwrap();

    assert_eq!(response.id, 4);
    assert_eq!(
        response.outcome,
        Outcome::Err(DeviceErrorBody {
            code: -1,
            message: "unsupported method".to_string(),
        })
    );
}

#[test]
fn test_decode_error_wins_over_result() {
    let response =
        decode_response(r#"{"id":4,"result":["ok"],"error":{"code":-5000,"message":"general error"}}"#).unwrap();

    assert!(!response.is_ok());
}

#[test]
fn test_decode_response_without_outcome() {
    let err = decode_message(r#"{"id":4}"#).unwrap_err();
    assert!(err.is_protocol());
}

#[test]
fn test_decode_notification() {
    let message = decode_message(r#"{"method":"props","params":{"power":"on","bright":"10"}}"#).unwrap();

    match message {
        Message::Notification(notification) => {
            assert_eq!(notification.method, "props");
            assert_eq!(notification.params["power"], "on");
            assert_eq!(notification.params["bright"], "10");
        }
        _ => panic!("Expected a notification"),
    }
}

#[test]
fn test_decode_response_rejects_notification() {
    let err = decode_response(r#"{"method":"props","params":{"power":"off"}}"#).unwrap_err();
    assert!(err.is_protocol());
}

#[test]
fn test_decode_message_rejects_unknown_shape() {
    assert!(decode_message(r#"{"hello":"world"}"#).unwrap_err().is_protocol());
    assert!(decode_message(r#"{"method":"props","params":[1,2]}"#).unwrap_err().is_protocol());
    assert!(decode_message("not json").unwrap_err().is_protocol());
}

#[test]
fn test_decode_message_rejects_oversized_line() {
    let line = format!(r#"{{"id":1,"result":["{}"]}}"#, "x".repeat(20 * 1024));
    assert!(decode_message(&line).unwrap_err().is_protocol());
}

// =============================================================================
// Response Encoding Tests
// =============================================================================

#[test]
fn test_encode_response_ok() {
    let line = encode_response(&Response::ok(2, vec![json!("on")])).unwrap();
    assert_eq!(line, r#"{"id":2,"result":["on"]}"#);
}

#[test]
fn test_encode_response_error() {
    let line = encode_response(&Response::error(2, -1, "bad")).unwrap();
    assert_eq!(line, r#"{"id":2,"error":{"code":-1,"message":"bad"}}"#);
}

#[test]
fn test_encode_notification() {
    let mut params = Map::new();
    params.insert("power".to_string(), json!("off"));
    let line = encode_notification(&Notification::props(params)).unwrap();

    assert_eq!(line, r#"{"method":"props","params":{"power":"off"}}"#);
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_job_appends_crlf() {
    let mut buffer = Cursor::new(Vec::new());
    write_job(&mut buffer, &Job::new(0, &Command::toggle())).unwrap();

    let written = String::from_utf8(buffer.into_inner()).unwrap();
    assert!(written.ends_with("}\r\n"));
    assert_eq!(written.matches("\r\n").count(), 1);
}

#[test]
fn test_write_response_then_decode() {
    let mut buffer = Cursor::new(Vec::new());
    write_response(&mut buffer, &Response::ok(5, vec![json!("ok")])).unwrap();
    write_response(&mut buffer, &Response::error(6, -1, "nope")).unwrap();

    let written = String::from_utf8(buffer.into_inner()).unwrap();
    let lines: Vec<&str> = written.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);

    assert!(decode_response(lines[0]).unwrap().is_ok());
    assert_eq!(decode_response(lines[1]).unwrap().id, 6);
}
