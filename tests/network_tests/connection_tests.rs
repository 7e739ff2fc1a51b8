//! Tests for the TCP Connection
//!
//! These tests verify:
//! - Address validation before any socket is opened
//! - CRLF framing in both directions
//! - Read timeouts and remote close detection
//! - Disconnect lifecycle

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use lightwire::{Config, Connection, ConnectionState, ErrorKind, LightError, Transport};

// =============================================================================
// Helper Functions
// =============================================================================

/// Connect a client to a fresh loopback listener and return both ends
fn connected_pair() -> (Connection, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut connection = Connection::connect("127.0.0.1", port, Duration::from_secs(2)).unwrap();
    connection.set_read_timeout(Duration::from_millis(200)).unwrap();
    let (server, _) = listener.accept().unwrap();
    (connection, server)
}

// =============================================================================
// Connect Tests
// =============================================================================

#[test]
fn test_connect_rejects_invalid_address() {
    let started = Instant::now();
    let err = Connection::connect("192.1555.0.0", 55443, Duration::from_secs(5)).err().unwrap();

    assert!(matches!(err, LightError::InvalidAddress(ref addr) if addr == "192.1555.0.0"));
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_connect_rejects_hostname() {
    let err = Connection::connect("localhost", 55443, Duration::from_secs(1)).err().unwrap();
    assert!(matches!(err, LightError::InvalidAddress(_)));
}

#[test]
fn test_connect_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = Connection::connect("127.0.0.1", port, Duration::from_secs(1)).err().unwrap();
    assert!(err.is_connection());
}

#[test]
fn test_connect_rejects_zero_timeouts() {
    let config = Config::builder().read_timeout_ms(0).build();
    let err = Connection::connect_with("127.0.0.1", 55443, &config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_sub_millisecond_connect_timeout_is_not_a_config_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    for timeout in [Duration::from_micros(500), Duration::ZERO] {
        if let Err(err) = Connection::connect("127.0.0.1", port, timeout) {
            assert_eq!(err.kind(), ErrorKind::Connection, "unexpected error: {}", err);
        }
    }
}

#[test]
fn test_connected_state() {
    let (connection, _server) = connected_pair();

    assert_eq!(connection.state(), ConnectionState::Connected);
    assert_eq!(connection.peer_addr().ip().to_string(), "127.0.0.1");
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_send_line_appends_crlf() {
    let (mut connection, mut server) = connected_pair();

    connection.send_line(r#"{"id":0,"method":"toggle","params":[]}"#).unwrap();

    let mut buf = [0u8; 64];
    let n = server.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"{\"id\":0,\"method\":\"toggle\",\"params\":[]}\r\n");
}

#[test]
fn test_recv_line_splits_lines() {
    let (mut connection, mut server) = connected_pair();

    server
        .write_all(b"{\"id\":0,\"result\":[\"ok\"]}\r\n{\"id\":1,\"result\":[\"ok\"]}\n")
        .unwrap();

    assert_eq!(
        connection.recv_line().unwrap().as_deref(),
        Some(r#"{"id":0,"result":["ok"]}"#)
    );
    assert_eq!(
        connection.recv_line().unwrap().as_deref(),
        Some(r#"{"id":1,"result":["ok"]}"#)
    );
}

#[test]
fn test_recv_line_joins_partial_writes() {
    let (mut connection, mut server) = connected_pair();
    connection.set_read_timeout(Duration::from_secs(2)).unwrap();

    let writer = thread::spawn(move || {
        server.write_all(b"{\"id\":3,\"res").unwrap();
        server.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        server.write_all(b"ult\":[\"on\"]}\r\n").unwrap();
        server
    });

    let line = connection.recv_line().unwrap();
    assert_eq!(line.as_deref(), Some(r#"{"id":3,"result":["on"]}"#));
    let _server = writer.join().unwrap();
}

#[test]
fn test_recv_line_times_out() {
    let (mut connection, _server) = connected_pair();

    let started = Instant::now();
    assert_eq!(connection.recv_line().unwrap(), None);
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[test]
fn test_recv_line_after_remote_close() {
    let (mut connection, server) = connected_pair();
    drop(server);

    let err = connection.recv_line().unwrap_err();
    assert!(matches!(err, LightError::ConnectionClosed(_)));
}

// =============================================================================
// Liveness Tests
// =============================================================================

#[test]
fn test_is_online_while_open() {
    let (mut connection, _server) = connected_pair();
    assert!(connection.is_online().unwrap());
}

#[test]
fn test_is_online_does_not_consume_data() {
    let (mut connection, mut server) = connected_pair();
    server.write_all(b"{\"id\":1,\"result\":[\"ok\"]}\r\n").unwrap();
    thread::sleep(Duration::from_millis(50));

    assert!(connection.is_online().unwrap());
    assert_eq!(
        connection.recv_line().unwrap().as_deref(),
        Some(r#"{"id":1,"result":["ok"]}"#)
    );
}

#[test]
fn test_recv_line_until_past_deadline() {
    let (mut connection, _server) = connected_pair();

    let started = Instant::now();
    assert_eq!(connection.recv_line_until(Instant::now()).unwrap(), None);
    assert!(started.elapsed() < Duration::from_millis(150));
}

#[test]
fn test_is_online_after_disconnect() {
    let (mut connection, _server) = connected_pair();
    connection.disconnect().unwrap();

    let err = connection.is_online().unwrap_err();
    assert!(matches!(err, LightError::NotConnected));
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[test]
fn test_is_online_after_remote_close() {
    let (mut connection, server) = connected_pair();
    drop(server);
    thread::sleep(Duration::from_millis(100));

    assert!(!connection.is_online().unwrap());
}

// =============================================================================
// Disconnect Tests
// =============================================================================

#[test]
fn test_disconnect_twice() {
    let (mut connection, _server) = connected_pair();

    connection.disconnect().unwrap();
    assert_eq!(connection.state(), ConnectionState::Disconnected);

    let err = connection.disconnect().unwrap_err();
    assert!(matches!(err, LightError::AlreadyDisconnected));
}

#[test]
fn test_send_after_disconnect() {
    let (mut connection, _server) = connected_pair();
    connection.disconnect().unwrap();

    let err = connection.send_line("{}").unwrap_err();
    assert!(matches!(err, LightError::NotConnected));
    assert!(err.is_connection());
}

#[test]
fn test_set_read_timeout_rejects_zero() {
    let (mut connection, _server) = connected_pair();
    let err = connection.set_read_timeout(Duration::ZERO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
