//! Connection Handler
//!
//! Owns the TCP socket to one device and frames it into lines.

use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{LightError, Result};
use crate::protocol::codec::{LINE_TERMINATOR, MAX_LINE_LEN};

/// Line-oriented channel to a device
///
/// [`Connection`] is the TCP implementation; the light client is generic over
/// this trait so tests can script the device side.
pub trait Transport {
    /// Write one frame followed by CRLF
    fn send_line(&mut self, payload: &str) -> Result<()>;

    /// How long one request waits for its reply
    fn read_timeout(&self) -> Duration;

    /// Read one complete line, without its terminator
    ///
    /// `Ok(None)` means `deadline` passed without a full line.
    fn recv_line_until(&mut self, deadline: Instant) -> Result<Option<String>>;

    /// Read one line within the transport's read timeout
    fn recv_line(&mut self) -> Result<Option<String>> {
        let deadline = Instant::now() + self.read_timeout();
        self.recv_line_until(deadline)
    }

    /// Whether the peer still looks reachable
    fn is_online(&mut self) -> Result<bool>;
}

/// Lifecycle of a [`Connection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// TCP connection to one device
#[derive(Debug)]
pub struct Connection {
    /// Socket, present while connected
    stream: Option<TcpStream>,

    /// Bytes received but not yet returned as a line
    buffer: BytesMut,

    state: ConnectionState,

    /// Remote address
    peer_addr: SocketAddr,

    /// How long `recv_line` waits for a full line
    read_timeout: Duration,
}

impl Connection {
    /// Connect to `ip:port`
    ///
    /// The address is checked before any socket is created.
    pub fn connect(ip: &str, port: u16, timeout: Duration) -> Result<Self> {
        // Sub-millisecond timeouts round up so they still reach the socket
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        let config = Config::builder().connect_timeout_ms(timeout_ms).build();
        Self::connect_with(ip, port, &config)
    }

    /// Connect using the timeouts of `config`
    pub fn connect_with(ip: &str, port: u16, config: &Config) -> Result<Self> {
        let ip: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| LightError::InvalidAddress(ip.to_string()))?;
        config.validate()?;

        let mut connection = Self {
            stream: None,
            buffer: BytesMut::with_capacity(1024),
            state: ConnectionState::Connecting,
            peer_addr: SocketAddr::new(ip, port),
            read_timeout: config.read_timeout(),
        };

        tracing::debug!("Connecting to {}", connection.peer_addr);

        let stream = TcpStream::connect_timeout(&connection.peer_addr, config.connect_timeout())
            .map_err(|e| match e.kind() {
                IoErrorKind::TimedOut | IoErrorKind::WouldBlock => LightError::ConnectTimeout {
                    addr: connection.peer_addr.to_string(),
                    timeout_ms: config.connect_timeout_ms,
                },
                _ => LightError::Io(e),
            })?;

        // Disable Nagle's algorithm, requests are tiny and latency matters
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(config.write_timeout()))?;

        connection.stream = Some(stream);
        connection.state = ConnectionState::Connected;

        tracing::debug!("Connected to {}", connection.peer_addr);
        Ok(connection)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Change how long `recv_line` waits
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        if timeout.is_zero() {
            return Err(LightError::Config("read timeout must be > 0".to_string()));
        }
        self.read_timeout = timeout;
        Ok(())
    }

    /// Close the socket
    ///
    /// Closing twice is reported as [`LightError::AlreadyDisconnected`].
    pub fn disconnect(&mut self) -> Result<()> {
        let stream = self.stream.take().ok_or(LightError::AlreadyDisconnected)?;
        self.state = ConnectionState::Disconnected;
        self.buffer.clear();

        // The peer may already be gone; the socket is released on drop either way
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            tracing::debug!("Shutdown of {} failed: {}", self.peer_addr, e);
        }

        tracing::debug!("Disconnected from {}", self.peer_addr);
        Ok(())
    }

    fn stream(&self) -> Result<&TcpStream> {
        self.stream.as_ref().ok_or(LightError::NotConnected)
    }

    /// Split the first complete line off the buffer
    fn take_line(&mut self) -> Result<Option<String>> {
        let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') else {
            if self.buffer.len() > MAX_LINE_LEN {
                return Err(LightError::Protocol(format!(
                    "Line exceeds {} bytes without terminator",
                    MAX_LINE_LEN
                )));
            }
            return Ok(None);
        };

        let frame = self.buffer.split_to(pos + 1);
        let line = String::from_utf8(frame.to_vec())
            .map_err(|e| LightError::Protocol(format!("Line is not UTF-8: {}", e)))?;
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Transport for Connection {
    fn send_line(&mut self, payload: &str) -> Result<()> {
        let mut stream = self.stream()?;
        tracing::trace!("-> {}: {}", self.peer_addr, payload);

        let mut frame = Vec::with_capacity(payload.len() + LINE_TERMINATOR.len());
        frame.extend_from_slice(payload.as_bytes());
        frame.extend_from_slice(LINE_TERMINATOR.as_bytes());

        stream.write_all(&frame).map_err(|e| match e.kind() {
            IoErrorKind::BrokenPipe | IoErrorKind::ConnectionReset | IoErrorKind::ConnectionAborted => {
                LightError::ConnectionClosed(format!("write to {} failed: {}", self.peer_addr, e))
            }
            _ => LightError::Io(e),
        })?;
        stream.flush()?;
        Ok(())
    }

    fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    fn recv_line_until(&mut self, deadline: Instant) -> Result<Option<String>> {
        let mut chunk = [0u8; 1024];

        loop {
            if let Some(line) = self.take_line()? {
                tracing::trace!("<- {}: {}", self.peer_addr, line);
                return Ok(Some(line));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            let mut stream = self.stream()?;
            stream.set_read_timeout(Some(remaining))?;

            match stream.read(&mut chunk) {
                Ok(0) => {
                    return Err(LightError::ConnectionClosed(format!(
                        "{} closed the connection",
                        self.peer_addr
                    )))
                }
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                // Unix reports a read timeout as WouldBlock, Windows as TimedOut
                Err(e) if matches!(e.kind(), IoErrorKind::WouldBlock | IoErrorKind::TimedOut) => {
                    return Ok(None)
                }
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), IoErrorKind::ConnectionReset | IoErrorKind::ConnectionAborted) => {
                    return Err(LightError::ConnectionClosed(format!(
                        "{} reset the connection",
                        self.peer_addr
                    )))
                }
                Err(e) => return Err(LightError::Io(e)),
            }
        }
    }

    /// Peek for a remote close without consuming data
    ///
    /// A graceful close is detected; a dead link usually is not until the
    /// next write or read fails.
    fn is_online(&mut self) -> Result<bool> {
        let stream = self.stream()?;
        if !self.buffer.is_empty() {
            return Ok(true);
        }

        stream.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        let online = match stream.peek(&mut probe) {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) if e.kind() == IoErrorKind::WouldBlock => true,
            Err(e) => {
                tracing::debug!("Liveness probe of {} failed: {}", self.peer_addr, e);
                false
            }
        };
        stream.set_nonblocking(false)?;

        Ok(online)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.stream.is_some() {
            let _ = self.disconnect();
        }
    }
}
