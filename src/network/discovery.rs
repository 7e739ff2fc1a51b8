//! Device discovery
//!
//! Finds lights on the local network with an SSDP-like multicast search.
//! Lights answer with an HTTP-style header block whose `Location` header
//! carries `yeelight://<ip>:<port>`.

use std::io::ErrorKind as IoErrorKind;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use crate::error::{LightError, Result};
use crate::protocol::CommandKind;

/// Multicast group and port lights listen on
pub const MULTICAST_ADDR: &str = "239.255.255.250:1982";

/// Search target advertised by lights
pub const SEARCH_TARGET: &str = "wifi_bulb";

/// A light that answered a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub ip: IpAddr,
    pub port: u16,
    pub id: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub firmware: Option<String>,
    /// Method names the device advertises, including ones this crate does not speak
    pub support: Vec<String>,
    pub power: Option<bool>,
    pub bright: Option<u8>,
}

impl DiscoveredDevice {
    /// The `(ip, port)` pair consumed by `Light::connect`
    pub fn addr(&self) -> (IpAddr, u16) {
        (self.ip, self.port)
    }

    pub fn supports(&self, kind: CommandKind) -> bool {
        self.support.iter().any(|method| method == kind.as_str())
    }
}

/// The search datagram
pub fn search_request() -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\nHOST: {}\r\nMAN: \"ssdp:discover\"\r\nST: {}\r\n",
        MULTICAST_ADDR, SEARCH_TARGET
    )
}

/// Parse one search reply
pub fn parse_search_response(text: &str) -> Result<DiscoveredDevice> {
    let mut location = None;
    let mut device = DiscoveredDevice {
        ip: IpAddr::from([0, 0, 0, 0]),
        port: 0,
        id: None,
        model: None,
        name: None,
        firmware: None,
        support: Vec::new(),
        power: None,
        bright: None,
    };

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "location" => location = Some(value.to_string()),
            "id" => device.id = Some(value.to_string()),
            "model" => device.model = Some(value.to_string()),
            "name" if !value.is_empty() => device.name = Some(value.to_string()),
            "fw_ver" => device.firmware = Some(value.to_string()),
            "support" => device.support = value.split_whitespace().map(str::to_string).collect(),
            "power" => device.power = Some(value == "on"),
            "bright" => device.bright = value.parse().ok(),
            _ => {}
        }
    }

    let location = location
        .ok_or_else(|| LightError::Protocol("Search reply has no Location header".to_string()))?;
    let addr: SocketAddr = location
        .strip_prefix("yeelight://")
        .unwrap_or(&location)
        .parse()
        .map_err(|_| LightError::Protocol(format!("Invalid Location header: {}", location)))?;

    device.ip = addr.ip();
    device.port = addr.port();
    Ok(device)
}

/// Multicast a search and collect replies until `timeout` elapses
pub fn discover(timeout: Duration) -> Result<Vec<DiscoveredDevice>> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let request = search_request();

    tracing::info!("Searching for lights via {}", MULTICAST_ADDR);
    socket.send_to(request.as_bytes(), MULTICAST_ADDR)?;

    let deadline = Instant::now() + timeout;
    let mut devices: Vec<DiscoveredDevice> = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        socket.set_read_timeout(Some(remaining))?;

        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), IoErrorKind::WouldBlock | IoErrorKind::TimedOut) => break,
            Err(e) => return Err(e.into()),
        };

        let text = String::from_utf8_lossy(&buf[..len]);
        match parse_search_response(&text) {
            Ok(device) => {
                if devices.iter().any(|d| d.addr() == device.addr()) {
                    continue;
                }
                tracing::info!("Discovered light at {}:{}", device.ip, device.port);
                devices.push(device);
            }
            Err(e) => tracing::debug!("Ignoring datagram from {}: {}", from, e),
        }
    }

    tracing::debug!("Discovery finished with {} light(s)", devices.len());
    Ok(devices)
}
