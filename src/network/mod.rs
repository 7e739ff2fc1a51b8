//! Network Module
//!
//! TCP connection, request correlation, discovery and the device emulator.
//!
//! ## Architecture
//! - `Connection`: one socket per device, strictly one request in flight
//! - `Session`: id-based matching of replies over any `Transport`
//! - `discovery`: multicast search yielding `(ip, port)` pairs
//! - `emulator`: loopback device for tests and local experiments

mod connection;
mod session;
pub mod discovery;
pub mod emulator;

pub use connection::{Connection, ConnectionState, Transport};
pub use session::{PendingRequests, Session, EXPIRED_CAPACITY};
pub use discovery::{discover, DiscoveredDevice};
pub use emulator::{DeviceEmulator, DeviceState, EmulatorOptions};
