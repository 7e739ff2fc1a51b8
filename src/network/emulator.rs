//! Device emulator
//!
//! A TCP server that speaks the light's protocol against an in-memory device
//! state. Used by the test suite and the `lightwire-emulator` binary.
//!
//! ## Threads
//! - one acceptor thread (non-blocking accept, polls the shutdown flag)
//! - one thread per client connection
//!
//! Device state and the request log are shared behind `parking_lot` mutexes.

use std::io::{BufRead, BufReader, ErrorKind as IoErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::protocol::{
    codec, CommandKind, DeviceErrorBody, Job, Notification, Property, Response,
};

/// How often blocked threads look at the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Error code the emulator uses for requests it cannot decode
pub const INVALID_REQUEST_CODE: i64 = -1;

/// Behavior switches of the emulator
#[derive(Debug, Clone, Default)]
pub struct EmulatorOptions {
    /// Push a `props` notification before replying to a state change
    pub notify: bool,

    /// Apply requests but never reply
    pub silent: bool,

    /// Answer every request with this error
    pub reject: Option<DeviceErrorBody>,

    /// Close each client connection after this many requests
    pub close_after: Option<usize>,
}

/// Emulated device state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub power: bool,
    pub bright: u8,
    pub rgb: u32,
    pub ct: u32,
    pub hue: u16,
    pub sat: u8,
    /// 1 = rgb, 2 = color temperature, 3 = hsv
    pub color_mode: u8,
    pub name: String,
    /// Serialized expression of the running color flow
    pub flow: Option<String>,
    /// Number of `set_default` calls seen
    pub saved_defaults: usize,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            power: true,
            bright: 100,
            rgb: 0xFF_FF_FF,
            ct: 4000,
            hue: 0,
            sat: 0,
            color_mode: 2,
            name: String::new(),
            flow: None,
            saved_defaults: 0,
        }
    }
}

impl DeviceState {
    /// Property value the way the device reports it: always a string
    pub fn read(&self, prop: Property) -> Value {
        let text = match prop {
            Property::Bright => self.bright.to_string(),
            Property::Rgb => self.rgb.to_string(),
            Property::Ct => self.ct.to_string(),
            Property::Hue => self.hue.to_string(),
            Property::Sat => self.sat.to_string(),
            Property::Name => self.name.clone(),
            Property::Power => (if self.power { "on" } else { "off" }).to_string(),
        };
        Value::String(text)
    }

    /// Apply a state-changing job and return the properties it touched
    fn apply(&mut self, job: &Job) -> Vec<Property> {
        let params = job.params();
        let int = |i: usize| params.get(i).and_then(Value::as_i64).unwrap_or_default();
        let text = |i: usize| params.get(i).and_then(Value::as_str).unwrap_or_default();

        match job.method() {
            CommandKind::Toggle => {
                self.power = !self.power;
                vec![Property::Power]
            }
            CommandKind::SetPower => {
                self.power = text(0) == "on";
                vec![Property::Power]
            }
            CommandKind::SetBright => {
                self.bright = int(0) as u8;
                vec![Property::Bright]
            }
            CommandKind::SetName => {
                self.name = text(0).to_string();
                vec![Property::Name]
            }
            CommandKind::SetRgb => {
                self.rgb = int(0) as u32;
                self.color_mode = 1;
                vec![Property::Rgb]
            }
            CommandKind::SetCtAbx => {
                self.ct = int(0) as u32;
                self.color_mode = 2;
                vec![Property::Ct]
            }
            CommandKind::SetHsv => {
                self.hue = int(0) as u16;
                self.sat = int(1) as u8;
                self.color_mode = 3;
                vec![Property::Hue, Property::Sat]
            }
            CommandKind::SetDefault => {
                self.saved_defaults += 1;
                Vec::new()
            }
            CommandKind::StartCf => {
                self.flow = Some(text(2).to_string());
                Vec::new()
            }
            CommandKind::StopCf => {
                self.flow = None;
                Vec::new()
            }
            CommandKind::GetProp => Vec::new(),
        }
    }
}

struct Shared {
    state: Mutex<DeviceState>,
    requests: Mutex<Vec<String>>,
    options: EmulatorOptions,
    shutdown: AtomicBool,
}

/// A running emulated light
pub struct DeviceEmulator {
    addr: SocketAddr,
    shared: Arc<Shared>,
    acceptor: Option<JoinHandle<()>>,
}

impl DeviceEmulator {
    /// Start on an ephemeral loopback port
    pub fn start(options: EmulatorOptions) -> Result<Self> {
        Self::bind("127.0.0.1:0", options)
    }

    /// Start on a given address
    pub fn bind(addr: &str, options: EmulatorOptions) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(DeviceState::default()),
            requests: Mutex::new(Vec::new()),
            options,
            shutdown: AtomicBool::new(false),
        });

        let acceptor_shared = Arc::clone(&shared);
        let acceptor = thread::Builder::new()
            .name("emulator-acceptor".to_string())
            .spawn(move || accept_loop(listener, acceptor_shared))?;

        tracing::info!("Device emulator listening on {}", addr);

        Ok(Self {
            addr,
            shared,
            acceptor: Some(acceptor),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ip(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Snapshot of the device state
    pub fn state(&self) -> DeviceState {
        self.shared.state.lock().clone()
    }

    /// Modify the device state in place
    pub fn update_state<F: FnOnce(&mut DeviceState)>(&self, f: F) {
        f(&mut self.shared.state.lock());
    }

    /// Every request line received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.shared.requests.lock().clone()
    }

    /// Stop accepting and close all client connections
    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }

    /// Block until the emulator is shut down from another thread
    pub fn wait(mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

impl Drop for DeviceEmulator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    let mut handlers: Vec<JoinHandle<()>> = Vec::new();

    while !shared.shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                tracing::debug!("Emulator accepted {}", peer);
                let shared = Arc::clone(&shared);
                let handler = thread::spawn(move || {
                    if let Err(e) = serve(stream, &shared) {
                        tracing::warn!("Emulator connection {} failed: {}", peer, e);
                    }
                    tracing::debug!("Emulator closed {}", peer);
                });
                handlers.push(handler);
            }
            Err(e) if e.kind() == IoErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                tracing::warn!("Emulator accept failed: {}", e);
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    for handler in handlers {
        let _ = handler.join();
    }
}

/// Serve one client until it disconnects, the emulator shuts down, or the
/// `close_after` budget is used up
fn serve(stream: TcpStream, shared: &Shared) -> Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut line = String::new();
    let mut handled = 0usize;

    while !shared.shutdown.load(Ordering::Relaxed) {
        match reader.read_line(&mut line) {
            Ok(0) => return Ok(()),
            // Partial line; the rest arrives with the next read
            Ok(_) if !line.ends_with('\n') => continue,
            Ok(_) => {
                let request = line.trim_end().to_string();
                line.clear();
                if request.is_empty() {
                    continue;
                }

                shared.requests.lock().push(request.clone());
                for reply in handle_request(&request, shared) {
                    codec::write_line(&mut writer, &reply)?;
                }

                handled += 1;
                if shared.options.close_after.is_some_and(|limit| handled >= limit) {
                    tracing::debug!("Emulator closing connection after {} requests", handled);
                    return Ok(());
                }
            }
            Err(e) if matches!(e.kind(), IoErrorKind::WouldBlock | IoErrorKind::TimedOut) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Lines to send back for one request line
fn handle_request(request: &str, shared: &Shared) -> Vec<String> {
    let job = match codec::decode_job(request) {
        Ok(job) => job,
        Err(e) => {
            tracing::debug!("Emulator rejecting '{}': {}", request, e);
            return codec::peek_request_id(request)
                .map(|id| Response::error(id, INVALID_REQUEST_CODE, e.to_string()))
                .and_then(|response| codec::encode_response(&response).ok())
                .into_iter()
                .collect();
        }
    };

    let options = &shared.options;
    let mut lines = Vec::new();

    let response = if let Some(error) = &options.reject {
        Response::error(job.id(), error.code, error.message.clone())
    } else {
        let mut state = shared.state.lock();
        if job.method() == CommandKind::GetProp {
            let values = job
                .params()
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|name| name.parse::<Property>().ok())
                .map(|prop| state.read(prop))
                .collect();
            Response::ok(job.id(), values)
        } else {
            let changed = state.apply(&job);
            if options.notify && !changed.is_empty() {
                let params: Map<String, Value> = changed
                    .iter()
                    .map(|prop| (prop.as_str().to_string(), state.read(*prop)))
                    .collect();
                if let Ok(line) = codec::encode_notification(&Notification::props(params)) {
                    lines.push(line);
                }
            }
            Response::ok(job.id(), vec![json!("ok")])
        }
    };

    if options.silent {
        return lines;
    }
    if let Ok(line) = codec::encode_response(&response) {
        lines.push(line);
    }
    lines
}
