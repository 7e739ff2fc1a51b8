//! Light Module
//!
//! The device handle that ties validation, the job queue, the session and
//! property reads together.
//!
//! ## Request paths
//! - **Deferred**: state changes go into the [`JobQueue`] and are sent by
//!   [`Light::commit`], one request line per job.
//! - **Immediate**: `get_prop` reads and `stop_cf` are sent right away and
//!   never touch the queue. Their ids come from a separate counter that
//!   starts at 1.

use std::net::SocketAddr;

use serde_json::Value;

use crate::command::{ColorSpace, ColorSpec, Command, FadeEffect, FlowAction, FlowExpression, Power};
use crate::config::Config;
use crate::error::{LightError, Result};
use crate::network::{Connection, ConnectionState, DiscoveredDevice, Session, Transport};
use crate::properties::{color_properties, ColorReading, PropertyValues};
use crate::protocol::{Job, Outcome, Property, Response};
use crate::queue::{CommitReport, JobQueue};

/// Client for one light
///
/// Generic over the [`Transport`] so the same validation and queueing logic
/// runs against a TCP [`Connection`] or a scripted test double.
#[derive(Debug)]
pub struct Light<T: Transport = Connection> {
    session: Session<T>,
    queue: JobQueue,
    config: Config,

    /// Id of the next immediate request
    next_direct_id: u64,
}

impl Light<Connection> {
    /// Connect to the light at `ip` on `config.port`
    pub fn connect(ip: &str, config: Config) -> Result<Self> {
        let connection = Connection::connect_with(ip, config.port, &config)?;
        Ok(Self::from_transport(connection, config))
    }

    /// Connect to a light found by discovery, using its advertised port
    pub fn connect_discovered(device: &DiscoveredDevice, config: Config) -> Result<Self> {
        let config = Config {
            port: device.port,
            ..config
        };
        Self::connect(&device.ip.to_string(), config)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.session.transport().peer_addr()
    }

    pub fn ip(&self) -> String {
        self.peer_addr().ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.peer_addr().port()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session.transport().state()
    }

    /// Close the connection; a second call fails with `AlreadyDisconnected`
    pub fn disconnect(&mut self) -> Result<()> {
        self.session.transport_mut().disconnect()
    }
}

impl<T: Transport> Light<T> {
    pub fn from_transport(transport: T, config: Config) -> Self {
        Self {
            session: Session::new(transport),
            queue: JobQueue::new(),
            config,
            next_direct_id: 1,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.session.transport()
    }

    pub fn into_transport(self) -> T {
        self.session.into_transport()
    }

    // =========================================================================
    // Deferred commands
    // =========================================================================

    /// Queue a command given as a raw method name and params
    pub fn enqueue(&mut self, method: &str, params: Vec<Value>) -> Result<&mut Self> {
        self.queue.enqueue(method, params)?;
        Ok(self)
    }

    /// Queue an already validated command
    ///
    /// `get_prop` and `stop_cf` are refused; use [`Self::get_prop`] and
    /// [`Self::stop_color_flow`] instead.
    pub fn push(&mut self, command: Command) -> Result<&mut Self> {
        self.queue.push(command)?;
        Ok(self)
    }

    fn defer(&mut self, command: Command) -> &mut Self {
        self.queue.append(command);
        self
    }

    pub fn toggle(&mut self) -> &mut Self {
        self.defer(Command::toggle())
    }

    /// Brightness, clamped to 0..=100, with the configured default effect
    pub fn set_brightness(&mut self, amount: i64) -> Result<&mut Self> {
        let effect = self.config.default_effect;
        self.set_brightness_with(amount, effect)
    }

    pub fn set_brightness_with(&mut self, amount: i64, effect: FadeEffect) -> Result<&mut Self> {
        Ok(self.defer(Command::set_bright(amount, effect)?))
    }

    pub fn set_color(&mut self, color: ColorSpec) -> Result<&mut Self> {
        let effect = self.config.default_effect;
        self.set_color_with(color, effect)
    }

    pub fn set_color_with(&mut self, color: ColorSpec, effect: FadeEffect) -> Result<&mut Self> {
        Ok(self.defer(Command::set_color(color, effect)?))
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.defer(Command::set_name(name))
    }

    pub fn set_power(&mut self, power: Power) -> Result<&mut Self> {
        let effect = self.config.default_effect;
        self.set_power_with(power, effect)
    }

    pub fn set_power_with(&mut self, power: Power, effect: FadeEffect) -> Result<&mut Self> {
        Ok(self.defer(Command::set_power(power, effect)?))
    }

    pub fn turn_on(&mut self) -> Result<&mut Self> {
        self.set_power(Power::On)
    }

    pub fn turn_off(&mut self) -> Result<&mut Self> {
        self.set_power(Power::Off)
    }

    /// Save the current state as the power-on default
    pub fn set_default(&mut self) -> &mut Self {
        self.defer(Command::set_default())
    }

    pub fn start_color_flow(&mut self, flow: FlowExpression, action: FlowAction) -> &mut Self {
        self.defer(Command::start_flow(flow, action))
    }

    pub fn pending_jobs(&self) -> &[Job] {
        self.queue.jobs()
    }

    /// Send all queued jobs
    ///
    /// The queue is empty afterwards, also when an error is returned.
    pub fn commit(&mut self) -> Result<CommitReport> {
        let report = self.queue.commit(&mut self.session, self.config.commit_policy)?;
        tracing::debug!(
            "Commit finished: {} job(s), succeeded={}",
            report.len(),
            report.succeeded()
        );
        Ok(report)
    }

    // =========================================================================
    // Immediate commands
    // =========================================================================

    /// Stop a running color flow right away
    pub fn stop_color_flow(&mut self) -> Result<()> {
        match self.send_now(&Command::stop_flow())? {
            Some(_) => Ok(()),
            None => {
                tracing::debug!("stop_cf got no reply, assuming it was applied");
                Ok(())
            }
        }
    }

    /// Read one property by name
    pub fn get_prop(&mut self, name: &str) -> Result<Value> {
        let prop: Property = name.parse()?;
        let values = self.read_props(&[prop])?;
        values
            .get(prop)
            .cloned()
            .ok_or_else(|| LightError::Protocol(format!("Property '{}' missing from reply", prop)))
    }

    /// Read several properties by name
    pub fn get_props(&mut self, names: &[&str]) -> Result<PropertyValues> {
        let props = names
            .iter()
            .map(|name| name.parse::<Property>())
            .collect::<Result<Vec<_>>>()?;
        self.read_props(&props)
    }

    /// Read several properties
    pub fn read_props(&mut self, props: &[Property]) -> Result<PropertyValues> {
        let command = Command::get_props(props)?;
        let id = self.next_direct_id;
        let result = self.send_now(&command)?.ok_or(LightError::NoResponse(id))?;
        PropertyValues::from_result(command.properties(), result)
    }

    pub fn brightness(&mut self) -> Result<u8> {
        self.read_props(&[Property::Bright])?.brightness()
    }

    pub fn color(&mut self, space: ColorSpace) -> Result<ColorReading> {
        self.read_props(color_properties(space))?.color(space)
    }

    pub fn name(&mut self) -> Result<String> {
        self.read_props(&[Property::Name])?.name()
    }

    pub fn is_on(&mut self) -> Result<bool> {
        self.read_props(&[Property::Power])?.power()
    }

    /// Liveness probe of the underlying transport
    pub fn is_online(&mut self) -> Result<bool> {
        self.session.transport_mut().is_online()
    }

    /// Send one command outside the queue
    ///
    /// Device errors are returned as `LightError::Device`; `Ok(None)` means no
    /// reply arrived in time.
    fn send_now(&mut self, command: &Command) -> Result<Option<Vec<Value>>> {
        let job = Job::new(self.next_direct_id, command);
        self.next_direct_id += 1;

        match self.session.request(&job)? {
            Some(Response {
                outcome: Outcome::Ok(result),
                ..
            }) => Ok(Some(result)),
            Some(Response {
                outcome: Outcome::Err(error),
                ..
            }) => Err(LightError::Device {
                code: error.code,
                message: error.message,
            }),
            None => Ok(None),
        }
    }
}
