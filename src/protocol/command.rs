//! Command definitions
//!
//! Method and property names accepted by the device, and the Job that carries
//! one validated command onto the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::Command;
use crate::error::LightError;

/// Methods understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    GetProp,
    Toggle,
    SetBright,
    SetName,
    SetRgb,
    SetCtAbx,
    SetHsv,
    SetPower,
    SetDefault,
    StartCf,
    StopCf,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        CommandKind::GetProp,
        CommandKind::Toggle,
        CommandKind::SetBright,
        CommandKind::SetName,
        CommandKind::SetRgb,
        CommandKind::SetCtAbx,
        CommandKind::SetHsv,
        CommandKind::SetPower,
        CommandKind::SetDefault,
        CommandKind::StartCf,
        CommandKind::StopCf,
    ];

    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::GetProp => "get_prop",
            CommandKind::Toggle => "toggle",
            CommandKind::SetBright => "set_bright",
            CommandKind::SetName => "set_name",
            CommandKind::SetRgb => "set_rgb",
            CommandKind::SetCtAbx => "set_ct_abx",
            CommandKind::SetHsv => "set_hsv",
            CommandKind::SetPower => "set_power",
            CommandKind::SetDefault => "set_default",
            CommandKind::StartCf => "start_cf",
            CommandKind::StopCf => "stop_cf",
        }
    }

    /// Whether the client sends this method right away instead of queueing it
    pub fn is_immediate(&self) -> bool {
        matches!(self, CommandKind::GetProp | CommandKind::StopCf)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = LightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LightError::UnknownMethod(s.to_string()))
    }
}

/// Readable device attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Bright,
    Rgb,
    Ct,
    Hue,
    Sat,
    Name,
    Power,
}

impl Property {
    pub const ALL: [Property; 7] = [
        Property::Bright,
        Property::Rgb,
        Property::Ct,
        Property::Hue,
        Property::Sat,
        Property::Name,
        Property::Power,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Bright => "bright",
            Property::Rgb => "rgb",
            Property::Ct => "ct",
            Property::Hue => "hue",
            Property::Sat => "sat",
            Property::Name => "name",
            Property::Power => "power",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = LightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .iter()
            .copied()
            .find(|prop| prop.as_str() == s)
            .ok_or_else(|| LightError::UnknownProperty(s.to_string()))
    }
}

/// One validated command with its request id
///
/// A Job can only be built from a [`Command`], so its params always satisfy
/// the method's signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    id: u64,
    method: CommandKind,
    params: Vec<Value>,
}

impl Job {
    pub fn new(id: u64, command: &Command) -> Self {
        Self {
            id,
            method: command.kind(),
            params: command.to_params(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> CommandKind {
        self.method
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
