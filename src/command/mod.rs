//! Command Module
//!
//! Validated commands. Every value that can reach the wire passes through
//! here first:
//!
//! - `color`: RGB / color temperature / HSV ranges
//! - `effect`: fade effect and power state
//! - `flow`: color flow steps and their wire serialization
//! - `validator`: per-method checks of raw parameter lists

mod color;
mod effect;
mod flow;
mod validator;

pub use color::{ColorSpace, ColorSpec};
pub use effect::{FadeEffect, Power};
pub use flow::{FlowAction, FlowExpression, FlowMode, FlowStep, FIELDS_PER_STEP, KEEP_BRIGHTNESS};
pub use validator::{clamp_brightness, validate};

use serde_json::{json, Value};

use crate::error::{LightError, Result};
use crate::protocol::{CommandKind, Property};

/// A command whose parameters are known to be valid
///
/// Only obtainable through the constructors below or [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    inner: Inner,
}

#[derive(Debug, Clone, PartialEq)]
enum Inner {
    GetProp(Vec<Property>),
    Toggle,
    SetBright { brightness: u8, effect: FadeEffect },
    SetName(String),
    SetColor { color: ColorSpec, effect: FadeEffect },
    SetPower { power: Power, effect: FadeEffect },
    SetDefault,
    StartCf { flow: FlowExpression, action: FlowAction },
    StopCf,
}

impl Command {
    fn wrap(inner: Inner) -> Self {
        Self { inner }
    }

    /// Read one or more properties
    pub fn get_props(props: &[Property]) -> Result<Self> {
        if props.is_empty() {
            return Err(LightError::validation("get_prop needs at least one property"));
        }
        Ok(Self::wrap(Inner::GetProp(props.to_vec())))
    }

    pub fn toggle() -> Self {
        Self::wrap(Inner::Toggle)
    }

    /// Brightness is clamped to 0..=100 rather than rejected
    pub fn set_bright(brightness: i64, effect: FadeEffect) -> Result<Self> {
        Ok(Self::wrap(Inner::SetBright {
            brightness: clamp_brightness(brightness),
            effect: effect.validated()?,
        }))
    }

    pub fn set_name(name: impl Into<String>) -> Self {
        Self::wrap(Inner::SetName(name.into()))
    }

    /// Maps to `set_rgb`, `set_ct_abx` or `set_hsv` depending on the color model
    pub fn set_color(color: ColorSpec, effect: FadeEffect) -> Result<Self> {
        Ok(Self::wrap(Inner::SetColor {
            color: color.validated()?,
            effect: effect.validated()?,
        }))
    }

    pub fn set_power(power: Power, effect: FadeEffect) -> Result<Self> {
        Ok(Self::wrap(Inner::SetPower {
            power,
            effect: effect.validated()?,
        }))
    }

    pub fn set_default() -> Self {
        Self::wrap(Inner::SetDefault)
    }

    pub fn start_flow(flow: FlowExpression, action: FlowAction) -> Self {
        Self::wrap(Inner::StartCf { flow, action })
    }

    pub fn stop_flow() -> Self {
        Self::wrap(Inner::StopCf)
    }

    /// Wire method of this command
    pub fn kind(&self) -> CommandKind {
        match &self.inner {
            Inner::GetProp(_) => CommandKind::GetProp,
            Inner::Toggle => CommandKind::Toggle,
            Inner::SetBright { .. } => CommandKind::SetBright,
            Inner::SetName(_) => CommandKind::SetName,
            Inner::SetColor { color, .. } => match color {
                ColorSpec::Rgb(_) => CommandKind::SetRgb,
                ColorSpec::Ct(_) => CommandKind::SetCtAbx,
                ColorSpec::Hsv { .. } => CommandKind::SetHsv,
            },
            Inner::SetPower { .. } => CommandKind::SetPower,
            Inner::SetDefault => CommandKind::SetDefault,
            Inner::StartCf { .. } => CommandKind::StartCf,
            Inner::StopCf => CommandKind::StopCf,
        }
    }

    /// Properties requested by a `get_prop`, empty for every other command
    pub fn properties(&self) -> &[Property] {
        match &self.inner {
            Inner::GetProp(props) => props.as_slice(),
            _ => &[],
        }
    }

    /// Positional wire parameters
    pub fn to_params(&self) -> Vec<Value> {
        match &self.inner {
            Inner::GetProp(props) => props.iter().map(|p| json!(p.as_str())).collect(),
            Inner::Toggle | Inner::SetDefault | Inner::StopCf => Vec::new(),
            Inner::SetBright { brightness, effect } => {
                vec![json!(brightness), json!(effect.name()), json!(effect.duration_ms())]
            }
            Inner::SetName(name) => vec![json!(name)],
            Inner::SetColor { color, effect } => match color {
                ColorSpec::Rgb(value) | ColorSpec::Ct(value) => {
                    vec![json!(value), json!(effect.name()), json!(effect.duration_ms())]
                }
                ColorSpec::Hsv { hue, sat } => vec![
                    json!(hue),
                    json!(sat),
                    json!(effect.name()),
                    json!(effect.duration_ms()),
                ],
            },
            Inner::SetPower { power, effect } => {
                vec![json!(power.as_str()), json!(effect.name()), json!(effect.duration_ms())]
            }
            Inner::StartCf { flow, action } => {
                vec![json!(flow.len()), json!(action.index()), json!(flow.serialize())]
            }
        }
    }
}

