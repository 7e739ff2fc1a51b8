//! Raw parameter validation
//!
//! Turns a `(method, params)` pair as it would appear on the wire into a
//! [`Command`]. Used by `enqueue` for loosely typed input and by the codec
//! when decoding request lines.
//!
//! ## Accepted layouts
//! ```text
//! get_prop     prop, prop, ...
//! toggle       (none)
//! set_bright   brightness [, effect [, delay]]
//! set_name     name
//! set_rgb      rgb        [, effect [, delay]]
//! set_ct_abx   kelvin     [, effect [, delay]]
//! set_hsv      hue [, sat] [, effect [, delay]]
//! set_power    on|off     [, effect [, delay]]
//! set_default  (none)
//! start_cf     count, action, expression
//! stop_cf      (none)
//! ```

use std::str::FromStr;

use serde_json::Value;

use super::{ColorSpec, Command, FadeEffect, FlowAction, FlowExpression, Power};
use crate::error::{LightError, Result};
use crate::protocol::{CommandKind, Property};

/// Clamp a brightness to 0..=100
pub fn clamp_brightness(brightness: i64) -> u8 {
    brightness.clamp(0, 100) as u8
}

/// Validate raw params for `kind` and build the canonical command
pub fn validate(kind: CommandKind, params: &[Value]) -> Result<Command> {
    let args = Args { kind, params };

    match kind {
        CommandKind::GetProp => {
            if params.is_empty() {
                return Err(LightError::validation("get_prop needs at least one property"));
            }
            let props = (0..params.len())
                .map(|i| Property::from_str(args.str_at(i)?))
                .collect::<Result<Vec<_>>>()?;
            Command::get_props(&props)
        }
        CommandKind::Toggle => {
            args.arity(0, 0)?;
            Ok(Command::toggle())
        }
        CommandKind::SetDefault => {
            args.arity(0, 0)?;
            Ok(Command::set_default())
        }
        CommandKind::StopCf => {
            args.arity(0, 0)?;
            Ok(Command::stop_flow())
        }
        CommandKind::SetName => {
            args.arity(1, 1)?;
            Ok(Command::set_name(args.str_at(0)?))
        }
        CommandKind::SetBright => {
            args.arity(1, 3)?;
            Command::set_bright(args.int_at(0)?, args.effect_from(1)?)
        }
        CommandKind::SetRgb => {
            args.arity(1, 3)?;
            Command::set_color(ColorSpec::rgb(args.int_at(0)?)?, args.effect_from(1)?)
        }
        CommandKind::SetCtAbx => {
            args.arity(1, 3)?;
            Command::set_color(ColorSpec::ct(args.int_at(0)?)?, args.effect_from(1)?)
        }
        CommandKind::SetHsv => {
            args.arity(1, 4)?;
            let hue = args.int_at(0)?;
            // Saturation is optional; when present it is the only number after the hue
            let (sat, tail) = match params.get(1) {
                Some(Value::Number(_)) => (Some(args.int_at(1)?), 2),
                _ => (None, 1),
            };
            if params.len() > tail + 2 {
                return Err(args.too_many(tail + 2));
            }
            Command::set_color(ColorSpec::hsv(hue, sat)?, args.effect_from(tail)?)
        }
        CommandKind::SetPower => {
            args.arity(1, 3)?;
            let power = Power::from_str(args.str_at(0)?)?;
            Command::set_power(power, args.effect_from(1)?)
        }
        CommandKind::StartCf => {
            args.arity(3, 3)?;
            let count = args.int_at(0)?;
            let action = FlowAction::from_index(args.int_at(1)?)?;
            let flow = FlowExpression::parse(args.str_at(2)?)?;
            if count != flow.len() as i64 {
                return Err(LightError::validation(format!(
                    "start_cf count {} does not match the {} steps of the expression",
                    count,
                    flow.len()
                )));
            }
            Ok(Command::start_flow(flow, action))
        }
    }
}

/// Positional accessors over one raw param list
struct Args<'a> {
    kind: CommandKind,
    params: &'a [Value],
}

impl<'a> Args<'a> {
    fn arity(&self, min: usize, max: usize) -> Result<()> {
        if self.params.len() < min {
            return Err(LightError::validation(format!(
                "{} expects at least {} params, got {}",
                self.kind,
                min,
                self.params.len()
            )));
        }
        if self.params.len() > max {
            return Err(self.too_many(max));
        }
        Ok(())
    }

    fn too_many(&self, max: usize) -> LightError {
        LightError::validation(format!(
            "{} expects at most {} params, got {}",
            self.kind,
            max,
            self.params.len()
        ))
    }

    fn int_at(&self, index: usize) -> Result<i64> {
        self.params
            .get(index)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                LightError::validation(format!(
                    "{} param {} must be an integer, got {}",
                    self.kind,
                    index,
                    self.describe(index)
                ))
            })
    }

    fn str_at(&self, index: usize) -> Result<&'a str> {
        self.params
            .get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                LightError::validation(format!(
                    "{} param {} must be a string, got {}",
                    self.kind,
                    index,
                    self.describe(index)
                ))
            })
    }

    /// Optional `effect, delay` pair starting at `index`
    fn effect_from(&self, index: usize) -> Result<FadeEffect> {
        let effect = match self.params.get(index) {
            Some(_) => Some(self.str_at(index)?),
            None => None,
        };
        let delay = match self.params.get(index + 1) {
            Some(_) => Some(self.int_at(index + 1)?),
            None => None,
        };
        FadeEffect::parse(effect, delay)
    }

    fn describe(&self, index: usize) -> String {
        match self.params.get(index) {
            Some(value) => value.to_string(),
            None => "nothing".to_string(),
        }
    }
}
