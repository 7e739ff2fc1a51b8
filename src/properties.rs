//! Property reads
//!
//! Decodes the positional result of a `get_prop` request into typed values.
//! The device reports every property as a string (`"100"`, `"on"`), plain
//! JSON numbers are accepted as well.

use serde_json::Value;

use crate::command::ColorSpace;
use crate::error::{LightError, Result};
use crate::protocol::Property;

/// Current color as reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorReading {
    /// Six lowercase hex digits, e.g. `ff0000`
    Rgb(String),
    Hsv { hue: u16, sat: u8 },
    Ct { ct: u32 },
}

/// Properties to request for a color read in the given space
pub fn color_properties(space: ColorSpace) -> &'static [Property] {
    match space {
        ColorSpace::Rgb => &[Property::Rgb],
        ColorSpace::Ct => &[Property::Ct],
        ColorSpace::Hsv => &[Property::Hue, Property::Sat],
    }
}

/// Values of one `get_prop` reply, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValues {
    values: Vec<(Property, Value)>,
}

impl PropertyValues {
    /// Pair a result array with the requested names
    pub fn from_result(props: &[Property], result: Vec<Value>) -> Result<Self> {
        if props.len() != result.len() {
            return Err(LightError::PropertyCountMismatch {
                expected: props.len(),
                actual: result.len(),
            });
        }
        Ok(Self {
            values: props.iter().copied().zip(result).collect(),
        })
    }

    pub fn get(&self, prop: Property) -> Option<&Value> {
        self.values.iter().find(|(p, _)| *p == prop).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Property, Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn raw(&self, prop: Property) -> Result<&Value> {
        self.get(prop)
            .ok_or_else(|| LightError::Protocol(format!("Property '{}' was not requested", prop)))
    }

    fn integer(&self, prop: Property) -> Result<i64> {
        let value = self.raw(prop)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            LightError::Protocol(format!("Property '{}' is not an integer: {}", prop, value))
        })
    }

    fn bounded(&self, prop: Property, max: i64) -> Result<i64> {
        let value = self.integer(prop)?;
        if !(0..=max).contains(&value) {
            return Err(LightError::Protocol(format!(
                "Property '{}' out of range: {} (max {})",
                prop, value, max
            )));
        }
        Ok(value)
    }

    /// Brightness, 0..=100
    pub fn brightness(&self) -> Result<u8> {
        Ok(self.bounded(Property::Bright, 100)? as u8)
    }

    /// `true` iff the device reports `"on"`
    pub fn power(&self) -> Result<bool> {
        Ok(self.raw(Property::Power)?.as_str() == Some("on"))
    }

    pub fn name(&self) -> Result<String> {
        match self.raw(Property::Name)? {
            Value::String(name) => Ok(name.clone()),
            other => Err(LightError::Protocol(format!("Property 'name' is not a string: {}", other))),
        }
    }

    /// RGB as six lowercase hex digits
    pub fn rgb_hex(&self) -> Result<String> {
        let rgb = self.bounded(Property::Rgb, 0xFF_FF_FF)?;
        Ok(format!("{:06x}", rgb))
    }

    pub fn ct(&self) -> Result<u32> {
        Ok(self.bounded(Property::Ct, u32::MAX as i64)? as u32)
    }

    pub fn hue(&self) -> Result<u16> {
        Ok(self.bounded(Property::Hue, 359)? as u16)
    }

    pub fn sat(&self) -> Result<u8> {
        Ok(self.bounded(Property::Sat, 100)? as u8)
    }

    /// Color in the requested space; the matching properties must have been read
    pub fn color(&self, space: ColorSpace) -> Result<ColorReading> {
        match space {
            ColorSpace::Rgb => Ok(ColorReading::Rgb(self.rgb_hex()?)),
            ColorSpace::Ct => Ok(ColorReading::Ct { ct: self.ct()? }),
            ColorSpace::Hsv => Ok(ColorReading::Hsv {
                hue: self.hue()?,
                sat: self.sat()?,
            }),
        }
    }
}
