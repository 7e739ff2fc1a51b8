//! Color specifications
//!
//! The three color models the device accepts, each with its own value range.

use std::fmt;
use std::str::FromStr;

use crate::error::{LightError, Result};

pub const RGB_MAX: u32 = 0xFF_FF_FF;
pub const CT_MIN: u32 = 1700;
pub const CT_MAX: u32 = 6500;
pub const HUE_MAX: u16 = 359;
pub const SAT_MAX: u8 = 100;
pub const DEFAULT_SAT: u8 = 50;

/// Target color of a `set_rgb`, `set_ct_abx` or `set_hsv` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// 24-bit RGB value, 0..=16777215
    Rgb(u32),

    /// Color temperature in kelvin, 1700..=6500
    Ct(u32),

    /// Hue 0..=359, saturation 0..=100
    Hsv { hue: u16, sat: u8 },
}

impl ColorSpec {
    /// RGB color from a packed `0xRRGGBB` value
    pub fn rgb(value: i64) -> Result<Self> {
        if !(0..=RGB_MAX as i64).contains(&value) {
            return Err(LightError::validation(format!(
                "Invalid rgb value {}: must be in 0..={}",
                value, RGB_MAX
            )));
        }
        Ok(ColorSpec::Rgb(value as u32))
    }

    /// Color temperature in kelvin
    pub fn ct(value: i64) -> Result<Self> {
        if !(CT_MIN as i64..=CT_MAX as i64).contains(&value) {
            return Err(LightError::validation(format!(
                "Invalid color temperature {}: must be in {}..={}",
                value, CT_MIN, CT_MAX
            )));
        }
        Ok(ColorSpec::Ct(value as u32))
    }

    /// Hue and saturation; saturation defaults to 50 and is clamped to 0..=100
    pub fn hsv(hue: i64, sat: Option<i64>) -> Result<Self> {
        if !(0..=HUE_MAX as i64).contains(&hue) {
            return Err(LightError::validation(format!(
                "Invalid hue {}: must be in 0..={}",
                hue, HUE_MAX
            )));
        }
        let sat = match sat {
            Some(sat) => sat.clamp(0, SAT_MAX as i64) as u8,
            None => DEFAULT_SAT,
        };
        Ok(ColorSpec::Hsv {
            hue: hue as u16,
            sat,
        })
    }

    /// Re-check a value built directly from the enum variants
    pub fn validated(self) -> Result<Self> {
        match self {
            ColorSpec::Rgb(value) => ColorSpec::rgb(value as i64),
            ColorSpec::Ct(value) => ColorSpec::ct(value as i64),
            ColorSpec::Hsv { hue, sat } => ColorSpec::hsv(hue as i64, Some(sat as i64)),
        }
    }

    pub fn space(&self) -> ColorSpace {
        match self {
            ColorSpec::Rgb(_) => ColorSpace::Rgb,
            ColorSpec::Ct(_) => ColorSpace::Ct,
            ColorSpec::Hsv { .. } => ColorSpace::Hsv,
        }
    }
}

/// Color model selector, used for typed color reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Ct,
    Hsv,
}

impl ColorSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Ct => "ct",
            ColorSpace::Hsv => "hsv",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorSpace {
    type Err = LightError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rgb" => Ok(ColorSpace::Rgb),
            "ct" => Ok(ColorSpace::Ct),
            "hsv" => Ok(ColorSpace::Hsv),
            other => Err(LightError::validation(format!(
                "Invalid color type '{}': expected one of rgb, ct, hsv",
                other
            ))),
        }
    }
}
