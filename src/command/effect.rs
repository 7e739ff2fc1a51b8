//! Fade effects and power states

use std::fmt;
use std::str::FromStr;

use crate::error::{LightError, Result};

/// Transition applied to a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEffect {
    /// Gradual change over `duration_ms` (30..=3000)
    Smooth { duration_ms: u16 },

    /// Immediate change
    Sudden,
}

impl FadeEffect {
    pub const DEFAULT_DURATION_MS: u16 = 300;
    pub const MIN_DURATION_MS: u16 = 30;
    pub const MAX_DURATION_MS: u16 = 3000;

    /// Smooth fade with a checked duration
    pub fn smooth(duration_ms: i64) -> Result<Self> {
        let range = Self::MIN_DURATION_MS as i64..=Self::MAX_DURATION_MS as i64;
        if !range.contains(&duration_ms) {
            return Err(LightError::validation(format!(
                "Invalid fade delay {}: must be in {}..={}",
                duration_ms,
                Self::MIN_DURATION_MS,
                Self::MAX_DURATION_MS
            )));
        }
        Ok(FadeEffect::Smooth {
            duration_ms: duration_ms as u16,
        })
    }

    pub fn sudden() -> Self {
        FadeEffect::Sudden
    }

    /// Build an effect from loosely specified parts
    ///
    /// No effect means smooth; smooth without a delay means 300 ms; a delay
    /// given with `sudden` is dropped.
    pub fn parse(effect: Option<&str>, delay_ms: Option<i64>) -> Result<Self> {
        match effect.unwrap_or("smooth") {
            "smooth" => match delay_ms {
                Some(delay) => FadeEffect::smooth(delay),
                None => Ok(FadeEffect::default()),
            },
            "sudden" => Ok(FadeEffect::Sudden),
            other => Err(LightError::validation(format!(
                "Invalid effect '{}': expected smooth or sudden",
                other
            ))),
        }
    }

    /// Re-check a value built directly from the enum variants
    pub fn validated(self) -> Result<Self> {
        match self {
            FadeEffect::Smooth { duration_ms } => FadeEffect::smooth(duration_ms as i64),
            FadeEffect::Sudden => Ok(FadeEffect::Sudden),
        }
    }

    /// Wire name of the effect
    pub fn name(&self) -> &'static str {
        match self {
            FadeEffect::Smooth { .. } => "smooth",
            FadeEffect::Sudden => "sudden",
        }
    }

    /// Duration sent on the wire; `sudden` has none and sends 0
    pub fn duration_ms(&self) -> u16 {
        match self {
            FadeEffect::Smooth { duration_ms } => *duration_ms,
            FadeEffect::Sudden => 0,
        }
    }
}

impl Default for FadeEffect {
    fn default() -> Self {
        FadeEffect::Smooth {
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }
}

/// Requested power state for `set_power`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn as_str(&self) -> &'static str {
        match self {
            Power::On => "on",
            Power::Off => "off",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Power::On)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Power {
    type Err = LightError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "on" => Ok(Power::On),
            "off" => Ok(Power::Off),
            other => Err(LightError::validation(format!(
                "Invalid power state '{}': expected on or off",
                other
            ))),
        }
    }
}
