//! Color flow expressions
//!
//! A color flow is a list of timed steps the device runs on its own. On the
//! wire the steps travel as one flat comma-separated integer list:
//!
//! ```text
//! duration,mode,value,brightness,duration,mode,value,brightness,...
//! ```

use std::fmt;
use std::str::FromStr;

use super::color::{CT_MAX, CT_MIN, RGB_MAX};
use crate::error::{LightError, Result};

/// Number of integers per step in the serialized form
pub const FIELDS_PER_STEP: usize = 4;

/// Brightness value meaning "leave brightness alone" for this step
pub const KEEP_BRIGHTNESS: i64 = -1;

/// What a flow step changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlowMode {
    Color = 1,
    ColorTemperature = 2,
    Sleep = 7,
}

impl FlowMode {
    pub fn code(&self) -> i64 {
        *self as u8 as i64
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(FlowMode::Color),
            2 => Ok(FlowMode::ColorTemperature),
            7 => Ok(FlowMode::Sleep),
            other => Err(LightError::validation(format!(
                "Invalid flow mode {}: expected 1, 2 or 7",
                other
            ))),
        }
    }
}

/// What the device does once the flow has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowAction {
    /// Go back to the state before the flow started
    #[default]
    Recover,

    /// Keep the state of the last step
    Stay,

    /// Turn the light off
    TurnOff,
}

impl FlowAction {
    const ORDER: [FlowAction; 3] = [FlowAction::Recover, FlowAction::Stay, FlowAction::TurnOff];

    /// Position in the fixed `recover, stay, off` order, which is the wire value
    pub fn index(&self) -> u8 {
        match self {
            FlowAction::Recover => 0,
            FlowAction::Stay => 1,
            FlowAction::TurnOff => 2,
        }
    }

    pub fn from_index(index: i64) -> Result<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ORDER.get(i).copied())
            .ok_or_else(|| {
                LightError::validation(format!("Invalid flow action index {}: expected 0..=2", index))
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowAction::Recover => "recover",
            FlowAction::Stay => "stay",
            FlowAction::TurnOff => "off",
        }
    }
}

impl fmt::Display for FlowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowAction {
    type Err = LightError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "recover" => Ok(FlowAction::Recover),
            "stay" => Ok(FlowAction::Stay),
            "off" | "turn_off" => Ok(FlowAction::TurnOff),
            other => Err(LightError::validation(format!(
                "Invalid flow action '{}': expected recover, stay or off",
                other
            ))),
        }
    }
}

/// One step of a color flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    pub duration_ms: i64,
    pub mode: FlowMode,
    pub value: i64,
    /// -1 to keep the current brightness, otherwise 1..=100
    pub brightness: i64,
}

impl FlowStep {
    pub fn new(duration_ms: i64, mode: FlowMode, value: i64, brightness: i64) -> Result<Self> {
        let step = Self {
            duration_ms,
            mode,
            value,
            brightness,
        };
        step.check()?;
        Ok(step)
    }

    /// Color step
    pub fn color(duration_ms: i64, rgb: i64, brightness: i64) -> Result<Self> {
        Self::new(duration_ms, FlowMode::Color, rgb, brightness)
    }

    /// Color temperature step
    pub fn temperature(duration_ms: i64, kelvin: i64, brightness: i64) -> Result<Self> {
        Self::new(duration_ms, FlowMode::ColorTemperature, kelvin, brightness)
    }

    /// Pause; value and brightness are ignored by the device
    pub fn sleep(duration_ms: i64) -> Self {
        Self {
            duration_ms,
            mode: FlowMode::Sleep,
            value: 0,
            brightness: KEEP_BRIGHTNESS,
        }
    }

    /// Parse one raw `[duration, mode, value, brightness]` row
    pub fn from_fields(fields: &[i64]) -> Result<Self> {
        if fields.len() != FIELDS_PER_STEP {
            return Err(LightError::validation(format!(
                "Flow step must have exactly {} fields, got {}",
                FIELDS_PER_STEP,
                fields.len()
            )));
        }
        let mode = FlowMode::from_code(fields[1])?;
        Self::new(fields[0], mode, fields[2], fields[3])
    }

    fn check(&self) -> Result<()> {
        if self.brightness != KEEP_BRIGHTNESS && !(1..=100).contains(&self.brightness) {
            return Err(LightError::validation(format!(
                "Invalid flow brightness {}: must be -1 or in 1..=100",
                self.brightness
            )));
        }

        let in_range = match self.mode {
            FlowMode::Color => (0..=RGB_MAX as i64).contains(&self.value),
            FlowMode::ColorTemperature => (CT_MIN as i64..=CT_MAX as i64).contains(&self.value),
            FlowMode::Sleep => true,
        };
        if !in_range {
            return Err(LightError::validation(format!(
                "Invalid flow value {} for mode {}",
                self.value,
                self.mode.code()
            )));
        }

        Ok(())
    }

    fn fields(&self) -> [i64; FIELDS_PER_STEP] {
        [self.duration_ms, self.mode.code(), self.value, self.brightness]
    }
}

/// A validated, non-empty sequence of flow steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowExpression {
    steps: Vec<FlowStep>,
}

impl FlowExpression {
    pub fn new(steps: Vec<FlowStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(LightError::validation("Flow expression must contain at least one step"));
        }
        for step in &steps {
            step.check()?;
        }
        Ok(Self { steps })
    }

    /// Build from raw rows of four integers each
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self> {
        let steps = rows
            .iter()
            .map(|row| FlowStep::from_fields(row.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(steps)
    }

    /// Parse the flat comma-separated wire form
    pub fn parse(expression: &str) -> Result<Self> {
        let fields = expression
            .split(',')
            .map(|field| {
                field.trim().parse::<i64>().map_err(|_| {
                    LightError::validation(format!("Flow field '{}' is not an integer", field.trim()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if fields.len() % FIELDS_PER_STEP != 0 {
            return Err(LightError::validation(format!(
                "Flow expression has {} fields, not a multiple of {}",
                fields.len(),
                FIELDS_PER_STEP
            )));
        }

        Self::from_rows(&fields.chunks(FIELDS_PER_STEP).collect::<Vec<_>>())
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Flatten every step's four fields and join them with commas
    pub fn serialize(&self) -> String {
        self.steps
            .iter()
            .flat_map(|step| step.fields())
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for FlowExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
