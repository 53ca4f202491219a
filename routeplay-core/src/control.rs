//! Control commands
//!
//! The control surface hands the engine one of three commands. Speed
//! multipliers are validated here, at the boundary, so the clock never has to.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated playback speed multiplier (finite, > 0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SpeedMultiplier(f64);

impl SpeedMultiplier {
    pub const NORMAL: SpeedMultiplier = SpeedMultiplier(1.0);

    pub fn new(value: f64) -> Result<Self, ControlError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ControlError::InvalidSpeed(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for SpeedMultiplier {
    type Error = ControlError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for SpeedMultiplier {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for SpeedMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// A user command from the control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    Play,
    Pause,
    SetSpeed(SpeedMultiplier),
    Restart,
}

impl FromStr for Command {
    type Err = ControlError;

    /// Parse the text form: `toggle-play`, `play`, `pause`,
    /// `set-speed <multiplier>`, `restart`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "toggle-play" | "toggle" => Ok(Command::TogglePlay),
            "play" => Ok(Command::Play),
            "pause" => Ok(Command::Pause),
            "restart" => Ok(Command::Restart),
            "set-speed" | "speed" => {
                let arg = parts
                    .next()
                    .ok_or(ControlError::MissingArgument("set-speed"))?;
                let value = arg
                    .trim_end_matches('x')
                    .parse::<f64>()
                    .map_err(|_| ControlError::InvalidSpeed(f64::NAN))?;
                Ok(Command::SetSpeed(SpeedMultiplier::new(value)?))
            }
            other => Err(ControlError::UnknownCommand(other.to_string())),
        }
    }
}
