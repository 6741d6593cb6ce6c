use serde::{Deserialize, Serialize};
use std::fmt;

use super::hazard::{classify, to_event, EventTag, HazardLevel};

/// Dispensing pump state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PumpState {
    On,
    Off,
}

impl fmt::Display for PumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PumpState::On => write!(f, "ON"),
            PumpState::Off => write!(f, "OFF"),
        }
    }
}

/// One poll of the station instruments
///
/// Produced once per tick by a [`ReadingSource`](crate::domain::sources::ReadingSource)
/// and never mutated afterwards. Only `gas_concentration` takes part in
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// LPG concentration in ppm
    pub gas_concentration: f64,
    /// Storage tank pressure in kPa
    pub tank_pressure: f64,
    pub pump_state: PumpState,
}

impl Reading {
    pub fn new(gas_concentration: f64, tank_pressure: f64, pump_state: PumpState) -> Self {
        Self {
            gas_concentration,
            tank_pressure,
            pump_state,
        }
    }

    /// Classifies this reading into a percept
    pub fn percept(&self) -> Percept {
        let level = classify(self.gas_concentration);
        Percept {
            level,
            event: to_event(level),
        }
    }
}

/// Classified observation derived from a [`Reading`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percept {
    pub level: HazardLevel,
    pub event: EventTag,
}
