use crate::domain::percept::{PumpState, Reading};
use crate::domain::sources::ReadingSource;

/// Nominal tank pressure reported alongside scripted concentrations (kPa)
const SCRIPTED_PRESSURE: f64 = 1000.0;

/// Replays a fixed ppm sequence
///
/// Once the sequence is exhausted the last value repeats. An empty script
/// reads 0 ppm forever.
#[derive(Debug, Clone)]
pub struct ScriptedReadings {
    ppm: Vec<f64>,
    cursor: usize,
}

impl ScriptedReadings {
    pub fn new(ppm: impl Into<Vec<f64>>) -> Self {
        Self {
            ppm: ppm.into(),
            cursor: 0,
        }
    }

    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.ppm.len().saturating_sub(self.cursor)
    }
}

impl ReadingSource for ScriptedReadings {
    fn next_reading(&mut self) -> Reading {
        let ppm = match self.ppm.get(self.cursor) {
            Some(value) => {
                self.cursor += 1;
                *value
            }
            None => self.ppm.last().copied().unwrap_or(0.0),
        };
        Reading::new(ppm, SCRIPTED_PRESSURE, PumpState::On)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
