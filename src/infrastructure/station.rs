use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::percept::{PumpState, Reading, PPM_WARNING};
use crate::domain::sources::ReadingSource;

/// Upper bound of the gas concentration during a leak (ppm)
const MAX_LEAK_PPM: f64 = 1500.0;
/// Healthy tank pressure band (kPa)
const NORMAL_PRESSURE: (f64, f64) = (800.0, 1200.0);
/// Pressure lost per tick while leaking (kPa)
const LEAK_PRESSURE_DROP: (f64, f64) = (5.0, 25.0);
/// Floor of the tank pressure during a leak (kPa)
const MIN_LEAK_PRESSURE: f64 = 400.0;
/// Per-tick ppm growth during a leak
const LEAK_PPM_RATE: (f64, f64) = (80.0, 120.0);
/// Probability that the pump is running during normal operation
const PUMP_ON_PROBABILITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Normal,
    Leak,
}

/// Simulated LPG filling station
///
/// Alternates a normal window of `normal_duration` ticks with a leak of
/// `leak_duration` ticks. During a leak the concentration rises roughly
/// linearly so a sensor walks through WARNING, DANGER and CRITICAL, while
/// tank pressure drops. At the end of a leak the station is reset.
#[derive(Debug)]
pub struct SimulatedStation {
    normal_duration: u32,
    leak_duration: u32,
    rng: StdRng,
    tick: u32,
    phase: Phase,
    phase_start: u32,
    ppm: f64,
    pressure: f64,
    pump_on: bool,
}

impl SimulatedStation {
    pub fn new(normal_duration: u32, leak_duration: u32) -> Self {
        Self::with_rng(normal_duration, leak_duration, StdRng::from_os_rng())
    }

    /// Reproducible station for a given seed
    pub fn seeded(normal_duration: u32, leak_duration: u32, seed: u64) -> Self {
        Self::with_rng(normal_duration, leak_duration, StdRng::seed_from_u64(seed))
    }

    fn with_rng(normal_duration: u32, leak_duration: u32, mut rng: StdRng) -> Self {
        let pressure = rng.random_range(950.0..1100.0);
        Self {
            normal_duration,
            leak_duration,
            rng,
            tick: 0,
            phase: Phase::Normal,
            phase_start: 0,
            ppm: 50.0,
            pressure,
            pump_on: true,
        }
    }

    #[cfg(test)]
    fn is_leaking(&self) -> bool {
        self.phase == Phase::Leak
    }

    fn advance(&mut self) {
        self.tick += 1;
        let elapsed = self.tick - self.phase_start;

        match self.phase {
            Phase::Normal => {
                self.simulate_normal();
                if elapsed >= self.normal_duration {
                    self.phase = Phase::Leak;
                    self.phase_start = self.tick;
                }
            }
            Phase::Leak => {
                self.simulate_leak(elapsed);
                if elapsed >= self.leak_duration {
                    self.reset_to_normal();
                }
            }
        }
    }

    fn simulate_normal(&mut self) {
        self.ppm = self.rng.random_range(0.0..PPM_WARNING);
        self.pressure += self.rng.random_range(-5.0_f64..=5.0);
        self.pressure = self.pressure.clamp(NORMAL_PRESSURE.0, NORMAL_PRESSURE.1);
        self.pump_on = self.rng.random_bool(PUMP_ON_PROBABILITY);
    }

    fn simulate_leak(&mut self, elapsed: u32) {
        let rate = self.rng.random_range(LEAK_PPM_RATE.0..=LEAK_PPM_RATE.1);
        self.ppm = (PPM_WARNING + f64::from(elapsed) * rate).min(MAX_LEAK_PPM);

        self.pressure -= self.rng.random_range(LEAK_PRESSURE_DROP.0..=LEAK_PRESSURE_DROP.1);
        self.pressure = self.pressure.max(MIN_LEAK_PRESSURE);

        // fuel keeps flowing during a leak
        self.pump_on = true;
    }

    fn reset_to_normal(&mut self) {
        self.phase = Phase::Normal;
        self.phase_start = self.tick;
        self.ppm = self.rng.random_range(30.0..100.0);
        self.pressure = self.rng.random_range(950.0..1100.0);
        self.pump_on = true;
    }
}

impl ReadingSource for SimulatedStation {
    fn next_reading(&mut self) -> Reading {
        self.advance();
        let pump = if self.pump_on {
            PumpState::On
        } else {
            PumpState::Off
        };
        Reading::new(round1(self.ppm), round1(self.pressure), pump)
    }

    fn name(&self) -> &str {
        "simulated-station"
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::percept::HazardLevel;

    #[test]
    fn normal_phase_stays_normal() {
        let mut station = SimulatedStation::seeded(4, 10, 1);

        for _ in 0..4 {
            let r = station.next_reading();
            assert!(r.gas_concentration >= 0.0 && r.gas_concentration <= PPM_WARNING);
            assert!((800.0..=1200.0).contains(&r.tank_pressure));
        }
        assert!(station.is_leaking());
    }

    #[test]
    fn leak_walks_through_every_hazard_level() {
        let mut station = SimulatedStation::seeded(4, 10, 42);
        for _ in 0..4 {
            station.next_reading();
        }

        let levels: Vec<HazardLevel> = (0..9)
            .map(|_| station.next_reading().percept().level)
            .collect();

        assert_eq!(levels[0], HazardLevel::Warning);
        assert!(levels.contains(&HazardLevel::Danger));
        assert_eq!(levels.last(), Some(&HazardLevel::Critical));
    }

    #[test]
    fn leak_keeps_pump_on_and_caps_values() {
        let mut station = SimulatedStation::seeded(1, 30, 9);
        station.next_reading();

        let mut last_pressure = f64::MAX;
        for _ in 0..29 {
            let r = station.next_reading();
            assert_eq!(r.pump_state, PumpState::On);
            assert!(r.gas_concentration <= MAX_LEAK_PPM);
            assert!(r.tank_pressure >= MIN_LEAK_PRESSURE);
            assert!(r.tank_pressure <= last_pressure);
            last_pressure = r.tank_pressure;
        }
    }

    #[test]
    fn station_resets_after_leak() {
        let mut station = SimulatedStation::seeded(2, 3, 5);
        for _ in 0..2 {
            station.next_reading();
        }
        for _ in 0..2 {
            station.next_reading();
        }
        let reset = station.next_reading();

        assert!(!station.is_leaking());
        assert!((30.0..=100.0).contains(&reset.gas_concentration));
        assert!((950.0..=1100.0).contains(&reset.tank_pressure));
    }

    #[test]
    fn same_seed_same_readings() {
        let mut a = SimulatedStation::seeded(4, 10, 123);
        let mut b = SimulatedStation::seeded(4, 10, 123);

        for _ in 0..20 {
            assert_eq!(a.next_reading(), b.next_reading());
        }
    }

    #[test]
    fn values_have_one_decimal() {
        let mut station = SimulatedStation::seeded(4, 10, 77);
        for _ in 0..15 {
            let r = station.next_reading();
            assert_eq!(round1(r.gas_concentration), r.gas_concentration);
            assert_eq!(round1(r.tank_pressure), r.tank_pressure);
        }
    }
}
