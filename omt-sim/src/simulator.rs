//! Bike telemetry simulator
//!
//! Derives the next `BikeData` snapshot from the previous one, the riding
//! flag, and bounded uniform jitter. The caller owns the clock and drives
//! `sample` at a fixed cadence; given a seed, the produced sequence is fully
//! deterministic.
//!
//! Each bounded field is clamped to its documented range after every update,
//! then rounded to its stored precision so repeated reads between ticks are
//! stable.

use omt_core::model::{BikeData, ModelError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use thiserror::Error;

/// Reference tick cadence
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Simulator configuration
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Cadence the caller drives `sample` at; must be non-zero
    pub tick_interval: Duration,

    /// Fixed RNG seed; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            seed: None,
        }
    }
}

/// Construction errors
#[derive(Debug, Error)]
pub enum SimError {
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("invalid initial snapshot: {0}")]
    InvalidSnapshot(#[from] ModelError),
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick_interval.is_zero() {
            return Err(SimError::ZeroTickInterval);
        }
        Ok(())
    }
}

/// Source of telemetry snapshots, one per tick
///
/// The tick loop talks to its source through this trait, so tests can drive
/// it with scripted readings instead of the simulator.
pub trait TelemetrySource: Send + Sync {
    /// Advance one tick and return the new snapshot
    fn sample(&mut self, riding: bool) -> BikeData;

    /// The latest snapshot, without advancing
    fn current(&self) -> BikeData;
}

/// The telemetry simulator. Owns the single mutable snapshot and the
/// random source feeding its jitter.
pub struct Simulator {
    data: BikeData,
    rng: StdRng,
    config: SimConfig,
}

impl Simulator {
    /// Start from the fixed default snapshot
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Self::from_snapshot(BikeData::default(), config)
    }

    /// Start from a caller-supplied snapshot, validated up front
    pub fn from_snapshot(data: BikeData, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        data.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { data, rng, config })
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }
}

impl TelemetrySource for Simulator {
    fn sample(&mut self, riding: bool) -> BikeData {
        self.data = advance(&self.data, riding, &mut self.rng);
        self.data
    }

    fn current(&self) -> BikeData {
        self.data
    }
}

/// Uniform noise in ±range/2
fn jitter(rng: &mut StdRng, range: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * range
}

/// Round to one decimal, the stored precision of most analog fields
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Gear from road speed: neutral at a standstill, then fixed speed bands
pub fn gear_for_speed(speed: f64) -> u8 {
    if speed == 0.0 {
        0
    } else if speed < 20.0 {
        1
    } else if speed < 40.0 {
        2
    } else if speed < 65.0 {
        3
    } else if speed < 90.0 {
        4
    } else if speed < 120.0 {
        5
    } else {
        6
    }
}

/// One derivation step. Pure given the random source.
///
/// Gear, rpm, and the odometer increment are derived from the pre-rounding
/// speed; the snapshot stores the rounded value.
fn advance(prev: &BikeData, riding: bool, rng: &mut StdRng) -> BikeData {
    let speed = if riding {
        // Drift toward cruising pace below 40, then hold and jitter in place
        let base = if prev.speed < 40.0 {
            prev.speed + 2.0
        } else {
            prev.speed
        };
        (base + jitter(rng, 8.0)).clamp(0.0, 180.0)
    } else {
        // Engine braking to a stop
        (prev.speed - 3.0).clamp(0.0, 180.0)
    };

    let rpm = if speed > 0.0 {
        (speed * 45.0 + jitter(rng, 200.0)).clamp(800.0, 9000.0)
    } else {
        0.0
    };

    let engine_temp = if riding {
        (prev.engine_temp + 0.1 + jitter(rng, 2.0)).clamp(70.0, 130.0)
    } else {
        (prev.engine_temp - 0.3 + jitter(rng, 1.0)).clamp(25.0, 130.0)
    };

    let fuel_level = if riding {
        (prev.fuel_level - 0.02).clamp(0.0, 100.0)
    } else {
        prev.fuel_level
    };

    BikeData {
        speed: speed.round(),
        rpm: rpm.round(),
        gear: gear_for_speed(speed),
        engine_temp: round1(engine_temp),
        fuel_level: round1(fuel_level),
        battery_health: (prev.battery_health + jitter(rng, 0.3)).clamp(0.0, 100.0),
        tire_pressure_front: round1((prev.tire_pressure_front + jitter(rng, 0.2)).clamp(20.0, 40.0)),
        tire_pressure_rear: round1((prev.tire_pressure_rear + jitter(rng, 0.2)).clamp(20.0, 40.0)),
        brake_condition: round1((prev.brake_condition + jitter(rng, 0.1)).clamp(0.0, 100.0)),
        engine_vibration: round1((prev.engine_vibration + jitter(rng, 1.0)).clamp(0.0, 100.0)),
        total_distance: round1(
            prev.total_distance + if riding { speed / 3600.0 } else { 0.0 },
        ),
        lat: prev.lat + if riding { jitter(rng, 0.0005) } else { 0.0 },
        lng: prev.lng + if riding { jitter(rng, 0.0005) } else { 0.0 },
    }
}
