//! Telemetry simulator for OpenMotoTelemetry

pub mod simulator;

pub use simulator::{
    gear_for_speed, SimConfig, SimError, Simulator, TelemetrySource, DEFAULT_TICK_INTERVAL,
};
