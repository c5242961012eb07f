//! OpenMotoTelemetry Core Library
//!
//! This crate provides the bike telemetry data model, the rule-based fault
//! engine, and the gauge status bands shared by the simulator and the server.

pub mod fault;
pub mod gauge;
pub mod model;

pub use fault::{Fault, FaultKind, FaultMonitor, FaultRules, Severity};
pub use model::{BikeData, DashboardFrame, FieldMask};
