//! Bike telemetry data model
//!
//! Defines the `BikeData` snapshot produced by the simulator on every tick,
//! the `DashboardFrame` broadcast to consumers, and field masking for
//! selective output.
//!
//! Every bounded field is kept inside its documented range by the producer;
//! `validate` re-checks those ranges so a malformed snapshot is rejected at
//! construction instead of leaking into the derivation rules.

use crate::fault::Fault;
use crate::gauge::GaugeReading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// One telemetry snapshot. Mutated in place by the simulator each tick;
/// everyone else sees it as an immutable copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BikeData {
    /// Road speed in km/h (0-180), stored as a whole number
    pub speed: f64,

    /// Engine speed (0 at standstill, 800-9000 while moving), whole number
    pub rpm: f64,

    /// Current gear (0 = neutral, 1-6), derived from speed bands
    pub gear: u8,

    /// Engine temperature in °C (25-130)
    pub engine_temp: f64,

    /// Fuel level in percent (0-100), never increases while riding
    pub fuel_level: f64,

    /// Battery health in percent (0-100)
    pub battery_health: f64,

    /// Front tire pressure in PSI (20-40)
    pub tire_pressure_front: f64,

    /// Rear tire pressure in PSI (20-40)
    pub tire_pressure_rear: f64,

    /// Brake pad condition in percent (0-100)
    pub brake_condition: f64,

    /// Engine vibration level (0-100)
    pub engine_vibration: f64,

    /// Odometer in km, never decreases
    pub total_distance: f64,

    /// GPS latitude in degrees
    pub lat: f64,

    /// GPS longitude in degrees
    pub lng: f64,
}

impl Default for BikeData {
    /// The fixed startup snapshot: parked, warm engine, mid-tank.
    fn default() -> Self {
        Self {
            speed: 0.0,
            rpm: 0.0,
            gear: 0,
            engine_temp: 85.0,
            fuel_level: 72.0,
            battery_health: 94.0,
            tire_pressure_front: 32.0,
            tire_pressure_rear: 30.0,
            brake_condition: 88.0,
            engine_vibration: 12.0,
            total_distance: 12847.0,
            lat: 28.6139,
            lng: 77.2090,
        }
    }
}

/// Error returned when a snapshot fails range validation
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} is {value}, outside the allowed range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ModelError> {
    if !value.is_finite() {
        return Err(ModelError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ModelError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl BikeData {
    /// Check every field against its documented range.
    ///
    /// The simulator calls this when constructed from a caller-supplied
    /// snapshot, so bad input surfaces as a configuration error up front.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_range("speed", self.speed, 0.0, 180.0)?;
        check_range("rpm", self.rpm, 0.0, 9000.0)?;
        if self.gear > 6 {
            return Err(ModelError::OutOfRange {
                field: "gear",
                value: f64::from(self.gear),
                min: 0.0,
                max: 6.0,
            });
        }
        check_range("engine_temp", self.engine_temp, 25.0, 130.0)?;
        check_range("fuel_level", self.fuel_level, 0.0, 100.0)?;
        check_range("battery_health", self.battery_health, 0.0, 100.0)?;
        check_range("tire_pressure_front", self.tire_pressure_front, 20.0, 40.0)?;
        check_range("tire_pressure_rear", self.tire_pressure_rear, 20.0, 40.0)?;
        check_range("brake_condition", self.brake_condition, 0.0, 100.0)?;
        check_range("engine_vibration", self.engine_vibration, 0.0, 100.0)?;
        if !self.total_distance.is_finite() {
            return Err(ModelError::NotFinite {
                field: "total_distance",
            });
        }
        if self.total_distance < 0.0 {
            return Err(ModelError::Negative {
                field: "total_distance",
                value: self.total_distance,
            });
        }
        check_range("lat", self.lat, -90.0, 90.0)?;
        check_range("lng", self.lng, -180.0, 180.0)?;
        Ok(())
    }
}

/// One frame of the dashboard state, broadcast after every tick.
///
/// The fault list is always computed against the `data` carried in the same
/// frame, never against a half-updated snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardFrame {
    /// When this frame was produced
    pub timestamp: DateTime<Utc>,

    /// Monotonic tick counter since startup
    pub tick: u64,

    /// Whether the ride toggle was on when this frame was produced
    pub riding: bool,

    /// The telemetry snapshot
    pub data: BikeData,

    /// Faults active as of this snapshot
    pub faults: Vec<Fault>,

    /// Per-gauge status derived from this snapshot
    pub gauges: Vec<GaugeReading>,
}

// === Field Masking for Selective Output ===

/// Specifies which telemetry fields to include in serialized output
///
/// Lets a stream consumer subscribe to just the fields it renders instead
/// of the full frame.
#[derive(Debug, Clone, Default)]
pub struct FieldMask {
    fields: HashSet<String>,
    include_all: bool,
}

impl FieldMask {
    /// Create a mask that includes all fields
    pub fn all() -> Self {
        Self {
            fields: HashSet::new(),
            include_all: true,
        }
    }

    /// Create a mask from a comma-separated list of field names
    pub fn parse(fields: &str) -> Self {
        let fields: HashSet<String> = fields
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            fields,
            include_all: false,
        }
    }

    /// Check if a field should be included
    pub fn includes(&self, field: &str) -> bool {
        self.include_all || self.fields.contains(&field.to_lowercase())
    }

    /// Check if all fields should be included
    pub fn is_all(&self) -> bool {
        self.include_all
    }
}

impl FromStr for FieldMask {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl DashboardFrame {
    /// Serialize this frame respecting the given field mask
    ///
    /// If mask is None or includes all fields, serialize everything.
    /// Timestamp, tick, and the riding flag are always included; telemetry
    /// fields land under `data`, and `faults`/`gauges` are selectable as
    /// whole sections.
    pub fn to_json_filtered(&self, mask: Option<&FieldMask>) -> serde_json::Result<String> {
        let mask = match mask {
            None => return serde_json::to_string(self),
            Some(m) if m.is_all() => return serde_json::to_string(self),
            Some(m) => m,
        };

        let mut map = serde_json::Map::new();
        map.insert(
            "timestamp".to_string(),
            serde_json::to_value(self.timestamp)?,
        );
        map.insert("tick".to_string(), serde_json::to_value(self.tick)?);
        map.insert("riding".to_string(), serde_json::to_value(self.riding)?);

        let d = &self.data;
        let fields: [(&str, serde_json::Value); 13] = [
            ("speed", d.speed.into()),
            ("rpm", d.rpm.into()),
            ("gear", d.gear.into()),
            ("engine_temp", d.engine_temp.into()),
            ("fuel_level", d.fuel_level.into()),
            ("battery_health", d.battery_health.into()),
            ("tire_pressure_front", d.tire_pressure_front.into()),
            ("tire_pressure_rear", d.tire_pressure_rear.into()),
            ("brake_condition", d.brake_condition.into()),
            ("engine_vibration", d.engine_vibration.into()),
            ("total_distance", d.total_distance.into()),
            ("lat", d.lat.into()),
            ("lng", d.lng.into()),
        ];

        let mut data = serde_json::Map::new();
        for (name, value) in fields {
            if mask.includes(name) {
                data.insert(name.to_string(), value);
            }
        }
        if !data.is_empty() {
            map.insert("data".to_string(), serde_json::Value::Object(data));
        }

        if mask.includes("faults") {
            map.insert("faults".to_string(), serde_json::to_value(&self.faults)?);
        }
        if mask.includes("gauges") {
            map.insert("gauges".to_string(), serde_json::to_value(&self.gauges)?);
        }

        serde_json::to_string(&map)
    }
}
