//! Gauge status bands
//!
//! Each dashboard gauge colors its value against a warning and a critical
//! threshold. Direction matters: engine temperature gets worse as it rises,
//! fuel as it falls. Bands are checked at construction so a mis-ordered
//! threshold pair is a configuration error rather than a gauge that silently
//! never leaves normal.

use crate::model::BikeData;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display status of a gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeStatus {
    Normal,
    Warning,
    Critical,
}

/// Which end of the scale is the dangerous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HighIsBad,
    LowIsBad,
}

/// Error returned for an inconsistent threshold pair
#[derive(Debug, Error, PartialEq)]
pub enum GaugeError {
    #[error("gauge thresholds must be finite")]
    NotFinite,

    #[error("warning threshold {warning} does not precede critical threshold {critical}")]
    Misordered { warning: f64, critical: f64 },
}

/// A warning/critical threshold pair with a direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeBands {
    direction: Direction,
    warning: f64,
    critical: f64,
}

impl GaugeBands {
    /// Build a band pair, rejecting thresholds that are not ordered along
    /// the direction of danger.
    pub fn new(direction: Direction, warning: f64, critical: f64) -> Result<Self, GaugeError> {
        if !warning.is_finite() || !critical.is_finite() {
            return Err(GaugeError::NotFinite);
        }
        let ordered = match direction {
            Direction::HighIsBad => warning < critical,
            Direction::LowIsBad => warning > critical,
        };
        if !ordered {
            return Err(GaugeError::Misordered { warning, critical });
        }
        Ok(Self {
            direction,
            warning,
            critical,
        })
    }

    // Presets are ordered by inspection
    const fn preset(direction: Direction, warning: f64, critical: f64) -> Self {
        Self {
            direction,
            warning,
            critical,
        }
    }

    /// Classify a value against the bands
    pub fn status(&self, value: f64) -> GaugeStatus {
        match self.direction {
            Direction::HighIsBad => {
                if value >= self.critical {
                    GaugeStatus::Critical
                } else if value >= self.warning {
                    GaugeStatus::Warning
                } else {
                    GaugeStatus::Normal
                }
            }
            Direction::LowIsBad => {
                if value <= self.critical {
                    GaugeStatus::Critical
                } else if value <= self.warning {
                    GaugeStatus::Warning
                } else {
                    GaugeStatus::Normal
                }
            }
        }
    }
}

/// The gauges rendered on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GaugeKind {
    EngineTemp,
    Fuel,
    Battery,
    TirePressure,
    BrakeCondition,
    Vibration,
}

impl GaugeKind {
    pub const ALL: [GaugeKind; 6] = [
        GaugeKind::EngineTemp,
        GaugeKind::Fuel,
        GaugeKind::Battery,
        GaugeKind::TirePressure,
        GaugeKind::BrakeCondition,
        GaugeKind::Vibration,
    ];

    /// Factory bands for this gauge
    pub fn bands(&self) -> GaugeBands {
        match self {
            GaugeKind::EngineTemp => GaugeBands::preset(Direction::HighIsBad, 95.0, 110.0),
            GaugeKind::Fuel => GaugeBands::preset(Direction::LowIsBad, 20.0, 10.0),
            GaugeKind::Battery => GaugeBands::preset(Direction::LowIsBad, 50.0, 30.0),
            GaugeKind::TirePressure => GaugeBands::preset(Direction::LowIsBad, 28.0, 25.0),
            GaugeKind::BrakeCondition => GaugeBands::preset(Direction::LowIsBad, 40.0, 20.0),
            GaugeKind::Vibration => GaugeBands::preset(Direction::HighIsBad, 60.0, 80.0),
        }
    }

    /// Pull this gauge's value out of a snapshot.
    ///
    /// Tire pressure reads the worse of the two tires.
    pub fn value(&self, data: &BikeData) -> f64 {
        match self {
            GaugeKind::EngineTemp => data.engine_temp,
            GaugeKind::Fuel => data.fuel_level,
            GaugeKind::Battery => data.battery_health,
            GaugeKind::TirePressure => data.tire_pressure_front.min(data.tire_pressure_rear),
            GaugeKind::BrakeCondition => data.brake_condition,
            GaugeKind::Vibration => data.engine_vibration,
        }
    }
}

/// A gauge value with its classified status, as shipped in a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    pub kind: GaugeKind,
    pub value: f64,
    pub status: GaugeStatus,
}

/// Compute the full set of gauge readings for a snapshot
pub fn readings(data: &BikeData) -> Vec<GaugeReading> {
    GaugeKind::ALL
        .iter()
        .map(|kind| {
            let value = kind.value(data);
            GaugeReading {
                kind: *kind,
                value,
                status: kind.bands().status(value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_misordered_high_is_bad() {
        let err = GaugeBands::new(Direction::HighIsBad, 110.0, 95.0).unwrap_err();
        assert_eq!(
            err,
            GaugeError::Misordered {
                warning: 110.0,
                critical: 95.0
            }
        );
    }

    #[test]
    fn test_new_rejects_misordered_low_is_bad() {
        assert!(GaugeBands::new(Direction::LowIsBad, 10.0, 20.0).is_err());
        assert!(GaugeBands::new(Direction::LowIsBad, 20.0, 10.0).is_ok());
    }

    #[test]
    fn test_new_rejects_nan() {
        assert_eq!(
            GaugeBands::new(Direction::HighIsBad, f64::NAN, 110.0),
            Err(GaugeError::NotFinite)
        );
    }

    #[test]
    fn test_high_is_bad_status_boundaries() {
        let bands = GaugeBands::new(Direction::HighIsBad, 95.0, 110.0).unwrap();
        assert_eq!(bands.status(85.0), GaugeStatus::Normal);
        assert_eq!(bands.status(95.0), GaugeStatus::Warning);
        assert_eq!(bands.status(109.9), GaugeStatus::Warning);
        assert_eq!(bands.status(110.0), GaugeStatus::Critical);
    }

    #[test]
    fn test_low_is_bad_status_boundaries() {
        let bands = GaugeBands::new(Direction::LowIsBad, 20.0, 10.0).unwrap();
        assert_eq!(bands.status(50.0), GaugeStatus::Normal);
        assert_eq!(bands.status(20.0), GaugeStatus::Warning);
        assert_eq!(bands.status(10.0), GaugeStatus::Critical);
        assert_eq!(bands.status(0.0), GaugeStatus::Critical);
    }

    #[test]
    fn test_all_presets_pass_validation() {
        for kind in GaugeKind::ALL {
            let b = kind.bands();
            GaugeBands::new(b.direction, b.warning, b.critical)
                .unwrap_or_else(|e| panic!("preset for {:?} invalid: {}", kind, e));
        }
    }

    #[test]
    fn test_tire_pressure_reads_worse_tire() {
        let data = BikeData {
            tire_pressure_front: 31.0,
            tire_pressure_rear: 24.0,
            ..BikeData::default()
        };
        assert_eq!(GaugeKind::TirePressure.value(&data), 24.0);

        let readings = readings(&data);
        let tire = readings
            .iter()
            .find(|r| r.kind == GaugeKind::TirePressure)
            .unwrap();
        assert_eq!(tire.status, GaugeStatus::Critical);
    }

    #[test]
    fn test_default_snapshot_is_all_normal() {
        let data = BikeData::default();
        for reading in readings(&data) {
            assert_eq!(
                reading.status,
                GaugeStatus::Normal,
                "{:?} should be normal at startup",
                reading.kind
            );
        }
    }

    #[test]
    fn test_gauge_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&GaugeKind::EngineTemp).unwrap(),
            "\"engine-temp\""
        );
        assert_eq!(
            serde_json::to_string(&GaugeStatus::Warning).unwrap(),
            "\"warning\""
        );
    }
}
