//! Rule-based fault detection
//!
//! Maps a telemetry snapshot to the set of currently-active faults. Fault
//! identity is the `FaultKind`, so re-detecting the same condition never
//! duplicates an alert, and a fault leaves the active set exactly when its
//! triggering condition stops holding. Thresholds live in `FaultRules`,
//! which is validated before use.

use crate::model::BikeData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Alert severity, ordered least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// The closed set of detectable fault conditions.
///
/// Doubles as the fault id: each variant serializes to the stable
/// kebab-case id used on the wire and in dismiss requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultKind {
    EngineOverheat,
    LowFuel,
    BrakeWear,
    TirePressure,
    Vibration,
    BatteryLow,
}

impl FaultKind {
    pub const ALL: [FaultKind; 6] = [
        FaultKind::EngineOverheat,
        FaultKind::LowFuel,
        FaultKind::BrakeWear,
        FaultKind::TirePressure,
        FaultKind::Vibration,
        FaultKind::BatteryLow,
    ];

    /// Stable string id
    pub fn id(&self) -> &'static str {
        match self {
            FaultKind::EngineOverheat => "engine-overheat",
            FaultKind::LowFuel => "low-fuel",
            FaultKind::BrakeWear => "brake-wear",
            FaultKind::TirePressure => "tire-pressure",
            FaultKind::Vibration => "vibration",
            FaultKind::BatteryLow => "battery-low",
        }
    }

    /// Which part of the bike the alert points at
    pub fn component(&self) -> &'static str {
        match self {
            FaultKind::EngineOverheat | FaultKind::Vibration => "Engine",
            FaultKind::LowFuel => "Fuel",
            FaultKind::BrakeWear => "Brakes",
            FaultKind::TirePressure => "Tires",
            FaultKind::BatteryLow => "Battery",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            FaultKind::EngineOverheat => "Engine temperature critically high",
            FaultKind::LowFuel => "Fuel level critically low",
            FaultKind::BrakeWear => "Brake pads significantly worn",
            FaultKind::TirePressure => "Tire pressure below safe threshold",
            FaultKind::Vibration => "Abnormal engine vibration detected",
            FaultKind::BatteryLow => "Battery health degraded",
        }
    }

    fn solution(&self) -> &'static str {
        match self {
            FaultKind::EngineOverheat => {
                "Stop riding immediately. Let the engine cool down. Check coolant levels."
            }
            FaultKind::LowFuel => "Refuel at the nearest station. Avoid high RPM riding.",
            FaultKind::BrakeWear => "Get brake pads replaced. Avoid aggressive braking.",
            FaultKind::TirePressure => {
                "Inflate tires to recommended PSI (30-32 front, 28-30 rear)."
            }
            FaultKind::Vibration => {
                "Check engine mounts and internal components. Schedule service."
            }
            FaultKind::BatteryLow => "Battery replacement recommended. Avoid short trips.",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for a dismiss request naming an id outside the closed set
#[derive(Debug, Error, PartialEq)]
#[error("unknown fault id: {0}")]
pub struct UnknownFaultId(pub String);

impl FromStr for FaultKind {
    type Err = UnknownFaultId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownFaultId(s.to_string()))
    }
}

/// An active fault. The timestamp marks first detection and survives
/// re-evaluation for as long as the condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    pub id: FaultKind,
    pub component: String,
    pub description: String,
    pub severity: Severity,
    pub solution: String,
    pub timestamp: DateTime<Utc>,
}

impl Fault {
    fn new(kind: FaultKind, severity: Severity) -> Self {
        Self {
            id: kind,
            component: kind.component().to_string(),
            description: kind.description().to_string(),
            severity,
            solution: kind.solution().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Fault trigger thresholds.
///
/// `Default` is the factory table; the settings API can replace it, and
/// every replacement goes through `validate` first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultRules {
    /// Engine temperature above this is an overheat (°C)
    pub overheat_temp: f64,
    /// Fuel below this raises a low-fuel alert (%)
    pub low_fuel: f64,
    /// Fuel below this escalates the alert to critical (%)
    pub critical_fuel: f64,
    /// Brake condition below this raises a wear alert (%)
    pub worn_brakes: f64,
    /// Brake condition below this escalates to critical (%)
    pub critical_brakes: f64,
    /// Either tire below this raises a pressure alert (PSI)
    pub low_tire_pressure: f64,
    /// Vibration above this raises an alert
    pub high_vibration: f64,
    /// Vibration above this escalates to critical
    pub critical_vibration: f64,
    /// Battery health below this raises an alert (%)
    pub low_battery: f64,
}

impl Default for FaultRules {
    fn default() -> Self {
        Self {
            overheat_temp: 110.0,
            low_fuel: 15.0,
            critical_fuel: 5.0,
            worn_brakes: 40.0,
            critical_brakes: 20.0,
            low_tire_pressure: 25.0,
            high_vibration: 60.0,
            critical_vibration: 80.0,
            low_battery: 30.0,
        }
    }
}

/// Error returned when a rule table is internally inconsistent
#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("threshold {0} is not a finite number")]
    NotFinite(&'static str),

    #[error("critical threshold {critical} must be stricter than warning threshold {warning}")]
    Inverted {
        critical: &'static str,
        warning: &'static str,
    },
}

impl FaultRules {
    /// Check that every threshold is finite and each critical cutoff lies
    /// strictly inside its warning cutoff.
    pub fn validate(&self) -> Result<(), RulesError> {
        let named = [
            ("overheat_temp", self.overheat_temp),
            ("low_fuel", self.low_fuel),
            ("critical_fuel", self.critical_fuel),
            ("worn_brakes", self.worn_brakes),
            ("critical_brakes", self.critical_brakes),
            ("low_tire_pressure", self.low_tire_pressure),
            ("high_vibration", self.high_vibration),
            ("critical_vibration", self.critical_vibration),
            ("low_battery", self.low_battery),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(RulesError::NotFinite(name));
            }
        }
        if self.critical_fuel >= self.low_fuel {
            return Err(RulesError::Inverted {
                critical: "critical_fuel",
                warning: "low_fuel",
            });
        }
        if self.critical_brakes >= self.worn_brakes {
            return Err(RulesError::Inverted {
                critical: "critical_brakes",
                warning: "worn_brakes",
            });
        }
        if self.critical_vibration <= self.high_vibration {
            return Err(RulesError::Inverted {
                critical: "critical_vibration",
                warning: "high_vibration",
            });
        }
        Ok(())
    }
}

/// Evaluate every rule against the snapshot and return the triggered faults.
///
/// Pure and deterministic given `data` (timestamps aside). Rules fire
/// independently; severity escalation follows the secondary cutoffs.
pub fn evaluate(data: &BikeData, rules: &FaultRules) -> Vec<Fault> {
    let mut faults = Vec::new();

    if data.engine_temp > rules.overheat_temp {
        faults.push(Fault::new(FaultKind::EngineOverheat, Severity::Critical));
    }

    if data.fuel_level < rules.low_fuel {
        let severity = if data.fuel_level < rules.critical_fuel {
            Severity::Critical
        } else {
            Severity::Medium
        };
        faults.push(Fault::new(FaultKind::LowFuel, severity));
    }

    if data.brake_condition < rules.worn_brakes {
        let severity = if data.brake_condition < rules.critical_brakes {
            Severity::Critical
        } else {
            Severity::Medium
        };
        faults.push(Fault::new(FaultKind::BrakeWear, severity));
    }

    if data.tire_pressure_front < rules.low_tire_pressure
        || data.tire_pressure_rear < rules.low_tire_pressure
    {
        faults.push(Fault::new(FaultKind::TirePressure, Severity::Medium));
    }

    if data.engine_vibration > rules.high_vibration {
        let severity = if data.engine_vibration > rules.critical_vibration {
            Severity::Critical
        } else {
            Severity::Low
        };
        faults.push(Fault::new(FaultKind::Vibration, severity));
    }

    if data.battery_health < rules.low_battery {
        faults.push(Fault::new(FaultKind::BatteryLow, Severity::Medium));
    }

    faults
}

/// Merge the previous active list with freshly computed candidates.
///
/// Still-active faults keep their original entry (first-detection timestamp,
/// relative order); resolved ids drop out; new ids append. No id ever
/// appears twice.
pub fn reconcile(previous: &[Fault], candidates: Vec<Fault>) -> Vec<Fault> {
    let candidate_ids: HashSet<FaultKind> = candidates.iter().map(|f| f.id).collect();
    let existing_ids: HashSet<FaultKind> = previous.iter().map(|f| f.id).collect();

    let mut active: Vec<Fault> = previous
        .iter()
        .filter(|f| candidate_ids.contains(&f.id))
        .cloned()
        .collect();
    active.extend(
        candidates
            .into_iter()
            .filter(|f| !existing_ids.contains(&f.id)),
    );
    active
}

/// Owns the active fault list and the rule table.
///
/// Dismissal removes an id immediately and is indistinguishable from
/// resolution at the next update: if the condition still holds, the fault
/// comes back as a new trigger with a fresh timestamp.
#[derive(Debug, Clone)]
pub struct FaultMonitor {
    rules: FaultRules,
    active: Vec<Fault>,
}

impl FaultMonitor {
    pub fn new(rules: FaultRules) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self {
            rules,
            active: Vec::new(),
        })
    }

    /// Recompute the active set against a fresh snapshot.
    pub fn update(&mut self, data: &BikeData) -> &[Fault] {
        let candidates = evaluate(data, &self.rules);
        self.active = reconcile(&self.active, candidates);
        &self.active
    }

    /// Remove a fault from the active set. Returns false if it wasn't there.
    pub fn dismiss(&mut self, kind: FaultKind) -> bool {
        let before = self.active.len();
        self.active.retain(|f| f.id != kind);
        self.active.len() != before
    }

    pub fn active(&self) -> &[Fault] {
        &self.active
    }

    pub fn rules(&self) -> &FaultRules {
        &self.rules
    }

    /// Replace the rule table, validating first.
    pub fn set_rules(&mut self, rules: FaultRules) -> Result<(), RulesError> {
        rules.validate()?;
        self.rules = rules;
        Ok(())
    }
}
