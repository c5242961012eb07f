//! Application state management

use chrono::Utc;
use omt_core::fault::{FaultKind, FaultMonitor, FaultRules, RulesError};
use omt_core::gauge;
use omt_core::model::DashboardFrame;
use omt_sim::{SimConfig, Simulator, TelemetrySource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

/// The state container behind the dashboard.
///
/// Single writer: the ticker task. Everyone else reads immutable
/// `DashboardFrame` snapshots. Within one tick the telemetry update is
/// fully applied before faults are evaluated, so a frame's fault list
/// always matches the data carried in the same frame.
pub struct Dashboard {
    source: Box<dyn TelemetrySource>,
    monitor: FaultMonitor,
    riding: bool,
    tick: u64,
    tick_interval: Duration,
}

impl Dashboard {
    pub fn new(
        source: Box<dyn TelemetrySource>,
        rules: FaultRules,
        tick_interval: Duration,
    ) -> Result<Self, RulesError> {
        Ok(Self {
            source,
            monitor: FaultMonitor::new(rules)?,
            riding: false,
            tick: 0,
            tick_interval,
        })
    }

    /// Advance one tick: telemetry first, then fault evaluation.
    pub fn tick(&mut self) -> DashboardFrame {
        let data = self.source.sample(self.riding);
        self.tick += 1;
        let faults = self.monitor.update(&data).to_vec();
        DashboardFrame {
            timestamp: Utc::now(),
            tick: self.tick,
            riding: self.riding,
            faults,
            gauges: gauge::readings(&data),
            data,
        }
    }

    /// Snapshot the current state without advancing.
    pub fn frame(&self) -> DashboardFrame {
        let data = self.source.current();
        DashboardFrame {
            timestamp: Utc::now(),
            tick: self.tick,
            riding: self.riding,
            faults: self.monitor.active().to_vec(),
            gauges: gauge::readings(&data),
            data,
        }
    }

    pub fn riding(&self) -> bool {
        self.riding
    }

    pub fn toggle_riding(&mut self) -> bool {
        self.riding = !self.riding;
        self.riding
    }

    pub fn dismiss(&mut self, kind: FaultKind) -> bool {
        self.monitor.dismiss(kind)
    }

    pub fn rules(&self) -> FaultRules {
        *self.monitor.rules()
    }

    pub fn set_rules(&mut self, rules: FaultRules) -> Result<(), RulesError> {
        self.monitor.set_rules(rules)
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The dashboard; written only by the ticker task
    pub dashboard: Arc<RwLock<Dashboard>>,

    /// Broadcast channel for dashboard frames
    /// Multiple consumers can subscribe to receive frames
    pub frame_tx: broadcast::Sender<DashboardFrame>,

    /// Cancelling this token stops the ticker; no tick fires afterwards
    pub ticker_cancel: CancellationToken,
}

impl AppState {
    /// State with the default simulator and factory fault rules
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(SimConfig::default(), FaultRules::default())
    }

    pub fn with_config(config: SimConfig, rules: FaultRules) -> anyhow::Result<Self> {
        let sim = Simulator::new(config)?;
        let tick_interval = sim.tick_interval();
        Self::with_source(Box::new(sim), rules, tick_interval)
    }

    /// State around an arbitrary telemetry source
    pub fn with_source(
        source: Box<dyn TelemetrySource>,
        rules: FaultRules,
        tick_interval: Duration,
    ) -> anyhow::Result<Self> {
        let dashboard = Dashboard::new(source, rules, tick_interval)?;

        // Broadcast channel with capacity for 100 frames
        let (frame_tx, _) = broadcast::channel(100);

        Ok(Self {
            dashboard: Arc::new(RwLock::new(dashboard)),
            frame_tx,
            ticker_cancel: CancellationToken::new(),
        })
    }

    /// Subscribe to dashboard frames
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardFrame> {
        self.frame_tx.subscribe()
    }
}
