//! The telemetry tick loop
//!
//! Drives the simulator at its configured cadence and broadcasts one frame
//! per tick. Cancellation is checked before each tick is applied: once the
//! token is cancelled, no further tick runs and no frame is sent.

use crate::state::AppState;
use tokio::time::sleep;
use tracing::info;

/// Main ticker loop. Runs until the state's cancellation token fires.
pub async fn run(state: AppState) {
    let interval = { state.dashboard.read().await.tick_interval() };
    let cancel = state.ticker_cancel.clone();

    info!(interval_ms = interval.as_millis() as u64, "telemetry ticker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }
        if cancel.is_cancelled() {
            break;
        }

        let frame = {
            let mut dashboard = state.dashboard.write().await;
            dashboard.tick()
        };

        // Ignore error if no receivers (they'll get the next frame)
        let _ = state.frame_tx.send(frame);
    }

    info!("telemetry ticker stopped");
}
