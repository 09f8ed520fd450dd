//! Fixed-interval sweep scheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use wardpass_store::IdentityStore;
use wardpass_types::Timestamp;

use crate::sweeper::ExpirySweeper;

/// Re-entrancy gate: at most one sweep run in flight.
///
/// A tick that finds the gate closed is skipped entirely; the sweep is
/// periodic and will catch up on the next tick.
pub(crate) struct TickGate(AtomicBool);

impl TickGate {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Try to claim the gate. `false` means a run is still in flight.
    pub(crate) fn try_enter(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn exit(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Releases the gate when dropped, so the gate reopens even if the sweep
/// run unwinds.
pub(crate) struct GatePass(Arc<TickGate>);

impl GatePass {
    pub(crate) fn new(gate: Arc<TickGate>) -> Self {
        Self(gate)
    }
}

impl Drop for GatePass {
    fn drop(&mut self) {
        self.0.exit();
    }
}

/// Spawn the periodic sweep task.
///
/// Each run executes on the blocking pool because notification delivery is
/// blocking I/O. Ticks never overlap: the interval skips missed ticks and
/// the [`TickGate`] drops a tick that fires while a run is still going.
/// Every error is caught and logged; nothing here can take the process
/// down.
pub fn spawn_sweep_loop<S>(
    sweeper: Arc<ExpirySweeper<S>>,
    interval_secs: u64,
) -> JoinHandle<()>
where
    S: IdentityStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let gate = Arc::new(TickGate::new());

        loop {
            ticker.tick().await;
            if !gate.try_enter() {
                tracing::warn!("previous sweep still running, skipping this tick");
                continue;
            }
            let sweeper = sweeper.clone();
            let pass = GatePass::new(gate.clone());
            tokio::task::spawn_blocking(move || {
                let _open_on_return = pass;
                match sweeper.run(Timestamp::now()) {
                    Ok(report) => {
                        if report.scanned > 0 {
                            tracing::info!(
                                scanned = report.scanned,
                                deactivated = report.deactivated,
                                failed = report.failed,
                                "sweep completed"
                            );
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "sweep run failed"),
                }
            });
        }
    })
}
