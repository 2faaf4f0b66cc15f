//! Periodic settlement reconciliation.
//!
//! A single tokio task ticks at a fixed interval and runs one reconciliation cycle
//! per tick. Shutdown is signalled over a watch channel and only observed between
//! cycles, so a cycle that is already running always completes.
use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};

use crate::{
    domain::{ReconcileOutcome, TransferReconciler},
    metrics::{NON_TERMINAL_TRANSFERS, RECONCILE_CYCLE_DURATION, RECONCILE_ERRORS_TOTAL},
    models::{RepositoryError, TransferStatus},
    repositories::TransferRepository,
    services::{LedgerProviderTrait, SettlementNotifier},
};

/// Per cycle counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub examined: usize,
    pub advanced: usize,
    pub failed: usize,
    pub unchanged: usize,
    pub errors: usize,
}

pub struct ReconciliationWorker<P, TR, N>
where
    P: LedgerProviderTrait,
    TR: TransferRepository,
    N: SettlementNotifier,
{
    reconciler: Arc<TransferReconciler<P, TR, N>>,
    interval: Duration,
    cycle_lock: Mutex<()>,
}

impl<P, TR, N> ReconciliationWorker<P, TR, N>
where
    P: LedgerProviderTrait + 'static,
    TR: TransferRepository + 'static,
    N: SettlementNotifier + 'static,
{
    pub fn new(reconciler: Arc<TransferReconciler<P, TR, N>>, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Reconciles every non-terminal transfer once.
    ///
    /// Cycles never overlap. Records are reconciled concurrently and a failure on
    /// one record is logged and left for the next cycle.
    pub async fn run_cycle(&self) -> Result<CycleSummary, RepositoryError> {
        let _cycle = self.cycle_lock.lock().await;
        let timer = RECONCILE_CYCLE_DURATION.start_timer();

        let records = self
            .reconciler
            .transfer_repository()
            .list_non_terminal()
            .await?;
        NON_TERMINAL_TRANSFERS.set(records.len() as f64);

        let results = join_all(
            records
                .iter()
                .map(|record| self.reconciler.reconcile_transfer(record)),
        )
        .await;

        let mut summary = CycleSummary {
            examined: records.len(),
            ..Default::default()
        };
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(ReconcileOutcome::Advanced(TransferStatus::Failed)) => summary.failed += 1,
                Ok(ReconcileOutcome::Advanced(_)) => summary.advanced += 1,
                Ok(ReconcileOutcome::Unchanged)
                | Ok(ReconcileOutcome::Rebroadcast)
                | Ok(ReconcileOutcome::AwaitingExpiry) => summary.unchanged += 1,
                Err(e) => {
                    summary.errors += 1;
                    RECONCILE_ERRORS_TOTAL.with_label_values(&[e.kind()]).inc();
                    if e.is_transient() {
                        warn!(
                            tx_id = %record.id,
                            status = %record.status,
                            error = %e,
                            "reconciliation failed, retrying next cycle"
                        );
                    } else {
                        error!(
                            tx_id = %record.id,
                            status = %record.status,
                            error = %e,
                            kind = e.kind(),
                            "reconciliation failed with a non-transient error"
                        );
                    }
                }
            }
        }

        timer.observe_duration();
        debug!(
            examined = summary.examined,
            advanced = summary.advanced,
            failed = summary.failed,
            unchanged = summary.unchanged,
            errors = summary.errors,
            "reconciliation cycle completed"
        );
        Ok(summary)
    }

    /// Spawns the periodic task.
    pub fn start(self: Arc<Self>) -> ReconciliationHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let interval = self.interval;

        info!(interval_ms = interval.as_millis() as u64, "starting reconciliation worker");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => {
                        info!("shutdown signal received, stopping reconciliation worker");
                        break;
                    }
                }

                if *shutdown_rx.borrow() {
                    break;
                }

                if let Err(e) = self.run_cycle().await {
                    warn!(error = %e, "reconciliation cycle could not list transfers");
                }
            }

            info!("reconciliation worker stopped");
        });

        ReconciliationHandle {
            shutdown_tx,
            handle,
        }
    }
}

/// Owner of a running worker.
pub struct ReconciliationHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReconciliationHandle {
    /// Signals shutdown and waits for the in-flight cycle, if any, to finish.
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(true).is_err() {
            debug!("reconciliation worker already stopped");
        }
        if let Err(e) = self.handle.await {
            error!(error = %e, "reconciliation worker task panicked");
        }
    }
}
