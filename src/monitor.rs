//! Consistency monitor: background polling of the backend's data check.
//!
//! The worker runs only while the run-condition holds (bootstrap complete,
//! last data check ok, not shut down). The loop is fixed-delay: sleep, then
//! work, so ticks never overlap regardless of how slow the backend is. Each
//! tick re-checks the condition and the worker stops itself when it fails;
//! [`sync_monitor`] restarts it when a controller operation makes the
//! condition true again.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::controller::{ShellCore, ShellState, change_storage_dir_flow, flush_pending_notice};
use crate::dialog::{ErrorPrompt, ModalFlow};
use crate::gateway::DataState;

/// Handle to the polling task. Stopping is graceful (signal, then join);
/// dropping without a stop aborts the task.
pub(crate) struct MonitorWorker {
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl MonitorWorker {
    pub(crate) async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("monitor worker join failed: {e}");
                }
            }
        }
    }
}

impl Drop for MonitorWorker {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.join_handle.take() {
            handle.abort();
        }
    }
}

/// Polling runs only for a fully bootstrapped shell whose last data check
/// passed. A failed check parks the monitor; a manual refresh resumes it.
fn monitor_should_run(state: &ShellState) -> bool {
    !state.shutdown
        && state.phase.is_stable()
        && state.data.as_ref().map(|d| d.ok).unwrap_or(true)
}

/// Reconcile the worker with the current run-condition. Must not be called
/// from inside the worker's own tick (the stop path joins the task); ticks
/// stop themselves instead.
pub(crate) async fn sync_monitor(core: &Arc<ShellCore>) {
    let mut state = core.state.lock().await;
    let should_run = monitor_should_run(&state);
    if should_run && !state.monitor_running {
        debug!("starting consistency monitor");
        state.monitor_running = true;
        state.worker = Some(spawn_monitor(Arc::clone(core)));
    } else if !should_run && state.monitor_running {
        debug!("stopping consistency monitor");
        state.monitor_running = false;
        let worker = state.worker.take();
        drop(state);
        if let Some(mut worker) = worker {
            worker.stop().await;
        }
    }
}

fn spawn_monitor(core: Arc<ShellCore>) -> MonitorWorker {
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let interval = core.options.poll_interval;
    let join_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = sleep(interval) => {
                    refresh_data(&core).await;
                    let mut state = core.state.lock().await;
                    if !monitor_should_run(&state) {
                        state.monitor_running = false;
                        break;
                    }
                }
            }
        }
    });
    MonitorWorker {
        stop_tx: Some(stop_tx),
        join_handle: Some(join_handle),
    }
}

/// Run one data check and store the result.
///
/// Transport failure is absorbed: with the fail-open policy (default) a
/// synthetic all-clear state is substituted so a missing backend never
/// degrades a working session; otherwise the state is marked not-ok. When
/// the backend reports the storage location invalid, the correction flow is
/// spawned at most once (latch plus modal slot), on its own task so poll
/// ticks keep observing while the user responds.
pub(crate) async fn refresh_data(core: &Arc<ShellCore>) {
    let next = match core.gateway.check_data_files().await {
        Ok(report) => DataState::from_report(report),
        Err(e) => {
            warn!("data check failed: {e}");
            if core.options.fail_open_on_poll_errors {
                DataState::assume_reachable()
            } else {
                DataState::unreachable()
            }
        }
    };
    let storage_invalid = !next.data_dir_valid;

    let mut state = core.state.lock().await;
    state.data = Some(next);

    if storage_invalid
        && !state.storage_prompting
        && state.modal.try_claim(ModalFlow::StorageCorrection)
    {
        state.storage_prompting = true;
        drop(state);
        tokio::spawn(recover_storage(Arc::clone(core)));
    }
}

/// Drift recovery: tell the user the storage location is broken, run the
/// correction flow, then release the latch and the modal slot. Runs on its
/// own task; the trailing refresh inside the flow sees the latch still set
/// and cannot re-enter.
///
/// Returns a boxed future: the call graph is cyclic (refresh spawns the
/// recovery, whose correction flow refreshes again), so the future type must
/// be erased here, at the definition.
fn recover_storage(core: Arc<ShellCore>) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        core.prompts
            .error(
                ErrorPrompt::new(
                    "Storage location is not valid",
                    "Choose a new location for the application data.",
                )
                .confirm_text("Change"),
            )
            .await;
        change_storage_dir_flow(&core).await;
        {
            let mut state = core.state.lock().await;
            state.storage_prompting = false;
            state.modal.release(ModalFlow::StorageCorrection);
            flush_pending_notice(&mut state);
        }
        sync_monitor(&core).await;
    })
}
