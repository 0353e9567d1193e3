//! Bootstrap state machine and session state.
//!
//! [`ShellController`] owns everything the shell needs to decide what to show:
//! the bootstrap phase, the cached configuration values, the latest data
//! state, the startup-notice popup, and the modal slot. All of it lives behind
//! a single `tokio::sync::Mutex`; the controller is the only writer, and the
//! presentation layer reads through [`ShellController::snapshot`] clones.

pub mod phase;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::{Result, ShellError};
use crate::dialog::{ModalFlow, ModalSlot, PromptSurface};
use crate::gateway::{ConfigValues, DataState, Gateway, InitialConfigForm};
use crate::monitor::{self, MonitorWorker};
use crate::options::ShellOptions;

pub use phase::BootstrapPhase;

/// Startup notice popup state, created at most once per controller lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticePopup {
    pub open: bool,
    pub title: String,
    pub message: String,
    pub notice_id: Option<String>,
}

/// The terms-of-use document, fetched on demand for the terms dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsText {
    pub title: String,
    pub text: String,
}

/// Read-only view of the session state for the presentation layer.
#[derive(Debug, Clone)]
pub struct ShellSnapshot {
    pub phase: BootstrapPhase,
    pub config: ConfigValues,
    pub data: Option<DataState>,
    pub terms_dialog_open: bool,
    pub notice: NoticePopup,
}

pub(crate) struct ShellState {
    pub(crate) phase: BootstrapPhase,
    pub(crate) config: ConfigValues,
    pub(crate) data: Option<DataState>,
    pub(crate) notice: NoticePopup,
    pub(crate) modal: ModalSlot,
    /// Set before the startup-notice fetch completes; never cleared, so the
    /// notice is requested at most once per controller lifetime.
    pub(crate) notice_requested: bool,
    /// Guards the acknowledge path against a double-dismiss while the
    /// seen-marker persistence is in flight.
    pub(crate) notice_closing: bool,
    /// Set while a storage-correction flow is in flight, cleared only when
    /// that flow finishes. Keeps repeated poll ticks from stacking dialogs.
    pub(crate) storage_prompting: bool,
    /// A fetched notice that could not claim the modal slot yet. Opened as
    /// soon as the slot frees; the one-shot latch covers the fetch, not the
    /// display.
    pub(crate) pending_notice: Option<NoticePopup>,
    pub(crate) shutdown: bool,
    pub(crate) monitor_running: bool,
    pub(crate) worker: Option<MonitorWorker>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            phase: BootstrapPhase::Unchecked,
            config: ConfigValues::default(),
            data: None,
            notice: NoticePopup::default(),
            modal: ModalSlot::new(),
            notice_requested: false,
            notice_closing: false,
            storage_prompting: false,
            pending_notice: None,
            shutdown: false,
            monitor_running: false,
            worker: None,
        }
    }
}

pub(crate) struct ShellCore {
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) prompts: Arc<dyn PromptSurface>,
    pub(crate) options: ShellOptions,
    pub(crate) state: Mutex<ShellState>,
}

/// Bootstrap and consistency-monitoring controller.
///
/// Cheap to clone; all clones share the same session state.
#[derive(Clone)]
pub struct ShellController {
    core: Arc<ShellCore>,
}

impl ShellController {
    pub fn new(gateway: Arc<dyn Gateway>, prompts: Arc<dyn PromptSurface>) -> Self {
        Self::with_options(gateway, prompts, ShellOptions::default())
    }

    pub fn with_options(
        gateway: Arc<dyn Gateway>,
        prompts: Arc<dyn PromptSurface>,
        options: ShellOptions,
    ) -> Self {
        Self {
            core: Arc::new(ShellCore {
                gateway,
                prompts,
                options,
                state: Mutex::new(ShellState::default()),
            }),
        }
    }

    /// Run (or re-run) the bootstrap evaluation: probe the backend, classify
    /// the phase, refresh dependent facts, and reconcile the monitor.
    ///
    /// Never fails: a probe failure degrades the phase to
    /// `NeedsInitialConfig` so the shell always has a screen to show.
    pub async fn evaluate(&self) {
        evaluate_core(&self.core).await;
    }

    pub async fn snapshot(&self) -> ShellSnapshot {
        let state = self.core.state.lock().await;
        ShellSnapshot {
            phase: state.phase,
            config: state.config.clone(),
            data: state.data.clone(),
            terms_dialog_open: state.modal.active() == Some(ModalFlow::Terms),
            notice: state.notice.clone(),
        }
    }

    /// Persist the first-run configuration. Backend error text is surfaced
    /// verbatim; on success the bootstrap evaluation re-runs, which normally
    /// moves the shell on to the terms gate.
    pub async fn submit_initial_config(&self, form: &InitialConfigForm) -> Result<()> {
        let ack = self.core.gateway.save_initial_config(form).await?;
        if !ack.is_ok() {
            let message = ack
                .error
                .unwrap_or_else(|| "Failed to save configuration.".to_string());
            return Err(ShellError::backend(message, ack.detail));
        }
        evaluate_core(&self.core).await;
        Ok(())
    }

    /// Fetch the terms-of-use document for the terms dialog.
    pub async fn terms_text(&self) -> Result<TermsText> {
        let resp = self.core.gateway.get_terms_text().await?;
        if !resp.is_ok() {
            return Err(ShellError::backend("Unable to load the terms text.", None));
        }
        Ok(TermsText {
            title: resp.title.unwrap_or_else(|| "Terms of Use".to_string()),
            text: resp.text.unwrap_or_default(),
        })
    }

    /// Record the user's acceptance of the terms. On success the terms gate
    /// clears, the data state refreshes, and the one-shot startup notice is
    /// requested.
    pub async fn accept_terms(&self) -> Result<()> {
        let ack = self.core.gateway.accept_terms().await?;
        if !ack.is_ok() {
            let message = ack
                .error
                .unwrap_or_else(|| "Failed to save terms acceptance.".to_string());
            return Err(ShellError::backend(message, ack.detail));
        }
        {
            let mut state = self.core.state.lock().await;
            if state.phase == BootstrapPhase::NeedsTerms {
                state.phase = BootstrapPhase::Ready;
            }
            sync_terms_modal(&mut state);
        }
        monitor::refresh_data(&self.core).await;
        request_startup_notice(&self.core).await;
        monitor::sync_monitor(&self.core).await;
        Ok(())
    }

    /// The user refused the terms: ask the backend to terminate the
    /// application.
    pub async fn decline_terms(&self) -> Result<()> {
        self.core.gateway.quit_app().await
    }

    /// Close the startup notice. When `dont_show_again` is set and the notice
    /// carries an id, the seen-marker is persisted first; persistence failure
    /// is logged and never keeps the popup open.
    pub async fn acknowledge_notice(&self, dont_show_again: bool) {
        let notice_id = {
            let mut state = self.core.state.lock().await;
            if !state.notice.open || state.notice_closing {
                return;
            }
            state.notice_closing = true;
            state.notice.notice_id.clone()
        };

        if dont_show_again {
            if let Some(id) = notice_id {
                match self.core.gateway.mark_notice_seen(&id).await {
                    Ok(ack) if ack.is_ok() => {}
                    Ok(ack) => {
                        warn!(notice_id = %id, error = ?ack.error, "notice seen-marker refused")
                    }
                    Err(e) => warn!(notice_id = %id, "notice seen-marker failed: {e}"),
                }
            }
        }

        let mut state = self.core.state.lock().await;
        state.notice = NoticePopup::default();
        state.notice_closing = false;
        state.modal.release(ModalFlow::Notice);
    }

    /// Let the user move the application data to a new location: directory
    /// picker, success/error prompt, then a fresh data check. Shares the
    /// correction flow with the monitor's drift recovery, so at most one such
    /// flow runs at a time.
    pub async fn change_storage_dir(&self) {
        {
            let mut state = self.core.state.lock().await;
            if state.storage_prompting || !state.modal.try_claim(ModalFlow::StorageCorrection) {
                return;
            }
            state.storage_prompting = true;
        }
        change_storage_dir_flow(&self.core).await;
        {
            let mut state = self.core.state.lock().await;
            state.storage_prompting = false;
            state.modal.release(ModalFlow::StorageCorrection);
            flush_pending_notice(&mut state);
        }
        monitor::sync_monitor(&self.core).await;
    }

    /// Manual data re-check, e.g. from the missing-files screen. Restarts
    /// polling when the failure condition has cleared.
    pub async fn refresh_data(&self) {
        monitor::refresh_data(&self.core).await;
        monitor::sync_monitor(&self.core).await;
    }

    /// Stop the monitor deterministically. No tick is observable after this
    /// resolves.
    pub async fn shutdown(&self) {
        let worker = {
            let mut state = self.core.state.lock().await;
            state.shutdown = true;
            state.monitor_running = false;
            state.worker.take()
        };
        if let Some(mut worker) = worker {
            worker.stop().await;
        }
    }
}

/// Full bootstrap evaluation over the shared core. Also the re-entry point
/// after setup completion.
pub(crate) async fn evaluate_core(core: &Arc<ShellCore>) {
    match core.gateway.get_config_status().await {
        Ok(status) if status.is_ok() => {
            let exists = status.exists.unwrap_or(false);
            let terms_accepted = status.terms_accepted.unwrap_or(false);
            {
                let mut state = core.state.lock().await;
                if let Some(config) = status.config {
                    state.config = config;
                }
                state.phase = BootstrapPhase::classify(exists, terms_accepted);
                sync_terms_modal(&mut state);
                debug!(phase = ?state.phase, "bootstrap evaluated");
            }
            if exists {
                monitor::refresh_data(core).await;
            }
            if exists && terms_accepted {
                request_startup_notice(core).await;
            }
        }
        Ok(status) => {
            warn!("bootstrap probe refused by backend");
            apply_failed_bootstrap(core, status.config).await;
        }
        Err(e) => {
            warn!("bootstrap probe failed: {e}");
            apply_failed_bootstrap(core, None).await;
        }
    }
    monitor::sync_monitor(core).await;
}

/// Conservative degradation: without a trustworthy probe the shell lands on
/// the initial-setup screen rather than an undefined phase.
async fn apply_failed_bootstrap(core: &Arc<ShellCore>, config: Option<ConfigValues>) {
    let mut state = core.state.lock().await;
    if let Some(config) = config {
        state.config = config;
    }
    state.phase = BootstrapPhase::NeedsInitialConfig;
    sync_terms_modal(&mut state);
}

/// Keep the modal slot in step with the phase: the terms dialog is open
/// exactly while the phase is `NeedsTerms`, and it preempts anything lower.
fn sync_terms_modal(state: &mut ShellState) {
    if state.phase == BootstrapPhase::NeedsTerms {
        state.modal.try_claim(ModalFlow::Terms);
    } else {
        state.modal.release(ModalFlow::Terms);
    }
}

/// One-shot startup-notice request. The latch is set before the fetch, so a
/// failed or disabled fetch still consumes the single attempt.
pub(crate) async fn request_startup_notice(core: &Arc<ShellCore>) {
    {
        let mut state = core.state.lock().await;
        if state.notice_requested || !state.phase.is_stable() {
            return;
        }
        state.notice_requested = true;
    }

    let resp = match core.gateway.get_startup_notice().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!("startup notice fetch failed: {e}");
            return;
        }
    };
    if !resp.is_ok() || !resp.enabled.unwrap_or(false) {
        debug!("startup notice disabled");
        return;
    }
    let Some(message) = resp.message else {
        return;
    };

    let popup = NoticePopup {
        open: true,
        title: resp.title.unwrap_or_else(|| "Notice".to_string()),
        message,
        notice_id: resp.notice_id,
    };
    let mut state = core.state.lock().await;
    if state.modal.try_claim(ModalFlow::Notice) {
        state.notice = popup;
    } else {
        debug!("startup notice deferred, another dialog is active");
        state.pending_notice = Some(popup);
    }
}

/// Open a deferred startup notice once the modal slot has freed up. Called
/// by whichever flow releases the slot.
pub(crate) fn flush_pending_notice(state: &mut ShellState) {
    if let Some(popup) = state.pending_notice.take() {
        if state.modal.try_claim(ModalFlow::Notice) {
            state.notice = popup;
        } else {
            state.pending_notice = Some(popup);
        }
    }
}

/// The storage-correction body shared by the user-invoked flow and the
/// monitor's drift recovery. Callers own the latch and the modal slot.
pub(crate) async fn change_storage_dir_flow(core: &Arc<ShellCore>) {
    use crate::dialog::{ErrorPrompt, InfoPrompt};

    match core.gateway.change_data_dir().await {
        Ok(ack) if ack.is_ok() => {
            core.prompts
                .info(InfoPrompt::new(
                    "Success",
                    "Storage location has been updated.",
                ))
                .await;
        }
        Ok(ack) => {
            // ok:false with no error text means the user cancelled the
            // directory picker; stay silent.
            if let Some(error) = ack.error {
                core.prompts
                    .error(
                        ErrorPrompt::new("Failed to change storage location", error)
                            .detail(ack.detail),
                    )
                    .await;
            }
        }
        Err(e) => {
            core.prompts
                .error(ErrorPrompt::new(
                    "Failed to change storage location",
                    e.to_string(),
                ))
                .await;
        }
    }
    monitor::refresh_data(core).await;
}
