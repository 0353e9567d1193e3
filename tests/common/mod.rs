#![allow(dead_code)]

//! Shared harness for the integration tests: a scripted gateway whose nine
//! operations replay queued outcomes, and a recording prompt surface that can
//! hold prompts open until the test releases them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use deskshell::{
    AckResponse, ConfigStatusResponse, ConfigValues, DataReport, ErrorPrompt, Gateway,
    InfoPrompt, InitialConfigForm, NoticeResponse, PromptSurface, Result, ShellController,
    ShellError, ShellOptions, TermsResponse,
};

/// One scripted operation: a queue of one-shot outcomes, then a steady
/// fallback. `Err(message)` plays back as a transport failure.
pub struct Script<T: Clone> {
    queue: Mutex<VecDeque<std::result::Result<T, String>>>,
    steady: Mutex<Option<std::result::Result<T, String>>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            steady: Mutex::new(None),
        }
    }

    pub fn push(&self, outcome: std::result::Result<T, String>) {
        self.queue.lock().unwrap().push_back(outcome);
    }

    pub fn steady(&self, outcome: std::result::Result<T, String>) {
        *self.steady.lock().unwrap() = Some(outcome);
    }

    fn next(&self) -> Result<T> {
        if let Some(outcome) = self.queue.lock().unwrap().pop_front() {
            return outcome.map_err(ShellError::transport);
        }
        if let Some(outcome) = self.steady.lock().unwrap().clone() {
            return outcome.map_err(ShellError::transport);
        }
        Err(ShellError::transport("unscripted call"))
    }
}

/// Scripted backend. Records every call (with the notice id parameter) so
/// tests can assert call counts and ordering.
pub struct ScriptedGateway {
    pub config_status: Script<ConfigStatusResponse>,
    pub save_config: Script<AckResponse>,
    pub terms: Script<TermsResponse>,
    pub accept: Script<AckResponse>,
    pub notice: Script<NoticeResponse>,
    pub mark_seen: Script<AckResponse>,
    pub data: Script<DataReport>,
    pub change_dir: Script<AckResponse>,
    pub quit: Script<()>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            config_status: Script::new(),
            save_config: Script::new(),
            terms: Script::new(),
            accept: Script::new(),
            notice: Script::new(),
            mark_seen: Script::new(),
            data: Script::new(),
            change_dir: Script::new(),
            quit: Script::new(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == name || c.starts_with(&format!("{name}(")))
            .count()
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn get_config_status(&self) -> Result<ConfigStatusResponse> {
        self.record("get_config_status");
        self.config_status.next()
    }

    async fn save_initial_config(&self, _form: &InitialConfigForm) -> Result<AckResponse> {
        self.record("save_initial_config");
        self.save_config.next()
    }

    async fn get_terms_text(&self) -> Result<TermsResponse> {
        self.record("get_terms_text");
        self.terms.next()
    }

    async fn accept_terms(&self) -> Result<AckResponse> {
        self.record("accept_terms");
        self.accept.next()
    }

    async fn get_startup_notice(&self) -> Result<NoticeResponse> {
        self.record("get_startup_notice");
        self.notice.next()
    }

    async fn mark_notice_seen(&self, notice_id: &str) -> Result<AckResponse> {
        self.record(format!("mark_notice_seen({notice_id})"));
        self.mark_seen.next()
    }

    async fn check_data_files(&self) -> Result<DataReport> {
        self.record("check_data_files");
        self.data.next()
    }

    async fn change_data_dir(&self) -> Result<AckResponse> {
        self.record("change_data_dir");
        self.change_dir.next()
    }

    async fn quit_app(&self) -> Result<()> {
        self.record("quit_app");
        self.quit.next()
    }
}

/// Prompt surface that records every prompt. While held, `error`/`info` do
/// not resolve until [`RecordingPrompts::release`] is called, which lets a
/// test observe the world with a dialog still on screen.
pub struct RecordingPrompts {
    errors: Mutex<Vec<ErrorPrompt>>,
    infos: Mutex<Vec<InfoPrompt>>,
    hold_tx: watch::Sender<bool>,
}

impl RecordingPrompts {
    pub fn new() -> Arc<Self> {
        let (hold_tx, _) = watch::channel(false);
        Arc::new(Self {
            errors: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
            hold_tx,
        })
    }

    /// Make subsequent (and in-flight) prompts block until released.
    pub fn hold(&self) {
        self.hold_tx.send_replace(true);
    }

    /// Resolve all held prompts.
    pub fn release(&self) {
        self.hold_tx.send_replace(false);
    }

    pub fn errors(&self) -> Vec<ErrorPrompt> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<InfoPrompt> {
        self.infos.lock().unwrap().clone()
    }

    async fn wait_while_held(&self) {
        let mut rx = self.hold_tx.subscribe();
        while *rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[async_trait]
impl PromptSurface for RecordingPrompts {
    async fn error(&self, prompt: ErrorPrompt) {
        self.errors.lock().unwrap().push(prompt);
        self.wait_while_held().await;
    }

    async fn info(&self, prompt: InfoPrompt) {
        self.infos.lock().unwrap().push(prompt);
        self.wait_while_held().await;
    }
}

/// Controller plus its collaborators, wired together.
pub fn shell(
    options: ShellOptions,
) -> (ShellController, Arc<ScriptedGateway>, Arc<RecordingPrompts>) {
    let gateway = ScriptedGateway::new();
    let prompts = RecordingPrompts::new();
    let controller = ShellController::with_options(gateway.clone(), prompts.clone(), options);
    (controller, gateway, prompts)
}

// ---- response constructors ----

pub fn config_status(exists: bool, terms_accepted: bool) -> ConfigStatusResponse {
    ConfigStatusResponse {
        ok: Some(true),
        exists: Some(exists),
        terms_accepted: Some(terms_accepted),
        config: Some(sample_config()),
    }
}

pub fn refused_config_status() -> ConfigStatusResponse {
    ConfigStatusResponse {
        ok: Some(false),
        ..Default::default()
    }
}

pub fn sample_config() -> ConfigValues {
    ConfigValues {
        url: "https://backend.invalid/api".to_string(),
        data_dir: "/home/user/appdata".to_string(),
        data_file_name: "records".to_string(),
        daily_test: "daily template".to_string(),
        makeup_test: "makeup template".to_string(),
        makeup_test_date: "makeup date template".to_string(),
    }
}

pub fn sample_form() -> InitialConfigForm {
    InitialConfigForm {
        url: "https://backend.invalid/api".to_string(),
        data_dir: "/home/user/appdata".to_string(),
        data_file_name: "records".to_string(),
        daily_test: "daily template".to_string(),
        makeup_test: "makeup template".to_string(),
        makeup_test_date: "makeup date template".to_string(),
    }
}

pub fn ok_ack() -> AckResponse {
    AckResponse {
        ok: Some(true),
        ..Default::default()
    }
}

pub fn failed_ack(error: &str) -> AckResponse {
    AckResponse {
        ok: Some(false),
        error: Some(error.to_string()),
        detail: None,
    }
}

/// `ok: false` with no error text: the user cancelled the directory picker.
pub fn cancelled_ack() -> AckResponse {
    AckResponse {
        ok: Some(false),
        ..Default::default()
    }
}

pub fn data_ok() -> DataReport {
    DataReport {
        ok: Some(true),
        data_dir_valid: Some(true),
        has_class: Some(true),
        has_data: Some(true),
        has_student: Some(true),
        missing: Some(Vec::new()),
        data_dir: Some("/home/user/appdata".to_string()),
        data_file_name: Some("records".to_string()),
    }
}

pub fn data_invalid_dir() -> DataReport {
    DataReport {
        ok: Some(false),
        data_dir_valid: Some(false),
        missing: Some(vec!["data directory".to_string()]),
        ..Default::default()
    }
}

pub fn data_missing(files: &[&str]) -> DataReport {
    DataReport {
        ok: Some(false),
        data_dir_valid: Some(true),
        missing: Some(files.iter().map(|f| f.to_string()).collect()),
        ..Default::default()
    }
}

pub fn notice_enabled(id: &str, title: &str, message: &str) -> NoticeResponse {
    NoticeResponse {
        ok: Some(true),
        enabled: Some(true),
        title: Some(title.to_string()),
        message: Some(message.to_string()),
        notice_id: Some(id.to_string()),
    }
}

pub fn notice_disabled() -> NoticeResponse {
    NoticeResponse {
        ok: Some(true),
        enabled: Some(false),
        ..Default::default()
    }
}

pub fn terms_ok(title: &str, text: &str) -> TermsResponse {
    TermsResponse {
        ok: Some(true),
        title: Some(title.to_string()),
        text: Some(text.to_string()),
    }
}
