//! Wire types for the backend gateway.
//!
//! Every field is optional: the backend's replies are plain JSON objects and
//! nothing guarantees their shape. A missing `ok` field counts as failure;
//! the `is_ok()` helpers centralize that rule. Config-status payloads are
//! camelCase, data-check payloads snake_case, exactly as the backend emits
//! them.

use serde::{Deserialize, Serialize};

/// Configuration values owned by the backend. The controller caches a copy
/// only to pre-fill the initial-setup screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigValues {
    pub url: String,
    pub data_dir: String,
    pub data_file_name: String,
    pub daily_test: String,
    pub makeup_test: String,
    pub makeup_test_date: String,
}

/// Reply to `get_config_status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigStatusResponse {
    pub ok: Option<bool>,
    pub exists: Option<bool>,
    pub terms_accepted: Option<bool>,
    pub config: Option<ConfigValues>,
}

impl ConfigStatusResponse {
    pub fn is_ok(&self) -> bool {
        self.ok.unwrap_or(false)
    }
}

/// Reply to `check_data_files`. Snake_case on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataReport {
    pub ok: Option<bool>,
    pub data_dir_valid: Option<bool>,
    pub has_class: Option<bool>,
    pub has_data: Option<bool>,
    pub has_student: Option<bool>,
    pub missing: Option<Vec<String>>,
    pub data_dir: Option<String>,
    pub data_file_name: Option<String>,
}

/// The controller's resolved view of a data check. Transient: refreshed on
/// every poll tick, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataState {
    pub ok: bool,
    pub data_dir_valid: bool,
    pub has_class: bool,
    pub has_data: bool,
    pub has_student: bool,
    pub missing: Vec<String>,
    pub data_dir: String,
    pub data_file_name: String,
}

impl DataState {
    /// Resolve a raw report. Presence flags default to false; the storage
    /// location only counts as invalid when the backend says so explicitly.
    pub fn from_report(report: DataReport) -> Self {
        Self {
            ok: report.ok.unwrap_or(false),
            data_dir_valid: report.data_dir_valid.unwrap_or(true),
            has_class: report.has_class.unwrap_or(false),
            has_data: report.has_data.unwrap_or(false),
            has_student: report.has_student.unwrap_or(false),
            missing: report.missing.unwrap_or_default(),
            data_dir: report.data_dir.unwrap_or_default(),
            data_file_name: report.data_file_name.unwrap_or_default(),
        }
    }

    /// Synthetic all-clear state substituted when the data check is
    /// unreachable and the fail-open policy is active.
    pub fn assume_reachable() -> Self {
        Self {
            ok: true,
            data_dir_valid: true,
            has_class: true,
            has_data: true,
            has_student: true,
            missing: Vec::new(),
            data_dir: String::new(),
            data_file_name: String::new(),
        }
    }

    /// Not-ok state used when fail-open is disabled and the check failed.
    /// The storage location stays "valid" so a transport outage never
    /// triggers the correction dialog, and `missing` stays empty so the
    /// outage is never rendered as a missing data file.
    pub fn unreachable() -> Self {
        Self {
            ok: false,
            data_dir_valid: true,
            has_class: false,
            has_data: false,
            has_student: false,
            missing: Vec::new(),
            data_dir: String::new(),
            data_file_name: String::new(),
        }
    }
}

/// Reply to `get_startup_notice`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoticeResponse {
    pub ok: Option<bool>,
    pub enabled: Option<bool>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub notice_id: Option<String>,
}

impl NoticeResponse {
    pub fn is_ok(&self) -> bool {
        self.ok.unwrap_or(false)
    }
}

/// Reply to `get_terms_text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsResponse {
    pub ok: Option<bool>,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl TermsResponse {
    pub fn is_ok(&self) -> bool {
        self.ok.unwrap_or(false)
    }
}

/// Generic acknowledgment reply (`accept_terms`, `mark_notice_seen`,
/// `change_data_dir`, `save_initial_config`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AckResponse {
    pub ok: Option<bool>,
    pub error: Option<String>,
    pub detail: Option<String>,
}

impl AckResponse {
    pub fn is_ok(&self) -> bool {
        self.ok.unwrap_or(false)
    }
}

/// Input for `save_initial_config`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialConfigForm {
    pub url: String,
    pub data_dir: String,
    pub data_file_name: String,
    pub daily_test: String,
    pub makeup_test: String,
    pub makeup_test_date: String,
}
