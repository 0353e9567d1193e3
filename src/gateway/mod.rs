//! Request/response boundary to the backend process.
//!
//! [`Gateway`] is the typed contract the controller programs against. The
//! production shell talks JSON-RPC-style to the backend; [`RpcGateway`] adapts
//! any [`RpcTransport`] (one `call(method, params)` entry point) to the typed
//! contract, owning method names, parameter shapes, and reply decoding.

pub mod types;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::core::{Result, ShellError};

pub use types::{
    AckResponse, ConfigStatusResponse, ConfigValues, DataReport, DataState, InitialConfigForm,
    NoticeResponse, TermsResponse,
};

/// Typed backend contract. All nine operations are request/response; the
/// backend never pushes.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Bootstrap probe: does a configuration exist, are the terms accepted,
    /// and what are the current configuration values.
    async fn get_config_status(&self) -> Result<ConfigStatusResponse>;

    /// Persist the first-run configuration.
    async fn save_initial_config(&self, form: &InitialConfigForm) -> Result<AckResponse>;

    /// Fetch the terms-of-use document.
    async fn get_terms_text(&self) -> Result<TermsResponse>;

    /// Record that the user accepted the terms.
    async fn accept_terms(&self) -> Result<AckResponse>;

    /// Fetch the startup notice, if one is configured and unseen.
    async fn get_startup_notice(&self) -> Result<NoticeResponse>;

    /// Record that the user dismissed the notice with the given id.
    async fn mark_notice_seen(&self, notice_id: &str) -> Result<AckResponse>;

    /// Verify the configured storage location and required data files.
    async fn check_data_files(&self) -> Result<DataReport>;

    /// Let the user pick a new storage location. `ok: false` with no error
    /// text means the user cancelled the picker.
    async fn change_data_dir(&self) -> Result<AckResponse>;

    /// Ask the backend to terminate the application.
    async fn quit_app(&self) -> Result<()>;
}

/// Transport seam under [`RpcGateway`]: a single JSON call entry point.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

/// [`Gateway`] implementation over a raw [`RpcTransport`].
pub struct RpcGateway<T: RpcTransport> {
    transport: T,
}

impl<T: RpcTransport> RpcGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call_as<R>(&self, method: &str, params: Value) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let reply = self.transport.call(method, params).await?;
        serde_json::from_value(reply)
            .map_err(|e| ShellError::transport(format!("malformed {method} reply: {e}")))
    }
}

#[async_trait]
impl<T: RpcTransport> Gateway for RpcGateway<T> {
    async fn get_config_status(&self) -> Result<ConfigStatusResponse> {
        self.call_as("get_config_status", json!({})).await
    }

    async fn save_initial_config(&self, form: &InitialConfigForm) -> Result<AckResponse> {
        let params = json!({
            "url": form.url,
            "data_dir": form.data_dir,
            "data_file_name": form.data_file_name,
            "daily_test_message": form.daily_test,
            "makeup_test_message": form.makeup_test,
            "makeup_test_date_message": form.makeup_test_date,
        });
        self.call_as("save_initial_config", params).await
    }

    async fn get_terms_text(&self) -> Result<TermsResponse> {
        self.call_as("get_terms_text", json!({})).await
    }

    async fn accept_terms(&self) -> Result<AckResponse> {
        self.call_as("accept_terms", json!({})).await
    }

    async fn get_startup_notice(&self) -> Result<NoticeResponse> {
        self.call_as("get_startup_notice", json!({})).await
    }

    async fn mark_notice_seen(&self, notice_id: &str) -> Result<AckResponse> {
        self.call_as("mark_notice_seen", json!({ "notice_id": notice_id }))
            .await
    }

    async fn check_data_files(&self) -> Result<DataReport> {
        self.call_as("check_data_files", json!({})).await
    }

    async fn change_data_dir(&self) -> Result<AckResponse> {
        self.call_as("change_data_dir", json!({})).await
    }

    async fn quit_app(&self) -> Result<()> {
        self.transport.call("quit_app", json!({})).await?;
        Ok(())
    }
}
