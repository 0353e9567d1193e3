use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    /// The gateway call itself failed (backend unreachable, malformed reply).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway call completed but the backend reported `ok: false`.
    /// The message is the backend's error text, surfaced verbatim.
    #[error("{message}")]
    Backend {
        message: String,
        detail: Option<String>,
    },

    /// Monitor worker lifecycle failure.
    #[error("Worker error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn backend(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::Backend {
            message: message.into(),
            detail,
        }
    }

    /// True for failures of the call itself, as opposed to a backend refusal.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
