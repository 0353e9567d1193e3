//! Dialog sequencing: one active modal at a time, fixed precedence.

use async_trait::async_trait;

/// The three modal flows the controller may run, in precedence order.
///
/// Terms agreement gates everything; the startup notice runs only once the
/// terms gate has been passed; storage correction is triggered by the
/// consistency monitor and yields to both of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalFlow {
    Terms,
    Notice,
    StorageCorrection,
}

impl ModalFlow {
    /// Lower rank wins. Used to decide preemption.
    fn rank(self) -> u8 {
        match self {
            Self::Terms => 0,
            Self::Notice => 1,
            Self::StorageCorrection => 2,
        }
    }
}

/// The single active-modal slot.
///
/// A flow claims the slot before presenting anything and releases it when the
/// user is done. Claims fail while the slot is occupied, except that the
/// terms flow preempts lower-precedence flows: the terms gate is mandatory
/// and must never wait behind an informational popup.
#[derive(Debug, Default)]
pub struct ModalSlot {
    active: Option<ModalFlow>,
}

impl ModalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<ModalFlow> {
        self.active
    }

    pub fn is_free(&self) -> bool {
        self.active.is_none()
    }

    /// Try to make `flow` the active modal. Returns whether the claim won.
    pub fn try_claim(&mut self, flow: ModalFlow) -> bool {
        match self.active {
            None => {
                self.active = Some(flow);
                true
            }
            Some(current) if current == flow => true,
            Some(current) if flow == ModalFlow::Terms && flow.rank() < current.rank() => {
                self.active = Some(flow);
                true
            }
            Some(_) => false,
        }
    }

    /// Release the slot if `flow` holds it. Releasing a flow that is not
    /// active is a no-op, so releases are idempotent and never steal the
    /// slot from a preempting flow.
    pub fn release(&mut self, flow: ModalFlow) {
        if self.active == Some(flow) {
            self.active = None;
        }
    }
}

/// A blocking error prompt. Resolves when the user acknowledges it.
#[derive(Debug, Clone)]
pub struct ErrorPrompt {
    pub title: String,
    pub message: String,
    pub detail: Option<String>,
    pub confirm_text: Option<String>,
}

impl ErrorPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            detail: None,
            confirm_text: None,
        }
    }

    pub fn detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }
}

/// An informational prompt. Resolves when the user acknowledges it.
#[derive(Debug, Clone)]
pub struct InfoPrompt {
    pub title: String,
    pub message: String,
}

impl InfoPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Presentation-side renderer for imperative modal prompts.
///
/// The storage-correction flow awaits these calls; they must not resolve
/// until the user has acknowledged the dialog. The terms and notice dialogs
/// are state-driven through [`crate::ShellSnapshot`] instead.
#[async_trait]
pub trait PromptSurface: Send + Sync {
    async fn error(&self, prompt: ErrorPrompt);

    async fn info(&self, prompt: InfoPrompt);
}
