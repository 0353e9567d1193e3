// ============================================================================
// deskshell Library
// ============================================================================
//
// Bootstrap and consistency-monitoring controller for a desktop application
// shell. The crate decides which screen the shell may show (initial setup,
// terms agreement, or the main view), keeps externally-verified facts fresh
// through a polling monitor, and sequences the corrective/informational
// modals so that at most one is ever active.
//
// The presentation layer and the backend are both collaborators behind
// traits: `Gateway` is the request/response boundary to the backend process,
// `PromptSurface` is the shell's modal prompt renderer.

pub mod controller;
pub mod core;
pub mod dialog;
pub mod gateway;
pub mod monitor;
pub mod options;

// Re-export main types for convenience
pub use controller::{BootstrapPhase, NoticePopup, ShellController, ShellSnapshot, TermsText};
pub use core::{Result, ShellError};
pub use dialog::{ErrorPrompt, InfoPrompt, ModalFlow, ModalSlot, PromptSurface};
pub use gateway::{
    AckResponse, ConfigStatusResponse, ConfigValues, DataReport, DataState, Gateway,
    InitialConfigForm, NoticeResponse, RpcGateway, RpcTransport, TermsResponse,
};
pub use options::ShellOptions;
