//! Bootstrap phase classification.

/// Lifecycle phase of the shell.
///
/// Monotonic during a normal startup (`Unchecked` → setup/terms → `Ready`),
/// but the controller re-runs classification after every bootstrap-relevant
/// operation, so a deleted configuration moves the shell back to setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    /// Startup evaluation has not completed yet. The shell shows nothing but
    /// a loading surface.
    Unchecked,
    /// No usable configuration exists (or the backend could not tell us).
    /// The shell shows the initial-setup screen.
    NeedsInitialConfig,
    /// Configuration exists but the terms of use are not accepted.
    NeedsTerms,
    /// Configured and terms accepted. The main view may load.
    Ready,
}

impl BootstrapPhase {
    /// Classify a bootstrap probe result. Absent facts count as false.
    pub fn classify(config_exists: bool, terms_accepted: bool) -> Self {
        match (config_exists, terms_accepted) {
            (false, _) => Self::NeedsInitialConfig,
            (true, false) => Self::NeedsTerms,
            (true, true) => Self::Ready,
        }
    }

    /// Whether the phase admits background polling. Only a fully bootstrapped
    /// shell is monitored; setup and terms screens have nothing to verify.
    pub fn is_stable(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether startup evaluation has completed.
    pub fn is_checked(self) -> bool {
        !matches!(self, Self::Unchecked)
    }
}
