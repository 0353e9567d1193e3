use std::time::Duration;

/// Fixed delay between consistency poll ticks while the shell is stable.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Tuning knobs for the shell controller.
///
/// The defaults reproduce the production behavior; tests shorten the poll
/// interval to keep runtimes reasonable.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Delay between consistency poll ticks. The timer is fixed-delay, so
    /// ticks never overlap.
    pub poll_interval: Duration,

    /// When the data-check call fails at the transport level, substitute a
    /// synthetic all-clear state instead of surfacing the outage. This keeps
    /// the shell usable when the backend process is absent (browser-only /
    /// disconnected development); disable it to have outages mark the data
    /// state as not ok.
    pub fail_open_on_poll_errors: bool,
}

impl ShellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay between poll ticks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enable or disable the fail-open policy for poll transport failures.
    pub fn fail_open_on_poll_errors(mut self, enabled: bool) -> Self {
        self.fail_open_on_poll_errors = enabled;
        self
    }
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fail_open_on_poll_errors: true,
        }
    }
}
