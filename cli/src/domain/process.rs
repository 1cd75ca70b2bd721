//! Process-facing value types: signals and action outcomes.

/// Signals the lifecycle engine delivers. Closed set — anything else is
/// outside this tool's remit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
    Usr1,
}

impl Signal {
    /// Name as understood by `kill -<NAME>`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Signal::Term => "TERM",
            Signal::Kill => "KILL",
            Signal::Usr1 => "USR1",
        }
    }

    /// Conventional Unix signal number, used in failure logs.
    #[must_use]
    pub fn number(self) -> u32 {
        match self {
            Signal::Term => 15,
            Signal::Kill => 9,
            Signal::Usr1 => 10,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SIG{}", self.name())
    }
}

/// Result of delivering a signal to a PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalResult {
    Delivered,
    /// The PID no longer exists; normalised so that restart-if-running
    /// idioms behave the same locally and remotely.
    NoSuchProcess,
}

/// Explicit outcome of a per-instance action.
///
/// `AlreadyStopped`, `AlreadyRunning` and `Unsupported` are success-shaped:
/// the fan-out executor logs them distinctly but never counts them as
/// failures. Real failures travel as `Err` alongside this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action changed state (or produced its output).
    Changed,
    /// Stop-like action on an instance with no discoverable process.
    AlreadyStopped,
    /// Start-like action on an instance that is already running.
    AlreadyRunning,
    /// The component type does not implement this action.
    Unsupported,
}
