//! Lifecycle state and stop reasons

use std::fmt;

/// Scheduler lifecycle: `Idle -> Started -> Running -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Started,
    Running,
    /// Terminal
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Why a run loop ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_ticks` reached
    MaxTicks,
    /// `max_run_s` elapsed
    MaxRuntime,
    /// Source exhausted and looping disabled
    InputEof,
    /// External shutdown request
    Signal,
}

impl StopReason {
    /// Message carried by the terminating event
    pub fn message(&self) -> &'static str {
        match self {
            Self::MaxTicks => "max_ticks reached",
            Self::MaxRuntime => "max_runtime reached",
            Self::InputEof => "input source reached end",
            Self::Signal => "signal received",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
