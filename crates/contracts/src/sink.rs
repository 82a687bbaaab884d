//! EventSink trait - Event Log interface
//!
//! Defines the abstract interface for event sinks.

use crate::{Event, Result, RunInfo};

/// Event output trait
///
/// All sink implementations must implement this trait. Sinks are owned by one
/// caller for the lifetime of a run.
pub trait EventSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Start a run: prepare targets and write the run header
    ///
    /// # Errors
    /// Returns IO error if targets cannot be created
    fn open(&mut self, run: &RunInfo) -> Result<()>;

    /// Write one event record
    ///
    /// # Errors
    /// Internal error if called before `open`, IO error on write failure
    fn emit(&mut self, event: &Event) -> Result<()>;

    /// Flush buffered records
    fn flush(&mut self) -> Result<()>;

    /// Close sink. Safe to call repeatedly and after a failed `open`.
    fn close(&mut self);
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self, run: &RunInfo) -> Result<()> {
        (**self).open(run)
    }

    fn emit(&mut self, event: &Event) -> Result<()> {
        (**self).emit(event)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
