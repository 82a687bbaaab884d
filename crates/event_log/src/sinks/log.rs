//! LogEventSink - mirrors events into the tracing log

use contracts::{Event, EventSink, Result, RunInfo};
use tracing::{info, instrument};

/// Sink that logs every event at info level
pub struct LogEventSink {
    name: String,
    emitted: u64,
}

impl LogEventSink {
    /// Create a new LogEventSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emitted: 0,
        }
    }

    /// Events logged since the last open
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_open", skip(self, run), fields(sink = %self.name))]
    fn open(&mut self, run: &RunInfo) -> Result<()> {
        self.emitted = 0;
        info!(
            sink = %self.name,
            node_id = %run.node_id,
            config_hash = %run.config_hash,
            calibration_hash = %run.calibration_hash,
            "run_started"
        );
        Ok(())
    }

    fn emit(&mut self, event: &Event) -> Result<()> {
        self.emitted += 1;
        info!(
            sink = %self.name,
            kind = %event.kind,
            t_ns = event.t_ns,
            message = event.message.as_deref().unwrap_or(""),
            "event"
        );
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Nothing to flush for log sink
        Ok(())
    }

    fn close(&mut self) {}
}
