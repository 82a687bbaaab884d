//! FanoutSink - duplicates every record to several sinks

use contracts::{Event, EventSink, Result, RunInfo};
use tracing::warn;

/// Sink that forwards to children in order
///
/// The first child error aborts the operation and is returned.
pub struct FanoutSink {
    name: String,
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanoutSink {
    /// Wrap `sinks`; the fan-out is named after its children joined by `+`
    pub fn new(sinks: Vec<Box<dyn EventSink>>) -> Self {
        let name = sinks
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join("+");
        Self { name, sinks }
    }

    /// Number of child sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, run: &RunInfo) -> Result<()> {
        for idx in 0..self.sinks.len() {
            if let Err(e) = self.sinks[idx].open(run) {
                warn!(sink = self.sinks[idx].name(), error = %e, "fanout open failed");
                for opened in &mut self.sinks[..idx] {
                    opened.close();
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn emit(&mut self, event: &Event) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.emit(event))
    }

    fn flush(&mut self) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.flush())
    }

    fn close(&mut self) {
        for sink in &mut self.sinks {
            sink.close();
        }
    }
}
