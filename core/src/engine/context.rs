//! Emission bookkeeping shared by the engine passes.

use crate::diff::{DiffError, DiffEvent, DiffSummary};
use crate::sink::{DiffSink, SinkFinishGuard};

/// Tracks the outcome of a run while forwarding events to the sink.
///
/// The context owns the sink's finish guard: if any pass fails, dropping
/// the context still delivers the sink's `finish` callback.
pub(super) struct EmitContext<'a, S: DiffSink + ?Sized> {
    sink: SinkFinishGuard<'a, S>,
    pub(super) differs: bool,
    pub(super) event_count: usize,
}

impl<'a, S: DiffSink + ?Sized> EmitContext<'a, S> {
    pub(super) fn new(sink: &'a mut S) -> Self {
        EmitContext {
            sink: SinkFinishGuard::new(sink),
            differs: false,
            event_count: 0,
        }
    }

    /// Emits a finding and marks the run as differing.
    pub(super) fn finding(&mut self, event: DiffEvent) -> Result<(), DiffError> {
        debug_assert!(event.is_finding());
        self.differs = true;
        self.event_count = self.event_count.saturating_add(1);
        self.sink.emit(event)
    }

    /// Emits the trailing run summary and releases the sink.
    pub(super) fn close(
        mut self,
        source_a: String,
        source_b: String,
    ) -> Result<DiffSummary, DiffError> {
        let differs = self.differs;
        self.event_count = self.event_count.saturating_add(1);
        self.sink.emit(DiffEvent::RunSummary {
            differs,
            source_a,
            source_b,
        })?;
        self.sink.finish_and_disarm()?;
        Ok(DiffSummary {
            differs,
            event_count: self.event_count,
        })
    }
}
