use crate::diff::{DiffError, DiffEvent};

/// Trait for streaming diff events to a consumer.
pub trait DiffSink {
    /// Called once before any events are emitted.
    ///
    /// Default is a no-op so sinks that don't need setup can ignore it.
    fn begin(&mut self) -> Result<(), DiffError> {
        Ok(())
    }

    fn emit(&mut self, event: DiffEvent) -> Result<(), DiffError>;

    /// Called exactly once per run, on success and on engine failure
    /// alike.
    fn finish(&mut self) -> Result<(), DiffError> {
        Ok(())
    }
}

/// Guarantees `finish` runs exactly once: the engine calls
/// [`SinkFinishGuard::finish_and_disarm`] on success, and `Drop` covers
/// every failure path (the failure keeps its original error; a finish
/// error on that path is dropped).
pub(crate) struct SinkFinishGuard<'a, S: DiffSink + ?Sized> {
    sink: &'a mut S,
    armed: bool,
}

impl<'a, S: DiffSink + ?Sized> SinkFinishGuard<'a, S> {
    pub(crate) fn new(sink: &'a mut S) -> SinkFinishGuard<'a, S> {
        SinkFinishGuard { sink, armed: true }
    }

    pub(crate) fn emit(&mut self, event: DiffEvent) -> Result<(), DiffError> {
        self.sink.emit(event)
    }

    pub(crate) fn finish_and_disarm(&mut self) -> Result<(), DiffError> {
        self.armed = false;
        self.sink.finish()
    }
}

impl<S: DiffSink + ?Sized> Drop for SinkFinishGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.sink.finish();
        }
    }
}

/// A sink that collects events into a Vec.
pub struct VecSink {
    events: Vec<DiffEvent>,
}

impl VecSink {
    pub fn new() -> VecSink {
        VecSink { events: Vec::new() }
    }

    pub fn into_events(self) -> Vec<DiffEvent> {
        self.events
    }
}

impl Default for VecSink {
    fn default() -> VecSink {
        VecSink::new()
    }
}

impl DiffSink for VecSink {
    fn emit(&mut self, event: DiffEvent) -> Result<(), DiffError> {
        self.events.push(event);
        Ok(())
    }
}

/// A sink that forwards events to a callback.
pub struct CallbackSink<F: FnMut(DiffEvent)> {
    f: F,
}

impl<F: FnMut(DiffEvent)> CallbackSink<F> {
    pub fn new(f: F) -> CallbackSink<F> {
        CallbackSink { f }
    }
}

impl<F: FnMut(DiffEvent)> DiffSink for CallbackSink<F> {
    fn emit(&mut self, event: DiffEvent) -> Result<(), DiffError> {
        (self.f)(event);
        Ok(())
    }
}
