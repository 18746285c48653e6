//! Streaming JSON Lines output.
//!
//! One `Header` line with the schema version and both sources, then one
//! JSON object per emitted event. Consumers can follow a run while it is
//! still in progress; the trailing `RunSummary` line closes it.

use std::io::Write;

use serde::Serialize;

use crate::diff::{DiffError, DiffEvent, DiffReport};
use crate::sink::DiffSink;

#[derive(Serialize)]
struct JsonLinesHeader<'a> {
    kind: &'static str,
    version: &'static str,
    source_a: &'a str,
    source_b: &'a str,
}

/// A [`DiffSink`] that writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    source_a: String,
    source_b: String,
    wrote_header: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, source_a: impl Into<String>, source_b: impl Into<String>) -> Self {
        JsonLinesSink {
            writer,
            source_a: source_a.into(),
            source_b: source_b.into(),
            wrote_header: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn sink_err(err: impl std::fmt::Display) -> DiffError {
    DiffError::SinkError {
        message: err.to_string(),
    }
}

impl<W: Write> DiffSink for JsonLinesSink<W> {
    fn begin(&mut self) -> Result<(), DiffError> {
        if self.wrote_header {
            return Ok(());
        }
        let header = JsonLinesHeader {
            kind: "Header",
            version: DiffReport::SCHEMA_VERSION,
            source_a: &self.source_a,
            source_b: &self.source_b,
        };
        serde_json::to_writer(&mut self.writer, &header).map_err(sink_err)?;
        self.writer.write_all(b"\n").map_err(sink_err)?;
        self.wrote_header = true;
        Ok(())
    }

    fn emit(&mut self, event: DiffEvent) -> Result<(), DiffError> {
        serde_json::to_writer(&mut self.writer, &event).map_err(sink_err)?;
        self.writer.write_all(b"\n").map_err(sink_err)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DiffError> {
        self.writer.flush().map_err(sink_err)
    }
}
