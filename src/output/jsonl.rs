use crate::output::traits::{OutputHandler, OutputRecord, OutputResult};
use std::io::Write;

/// Writes one JSON object per line to any `Write` sink
///
/// Each line is flushed as soon as it is written so that downstream readers
/// see records while the run is still in progress.
pub struct JsonLinesOutput<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Returns the number of records written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Consumes the handler, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesOutput<std::io::Stdout> {
    /// Creates a handler writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OutputHandler for JsonLinesOutput<W> {
    fn record(&mut self, record: &OutputRecord) -> OutputResult<()> {
        let line = record.to_json_line()?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        tracing::debug!("Wrote {} records", self.written);
        Ok(())
    }
}
