use crate::output::traits::{Diagnostic, OutputHandler, OutputRecord, OutputResult};

/// Collects records and diagnostics in memory
///
/// Useful when embedding the processor, and in tests that inspect both the
/// record stream and the diagnostic channel.
#[derive(Debug, Default, Clone)]
pub struct MemoryOutput {
    pub records: Vec<OutputRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub finalized: bool,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for a URL, if one was emitted
    pub fn record_for(&self, url: &str) -> Option<&OutputRecord> {
        self.records.iter().find(|r| r.url == url)
    }

    /// Returns the emitted URLs in emission order
    pub fn urls(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.url.as_str()).collect()
    }
}

impl OutputHandler for MemoryOutput {
    fn record(&mut self, record: &OutputRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> OutputResult<()> {
        tracing::debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic.clone());
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        self.finalized = true;
        Ok(())
    }
}
