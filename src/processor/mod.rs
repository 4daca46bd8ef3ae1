//! Processor module for URL fetching and result building
//!
//! This module contains the core processing logic, including:
//! - Deduplication and the single-lane task queue
//! - HTTP fetching with protocol fallback
//! - Title and email extraction
//! - The event loop that paces tasks and schedules retries

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{PageFetcher, Processor, RunSummary};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{build_record, extract_email, hash_email, parse_html, ParsedPage};
pub use scheduler::{ProcessingTask, TaskQueue};

use crate::config::ProcessorConfig;
use crate::input::from_chunks;
use crate::output::OutputHandler;
use crate::ProcessError;

/// Processes a complete in-memory text in one run
///
/// This is a convenience wrapper over `Processor::new` and
/// `Processor::run` for callers that already hold the whole input.
///
/// # Arguments
///
/// * `config` - The processor configuration
/// * `text` - The input text
/// * `output` - Receives records and diagnostics
///
/// # Example
///
/// ```no_run
/// use bracket_fetch::config::ProcessorConfig;
/// use bracket_fetch::output::MemoryOutput;
/// use bracket_fetch::processor::process_text;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut output = MemoryOutput::new();
/// process_text(ProcessorConfig::new("s3cret"), "see [www.rust-lang.org]", &mut output).await?;
/// println!("{:?}", output.records);
/// # Ok(())
/// # }
/// ```
pub async fn process_text<O: OutputHandler>(
    config: ProcessorConfig,
    text: &str,
    output: &mut O,
) -> Result<RunSummary, ProcessError> {
    Processor::new(config)?
        .run(from_chunks([text.to_string()]), output)
        .await
}
