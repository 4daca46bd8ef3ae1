//! Output module for emitting processing results
//!
//! This module handles:
//! - The per-URL output record and its JSON shape
//! - Diagnostic notices for retried and failed URLs
//! - Newline-delimited JSON writing and in-memory collection

mod jsonl;
mod memory;
mod traits;

pub use jsonl::JsonLinesOutput;
pub use memory::MemoryOutput;
pub use traits::{Diagnostic, OutputError, OutputHandler, OutputRecord, OutputResult};
