//! State module for tracking run progress
//!
//! # Components
//!
//! - `ProcessorState`: Tracks the lifecycle of one processing run
//!   (running, draining, complete)

mod processor_state;

// Re-export main types
pub use processor_state::ProcessorState;
