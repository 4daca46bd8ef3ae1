//! Task queue with deduplication and completion accounting
//!
//! This module handles:
//! - The dedup gate: each canonical URL is scheduled at most once per run
//! - The FIFO of pending tasks, executed one at a time
//! - Retry bookkeeping: at most one retry per URL, and a pending-retry
//!   counter covering armed timers and fired-but-unresolved retries
//! - The "can finish" predicate used to decide when a run is complete

use std::collections::{HashSet, VecDeque};

/// A unit of work: one fetch attempt for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingTask {
    /// The canonical URL to fetch
    pub url: String,

    /// Whether this is the single scheduled retry
    pub is_retry: bool,
}

impl ProcessingTask {
    pub fn first_attempt(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_retry: false,
        }
    }

    pub fn retry(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_retry: true,
        }
    }
}

/// TaskQueue owns every piece of shared run state
///
/// It is driven from a single logical thread (the processor's event loop),
/// so plain collections suffice.
#[derive(Debug, Default)]
pub struct TaskQueue {
    /// Tasks waiting to run, in dequeue order
    pending: VecDeque<ProcessingTask>,

    /// Canonical URLs already scheduled (monotonic)
    seen: HashSet<String>,

    /// URLs that have used their one retry
    retried: HashSet<String>,

    /// Whether a task is currently executing
    executing: bool,

    /// Retries armed but not yet resolved
    pending_retries: usize,

    /// Occurrences dropped by the dedup gate
    duplicates_dropped: usize,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a first attempt for a URL unless it was seen before
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and a task was queued
    /// * `false` - Duplicate; nothing was queued
    pub fn schedule(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            self.duplicates_dropped += 1;
            return false;
        }

        self.seen.insert(url.clone());
        self.pending.push_back(ProcessingTask::first_attempt(url));
        true
    }

    /// Records that a retry timer is being armed for a URL
    ///
    /// Returns false if the URL already had its retry.
    pub fn arm_retry(&mut self, url: &str) -> bool {
        if !self.retried.insert(url.to_string()) {
            return false;
        }
        self.pending_retries += 1;
        true
    }

    /// Queues the retry task once its timer fires
    pub fn push_retry(&mut self, url: String) {
        self.pending.push_back(ProcessingTask::retry(url));
    }

    /// Dequeues the next task unless one is already executing
    pub fn start_next(&mut self) -> Option<ProcessingTask> {
        if self.executing {
            return None;
        }

        let task = self.pending.pop_front()?;
        self.executing = true;
        Some(task)
    }

    /// Marks the executing task as resolved
    ///
    /// A resolved retry releases its pending-retry slot whatever the outcome.
    pub fn complete(&mut self, task: &ProcessingTask) {
        self.executing = false;
        if task.is_retry {
            self.pending_retries = self.pending_retries.saturating_sub(1);
        }
    }

    /// True iff the queue is empty, nothing executes, and no retry is pending
    pub fn can_finish(&self) -> bool {
        self.pending.is_empty() && !self.executing && self.pending_retries == 0
    }

    /// Returns the number of queued tasks
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether no task is queued
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn pending_retries(&self) -> usize {
        self.pending_retries
    }

    /// Returns the number of distinct URLs ever scheduled
    pub fn scheduled_count(&self) -> usize {
        self.seen.len()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}
