//! Processor coordinator - the single-lane event loop
//!
//! This module contains the loop that ties every component together:
//! - Reading input chunks and tokenizing them into bracket groups
//! - Resolving groups to canonical URLs and gating them through dedup
//! - Running one fetch at a time, spaced by the rate-limit interval
//! - Arming one delayed retry per failed URL and re-queuing it on expiry
//! - Emitting one record per URL and signalling completion exactly once
//!
//! All run state is owned by the `Processor` and touched only from the
//! loop, so timers re-enter the queue without locks.

use crate::config::ProcessorConfig;
use crate::output::{Diagnostic, OutputHandler, OutputRecord};
use crate::processor::fetcher::Fetcher;
use crate::processor::parser::build_record;
use crate::processor::scheduler::{ProcessingTask, TaskQueue};
use crate::state::ProcessorState;
use crate::tokenizer::{BracketGroup, BracketTokenizer};
use crate::url::extract_url;
use crate::{FetchError, FetchResult, ProcessError};
use futures::future::{BoxFuture, OptionFuture};
use futures::{FutureExt, Stream, StreamExt};
use std::io;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tokio_util::time::DelayQueue;

/// The seam between the scheduler and the network
///
/// `Fetcher` is the production implementation; tests substitute scripted
/// fetchers to exercise scheduling without a server.
pub trait PageFetcher: Clone + Send + Sync + 'static {
    /// Fetches one URL, returning the body of a 2xx response
    fn fetch_page(&self, url: &str, is_retry: bool) -> BoxFuture<'static, FetchResult<String>>;
}

impl PageFetcher for Fetcher {
    fn fetch_page(&self, url: &str, is_retry: bool) -> BoxFuture<'static, FetchResult<String>> {
        let fetcher = self.clone();
        let url = url.to_string();
        async move { fetcher.fetch(&url, is_retry).await }.boxed()
    }
}

/// Counters describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct canonical URLs scheduled
    pub urls_scheduled: usize,

    /// Output records written
    pub records_emitted: usize,

    /// Retries armed after a failed first attempt
    pub retries_scheduled: usize,

    /// URLs whose retry failed as well
    pub final_failures: usize,

    /// URL occurrences dropped as duplicates
    pub duplicates_dropped: usize,

    /// Wall time from start to completion
    pub elapsed: Duration,
}

type Attempt = BoxFuture<'static, (ProcessingTask, FetchResult<String>)>;

/// Main processor structure
///
/// A processor performs exactly one run: `run` consumes it. Subscribe to
/// state changes with `subscribe` before starting the run.
pub struct Processor<F: PageFetcher = Fetcher> {
    config: ProcessorConfig,
    fetcher: F,
    queue: TaskQueue,
    retries: DelayQueue<String>,
    in_flight: Option<Attempt>,
    next_start: Option<Instant>,
    state: watch::Sender<ProcessorState>,
    summary: RunSummary,
}

impl Processor<Fetcher> {
    /// Creates a processor backed by the HTTP fetcher
    ///
    /// # Returns
    ///
    /// * `Ok(Processor)` - Configuration valid and client built
    /// * `Err(ProcessError)` - Invalid configuration or client failure
    pub fn new(config: ProcessorConfig) -> Result<Self, ProcessError> {
        config.validate()?;
        let fetcher = Fetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: PageFetcher> Processor<F> {
    /// Creates a processor with a custom fetcher
    pub fn with_fetcher(config: ProcessorConfig, fetcher: F) -> Self {
        let (state, _) = watch::channel(ProcessorState::Running);

        Self {
            config,
            fetcher,
            queue: TaskQueue::new(),
            retries: DelayQueue::new(),
            in_flight: None,
            next_start: None,
            state,
            summary: RunSummary::default(),
        }
    }

    /// Returns a receiver that observes state transitions
    ///
    /// `ProcessorState::Complete` is published exactly once, at the moment
    /// the input has ended and all queued, executing, and retried work has
    /// resolved.
    pub fn subscribe(&self) -> watch::Receiver<ProcessorState> {
        self.state.subscribe()
    }

    /// Returns the current state
    pub fn state(&self) -> ProcessorState {
        *self.state.borrow()
    }

    /// Runs the processor to completion
    ///
    /// # Flow
    ///
    /// 1. Start the next queued task if the worker is idle and the
    ///    rate-limit gate is open
    /// 2. Finish if input has ended and nothing is queued, executing, or
    ///    awaiting retry
    /// 3. Otherwise wait for whichever comes first: an input chunk, the
    ///    executing task's outcome, the rate-limit gate, or a retry timer
    ///
    /// # Arguments
    ///
    /// * `input` - Chunked text; chunk boundaries may fall anywhere
    /// * `output` - Receives records and diagnostics
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed
    /// * `Err(ProcessError)` - The input or output stream failed
    pub async fn run<S, O>(mut self, mut input: S, output: &mut O) -> Result<RunSummary, ProcessError>
    where
        S: Stream<Item = io::Result<String>> + Unpin,
        O: OutputHandler,
    {
        tracing::info!("Starting processing run");
        let start_time = Instant::now();
        let mut tokenizer = BracketTokenizer::new();
        let mut input_open = true;

        loop {
            self.start_next_task();

            if !input_open && self.queue.can_finish() {
                break;
            }

            tokio::select! {
                chunk = input.next(), if input_open => match chunk {
                    Some(Ok(text)) => {
                        for group in tokenizer.feed(&text) {
                            self.handle_group(&group);
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!("Input stream failed: {}", e);
                        return Err(e.into());
                    }
                    None => {
                        tokenizer.finish();
                        input_open = false;
                        if !self.queue.can_finish() {
                            self.transition(ProcessorState::Draining);
                        }
                    }
                },

                Some((task, result)) = OptionFuture::from(self.in_flight.as_mut()), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.handle_outcome(task, result, output)?;
                }

                _ = sleep_until(self.next_start.unwrap_or_else(Instant::now)), if self.next_start.is_some() => {
                    self.next_start = None;
                }

                Some(expired) = self.retries.next(), if !self.retries.is_empty() => {
                    let url = expired.into_inner();
                    tracing::debug!("Retry timer fired for {}", url);
                    self.queue.push_retry(url);
                }

                else => {
                    tracing::warn!("Event loop has nothing left to wait on");
                    break;
                }
            }
        }

        self.transition(ProcessorState::Complete);
        output.finalize()?;

        self.summary.urls_scheduled = self.queue.scheduled_count();
        self.summary.duplicates_dropped = self.queue.duplicates_dropped();
        self.summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Processing completed: {} URLs, {} retries, {} final failures in {:?}",
            self.summary.urls_scheduled,
            self.summary.retries_scheduled,
            self.summary.final_failures,
            self.summary.elapsed
        );

        Ok(self.summary)
    }

    /// Resolves a bracket group and schedules its URL if it is new
    fn handle_group(&mut self, group: &BracketGroup) {
        let Some(url) = extract_url(group) else {
            tracing::trace!("No URL in bracket group {}", group);
            return;
        };

        if self.queue.schedule(url.clone()) {
            tracing::debug!("Scheduled {} ({} queued)", url, self.queue.len());
        } else {
            tracing::debug!("Skipping duplicate {}", url);
        }
    }

    /// Starts the next task when the worker is idle and the gate is open
    fn start_next_task(&mut self) {
        if self.in_flight.is_some() || self.next_start.is_some() {
            return;
        }

        let Some(task) = self.queue.start_next() else {
            return;
        };

        tracing::debug!(
            "Fetching {}{}",
            task.url,
            if task.is_retry { " (retry)" } else { "" }
        );

        let attempt = self.fetcher.fetch_page(&task.url, task.is_retry);
        self.in_flight = Some(async move { (task, attempt.await) }.boxed());
    }

    /// Handles the outcome of a finished task
    ///
    /// | Attempt | Outcome | Action |
    /// |---------|---------|--------|
    /// | First | Success | Emit full record |
    /// | First | Failure | Arm retry timer, no record yet |
    /// | Retry | Success | Emit full record |
    /// | Retry | Failure | Final-failure notice, emit URL-only record |
    fn handle_outcome<O: OutputHandler>(
        &mut self,
        task: ProcessingTask,
        result: FetchResult<String>,
        output: &mut O,
    ) -> Result<(), ProcessError> {
        self.queue.complete(&task);

        match result {
            Ok(body) => {
                let record = build_record(&task.url, &body, &self.config.secret);
                self.emit(&record, output)?;
            }
            Err(err) if !task.is_retry => self.schedule_retry(task, err, output)?,
            Err(err) => self.give_up(task, err, output)?,
        }

        // Space out the next dequeue only if something is waiting
        if !self.queue.is_empty() {
            self.next_start = Some(Instant::now() + self.config.rate_limit_interval);
        }

        Ok(())
    }

    /// Arms the one-shot retry timer for a failed first attempt
    fn schedule_retry<O: OutputHandler>(
        &mut self,
        task: ProcessingTask,
        err: FetchError,
        output: &mut O,
    ) -> Result<(), ProcessError> {
        if !self.queue.arm_retry(&task.url) {
            tracing::warn!("{} already used its retry", task.url);
            return self.give_up(task, err, output);
        }

        let delay = self.config.retry_delay;
        tracing::debug!("First attempt for {} failed: {}", task.url, err);

        output.diagnostic(&Diagnostic::RetryScheduled {
            url: task.url.clone(),
            delay,
        })?;
        self.retries.insert(task.url, delay);
        self.summary.retries_scheduled += 1;
        Ok(())
    }

    /// Reports a terminal failure and emits the URL-only record
    fn give_up<O: OutputHandler>(
        &mut self,
        task: ProcessingTask,
        err: FetchError,
        output: &mut O,
    ) -> Result<(), ProcessError> {
        output.diagnostic(&Diagnostic::FinalFailure {
            url: task.url.clone(),
            cause: err.to_string(),
        })?;
        self.summary.final_failures += 1;
        self.emit(&OutputRecord::url_only(task.url), output)
    }

    fn emit<O: OutputHandler>(
        &mut self,
        record: &OutputRecord,
        output: &mut O,
    ) -> Result<(), ProcessError> {
        output.record(record)?;
        self.summary.records_emitted += 1;
        Ok(())
    }

    /// Publishes a state change if it is a valid forward transition
    fn transition(&mut self, next: ProcessorState) {
        let current = *self.state.borrow();
        if current.can_transition_to(next) {
            tracing::debug!("Processor state {} -> {}", current, next);
            self.state.send_replace(next);
        }
    }
}
