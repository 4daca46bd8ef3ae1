//! Bracket-Fetch main entry point
//!
//! This is the command-line interface for the bracketed URL resolver.

use anyhow::Context;
use bracket_fetch::config::ProcessorConfig;
use bracket_fetch::input::open_input;
use bracket_fetch::output::JsonLinesOutput;
use bracket_fetch::processor::Processor;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Bracket-Fetch: bracketed URL resolver
///
/// Reads text, finds `[...]` groups, fetches the last URL in each group
/// (one request per second, one delayed retry on failure), and prints one
/// JSON line per unique URL with the page title and a hashed email.
#[derive(Parser, Debug)]
#[command(name = "bracket-fetch")]
#[command(version)]
#[command(about = "Resolve bracketed URLs to titles and hashed emails", long_about = None)]
struct Cli {
    /// Input file; reads stdin when omitted or "-"
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Secret appended to extracted emails before hashing
    #[arg(long, env = "BRACKET_FETCH_SECRET", hide_env_values = true)]
    secret: String,

    /// Retry failed URLs after a few milliseconds instead of 60 seconds
    #[arg(long, env = "BRACKET_FETCH_FAST_RETRY")]
    fast_retry: bool,

    /// Override the retry delay in milliseconds
    #[arg(long, value_name = "MS", conflicts_with = "fast_retry")]
    retry_delay_ms: Option<u64>,

    /// Override the minimum spacing between requests in milliseconds
    #[arg(long, value_name = "MS")]
    rate_limit_ms: Option<u64>,

    /// Override the per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Builds the processor configuration from the parsed arguments
    fn processor_config(&self) -> ProcessorConfig {
        let mut config = if self.fast_retry {
            ProcessorConfig::fast(self.secret.clone())
        } else {
            ProcessorConfig::new(self.secret.clone())
        };

        if let Some(ms) = self.retry_delay_ms {
            config = config.with_retry_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.rate_limit_ms {
            config = config.with_rate_limit_interval(Duration::from_millis(ms));
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_fetch_timeout(Duration::from_secs(secs));
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let processor = Processor::new(cli.processor_config()).context("invalid configuration")?;

    let input = open_input(cli.input.as_deref())
        .await
        .with_context(|| match &cli.input {
            Some(path) => format!("failed to open {}", path.display()),
            None => "failed to open stdin".to_string(),
        })?;

    let mut output = JsonLinesOutput::stdout();

    match processor.run(input, &mut output).await {
        Ok(summary) => {
            tracing::info!(
                "Done: {} records, {} duplicates skipped",
                summary.records_emitted,
                summary.duplicates_dropped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Processing failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only JSON records.
fn setup_logging(verbose: u8, quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directives(verbose, quiet)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Chooses the filter directives for a verbosity level
///
/// Quiet mode still passes this crate's warnings, which carry the
/// retry-scheduled notices.
fn log_directives(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "bracket_fetch=warn,error";
    }

    match verbose {
        0 => "bracket_fetch=info,warn",
        1 => "bracket_fetch=debug,info",
        2 => "bracket_fetch=trace,debug",
        _ => "trace",
    }
}
