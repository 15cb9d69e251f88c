//! Command-line entry point for fillbass

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use fillbass::{Config, DateDescriptor, DateRange, GamedayFetcher, ResumeMode, run_with_shutdown};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Mirror the MLB gameday file tree to local disk
#[derive(Debug, Parser)]
#[command(name = "fillbass", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file; flags override its values
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every day between the start and end dates, inclusive
    Fetch(FetchArgs),
}

#[derive(Debug, clap::Args)]
struct FetchArgs {
    /// First day, DD/MM/YYYY
    #[arg(short, long, default_value = "01/01/2008", value_parser = DateDescriptor::parse_dmy)]
    start_date: DateDescriptor,

    /// Last day, DD/MM/YYYY
    #[arg(short, long, default_value = "01/01/2017", value_parser = DateDescriptor::parse_dmy)]
    end_date: DateDescriptor,

    /// Days fetched in parallel
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds; 0 disables it
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// How finished days are recognised: directory or manifest
    #[arg(long)]
    resume: Option<ResumeMode>,

    /// Local root of the mirrored tree [default: data]
    save_path: Option<PathBuf>,
}

impl FetchArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.save_path {
            config.local_root = path.clone();
        }
        if let Some(n) = self.concurrency {
            config.max_concurrent_days = n;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(mode) = self.resume {
            config.resume = mode;
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fillbass={level}")));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Fetch(args) => {
            args.apply(&mut config);
            let range = DateRange::new(args.start_date, args.end_date)?;
            let fetcher = GamedayFetcher::new(config).context("invalid configuration")?;

            let summary = run_with_shutdown(fetcher, range).await;
            if summary.days_failed + summary.days_incomplete + summary.days_rejected > 0 {
                tracing::warn!(
                    days_failed = summary.days_failed,
                    days_incomplete = summary.days_incomplete,
                    days_rejected = summary.days_rejected,
                    "Some days were not fully fetched"
                );
            }
        }
    }
    Ok(())
}
