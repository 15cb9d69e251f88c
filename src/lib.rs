//! # fillbass
//!
//! Mirrors the MLB gameday (gd2) static file tree to local disk.
//!
//! For every day of a date range the fetcher lists the day folder, and for every game
//! in it downloads the play-by-play file plus the per-player files linked from the
//! game's `pitchers/` and `batters/` folders. A player's file is fetched once per run
//! even when the player appears in many games. Days run in parallel on a bounded
//! worker pool; games inside a day run one after another.
//!
//! The local tree mirrors the remote one:
//!
//! ```text
//! data/year_2008/month_04/day_01/gid_2008_04_01_bosmlb_oakmlb_1/inning_all.xml
//! data/year_2008/month_04/day_01/gid_2008_04_01_bosmlb_oakmlb_1/111.xml
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use fillbass::{Config, DateDescriptor, DateRange, GamedayFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = GamedayFetcher::new(Config::default())?;
//!
//!     let mut events = fetcher.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let range = DateRange::new(
//!         DateDescriptor::parse_dmy("01/04/2008")?,
//!         DateDescriptor::parse_dmy("07/04/2008")?,
//!     )?;
//!     let summary = fetcher.run(range).await;
//!     println!("{} days complete", summary.days_completed);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Per-run entity claim set
pub mod dedup;
/// Error types
pub mod error;
/// Day, game and run orchestration
pub mod fetcher;
/// HTTP facade over a pooled client
pub mod http;
/// Directory-listing parsing
pub mod listing;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, LayoutConfig, ResumeMode, RetryConfig};
pub use dedup::EntityDeduplicator;
pub use error::{Error, ParseError, Result};
pub use fetcher::GamedayFetcher;
pub use http::HttpClient;
pub use listing::{ListingExtractor, ListingKind};
pub use types::{
    ChildRef, DateDescriptor, DateRange, DayReport, DayStatus, EntityId, EntityLink, Event,
    GameId, GameReport, RunSummary,
};

/// Run `range` and shut the fetcher down on SIGTERM or SIGINT
///
/// In-flight requests are cancelled and days still waiting for a worker are not
/// started; the summary of what finished is returned either way.
///
/// # Example
///
/// ```no_run
/// use fillbass::{Config, DateDescriptor, DateRange, GamedayFetcher, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = GamedayFetcher::new(Config::default())?;
///     let day = DateDescriptor::parse_dmy("01/04/2008")?;
///     let summary = run_with_shutdown(fetcher, DateRange::single(day)).await;
///     println!("{summary:?}");
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(fetcher: GamedayFetcher, range: DateRange) -> RunSummary {
    let run = fetcher.run(range);
    tokio::pin!(run);

    tokio::select! {
        summary = &mut run => summary,
        _ = wait_for_signal() => {
            fetcher.shutdown();
            run.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            // Without a handler the run is never interrupted
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
