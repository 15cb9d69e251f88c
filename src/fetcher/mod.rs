//! Fetch orchestration split into focused submodules.
//!
//! - [`game`] - one game: primary file plus unclaimed entity files
//! - [`day`] - completion gate, day directory, day listing, sequential games
//! - [`run`] - date iteration and the bounded day worker pool
//! - [`manifest`] - per-day completion manifest for [`ResumeMode::Manifest`]
//!
//! [`ResumeMode::Manifest`]: crate::config::ResumeMode::Manifest

mod day;
mod game;
pub mod manifest;
mod run;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::dedup::EntityDeduplicator;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::listing::ListingExtractor;
use crate::retry;
use crate::types::Event;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Mirrors a date range of the remote tree into the local root
///
/// Cloneable; every clone shares the HTTP pool, the entity claim set, the worker
/// limit and the cancellation token.
#[derive(Clone)]
pub struct GamedayFetcher {
    pub(crate) config: Arc<Config>,
    pub(crate) http: HttpClient,
    pub(crate) extractor: ListingExtractor,
    pub(crate) dedup: EntityDeduplicator,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Worker slots for day units (respects max_concurrent_days)
    pub(crate) concurrent_limit: Arc<tokio::sync::Semaphore>,
    /// Run-level cancellation, raced against every request
    pub(crate) cancel: CancellationToken,
    /// Cleared by shutdown(); submissions are refused afterwards
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl GamedayFetcher {
    /// Create a fetcher with a fresh entity claim set
    pub fn new(config: Config) -> Result<Self> {
        Self::with_deduplicator(config, EntityDeduplicator::new())
    }

    /// Create a fetcher that shares an existing claim set
    pub fn with_deduplicator(config: Config, dedup: EntityDeduplicator) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new(&config)?;
        let extractor = ListingExtractor::new(&config.layout);
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1024);
        let concurrent_limit = Arc::new(tokio::sync::Semaphore::new(config.max_concurrent_days));

        tracing::debug!(
            base_url = %config.base_url,
            local_root = %config.local_root.display(),
            max_concurrent_days = config.max_concurrent_days,
            resume = ?config.resume,
            "Fetcher initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            http,
            extractor,
            dedup,
            event_tx,
            concurrent_limit,
            cancel: CancellationToken::new(),
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to fetch events
    ///
    /// Each subscriber receives every event. A subscriber more than 1024 events behind
    /// gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this fetcher was built with
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The run's entity claim set
    pub fn deduplicator(&self) -> &EntityDeduplicator {
        &self.dedup
    }

    /// Stop accepting days and cancel in-flight requests
    pub fn shutdown(&self) {
        tracing::info!("Shutting down fetcher");
        self.accepting_new.store(false, Ordering::SeqCst);
        self.cancel.cancel();
    }

    /// Whether shutdown() has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // No receivers is fine; the event is dropped
        self.event_tx.send(event).ok();
    }

    /// Run a request under the retry policy, aborting with [`Error::Cancelled`] on shutdown
    pub(crate) async fn request<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = retry::with_retry(&self.config.retry, operation) => result,
        }
    }
}

/// Resolve `relative` against a directory URL
pub(crate) fn join_url(base: &url::Url, relative: &str) -> Result<url::Url> {
    base.join(relative).map_err(|e| Error::InvalidUrl {
        url: format!("{base} + {relative}"),
        reason: e.to_string(),
    })
}

/// `url` with exactly one trailing slash
pub(crate) fn as_dir_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}
