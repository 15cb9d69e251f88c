//! Run orchestration: one day unit per date, at most `max_concurrent_days` in flight.

use crate::error::{Error, Result};
use crate::types::{DateDescriptor, DateRange, DayReport, Event, RunSummary};
use std::sync::atomic::Ordering;
use tokio::task::JoinSet;

use super::GamedayFetcher;

type DayOutcome = (DateDescriptor, Result<DayReport>);

impl GamedayFetcher {
    /// Fetch every day of `range` and wait for all of them
    ///
    /// Every day is submitted up front; submission never blocks. Each day unit then
    /// waits for one of the `max_concurrent_days` worker slots. Failures of a single
    /// day (an `Err` or a panic) are logged and counted, never propagated, so the
    /// summary is always returned.
    pub async fn run(&self, range: DateRange) -> RunSummary {
        tracing::info!(
            start = %range.start(),
            end = %range.end(),
            days = range.len(),
            workers = self.config.max_concurrent_days,
            "Starting run"
        );

        let mut summary = RunSummary::default();
        let mut days: JoinSet<DayOutcome> = JoinSet::new();

        for date in range.days() {
            match self.submit_day(&mut days, date) {
                Ok(()) => summary.days_submitted += 1,
                Err(e) => {
                    tracing::error!(date = %date, error = %e, "Day rejected");
                    summary.days_rejected += 1;
                }
            }
        }

        while let Some(joined) = days.join_next().await {
            match joined {
                Ok((_, Ok(report))) => summary.record_day(&report),
                Ok((date, Err(e))) => {
                    tracing::error!(date = %date, kind = e.kind(), error = %e, "Day failed");
                    summary.days_failed += 1;
                    self.emit_event(Event::DayFailed {
                        date,
                        error: e.to_string(),
                    });
                }
                Err(join_err) => {
                    // The date went down with the task
                    tracing::error!(error = %join_err, "Day task panicked");
                    summary.days_failed += 1;
                }
            }
        }

        tracing::info!(
            days_submitted = summary.days_submitted,
            days_rejected = summary.days_rejected,
            days_skipped = summary.days_skipped,
            days_completed = summary.days_completed,
            days_incomplete = summary.days_incomplete,
            days_failed = summary.days_failed,
            games_completed = summary.games_completed,
            games_failed = summary.games_failed,
            entities_downloaded = summary.entities_downloaded,
            entities_skipped = summary.entities_skipped,
            "Run complete"
        );
        self.emit_event(Event::RunComplete {
            summary: summary.clone(),
        });
        summary
    }

    fn submit_day(&self, days: &mut JoinSet<DayOutcome>, date: DateDescriptor) -> Result<()> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let fetcher = self.clone();
        days.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = fetcher.cancel.cancelled() => return (date, Err(Error::Cancelled)),
                permit = fetcher.concurrent_limit.clone().acquire_owned() => permit,
            };
            // The semaphore is never closed
            let Ok(_permit) = permit else {
                return (date, Err(Error::ShuttingDown));
            };
            (date, fetcher.fetch_day(date).await)
        });

        tracing::debug!(date = %date, "Day queued");
        self.emit_event(Event::DayQueued { date });
        Ok(())
    }
}
