//! Day fetch unit.

use crate::config::ResumeMode;
use crate::error::{Error, Result};
use crate::types::{DateDescriptor, DayReport, DayStatus, Event, GameId};
use std::path::Path;

use super::GamedayFetcher;
use super::manifest::DayManifest;

impl GamedayFetcher {
    /// Fetch every game of `date`
    ///
    /// Steps:
    /// 1. Completion gate: in [`ResumeMode::Directory`] an existing day directory means
    ///    the day is done; in [`ResumeMode::Manifest`] only a manifest marked complete does.
    ///    A skipped day makes no requests.
    /// 2. Creates the day directory. Failure here is returned as `Err`.
    /// 3. Fetches the day listing. Failure other than cancellation ends the day as
    ///    [`DayStatus::Incomplete`] with the directory left in place.
    /// 4. Fetches the games one after another in listing order; a failed game does not
    ///    stop the ones after it.
    pub async fn fetch_day(&self, date: DateDescriptor) -> Result<DayReport> {
        let day_url = date.remote_url(&self.config.base_dir_url());
        let local_dir = date.local_dir(&self.config.local_root);

        let mut manifest = match self.config.resume {
            ResumeMode::Directory => {
                if is_dir(&local_dir).await {
                    return Ok(self.skip_day(date));
                }
                None
            }
            ResumeMode::Manifest => match DayManifest::load(&local_dir).await? {
                Some(m) if m.complete => return Ok(self.skip_day(date)),
                Some(m) => Some(m),
                None => Some(DayManifest::default()),
            },
        };

        tokio::fs::create_dir_all(&local_dir)
            .await
            .map_err(|e| Error::filesystem(&local_dir, e))?;

        tracing::info!(date = %date, "Retrieving day");
        self.emit_event(Event::DayStarted { date });

        let mut report = DayReport::new(date, DayStatus::Complete);

        let games = match self.fetch_game_ids(&day_url).await {
            Ok(games) => games,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!(date = %date, url = %day_url, kind = e.kind(), error = %e, "Day listing failed");
                report.status = DayStatus::Incomplete;
                report.listing_error = Some(e.to_string());
                self.emit_event(Event::DayFinished {
                    report: report.clone(),
                });
                return Ok(report);
            }
        };
        tracing::debug!(date = %date, games = games.len(), "Day listing fetched");

        for game in &games {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if let Some(m) = &manifest
                && m.has_game(game.as_str())
            {
                report.games_resumed += 1;
                continue;
            }

            let game_dir = local_dir.join(game.as_str());
            if let Err(e) = tokio::fs::create_dir_all(&game_dir).await {
                let e = Error::filesystem(&game_dir, e);
                tracing::warn!(date = %date, game = %game, error = %e, "Could not create game directory");
                report.games_failed += 1;
                self.emit_event(Event::GameFailed {
                    game: game.clone(),
                    error: e.to_string(),
                });
                continue;
            }

            let game_url = format!("{day_url}{game}/");
            let game_report = self.fetch_game(&game_url, game, &game_dir).await;
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            report.entities_downloaded += game_report.entities_downloaded;
            report.entities_skipped += game_report.entities_skipped;

            if !game_report.is_complete() {
                report.games_failed += 1;
                continue;
            }
            report.games_completed += 1;

            if let Some(m) = manifest.as_mut() {
                m.games.insert(game.as_str().to_string());
                self.save_manifest(m, &local_dir, date).await;
            }
        }

        if report.games_failed > 0 {
            report.status = DayStatus::Incomplete;
        } else if let Some(m) = manifest.as_mut() {
            m.complete = true;
            self.save_manifest(m, &local_dir, date).await;
        }

        tracing::info!(
            date = %date,
            games_completed = report.games_completed,
            games_failed = report.games_failed,
            games_resumed = report.games_resumed,
            entities_downloaded = report.entities_downloaded,
            "Retrieved day"
        );
        self.emit_event(Event::DayFinished {
            report: report.clone(),
        });
        Ok(report)
    }

    async fn fetch_game_ids(&self, day_url: &str) -> Result<Vec<GameId>> {
        let document = self.request(|| self.http.get_text(day_url)).await?;
        self.extractor.game_ids(&document)
    }

    fn skip_day(&self, date: DateDescriptor) -> DayReport {
        tracing::debug!(date = %date, "Day already fetched, skipping");
        self.emit_event(Event::DaySkipped { date });
        DayReport::new(date, DayStatus::Skipped)
    }

    // A manifest that cannot be written only costs resume precision on the next run.
    async fn save_manifest(&self, manifest: &mut DayManifest, day_dir: &Path, date: DateDescriptor) {
        if let Err(e) = manifest.save(day_dir).await {
            tracing::warn!(date = %date, error = %e, "Could not write day manifest");
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
