//! Game fetch unit.

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::{Event, GameId, GameReport};
use std::path::Path;

use super::{GamedayFetcher, as_dir_url, join_url};

impl GamedayFetcher {
    /// Fetch one game into `local_game_path`
    ///
    /// 1. Downloads the primary data file (always, overwriting).
    /// 2. For each entity category, fetches its listing and downloads every entity
    ///    this run has not claimed yet.
    ///
    /// Errors stop the game and are recorded in the report; they are never returned.
    /// Files written before the error stay on disk.
    pub async fn fetch_game(
        &self,
        game_url: &str,
        game: &GameId,
        local_game_path: &Path,
    ) -> GameReport {
        tracing::debug!(game = %game, url = game_url, "Fetching game");

        let mut report = GameReport::default();
        match self.try_fetch_game(game_url, game, local_game_path, &mut report).await {
            Ok(()) => {
                tracing::debug!(
                    game = %game,
                    entities_downloaded = report.entities_downloaded,
                    entities_skipped = report.entities_skipped,
                    "Fetched game"
                );
                self.emit_event(Event::GameCompleted {
                    game: game.clone(),
                    entities_downloaded: report.entities_downloaded,
                });
            }
            Err(e @ Error::Cancelled) => {
                tracing::debug!(game = %game, "Game fetch cancelled");
                report.error = Some(e.to_string());
            }
            Err(e) => {
                tracing::warn!(game = %game, kind = e.kind(), error = %e, "Game fetch failed");
                report.error = Some(e.to_string());
                self.emit_event(Event::GameFailed {
                    game: game.clone(),
                    error: e.to_string(),
                });
            }
        }
        report
    }

    async fn try_fetch_game(
        &self,
        game_url: &str,
        game: &GameId,
        dir: &Path,
        report: &mut GameReport,
    ) -> Result<()> {
        let base = HttpClient::parse_url(&as_dir_url(game_url))?;
        let layout = &self.config.layout;

        let primary_url = join_url(&base, &layout.primary_file)?;
        let primary_dest = dir.join(layout.primary_file_name());
        self.request(|| self.http.download(primary_url.as_str(), &primary_dest))
            .await?;
        report.primary_downloaded = true;

        for category in &layout.entity_categories {
            let listing_url = join_url(&base, &format!("{}/", category.trim_matches('/')))?;
            let document = self
                .request(|| self.http.get_text(listing_url.as_str()))
                .await?;
            let links = self.extractor.entity_links(&document)?;

            for link in links {
                if !self.dedup.try_claim(link.id) {
                    report.entities_skipped += 1;
                    continue;
                }

                let entity_url = join_url(&listing_url, &link.href)?;
                let dest = dir.join(link.file_name());
                self.request(|| self.http.download(entity_url.as_str(), &dest))
                    .await?;

                report.entities_downloaded += 1;
                tracing::trace!(game = %game, entity = %link.id, category = %category, "Downloaded entity");
                self.emit_event(Event::EntityDownloaded {
                    game: game.clone(),
                    entity: link.id,
                });
            }
        }
        Ok(())
    }
}
