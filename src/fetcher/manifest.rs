//! Per-day completion manifest used by [`ResumeMode::Manifest`](crate::config::ResumeMode)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Manifest file name inside a day directory
///
/// Starts with a dot and is not `.xml`, so tools walking the tree for data files
/// do not pick it up.
pub const MANIFEST_FILE: &str = ".fillbass-day.json";

/// Which games of a day are done, and whether the day as a whole is
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayManifest {
    /// Listing fetched and every game finished
    pub complete: bool,
    /// Games that finished without error
    pub games: BTreeSet<String>,
    /// Unix timestamp of the last write
    pub updated_at: i64,
}

impl DayManifest {
    /// Manifest path for a day directory
    pub fn path(day_dir: &Path) -> PathBuf {
        day_dir.join(MANIFEST_FILE)
    }

    /// Read the manifest of `day_dir`; `None` when there is none yet
    pub async fn load(day_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(day_dir);
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::filesystem(path, e)),
        }
    }

    /// Whether `game` is recorded as finished
    pub fn has_game(&self, game: &str) -> bool {
        self.games.contains(game)
    }

    /// Write the manifest to `day_dir` via a temp file and rename
    pub async fn save(&mut self, day_dir: &Path) -> Result<()> {
        self.updated_at = chrono::Utc::now().timestamp();
        let path = Self::path(day_dir);
        let tmp = day_dir.join(format!("{MANIFEST_FILE}.tmp"));
        let raw = serde_json::to_vec_pretty(self)?;

        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| Error::filesystem(&tmp, e))?;
        file.write_all(&raw)
            .await
            .map_err(|e| Error::filesystem(&tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| Error::filesystem(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::filesystem(&path, e))
    }
}
