//! Core types for fillbass

use crate::error::{Error, ParseError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI date format (`DD/MM/YYYY`)
pub const DMY_FORMAT: &str = "%d/%m/%Y";

/// One calendar day, mapped to fixed-width remote and local path segments
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateDescriptor(NaiveDate);

impl DateDescriptor {
    /// Build from year/month/day, `None` when the date does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse the CLI's `DD/MM/YYYY` format
    pub fn parse_dmy(input: &str) -> Result<Self> {
        NaiveDate::parse_from_str(input.trim(), DMY_FORMAT)
            .map(Self)
            .map_err(|_| {
                ParseError::InvalidDate {
                    input: input.to_string(),
                    expected: "DD/MM/YYYY",
                }
                .into()
            })
    }

    /// Underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month number (1-12)
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month (1-31)
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Relative path shared by the remote and local trees: `year_Y/month_MM/day_DD`
    pub fn path_segment(&self) -> String {
        format!(
            "year_{}/month_{:02}/day_{:02}",
            self.year(),
            self.month(),
            self.day()
        )
    }

    /// Day listing URL below `base_dir_url` (which must end in `/`), with trailing slash
    pub fn remote_url(&self, base_dir_url: &str) -> String {
        format!("{}{}/", base_dir_url, self.path_segment())
    }

    /// Local day directory under `root`
    pub fn local_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("year_{}", self.year()))
            .join(format!("month_{:02}", self.month()))
            .join(format!("day_{:02}", self.day()))
    }
}

impl From<NaiveDate> for DateDescriptor {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for DateDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of days
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: DateDescriptor,
    end: DateDescriptor,
}

impl DateRange {
    /// Create a range; fails when `start` is after `end`
    pub fn new(start: DateDescriptor, end: DateDescriptor) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange {
                start: start.date(),
                end: end.date(),
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day
    pub fn single(day: DateDescriptor) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// First day
    pub fn start(&self) -> DateDescriptor {
        self.start
    }

    /// Last day (inclusive)
    pub fn end(&self) -> DateDescriptor {
        self.end
    }

    /// Number of days, `(end - start).days + 1`
    pub fn len(&self) -> usize {
        (self.end.date() - self.start.date()).num_days() as usize + 1
    }

    /// Always false; a valid range holds at least one day
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every day in the range, ascending
    pub fn days(&self) -> impl Iterator<Item = DateDescriptor> + use<> {
        let end = self.end.date();
        self.start
            .date()
            .iter_days()
            .take_while(move |d| *d <= end)
            .map(DateDescriptor)
    }
}

/// Game folder name taken from a day listing (e.g. `gid_2008_04_01_bosmlb_oakmlb_1`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric player identifier, the dedup key
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// One entity row of a pitchers/batters listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityLink {
    /// Identifier parsed from the file name
    pub id: EntityId,
    /// The href as written in the listing
    pub href: String,
}

impl EntityLink {
    /// Local file name: the final path segment of the href
    pub fn file_name(&self) -> &str {
        self.href
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(self.href.as_str())
    }
}

/// Child entry of a listing document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildRef {
    /// A game folder from a day listing
    Game(GameId),
    /// An entity file from a pitchers/batters listing
    Entity(EntityLink),
}

/// What happened to a single game
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GameReport {
    /// Primary data file written
    pub primary_downloaded: bool,
    /// Entity files written for this game
    pub entities_downloaded: usize,
    /// Entity files skipped because another game already claimed them
    pub entities_skipped: usize,
    /// First error that stopped the game, if any
    pub error: Option<String>,
}

impl GameReport {
    /// True when the game finished without error
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Final state of a day unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Already fetched by an earlier run; nothing was requested
    Skipped,
    /// Listing fetched and every game finished
    Complete,
    /// Listing failed or at least one game failed
    Incomplete,
}

/// What happened to a single day
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayReport {
    /// The day
    pub date: DateDescriptor,
    /// Final state
    pub status: DayStatus,
    /// Games that finished
    pub games_completed: usize,
    /// Games that hit an error
    pub games_failed: usize,
    /// Games already recorded as done in the day manifest
    pub games_resumed: usize,
    /// Entity files written
    pub entities_downloaded: usize,
    /// Entity files skipped by the deduplicator
    pub entities_skipped: usize,
    /// Listing failure that cut the day short
    pub listing_error: Option<String>,
}

impl DayReport {
    pub(crate) fn new(date: DateDescriptor, status: DayStatus) -> Self {
        Self {
            date,
            status,
            games_completed: 0,
            games_failed: 0,
            games_resumed: 0,
            entities_downloaded: 0,
            entities_skipped: 0,
            listing_error: None,
        }
    }
}

/// Aggregated counters for a whole run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Day units handed to the worker pool
    pub days_submitted: usize,
    /// Days refused at submission (shutdown in progress)
    pub days_rejected: usize,
    /// Days skipped by the completion gate
    pub days_skipped: usize,
    /// Days that finished every game
    pub days_completed: usize,
    /// Days with a failed listing or at least one failed game
    pub days_incomplete: usize,
    /// Days that failed outright (directory creation, cancellation, panic)
    pub days_failed: usize,
    /// Games finished across all days
    pub games_completed: usize,
    /// Games with an error across all days
    pub games_failed: usize,
    /// Entity files written
    pub entities_downloaded: usize,
    /// Entity files skipped by the deduplicator
    pub entities_skipped: usize,
}

impl RunSummary {
    pub(crate) fn record_day(&mut self, report: &DayReport) {
        match report.status {
            DayStatus::Skipped => self.days_skipped += 1,
            DayStatus::Complete => self.days_completed += 1,
            DayStatus::Incomplete => self.days_incomplete += 1,
        }
        self.games_completed += report.games_completed;
        self.games_failed += report.games_failed;
        self.entities_downloaded += report.entities_downloaded;
        self.entities_skipped += report.entities_skipped;
    }
}

/// Event emitted during a fetch run
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Day handed to the worker pool
    DayQueued {
        /// The day
        date: DateDescriptor,
    },

    /// Day unit acquired a worker and passed the completion gate
    DayStarted {
        /// The day
        date: DateDescriptor,
    },

    /// Day already fetched; no requests were made
    DaySkipped {
        /// The day
        date: DateDescriptor,
    },

    /// Day unit returned
    DayFinished {
        /// Final report
        report: DayReport,
    },

    /// Day unit failed outright
    DayFailed {
        /// The day
        date: DateDescriptor,
        /// Error message
        error: String,
    },

    /// Game finished
    GameCompleted {
        /// The game
        game: GameId,
        /// Entity files written for this game
        entities_downloaded: usize,
    },

    /// Game stopped on an error
    GameFailed {
        /// The game
        game: GameId,
        /// Error message
        error: String,
    },

    /// Entity file written
    EntityDownloaded {
        /// The game it was listed under
        game: GameId,
        /// The entity
        entity: EntityId,
    },

    /// All submitted days have returned
    RunComplete {
        /// Final counters
        summary: RunSummary,
    },
}
