#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistent per-level high-score ledger with rank insertion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use switchback_core::{LevelId, ScoreEntry};
use thiserror::Error;

/// Largest number of entries a level's ledger retains.
pub const MAX_ENTRIES: usize = 10;

/// Errors surfaced by ledger persistence.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The score file for a level could not be created or read.
    #[error("failed to read scores for {level}: {source}")]
    Read {
        /// Level whose file was accessed.
        level: LevelId,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The score file for a level could not be written.
    #[error("failed to persist scores for {level}: {source}")]
    Write {
        /// Level whose file was written.
        level: LevelId,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Returns the slot a candidate score would occupy in a descending list.
///
/// Ties insert before existing equal scores; a candidate lower than every
/// entry ranks at `entries.len()`. Ranks at or past [`MAX_ENTRIES`] do not
/// qualify for recording.
#[must_use]
pub fn rank(score: u32, entries: &[ScoreEntry]) -> usize {
    entries
        .iter()
        .position(|entry| entry.score() <= score)
        .unwrap_or(entries.len())
}

/// Directory-backed store of ranked `<score>:<name>` lines, one file per
/// level.
#[derive(Clone, Debug)]
pub struct ScoreLedger {
    root: PathBuf,
}

impl ScoreLedger {
    /// Creates a ledger rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the ledger persists into.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the ranked entries recorded for a level.
    ///
    /// A level without a score file yields an empty list; the file is
    /// created so later writes never race a missing directory. Malformed
    /// lines are skipped with a warning.
    pub fn load(&self, level: &LevelId) -> Result<Vec<ScoreEntry>, LedgerError> {
        let path = self.score_path(level);
        if !path.exists() {
            fs::create_dir_all(&self.root).map_err(|source| LedgerError::Read {
                level: level.clone(),
                source,
            })?;
            let _ = fs::File::create(&path).map_err(|source| LedgerError::Read {
                level: level.clone(),
                source,
            })?;
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(|source| LedgerError::Read {
            level: level.clone(),
            source,
        })?;
        Ok(parse_entries(&raw, level))
    }

    /// Inserts an entry at its rank, truncates to [`MAX_ENTRIES`], and
    /// rewrites the level's score file in descending order.
    pub fn record(
        &self,
        level: &LevelId,
        entries: &mut Vec<ScoreEntry>,
        index: usize,
        entry: ScoreEntry,
    ) -> Result<(), LedgerError> {
        entries.insert(index.min(entries.len()), entry);
        entries.truncate(MAX_ENTRIES);
        self.persist(level, entries)
    }

    fn persist(&self, level: &LevelId, entries: &[ScoreEntry]) -> Result<(), LedgerError> {
        fs::create_dir_all(&self.root).map_err(|source| LedgerError::Write {
            level: level.clone(),
            source,
        })?;
        let mut contents = String::new();
        for entry in entries {
            contents.push_str(&format!("{}:{}\n", entry.score(), entry.name()));
        }
        fs::write(self.score_path(level), contents).map_err(|source| LedgerError::Write {
            level: level.clone(),
            source,
        })?;
        info!("persisted {} score entries for {level}", entries.len());
        Ok(())
    }

    fn score_path(&self, level: &LevelId) -> PathBuf {
        self.root.join(format!("{}_score", level.as_str()))
    }
}

fn parse_entries(raw: &str, level: &LevelId) -> Vec<ScoreEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = line.split_once(':').and_then(|(score, name)| {
            let score = score.trim().parse::<u32>().ok()?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(ScoreEntry::new(score, name))
        });
        match parsed {
            Some(entry) => entries.push(entry),
            None => warn!("skipping malformed score line for {level}: {line:?}"),
        }
    }
    entries
}
