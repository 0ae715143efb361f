//! Ledger record types.
//!
//! A [`DocEntry`] pairs one tracked source file with the markdown written for
//! it. Freshness is decided by comparing [`source_hash`] of the file on disk
//! against the hash stored at generation time; timestamps are informational.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::core::error::DocgenError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    Current,
    Stale,
    Error,
}

impl DocStatus {
    pub const ALL: [DocStatus; 3] = [DocStatus::Current, DocStatus::Stale, DocStatus::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            DocStatus::Current => "current",
            DocStatus::Stale => "stale",
            DocStatus::Error => "error",
        }
    }
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocStatus {
    type Err = DocgenError;

    /// Case-insensitive parse of a status filter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        DocStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| {
                DocgenError::InvalidInput(format!(
                    "Invalid status: {}. Use current, stale, or error",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocEntry {
    pub source_file: String,
    pub doc_file: String,
    #[serde(default = "default_status")]
    pub status: DocStatus,
    pub generated_at: NaiveDateTime,
    #[serde(default)]
    pub source_hash: String,
}

fn default_status() -> DocStatus {
    DocStatus::Current
}

impl DocEntry {
    /// A freshly generated entry, stamped with the local wall-clock time.
    pub fn new(source_file: &str, doc_file: &str, source_hash: &str) -> Self {
        Self {
            source_file: ledger_key(Path::new(source_file)),
            doc_file: doc_file.to_string(),
            status: DocStatus::Current,
            generated_at: now_local(),
            source_hash: source_hash.to_string(),
        }
    }

    pub fn is_current(&self) -> bool {
        self.status == DocStatus::Current
    }
}

/// Per-status tally of a set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub current: usize,
    pub stale: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn of(entries: &[DocEntry]) -> Self {
        entries.iter().fold(
            StatusCounts {
                total: entries.len(),
                ..Default::default()
            },
            |mut counts, entry| {
                match entry.status {
                    DocStatus::Current => counts.current += 1,
                    DocStatus::Stale => counts.stale += 1,
                    DocStatus::Error => counts.error += 1,
                }
                counts
            },
        )
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} docs ({} current, {} stale)",
            self.total, self.current, self.stale
        )
    }
}

/// Local time truncated to microseconds so the ledger stays readable by
/// tools that only accept six fractional digits.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Lowercase hex SHA-256 of the exact bytes that were documented.
pub fn source_hash(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Normalized string form used as the ledger key.
///
/// Drops `.` components and trailing separators without touching the
/// filesystem, so `./src/a.py` and `src/a.py/` both key as `src/a.py`.
pub fn ledger_key(path: &Path) -> String {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        return ".".to_string();
    }
    normalized.to_string_lossy().into_owned()
}
