//! Ledger store: the persistent record of documented source files.
//!
//! The ledger is a single JSON document `{ "version": 1, "entries": [...] }`
//! under the docgen home (`~/.docgen/docs.json` by default). Every operation
//! is a whole-file read-modify-write; there is no locking, so two concurrent
//! invocations race and the last save wins.
//!
//! Uniqueness of `source_file` is enforced here: [`LedgerStore::add`] is an
//! upsert, so callers never need to `find` first.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::entry::{DocEntry, DocStatus, ledger_key};
use crate::core::error::DocgenError;

/// Schema version written into every ledger file.
pub const LEDGER_VERSION: u32 = 1;

/// File name of the ledger inside the docgen home.
pub const LEDGER_FILE: &str = "docs.json";

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    entries: Vec<DocEntry>,
}

/// Handle on a ledger file. Cheap to clone; holds no open file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Ledger at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger at `<home>/docs.json`.
    pub fn in_dir(home: &Path) -> Self {
        Self::new(home.join(LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_exists(&self) -> Result<(), DocgenError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "initializing empty ledger");
            self.write_atomic(&[])?;
        }
        Ok(())
    }

    /// All entries. Creates an empty ledger if none exists yet.
    pub fn load(&self) -> Result<Vec<DocEntry>, DocgenError> {
        self.ensure_exists()?;
        let raw = fs::read_to_string(&self.path)?;
        let ledger: LedgerFile =
            serde_json::from_str(&raw).map_err(|e| DocgenError::LedgerCorrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        if ledger.version > LEDGER_VERSION {
            tracing::warn!(
                found = ledger.version,
                supported = LEDGER_VERSION,
                "ledger was written by a newer docgen; reading it anyway"
            );
        }
        tracing::debug!(entries = ledger.entries.len(), "ledger loaded");
        Ok(ledger.entries)
    }

    /// Replace the ledger contents with `entries`.
    pub fn save(&self, entries: &[DocEntry]) -> Result<(), DocgenError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.write_atomic(entries)?;
        tracing::debug!(entries = entries.len(), "ledger saved");
        Ok(())
    }

    /// Write to a sibling temp file, flush, then rename over the ledger so a
    /// crash mid-write leaves the previous contents intact.
    fn write_atomic(&self, entries: &[DocEntry]) -> Result<(), DocgenError> {
        let ledger = LedgerFile {
            version: LEDGER_VERSION,
            entries: entries.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&ledger).map_err(|e| DocgenError::LedgerCorrupt {
            path: self.path.display().to_string(),
            reason: format!("failed to serialize ledger: {e}"),
        })?;

        let tmp_path = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| LEDGER_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Entry whose key equals the normalized `source_file`, if any.
    pub fn find(&self, source_file: &str) -> Result<Option<DocEntry>, DocgenError> {
        let key = ledger_key(Path::new(source_file));
        Ok(self
            .load()?
            .into_iter()
            .find(|entry| entry.source_file == key))
    }

    /// Insert or replace the entry for `entry.source_file`.
    ///
    /// The first existing entry with the same key is overwritten in place and
    /// any further duplicates (from ledgers written by older tools) are
    /// dropped. Returns `true` when a new entry was appended.
    pub fn add(&self, entry: DocEntry) -> Result<bool, DocgenError> {
        let mut entry = entry;
        entry.source_file = ledger_key(Path::new(&entry.source_file));

        let mut entries = self.load()?;
        let mut replaced = false;
        entries.retain_mut(|existing| {
            if existing.source_file != entry.source_file {
                return true;
            }
            if replaced {
                return false;
            }
            *existing = entry.clone();
            replaced = true;
            true
        });
        if !replaced {
            entries.push(entry);
        }
        self.save(&entries)?;
        Ok(!replaced)
    }

    /// Entries, optionally restricted to one status.
    pub fn get(&self, status: Option<DocStatus>) -> Result<Vec<DocEntry>, DocgenError> {
        let entries = self.load()?;
        Ok(match status {
            Some(status) => entries.into_iter().filter(|e| e.status == status).collect(),
            None => entries,
        })
    }

    /// Remove every entry for `source_file`. Returns how many were removed.
    pub fn delete(&self, source_file: &str) -> Result<usize, DocgenError> {
        let key = ledger_key(Path::new(source_file));
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.source_file != key);
        let removed = before - entries.len();
        self.save(&entries)?;
        Ok(removed)
    }

    /// Set every entry for `source_file` to stale. Returns how many matched.
    pub fn mark_stale(&self, source_file: &str) -> Result<usize, DocgenError> {
        let key = ledger_key(Path::new(source_file));
        let mut entries = self.load()?;
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|e| e.source_file == key) {
            entry.status = DocStatus::Stale;
            changed += 1;
        }
        self.save(&entries)?;
        Ok(changed)
    }
}
