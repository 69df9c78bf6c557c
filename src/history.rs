//! Command history: an append-only file of accepted lines plus a cursor
//! for Up/Down recall.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::error::PersistenceError;

/// What [`HistoryStore::recall_newer`] moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall<'a> {
    Entry(&'a str),
    /// Back at the live line; the caller should show an empty prompt.
    Live,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<String>,
    /// Offset from the end of `entries`; 0 means not browsing.
    cursor: usize,
}

impl HistoryStore {
    /// Read the history file, creating it empty if it doesn't exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();

        let entries = match File::open(&path) {
            Ok(file) => read_entries(file).map_err(|e| PersistenceError::new(&path, e))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                File::create(&path).map_err(|e| PersistenceError::new(&path, e))?;
                info!("created history file {}", path.display());
                Vec::new()
            }
            Err(err) => return Err(PersistenceError::new(&path, err)),
        };

        debug!("loaded {} history entries from {}", entries.len(), path.display());
        Ok(Self {
            path,
            entries,
            cursor: 0,
        })
    }

    /// Remember `line` unless it is empty or repeats the last entry. The
    /// in-memory log decides; the file append follows.
    pub fn record(&mut self, line: &str) -> Result<bool, PersistenceError> {
        if line.is_empty() || self.entries.last().map(String::as_str) == Some(line) {
            return Ok(false);
        }

        self.entries.push(line.to_string());
        self.append_to_disk(line).map_err(|e| {
            error!("history append to {} failed: {}", self.path.display(), e);
            PersistenceError::new(&self.path, e)
        })?;
        Ok(true)
    }

    fn append_to_disk(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }

    /// Step one entry further into the past, stopping at the oldest.
    pub fn recall_older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        self.entries
            .get(self.entries.len() - self.cursor)
            .map(String::as_str)
    }

    /// Step one entry back toward the live line. `None` when not browsing.
    pub fn recall_newer(&mut self) -> Option<Recall<'_>> {
        match self.cursor {
            0 => None,
            1 => {
                self.cursor = 0;
                Some(Recall::Live)
            }
            _ => {
                self.cursor -= 1;
                self.entries
                    .get(self.entries.len() - self.cursor)
                    .map(|e| Recall::Entry(e.as_str()))
            }
        }
    }

    /// Stop browsing; called on every submission.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor > 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_entries(file: File) -> io::Result<Vec<String>> {
    BufReader::new(file).lines().collect()
}

/// Create `path` empty when it does not exist yet. Existing files are left
/// untouched.
pub fn ensure_file(path: &Path) -> Result<(), PersistenceError> {
    match fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            File::create(path).map_err(|e| PersistenceError::new(path, e))?;
            info!("created {}", path.display());
            Ok(())
        }
        Err(err) => Err(PersistenceError::new(path, err)),
    }
}
