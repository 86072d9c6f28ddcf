//! Append-only JSON Lines signal store.
//!
//! One accepted candidate per line. The file is read once on open and kept
//! in memory; appends go to both.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use smc_core::dedup::{SignalKey, SignalStore};
use smc_core::domain::TradeCandidate;
use smc_core::SmcError;

pub struct JsonlSignalStore {
    path: PathBuf,
    file: File,
    candidates: Vec<TradeCandidate>,
}

impl JsonlSignalStore {
    /// Open `path`, creating it if missing, and load its history.
    pub fn open(path: &Path) -> Result<Self, SmcError> {
        let candidates = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let mut loaded = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                loaded.push(serde_json::from_str(&line).map_err(std::io::Error::from)?);
            }
            loaded
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            candidates,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

impl SignalStore for JsonlSignalStore {
    fn recent(
        &self,
        key: &SignalKey,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeCandidate>, SmcError> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| key.matches(c) && c.created_at >= since)
            .cloned()
            .collect())
    }

    fn append(&mut self, candidate: &TradeCandidate) -> Result<(), SmcError> {
        let line = serde_json::to_string(candidate).map_err(std::io::Error::from)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.candidates.push(candidate.clone());
        Ok(())
    }
}
