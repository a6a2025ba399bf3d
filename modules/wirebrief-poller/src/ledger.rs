//! Durable record of which (message, ticker) units have produced a brief.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use wirebrief_common::WirebriefError;

/// Sentinel ticker covering every ticker of a message. Entries from the
/// old per-message state format migrate to `"{id}#ALL"`.
const ALL_TICKERS: &str = "ALL";

/// Ledger key for one processing unit.
pub fn unit_key(message_id: &str, ticker: &str) -> String {
    format!("{message_id}#{ticker}")
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    processed_keys: BTreeSet<String>,
    /// Pre-ticker format: bare message ids. Read once, never written back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    processed_ids: Vec<String>,
}

/// Set of processed unit keys, persisted as JSON after every completed unit.
#[derive(Debug)]
pub struct ProcessedLedger {
    path: PathBuf,
    keys: BTreeSet<String>,
}

impl ProcessedLedger {
    /// Load the ledger from `path`. A missing file starts an empty ledger;
    /// an unreadable or corrupt file is logged and also starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut keys = BTreeSet::new();

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<LedgerFile>(&raw) {
                Ok(mut file) => {
                    keys.append(&mut file.processed_keys);
                    for id in file.processed_ids.drain(..) {
                        keys.insert(unit_key(&id, ALL_TICKERS));
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt ledger file; starting empty");
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read ledger file; starting empty");
            }
        }

        Self { path, keys }
    }

    /// True if this unit key or its message-wide `ALL` sentinel is recorded.
    pub fn is_processed(&self, key: &str) -> bool {
        if self.keys.contains(key) {
            return true;
        }
        match key.rsplit_once('#') {
            Some((message_id, _)) => self.keys.contains(&unit_key(message_id, ALL_TICKERS)),
            None => false,
        }
    }

    pub fn mark_processed(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    /// Write the ledger to disk. Legacy `processed_ids` entries were folded
    /// into keys at load time, so the old field is dropped here.
    pub fn persist(&self) -> Result<(), WirebriefError> {
        let file = LedgerFile {
            processed_keys: self.keys.clone(),
            processed_ids: Vec::new(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| WirebriefError::State(format!("serialize ledger: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            WirebriefError::State(format!("write {}: {e}", self.path.display()))
        })?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
