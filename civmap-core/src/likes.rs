//! Per-user like state and its key-value persistence.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Facility;
use crate::ports::{CivmapError, LikeStore};

/// Storage key of the id → like count map.
pub const LIKE_COUNTS_KEY: &str = "facility_like_counts";
/// Storage key of the id → liked flag map.
pub const USER_LIKES_KEY: &str = "facility_user_likes";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Persisted like counts and liked flags keyed by facility id.
pub struct LikeLedger {
    /// Like count per facility id.
    #[serde(rename = "facility_like_counts", default)]
    pub counts: BTreeMap<String, u32>,
    /// Liked flag per facility id.
    #[serde(rename = "facility_user_likes", default)]
    pub liked: BTreeMap<String, bool>,
}

impl LikeLedger {
    /// Overlay persisted state onto freshly loaded facilities.
    ///
    /// A persisted count wins over the record's own; the liked flag defaults
    /// to `false`.
    pub fn apply<'a>(&self, facilities: impl IntoIterator<Item = &'a mut Facility>) {
        for facility in facilities {
            let key = facility.id.to_string();
            if let Some(count) = self.counts.get(&key) {
                facility.likes = *count;
            }
            facility.liked = self.liked.get(&key).copied().unwrap_or(false);
        }
    }

    /// Store the like fields of one facility.
    pub fn record(&mut self, facility: &Facility) {
        let key = facility.id.to_string();
        self.counts.insert(key.clone(), facility.likes);
        self.liked.insert(key, facility.liked);
    }
}

/// Flip the liked flag and adjust the count, never going below zero.
pub fn toggle(facility: &mut Facility) {
    facility.liked = !facility.liked;
    facility.likes = if facility.liked {
        facility.likes.saturating_add(1)
    } else {
        facility.likes.saturating_sub(1)
    };
}

/// Like state kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryLikeStore {
    ledger: Mutex<LikeLedger>,
}

impl MemoryLikeStore {
    /// Start from an existing ledger.
    #[must_use]
    pub fn with_ledger(ledger: LikeLedger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }
}

impl LikeStore for MemoryLikeStore {
    fn load(&self) -> Result<LikeLedger, CivmapError> {
        Ok(self
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, ledger: &LikeLedger) -> Result<(), CivmapError> {
        ledger.clone_into(&mut self.ledger.lock().unwrap_or_else(PoisonError::into_inner));
        Ok(())
    }
}

/// Like state stored as a JSON object with the two storage keys.
#[derive(Debug, Clone)]
pub struct JsonFileLikeStore {
    path: PathBuf,
}

impl JsonFileLikeStore {
    /// Store backed by the file at `path`; the file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LikeStore for JsonFileLikeStore {
    fn load(&self) -> Result<LikeLedger, CivmapError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(LikeLedger::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no like state yet");
                Ok(LikeLedger::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, ledger: &LikeLedger) -> Result<(), CivmapError> {
        let text = serde_json::to_string_pretty(ledger)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
