use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::core::sync::DurableSync;
use crate::core::VideoRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: bool,
}

/// The saved library: records keyed by id, oldest save first.
///
/// Every call that changes the set writes the full set through [`DurableSync`]
/// before returning. If that write fails the in-memory change still stands and the
/// error is returned; the next successful write brings the slot back in line.
#[derive(Debug)]
pub struct LibraryStore {
    records: Vec<VideoRecord>,
    sync: DurableSync,
    recovered: Option<Error>,
}

impl LibraryStore {
    /// An empty library. Nothing is read from the slot.
    pub fn new(sync: DurableSync) -> Self {
        Self {
            records: Vec::new(),
            sync,
            recovered: None,
        }
    }

    /// Load the persisted library. Unreadable state starts an empty library and is
    /// kept in [`recovered_error`](Self::recovered_error).
    pub fn hydrate(sync: DurableSync) -> Self {
        let (loaded, recovered) = match sync.try_load() {
            Ok(records) => (records.unwrap_or_default(), None),
            Err(e) => {
                warn!("Starting with an empty library: {}", e);
                (Vec::new(), Some(e))
            }
        };

        let mut seen = HashSet::new();
        let records: Vec<VideoRecord> = loaded
            .into_iter()
            .filter(|r| seen.insert(r.id))
            .collect();
        info!("Loaded {} saved videos from slot '{}'", records.len(), sync.slot());

        Self {
            records,
            sync,
            recovered,
        }
    }

    pub fn recovered_error(&self) -> Option<&Error> {
        self.recovered.as_ref()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub fn get(&self, id: u64) -> Option<&VideoRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `record` unless its id is already saved.
    pub fn add(&mut self, record: VideoRecord) -> Result<AddOutcome> {
        if self.contains(record.id) {
            debug!("Video {} already saved", record.id);
            return Ok(AddOutcome { added: false });
        }

        debug!("Saving video {}", record.id);
        self.records.push(record);
        self.sync.save(&self.records)?;
        Ok(AddOutcome { added: true })
    }

    pub fn remove(&mut self, id: u64) -> Result<RemoveOutcome> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return Ok(RemoveOutcome { removed: false });
        };

        debug!("Removing video {}", id);
        self.records.remove(index);
        self.sync.save(&self.records)?;
        Ok(RemoveOutcome { removed: true })
    }

    /// Empty the library. Always writes, even when already empty.
    pub fn clear(&mut self) -> Result<()> {
        debug!("Clearing {} saved videos", self.records.len());
        self.records.clear();
        self.sync.save(&self.records)
    }
}
