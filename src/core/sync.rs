use tracing::{debug, warn};

use crate::core::error::{Error, Result};
use crate::core::store::KeyValueStore;
use crate::core::VideoRecord;

/// Slot name used when the configuration does not override it.
pub const DEFAULT_SLOT: &str = "videos";

/// Mirrors the saved library into one named slot of a key-value store.
///
/// Every save writes the full set. An empty set removes the slot, so "absent" and
/// "saved nothing" are the same persisted state.
pub struct DurableSync {
    store: Box<dyn KeyValueStore>,
    slot: String,
}

impl DurableSync {
    pub fn new(store: Box<dyn KeyValueStore>, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn save(&self, records: &[VideoRecord]) -> Result<()> {
        if records.is_empty() {
            debug!("Removing empty slot '{}'", self.slot);
            return self.store.remove(&self.slot).map_err(|source| Error::PersistenceWrite {
                slot: self.slot.clone(),
                source,
            });
        }

        let json = serde_json::to_string(records).map_err(Error::Encode)?;
        debug!("Writing {} records ({} bytes) to slot '{}'", records.len(), json.len(), self.slot);
        self.store.set(&self.slot, &json).map_err(|source| Error::PersistenceWrite {
            slot: self.slot.clone(),
            source,
        })
    }

    /// Read the slot, surfacing unreadable or corrupt state as `PersistenceRead`.
    pub fn try_load(&self) -> Result<Option<Vec<VideoRecord>>> {
        let content = self.store.get(&self.slot).map_err(|e| Error::PersistenceRead {
            slot: self.slot.clone(),
            reason: e.to_string(),
        })?;

        let Some(content) = content else {
            return Ok(None);
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::PersistenceRead {
                slot: self.slot.clone(),
                reason: e.to_string(),
            })
    }

    /// Like [`try_load`](Self::try_load), but a read failure counts as no prior state.
    pub fn load(&self) -> Option<Vec<VideoRecord>> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                warn!("Ignoring saved library: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for DurableSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableSync").field("slot", &self.slot).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    fn record(id: u64) -> VideoRecord {
        VideoRecord {
            id,
            duration_seconds: 30,
            uploader_name: "uploader".to_string(),
            canonical_url: format!("https://p/{}", id),
            thumbnail_url: format!("https://i/{}", id),
            selected_variant: None,
            raw_variants: vec![],
        }
    }

    #[test]
    fn test_read_your_writes() {
        let store = MemoryStore::new();
        let sync = DurableSync::new(Box::new(store.clone()), DEFAULT_SLOT);

        let records = vec![record(1), record(2)];
        sync.save(&records).unwrap();
        assert_eq!(sync.load(), Some(records));
    }

    #[test]
    fn test_empty_save_removes_slot() {
        let store = MemoryStore::new();
        let sync = DurableSync::new(Box::new(store.clone()), DEFAULT_SLOT);

        sync.save(&[record(1)]).unwrap();
        assert!(store.contains(DEFAULT_SLOT));
        sync.save(&[]).unwrap();
        assert!(!store.contains(DEFAULT_SLOT));
        assert_eq!(sync.load(), None);
    }

    #[test]
    fn test_corrupt_slot_is_absent() {
        let store = MemoryStore::new();
        store.set(DEFAULT_SLOT, "{not json").unwrap();
        let sync = DurableSync::new(Box::new(store), DEFAULT_SLOT);

        assert!(matches!(sync.try_load(), Err(Error::PersistenceRead { .. })));
        assert_eq!(sync.load(), None);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let sync = DurableSync::new(Box::new(MemoryStore::with_quota(8)), "tiny");
        let err = sync.save(&[record(1)]).unwrap_err();
        assert!(matches!(err, Error::PersistenceWrite { ref slot, .. } if slot == "tiny"));
        assert!(err.is_persistence());
    }
}
