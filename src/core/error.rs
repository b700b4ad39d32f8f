//! Error types for the library core

use thiserror::Error;

use crate::core::store::StoreError;

/// Why a search fetch produced no results.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no API key configured")]
    MissingApiKey,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("could not read slot '{slot}': {reason}")]
    PersistenceRead { slot: String, reason: String },

    #[error("could not write slot '{slot}': {source}")]
    PersistenceWrite {
        slot: String,
        #[source]
        source: StoreError,
    },

    #[error("could not encode saved library: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of the persistent slot, where the in-memory library
    /// is still authoritative.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::PersistenceRead { .. } | Error::PersistenceWrite { .. } | Error::Encode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
