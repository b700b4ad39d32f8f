pub mod downloader;
pub mod error;
pub mod library;
pub mod metadata;
pub mod normalizer;
pub mod provider;
pub mod quality;
pub mod session;
pub mod store;
pub mod sync;

pub use downloader::Downloader;
pub use error::{Error, FetchError};
pub use library::{AddOutcome, LibraryStore, RemoveOutcome};
pub use metadata::{RawSearchResponse, RawUser, RawVideo, SearchRequest, Variant, VideoRecord};
pub use normalizer::{normalize, normalize_body};
pub use provider::SearchProvider;
pub use quality::select_variant;
pub use session::{Completion, SearchSession, SessionState, Update};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use sync::{DurableSync, DEFAULT_SLOT};
