pub mod cli;
pub mod config;
pub mod core;
pub mod providers;
pub mod utils;

pub use crate::core::{
    select_variant, DurableSync, LibraryStore, SearchProvider, SearchSession, VideoRecord,
};
pub use crate::providers::PexelsProvider;
