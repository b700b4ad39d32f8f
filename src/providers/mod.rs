pub mod pexels;

pub use pexels::PexelsProvider;
