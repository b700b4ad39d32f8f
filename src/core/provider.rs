use crate::core::error::FetchError;
use crate::core::{SearchRequest, VideoRecord};
use async_trait::async_trait;

/// A remote video catalog that can be searched by free text.
///
/// Implementations return records already normalized, in provider order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, request: &SearchRequest) -> Result<Vec<VideoRecord>, FetchError>;
}
