use tracing::{debug, warn};

use crate::core::error::FetchError;
use crate::core::quality::select_variant;
use crate::core::{RawSearchResponse, RawVideo, Variant, VideoRecord};

impl From<RawVideo> for VideoRecord {
    fn from(raw: RawVideo) -> Self {
        let id = raw.id;
        let raw_variants: Vec<Variant> = raw
            .video_files
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<Variant>(value) {
                Ok(variant) => Some(variant),
                Err(e) => {
                    warn!("Skipping malformed variant #{} of video {}: {}", index, id, e);
                    None
                }
            })
            .collect();
        let selected_variant = select_variant(&raw_variants).cloned();

        Self {
            id,
            duration_seconds: raw.duration,
            uploader_name: raw.user.map(|u| u.name).unwrap_or_default(),
            canonical_url: raw.url,
            thumbnail_url: raw.image,
            selected_variant,
            raw_variants,
        }
    }
}

/// Map a decoded provider response to records, in provider order.
///
/// Items without a usable id are skipped with a warning. Null or missing fields
/// take defaults, malformed variants are dropped on their own, and items left
/// without variants become unplayable records.
pub fn normalize(response: RawSearchResponse) -> Vec<VideoRecord> {
    let total = response.videos.len();
    let records: Vec<VideoRecord> = response
        .videos
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawVideo>(value) {
            Ok(raw) => Some(VideoRecord::from(raw)),
            Err(e) => {
                warn!("Skipping malformed item #{}: {}", index, e);
                None
            }
        })
        .collect();

    debug!("Normalized {}/{} items", records.len(), total);
    records
}

/// Parse a response body and normalize it. A body that is not a search response
/// fails the whole batch.
pub fn normalize_body(body: &str) -> Result<Vec<VideoRecord>, FetchError> {
    let response: RawSearchResponse = serde_json::from_str(body)?;
    Ok(normalize(response))
}
