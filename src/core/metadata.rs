use serde::{Deserialize, Deserializer, Serialize};

/// One encoded rendition of a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Quality label as reported by the provider ("hd", "sd", "uhd", ...).
    #[serde(default)]
    pub quality: Option<String>,
    /// Playable reference.
    pub link: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Variant {
    pub fn has_quality(&self, label: &str) -> bool {
        self.quality.as_deref() == Some(label)
    }

    /// File extension for downloads, taken from the MIME subtype.
    pub fn extension(&self) -> &str {
        self.file_type
            .as_deref()
            .and_then(|mime| mime.split_once('/'))
            .map(|(_, subtype)| subtype)
            .filter(|subtype| !subtype.is_empty())
            .unwrap_or("mp4")
    }
}

/// A catalog item as known to the library and the search session.
///
/// `selected_variant`, when present, is always one of `raw_variants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: u64,
    pub duration_seconds: u64,
    pub uploader_name: String,
    pub canonical_url: String,
    pub thumbnail_url: String,
    pub selected_variant: Option<Variant>,
    #[serde(default)]
    pub raw_variants: Vec<Variant>,
}

impl VideoRecord {
    pub fn is_playable(&self) -> bool {
        self.selected_variant.is_some()
    }

    pub fn quality_label(&self) -> &str {
        self.selected_variant
            .as_ref()
            .and_then(|v| v.quality.as_deref())
            .unwrap_or("-")
    }
}

/// Request sent to a search provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page_size: u32,
}

/// Top-level shape of a provider search response.
///
/// Items stay as raw JSON values so one malformed item cannot fail the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSearchResponse {
    pub videos: Vec<serde_json::Value>,
}

/// Only `id` is required. Missing or null fields fall back to their defaults and
/// variants stay raw so each one is decoded on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVideo {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_files: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
