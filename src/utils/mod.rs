use std::path::PathBuf;

use crate::core::VideoRecord;

/// A browsable category: display name and the query it searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub query: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Nature",
        query: "nature",
    },
    Category {
        name: "Travel",
        query: "travel",
    },
    Category {
        name: "City",
        query: "city",
    },
    Category {
        name: "Cars",
        query: "car",
    },
    Category {
        name: "Fashion",
        query: "fashion",
    },
    Category {
        name: "Animals",
        query: "animals",
    },
    Category {
        name: "Technology",
        query: "technology",
    },
    Category {
        name: "Business",
        query: "business",
    },
    Category {
        name: "Food",
        query: "food",
    },
    Category {
        name: "Sports",
        query: "sports",
    },
    Category {
        name: "Music",
        query: "music",
    },
    Category {
        name: "Fitness",
        query: "fitness",
    },
];

/// Resolve a category by display name, case-insensitively.
pub fn category_query(name: &str) -> Option<&'static str> {
    let name = name.trim();
    CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .map(|c| c.query)
}

/// `m:ss`, minutes unbounded.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn output_filename(record: &VideoRecord, from_library: bool) -> PathBuf {
    let ext = record
        .selected_variant
        .as_ref()
        .map(|v| v.extension())
        .unwrap_or("mp4");
    let prefix = if from_library { "saved-video" } else { "video" };
    PathBuf::from(format!("{}-{}.{}", prefix, record.id, ext))
}
