use serde::{Deserialize, Serialize};
use std::fmt;

/// Cloudinary resource types the listing endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Raw,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Raw => "raw",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A publicly fetchable media URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
}

impl Asset {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCollection {
    pub folder: String,
    pub assets: Vec<Asset>,
    /// Set when the host reported more results than were returned
    pub truncated: bool,
}

impl AssetCollection {
    pub fn new(folder: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            folder: folder.into(),
            assets,
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|asset| asset.url.as_str())
    }
}
