use crate::Snowflake;
use std::path::PathBuf;

/// Where in a message a media URL was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaOrigin {
    InlineLink,
    Attachment,
    EmbedImage,
}

/// A URL the scraper will try to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    pub url: String,
    pub origin: MediaOrigin,
}

impl MediaCandidate {
    pub fn new(url: impl Into<String>, origin: MediaOrigin) -> Self {
        Self {
            url: url.into(),
            origin,
        }
    }
}

/// What to scrape and where to put it
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
    pub server_id: Snowflake,
    /// `None` means every text channel in the server
    pub channel_id: Option<Snowflake>,
    pub output_dir: PathBuf,
}
