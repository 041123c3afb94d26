//! Channel history scraping engine.
//!
//! [`Scraper`] resolves the channels of a [`ScrapeTarget`] and runs one
//! [`ChannelWalker`] per channel on a bounded pool. Each walker pages through
//! the history newest to oldest, appends a plain-text transcript and hands
//! the media found in every message to the [`Downloader`].
//!
//! Failures come in two classes. A failed page fetch or download is logged
//! and skipped. A filesystem failure, or an explicitly requested channel
//! that cannot be read, is returned as [`ScrapeError`] and stops the whole
//! run.
//!
//! [`ScrapeTarget`]: blacksheep_types::ScrapeTarget

pub mod download;
pub mod error;
pub mod media;
pub mod mentions;
pub mod options;
pub mod orchestrator;
pub mod walker;

pub use download::{Downloader, FetchError, HttpBody, HttpFetcher, MediaBody, MediaFetcher};
pub use error::{Result, ScrapeError};
pub use media::extract_media;
pub use mentions::{resolve_mentions, rewrite_mentions};
pub use options::{ScrapeMode, ScrapeOptions};
pub use orchestrator::{ScrapeReport, Scraper};
pub use walker::{ChannelOutcome, ChannelReport, ChannelWalker};
