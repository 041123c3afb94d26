//! BlackSheep Types - Core types shared by the scraper crates
//!
//! This module defines the platform data model (messages, channels, servers,
//! ids), the media candidates derived from messages, and the
//! [`HistorySource`] port the scrape engine consumes.

mod channel;
mod guild;
mod media;
mod message;
mod snowflake;
mod source;

pub use channel::{Channel, ChannelKind};
pub use guild::{Guild, Role};
pub use media::{MediaCandidate, MediaOrigin, ScrapeTarget};
pub use message::{Attachment, Embed, Message, UserTag};
pub use snowflake::{Snowflake, DISCORD_EPOCH_MS};
pub use source::{ApiError, HistorySource, MAX_PAGE_SIZE};
