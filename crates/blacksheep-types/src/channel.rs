use crate::Snowflake;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel types as numbered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelKind {
    GuildText,
    Dm,
    GuildVoice,
    GroupDm,
    GuildCategory,
    Unknown(u8),
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(value: ChannelKind) -> Self {
        match value {
            ChannelKind::GuildText => 0,
            ChannelKind::Dm => 1,
            ChannelKind::GuildVoice => 2,
            ChannelKind::GroupDm => 3,
            ChannelKind::GuildCategory => 4,
            ChannelKind::Unknown(other) => other,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuildText => f.write_str("Guild Text"),
            Self::Dm => f.write_str("DM"),
            Self::GuildVoice => f.write_str("Guild Voice"),
            Self::GroupDm => f.write_str("Group DM"),
            Self::GuildCategory => f.write_str("Guild Category"),
            Self::Unknown(n) => write!(f, "Unknown ({n})"),
        }
    }
}

/// A channel inside a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub nsfw: bool,
}

impl Channel {
    /// Only guild text channels carry a message history worth scraping
    pub fn is_text(&self) -> bool {
        self.kind == ChannelKind::GuildText
    }
}
