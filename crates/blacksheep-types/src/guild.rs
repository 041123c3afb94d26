use crate::Snowflake;
use serde::{Deserialize, Serialize};

/// A permission role defined in a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    /// Owned by an integration rather than assignable by hand
    pub managed: bool,
    /// Listed separately in the member sidebar
    pub hoist: bool,
    /// RGB colour as an integer, 0 for none
    pub color: u32,
    pub position: i32,
}

/// Server metadata shown by the `guild` command and the channel list header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub owner_id: Snowflake,
    /// AFK timeout in seconds
    pub afk_timeout: u32,
    pub verification_level: u8,
    pub explicit_content_filter: u8,
    pub widget_enabled: bool,
    pub roles: Vec<Role>,
}
