//! Wire shapes of the REST API, converted into the shared data model.
//!
//! Only the fields the scraper reads are declared; everything else in the
//! payloads is ignored by serde.

use blacksheep_types::{
    Attachment, Channel, ChannelKind, Embed, Guild, Message, Role, Snowflake, UserTag,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    id: Snowflake,
    username: String,
    /// Accounts migrated to unique usernames report "0"
    #[serde(default = "default_discriminator")]
    discriminator: String,
}

fn default_discriminator() -> String {
    "0".to_string()
}

impl From<WireUser> for UserTag {
    fn from(user: WireUser) -> Self {
        UserTag::new(user.id, user.username, user.discriminator)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAttachment {
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireImage {
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEmbed {
    #[serde(default)]
    image: Option<WireImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    id: Snowflake,
    author: WireUser,
    #[serde(default)]
    content: String,
    #[serde(default)]
    mentions: Vec<WireUser>,
    #[serde(default)]
    attachments: Vec<WireAttachment>,
    #[serde(default)]
    embeds: Vec<WireEmbed>,
}

impl From<WireMessage> for Message {
    fn from(msg: WireMessage) -> Self {
        Message {
            id: msg.id,
            author: msg.author.into(),
            content: msg.content,
            mentions: msg.mentions.into_iter().map(UserTag::from).collect(),
            attachments: msg
                .attachments
                .into_iter()
                .map(|a| Attachment { url: a.url })
                .collect(),
            embeds: msg
                .embeds
                .into_iter()
                .map(|e| Embed {
                    image_url: e.image.map(|i| i.url),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChannel {
    id: Snowflake,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    nsfw: bool,
}

impl From<WireChannel> for Channel {
    fn from(channel: WireChannel) -> Self {
        Channel {
            id: channel.id,
            name: channel.name.unwrap_or_default(),
            kind: ChannelKind::from(channel.kind),
            nsfw: channel.nsfw,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRole {
    id: Snowflake,
    name: String,
    #[serde(default)]
    managed: bool,
    #[serde(default)]
    hoist: bool,
    #[serde(default)]
    color: u32,
    #[serde(default)]
    position: i32,
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        Role {
            id: role.id,
            name: role.name,
            managed: role.managed,
            hoist: role.hoist,
            color: role.color,
            position: role.position,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireGuild {
    id: Snowflake,
    name: String,
    owner_id: Snowflake,
    #[serde(default)]
    afk_timeout: u32,
    #[serde(default)]
    verification_level: u8,
    #[serde(default)]
    explicit_content_filter: u8,
    #[serde(default)]
    widget_enabled: bool,
    #[serde(default)]
    roles: Vec<WireRole>,
}

impl From<WireGuild> for Guild {
    fn from(guild: WireGuild) -> Self {
        Guild {
            id: guild.id,
            name: guild.name,
            owner_id: guild.owner_id,
            afk_timeout: guild.afk_timeout,
            verification_level: guild.verification_level,
            explicit_content_filter: guild.explicit_content_filter,
            widget_enabled: guild.widget_enabled,
            roles: guild.roles.into_iter().map(Role::from).collect(),
        }
    }
}
