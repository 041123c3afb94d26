use crate::Snowflake;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user as referenced from a message (author or mention)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTag {
    pub id: Snowflake,
    pub username: String,
    pub discriminator: String,
}

impl UserTag {
    pub fn new(id: Snowflake, username: impl Into<String>, discriminator: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: discriminator.into(),
        }
    }
}

/// Renders as `username#discriminator`
impl fmt::Display for UserTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.username, self.discriminator)
    }
}

/// An uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
}

/// A link preview; only the preview image matters to the scraper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub image_url: Option<String>,
}

/// One message from a channel's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub author: UserTag,
    pub content: String,
    /// Users mentioned in `content`, in the order the platform lists them
    pub mentions: Vec<UserTag>,
    pub attachments: Vec<Attachment>,
    pub embeds: Vec<Embed>,
}

impl Message {
    pub fn new(id: Snowflake, author: UserTag, content: impl Into<String>) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            mentions: Vec::new(),
            attachments: Vec::new(),
            embeds: Vec::new(),
        }
    }

    pub fn with_mention(mut self, user: UserTag) -> Self {
        self.mentions.push(user);
        self
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachments.push(Attachment { url: url.into() });
        self
    }

    pub fn with_embed(mut self, image_url: Option<String>) -> Self {
        self.embeds.push(Embed { image_url });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_tag_display() {
        let user = UserTag::new(Snowflake::new(1), "tira", "0420");
        assert_eq!(user.to_string(), "tira#0420");
    }

    #[test]
    fn test_builder_collects_media_sources() {
        let msg = Message::new(Snowflake::new(10), UserTag::new(Snowflake::new(1), "a", "0001"), "hi")
            .with_attachment("https://cdn.example.com/a.png")
            .with_embed(None)
            .with_embed(Some("https://cdn.example.com/b.jpg".into()));
        assert_eq!(msg.attachments.len(), 1);
        assert_eq!(msg.embeds.len(), 2);
        assert!(msg.mentions.is_empty());
    }
}
