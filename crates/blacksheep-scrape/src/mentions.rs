//! Mention token rewriting.
//!
//! Message bodies carry mentions as `<@id>` or, for nickname mentions,
//! `<@!id>`. Both become `@username#discriminator` using the mention list the
//! platform ships with every message, so no lookups are needed.

use blacksheep_types::{Message, UserTag};
use regex::{Captures, Regex};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static MENTION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?(\d+)>").expect("mention pattern is valid"));

/// Replace every mention token whose id is in `mentions`.
///
/// Tokens naming users absent from `mentions` are left as they are.
pub fn rewrite_mentions(content: &str, mentions: &[UserTag]) -> String {
    if mentions.is_empty() {
        return content.to_string();
    }

    MENTION_TOKEN
        .replace_all(content, |caps: &Captures<'_>| {
            let known = caps[1]
                .parse::<u64>()
                .ok()
                .and_then(|id| mentions.iter().find(|user| user.id.get() == id));
            match known {
                Some(user) => format!("@{user}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Return `message` with its body rewritten by [`rewrite_mentions`]
pub fn resolve_mentions(mut message: Message) -> Message {
    message.content = rewrite_mentions(&message.content, &message.mentions);
    message
}
