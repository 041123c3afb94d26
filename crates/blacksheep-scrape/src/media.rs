//! Media candidate extraction.

use blacksheep_types::{MediaCandidate, MediaOrigin, Message};
use regex::Regex;
use std::sync::LazyLock;

/// Scheme-qualified URLs only; bare domains are not links
#[allow(clippy::expect_used)]
static STRICT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b[a-z][a-z0-9+.\-]*://[^\s<>"`]+"#).expect("url pattern is valid")
});

/// Punctuation that ends a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', '\'', '*', '_', '~', '|'];

/// Every downloadable URL referenced by `message`.
///
/// Inline links come first, then attachments, then embed preview images.
/// Nothing is deduplicated and no extension filter is applied.
pub fn extract_media(message: &Message) -> Vec<MediaCandidate> {
    let inline = find_urls(&message.content)
        .into_iter()
        .map(|url| MediaCandidate::new(url, MediaOrigin::InlineLink));

    let attachments = message
        .attachments
        .iter()
        .map(|a| MediaCandidate::new(a.url.clone(), MediaOrigin::Attachment));

    let embeds = message
        .embeds
        .iter()
        .filter_map(|e| e.image_url.as_ref())
        .map(|url| MediaCandidate::new(url.clone(), MediaOrigin::EmbedImage));

    inline.chain(attachments).chain(embeds).collect()
}

/// URLs in free text, in order of appearance
pub fn find_urls(text: &str) -> Vec<&str> {
    STRICT_URL
        .find_iter(text)
        .map(|m| trim_url(m.as_str()))
        .filter(|url| url.contains("://") && !url.ends_with("://"))
        .collect()
}

/// Drop trailing punctuation and closing brackets that have no opener in the URL
fn trim_url(mut url: &str) -> &str {
    loop {
        let Some(last) = url.chars().last() else {
            return url;
        };
        let strip = if TRAILING_PUNCTUATION.contains(&last) {
            true
        } else if let Some(open) = opener(last) {
            url.matches(open).count() < url.matches(last).count()
        } else {
            false
        };
        if !strip {
            return url;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
}

fn opener(close: char) -> Option<char> {
    match close {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use blacksheep_types::{Snowflake, UserTag};

    fn message(content: &str) -> Message {
        Message::new(
            Snowflake::new(1),
            UserTag::new(Snowflake::new(2), "u", "0002"),
            content,
        )
    }

    #[test]
    fn test_counts_every_source() {
        let msg = message("look https://a.example/1.png and http://b.example/2.gif")
            .with_attachment("https://cdn.example/3.mp4")
            .with_embed(Some("https://cdn.example/4.jpg".into()))
            .with_embed(None);

        let found = extract_media(&msg);
        let origins: Vec<_> = found.iter().map(|c| c.origin).collect();
        assert_eq!(
            origins,
            vec![
                MediaOrigin::InlineLink,
                MediaOrigin::InlineLink,
                MediaOrigin::Attachment,
                MediaOrigin::EmbedImage,
            ]
        );
        assert_eq!(found[0].url, "https://a.example/1.png");
        assert_eq!(found[3].url, "https://cdn.example/4.jpg");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let url = "https://cdn.example/same.png";
        let msg = message(url).with_attachment(url);
        let found = extract_media(&msg);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].url, found[1].url);
    }

    #[test]
    fn test_bare_domains_are_ignored() {
        assert!(find_urls("visit example.com or www.example.org today").is_empty());
    }

    #[test]
    fn test_non_media_links_are_candidates() {
        assert_eq!(
            find_urls("read https://example.com/article?id=3#top"),
            vec!["https://example.com/article?id=3#top"]
        );
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        assert_eq!(
            find_urls("see https://x.example/a.png, then (https://y.example/b.jpg)."),
            vec!["https://x.example/a.png", "https://y.example/b.jpg"]
        );
        assert_eq!(
            find_urls("https://en.wikipedia.org/wiki/Rust_(programming_language)"),
            vec!["https://en.wikipedia.org/wiki/Rust_(programming_language)"]
        );
    }

    #[test]
    fn test_suppressed_embeds_are_found() {
        assert_eq!(
            find_urls("<https://x.example/quiet.png>"),
            vec!["https://x.example/quiet.png"]
        );
    }
}
