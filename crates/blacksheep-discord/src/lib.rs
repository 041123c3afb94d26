//! REST client for the chat platform.
//!
//! [`DiscordClient`] implements [`HistorySource`] over the v10 HTTP API. Rate
//! limits are left to the platform; non-success responses are mapped onto
//! [`ApiError`] so callers can tell a bad id from a bad token.

mod models;

use blacksheep_types::{ApiError, Channel, Guild, HistorySource, Message, Snowflake, UserTag};
use models::{WireChannel, WireGuild, WireMessage, WireUser};
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Default REST endpoint
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/t1ra/BlackSheep, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Platform REST client
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
}

impl DiscordClient {
    /// Create a client that authenticates every request with `token`.
    ///
    /// The token is sent verbatim, so bot tokens need their `Bot ` prefix.
    pub fn new(token: &str, api_base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(token)
            .map_err(|e| ApiError::Unauthorized(format!("token is not a valid header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        info!("Discord client initialized for {}", api_base);
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Validate the token by fetching the account it belongs to
    pub async fn validate_token(&self) -> Result<UserTag, ApiError> {
        let me: WireUser = self.get("/users/@me", &[]).await?;
        Ok(me.into())
    }

    /// Server metadata, roles included
    pub async fn get_guild(&self, server_id: Snowflake) -> Result<Guild, ApiError> {
        let guild: WireGuild = self.get(&format!("/guilds/{server_id}"), &[]).await?;
        Ok(guild.into())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, path, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }
}

/// Map a non-success status onto the error taxonomy
fn status_error(status: StatusCode, path: &str, body: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(path.to_string()),
        StatusCode::FORBIDDEN => ApiError::Forbidden(path.to_string()),
        other => ApiError::Status {
            status: other.as_u16(),
            body,
        },
    }
}

impl HistorySource for DiscordClient {
    async fn list_channels(&self, server_id: Snowflake) -> Result<Vec<Channel>, ApiError> {
        let channels: Vec<WireChannel> = self
            .get(&format!("/guilds/{server_id}/channels"), &[])
            .await?;
        Ok(channels.into_iter().map(Channel::from).collect())
    }

    async fn fetch_messages(
        &self,
        channel_id: Snowflake,
        limit: u8,
        before: Option<Snowflake>,
    ) -> Result<Vec<Message>, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = before {
            query.push(("before", cursor.to_string()));
        }
        let messages: Vec<WireMessage> = self
            .get(&format!("/channels/{channel_id}/messages"), &query)
            .await?;
        Ok(messages.into_iter().map(Message::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/guilds/1/channels", String::new()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "/users/@me", String::new()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/channels/1/messages", String::new()),
            ApiError::Forbidden(_)
        ));
        match status_error(StatusCode::BAD_GATEWAY, "/x", "upstream".into()) {
            ApiError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client =
            DiscordClient::new("token", "https://example.test/api/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.endpoint("/channels/1/messages"),
            "https://example.test/api/channels/1/messages"
        );
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let result = DiscordClient::new("bad\ntoken", DEFAULT_API_BASE, Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
