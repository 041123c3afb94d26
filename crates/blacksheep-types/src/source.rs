use crate::{Channel, Message, Snowflake};
use std::future::Future;
use thiserror::Error;

/// Platform maximum for one history request
pub const MAX_PAGE_SIZE: u8 = 100;

/// Errors reported by the remote message-history API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown or inaccessible server/channel id
    #[error("not found: {0}")]
    NotFound(String),

    /// Token rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Token valid but lacks access
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read access to a chat platform's channels and message history.
///
/// Implementations must be shareable across walker tasks.
pub trait HistorySource: Send + Sync + 'static {
    /// Every channel in the server, of every kind
    fn list_channels(
        &self,
        server_id: Snowflake,
    ) -> impl Future<Output = Result<Vec<Channel>, ApiError>> + Send;

    /// Up to `limit` messages older than `before` (newest first when `None`),
    /// ordered newest to oldest. An empty page means the history is exhausted.
    fn fetch_messages(
        &self,
        channel_id: Snowflake,
        limit: u8,
        before: Option<Snowflake>,
    ) -> impl Future<Output = Result<Vec<Message>, ApiError>> + Send;
}
