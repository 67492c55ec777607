//! Outbound message delivery.
//!
//! Transport failures are logged by callers and never shown to the user.
//! Nothing is retried.

pub mod memory;
pub mod telegram;

use async_trait::async_trait;

/// Message sent to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    /// Telegram legacy-Markdown text.
    pub text: String,
}

/// Delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request failed before a response arrived. The URL is stripped
    /// because it embeds the bot token.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("transport returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered 2xx but reported `ok: false`.
    #[error("message rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

/// Message transport contract.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Stable transport identifier (e.g. `telegram`).
    fn id(&self) -> &'static str;

    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError>;
}
