use crate::config::TelegramConfig;
use crate::transport::{MessageTransport, OutboundMessage, TransportError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Telegram Bot API adapter.
///
/// Inbound messages are webhook-driven (push); the gateway owns the route
/// and hands the decoded [`Update`] to the bot. This type only sends.
pub struct TelegramTransport {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            bot_token: config.bot_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    fn id(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let body = serde_json::json!({
            "chat_id": message.chat_id,
            "text": message.text,
            "parse_mode": "Markdown",
        });
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let api: ApiResponse = response.json().await?;
        if !api.ok {
            return Err(TransportError::Rejected(
                api.description.unwrap_or_else(|| "no description".to_owned()),
            ));
        }
        Ok(())
    }
}

/// Subset of a Telegram `Update` the bot cares about. Every other update
/// kind deserializes with `message: None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A text message extracted from an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    /// Chat the message came from; this is the sender identity.
    pub chat_id: i64,
    pub text: String,
}

impl Update {
    /// Decode a webhook body. A body that does not fit the shape above
    /// (no `chat`, non-string `text`, ...) becomes an update without a
    /// message instead of an error, so it is acknowledged and ignored.
    pub fn from_value(value: serde_json::Value) -> Self {
        let update_id = value
            .get("update_id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_default();
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::debug!("update {update_id} has an unexpected shape: {e}");
            Self {
                update_id,
                message: None,
            }
        })
    }

    /// The text message carried by this update, if any.
    ///
    /// Edited messages, photos, callbacks and the like yield `None`.
    #[must_use]
    pub fn text_message(&self) -> Option<InboundText> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some(InboundText {
            chat_id: message.chat.id,
            text: text.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn malformed_messages_decode_without_text() {
        let no_chat = Update::from_value(json!({"update_id": 3, "message": {"text": "/help"}}));
        assert_eq!(no_chat.update_id, 3);
        assert!(no_chat.text_message().is_none());

        let numeric_text = Update::from_value(json!({
            "message": {"chat": {"id": 1}, "text": 5}
        }));
        assert!(numeric_text.text_message().is_none());

        let good = Update::from_value(json!({
            "message": {"chat": {"id": 1}, "text": "/help"}
        }));
        assert_eq!(good.text_message().unwrap().text, "/help");
    }

    #[test]
    fn text_message_is_extracted() {
        let u = update(json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": {"id": 42, "is_bot": false, "first_name": "A"},
                "chat": {"id": 42, "type": "private"},
                "date": 1_700_000_000,
                "text": "/view weekday"
            }
        }));
        assert_eq!(
            u.text_message(),
            Some(InboundText {
                chat_id: 42,
                text: "/view weekday".to_owned()
            })
        );
    }

    #[test]
    fn photo_message_has_no_text() {
        let u = update(json!({
            "update_id": 11,
            "message": {
                "message_id": 2,
                "chat": {"id": 42, "type": "private"},
                "photo": [{"file_id": "abc"}]
            }
        }));
        assert_eq!(u.text_message(), None);
    }

    #[test]
    fn edited_messages_and_callbacks_are_ignored() {
        let edited = update(json!({
            "update_id": 12,
            "edited_message": {"chat": {"id": 42}, "text": "/add weekday again"}
        }));
        assert_eq!(edited.text_message(), None);

        let callback = update(json!({"update_id": 13, "callback_query": {"id": "x"}}));
        assert_eq!(callback.text_message(), None);
    }

    #[test]
    fn method_url_embeds_token() {
        let cfg = TelegramConfig {
            bot_token: "123:abc".to_owned(),
            chat_id: 1,
            api_base: "https://api.telegram.org/".to_owned(),
        };
        let transport = TelegramTransport::new(&cfg, Duration::from_secs(1)).unwrap();
        assert_eq!(
            transport.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
