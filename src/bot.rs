//! Glue between inbound Telegram updates, the router, and the transport.

use crate::router::Router;
use crate::transport::telegram::Update;
use crate::transport::{MessageTransport, OutboundMessage};
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to one inbound update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No text message in the update.
    Ignored,
    /// Text from someone other than the authorized chat.
    Dropped,
    /// A reply was produced and delivered.
    Replied,
    /// A reply was produced but delivery failed.
    ReplyFailed,
}

impl UpdateOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Dropped => "dropped",
            Self::Replied => "replied",
            Self::ReplyFailed => "reply_failed",
        }
    }
}

pub struct Bot {
    router: Router,
    transport: Arc<dyn MessageTransport>,
    chat_id: i64,
}

impl Bot {
    /// `chat_id` is the single recipient every reply goes to.
    pub fn new(router: Router, transport: Arc<dyn MessageTransport>, chat_id: i64) -> Self {
        Self {
            router,
            transport,
            chat_id,
        }
    }

    pub async fn handle_update(&self, update: &Update) -> UpdateOutcome {
        let Some(inbound) = update.text_message() else {
            debug!("ignoring update {} without text", update.update_id);
            return UpdateOutcome::Ignored;
        };

        let Some(reply) = self.router.handle(&inbound.text, inbound.chat_id).await else {
            return UpdateOutcome::Dropped;
        };

        let message = OutboundMessage {
            chat_id: self.chat_id,
            text: reply,
        };
        match self.transport.send(message).await {
            Ok(()) => UpdateOutcome::Replied,
            Err(err) => {
                warn!("failed to send {} reply: {err}", self.transport.id());
                UpdateOutcome::ReplyFailed
            }
        }
    }
}
