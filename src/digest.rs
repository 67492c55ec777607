//! Daily digest: pick today's list and send it to the configured chat.
//!
//! This path reads storage but never writes it, and does not go through
//! the command router.

use crate::router::render::render_items;
use crate::storage::TaskStore;
use crate::tasks::{ListName, TaskDocument};
use crate::transport::{MessageTransport, OutboundMessage, TransportError};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use std::sync::Arc;

/// Injectable time source.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Clock backed by the system time.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Saturday and Sunday use the weekend list; every other day the weekday list.
pub fn list_for_date(date: NaiveDate) -> ListName {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => ListName::Weekend,
        _ => ListName::Weekday,
    }
}

/// The list that applies to `now` as seen from the fixed `offset`.
pub fn today_list(now: DateTime<Utc>, offset: FixedOffset) -> ListName {
    list_for_date(now.with_timezone(&offset).date_naive())
}

/// Digest text for `list`.
pub fn compose_digest(doc: &TaskDocument, list: ListName) -> String {
    let items = doc.list(list);
    if items.is_empty() {
        return format!("Nothing scheduled for today ({list} list is empty).");
    }
    format!(
        "*Good morning! Today's {list} tasks:*\n{}",
        render_items(items)
    )
}

/// Sends the digest for "today" through a transport.
pub struct Digest {
    store: Arc<dyn TaskStore>,
    transport: Arc<dyn MessageTransport>,
    chat_id: i64,
    utc_offset: FixedOffset,
}

impl Digest {
    pub fn new(
        store: Arc<dyn TaskStore>,
        transport: Arc<dyn MessageTransport>,
        chat_id: i64,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            transport,
            chat_id,
            utc_offset,
        }
    }

    /// Load the document and send the digest for the day containing `now`.
    ///
    /// Returns the list that was sent. Delivery errors are logged and
    /// returned; they are not retried.
    pub async fn send_now(&self, now: DateTime<Utc>) -> Result<ListName, TransportError> {
        let list = today_list(now, self.utc_offset);
        let doc = self.store.load().await;
        let text = compose_digest(&doc, list);

        let message = OutboundMessage {
            chat_id: self.chat_id,
            text,
        };
        match self.transport.send(message).await {
            Ok(()) => {
                tracing::info!("sent {list} digest via {}", self.transport.id());
                Ok(list)
            }
            Err(err) => {
                tracing::error!("failed to send {list} digest: {err}");
                Err(err)
            }
        }
    }
}
