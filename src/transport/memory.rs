use crate::transport::{MessageTransport, OutboundMessage, TransportError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Transport that records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    fail: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessageTransport for MemoryTransport {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected("delivery disabled".to_owned()));
        }
        self.sent
            .lock()
            .map_err(|_| TransportError::Rejected("transport lock poisoned".to_owned()))?
            .push(message);
        Ok(())
    }
}
