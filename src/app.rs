//! Builds the long-lived services from a [`BotConfig`].

use crate::bot::Bot;
use crate::config::BotConfig;
use crate::digest::Digest;
use crate::router::Router;
use crate::scheduler::{DailySchedule, Scheduler};
use crate::storage::{self, TaskStore};
use crate::transport::MessageTransport;
use crate::transport::telegram::TelegramTransport;
use std::sync::Arc;

/// Shared services handed to the gateway and the scheduler.
#[derive(Clone)]
pub struct App {
    pub bot: Arc<Bot>,
    pub digest: Arc<Digest>,
    pub store: Arc<dyn TaskStore>,
}

impl App {
    /// Wire real backends: the configured store and Telegram.
    pub fn from_config(config: &BotConfig) -> crate::Result<Self> {
        let store = storage::from_config(config)?;
        let transport: Arc<dyn MessageTransport> =
            Arc::new(TelegramTransport::new(&config.telegram, config.http_timeout)?);
        Ok(Self::new(config, store, transport))
    }

    /// Wire the given store and transport according to `config`.
    pub fn new(
        config: &BotConfig,
        store: Arc<dyn TaskStore>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        let chat_id = config.telegram.chat_id;
        let offset = config.digest.utc_offset;

        let router = Router::new(Arc::clone(&store), chat_id, offset)
            .with_save_failure_policy(config.save_failure_policy);
        let bot = Arc::new(Bot::new(router, Arc::clone(&transport), chat_id));
        let digest = Arc::new(Digest::new(Arc::clone(&store), transport, chat_id, offset));

        Self { bot, digest, store }
    }

    /// Scheduler for the daily digest, or `None` when disabled.
    pub fn scheduler(&self, config: &BotConfig) -> Option<Scheduler> {
        if !config.digest.scheduled {
            return None;
        }
        Some(Scheduler::new(
            DailySchedule::from_config(&config.digest),
            Arc::clone(&self.digest),
        ))
    }
}
