//! Dayplan: a personal weekday/weekend task-list bot for Telegram.
//!
//! The bot keeps two ordered task lists in a single JSON document and lets
//! one authorized chat edit them with slash commands. Once a day it sends
//! the list that applies to the current date.
//!
//! # Architecture
//!
//! - **Gateway** ([`gateway`]): axum server receiving Telegram webhooks and
//!   manual digest triggers
//! - **Router** ([`router`]): authorization, command parsing, list mutation
//! - **Storage** ([`storage`]): full-document load/save behind [`storage::TaskStore`]
//! - **Transport** ([`transport`]): outbound delivery via the Telegram Bot API
//! - **Digest** ([`digest`]) and **Scheduler** ([`scheduler`]): the daily reminder

pub mod app;
pub mod bot;
pub mod config;
pub mod digest;
pub mod error;
pub mod gateway;
pub mod router;
pub mod scheduler;
pub mod storage;
pub mod tasks;
pub mod transport;

pub use app::App;
pub use config::BotConfig;
pub use error::{DayplanError, Result};
pub use tasks::{ListName, TaskDocument};
