//! Background scheduler for the daily digest.

pub mod runner;
pub mod tasks;

pub use runner::Scheduler;
pub use tasks::DailySchedule;
