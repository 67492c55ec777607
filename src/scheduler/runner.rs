//! Scheduler background loop.
//!
//! Spawns a tokio task that periodically checks whether the daily digest
//! is due and sends it. Nothing is persisted: a restart after the fire
//! time skips that day rather than sending twice.

use crate::digest::{Clock, Digest};
use crate::scheduler::tasks::DailySchedule;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Interval between scheduler ticks (seconds).
const TICK_INTERVAL_SECS: u64 = 30;

/// Background scheduler that fires the daily digest.
pub struct Scheduler {
    schedule: DailySchedule,
    digest: Arc<Digest>,
    clock: Clock,
}

impl Scheduler {
    pub fn new(schedule: DailySchedule, digest: Arc<Digest>) -> Self {
        Self {
            schedule,
            digest,
            clock: crate::digest::system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start the scheduler background loop.
    pub fn run(mut self) -> tokio::task::JoinHandle<()> {
        let now = (self.clock)();
        self.schedule = self.schedule.clone().starting_at(now);

        tokio::spawn(async move {
            info!(
                "digest scheduler started ({}), next run at {}",
                self.schedule,
                self.schedule.next_fire(now)
            );
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(TICK_INTERVAL_SECS));

            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    /// Execute one scheduler tick. Returns `true` when the digest fired.
    pub async fn tick(&mut self) -> bool {
        let now = (self.clock)();
        if !self.schedule.is_due(now) {
            return false;
        }

        debug!("daily digest is due");
        // Marked before sending: a failed delivery is not retried.
        self.schedule.mark_fired(now);
        if let Err(e) = self.digest.send_now(now).await {
            warn!("scheduled digest was not delivered: {e}");
        }
        info!("next digest at {}", self.schedule.next_fire(now));
        true
    }
}
