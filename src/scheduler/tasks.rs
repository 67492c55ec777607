//! Daily schedule definition for the digest.

use crate::config::DigestConfig;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Fires once per local day at a fixed local time.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    /// Local time of day to fire.
    pub time: NaiveTime,
    /// Fixed timezone the time is expressed in.
    pub offset: FixedOffset,
    /// Local date of the last firing, if any.
    pub last_fired: Option<NaiveDate>,
}

impl DailySchedule {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            time,
            offset,
            last_fired: None,
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(config.time, config.utc_offset)
    }

    /// Treat today's slot as already used if `now` is past it, so a restart
    /// after the fire time does not send a second digest.
    pub fn starting_at(mut self, now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&self.offset);
        if local.time() >= self.time {
            self.last_fired = Some(local.date_naive());
        }
        self
    }

    /// Returns `true` if the slot for the local day containing `now` has
    /// been reached and not yet used.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset);
        local.time() >= self.time && self.last_fired != Some(local.date_naive())
    }

    /// Record a firing for the local day containing `now`.
    pub fn mark_fired(&mut self, now: DateTime<Utc>) {
        self.last_fired = Some(now.with_timezone(&self.offset).date_naive());
    }

    /// The next instant the schedule will fire after `now`.
    pub fn next_fire(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        let local = now.with_timezone(&self.offset);
        let mut date = local.date_naive();
        if !self.is_due(now) && (local.time() >= self.time || self.last_fired == Some(date)) {
            date += Duration::days(1);
        }
        // Fixed offsets have no gaps, so the local time always exists.
        self.offset
            .from_local_datetime(&date.and_time(self.time))
            .single()
            .unwrap_or(local)
    }
}

impl std::fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "daily at {} (UTC{})", self.time.format("%H:%M"), self.offset)
    }
}
