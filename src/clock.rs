//! Wall-clock time kept locally between network synchronizations.
//!
//! The network is only asked for the time every `sync_interval`; in between, the last good
//! answer is extrapolated from uptime. A failed or pending request never blocks and never
//! loses the time we already have.

use crate::error::{Error, Result};
use crate::hardware::TimeSource;
use crate::utility::ms_between;
use embedded_time::duration::Milliseconds;
use time::{Date, OffsetDateTime, UtcOffset, Weekday};

/// Units-safe wrapper for Unix timestamps (seconds since 1970-01-01 00:00:00 UTC)
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// Convert NTP seconds (since 1900-01-01) to Unix seconds (since 1970-01-01)
    pub const fn from_ntp_seconds(ntp: u32) -> Option<Self> {
        const NTP_TO_UNIX_SECONDS: i64 = 2_208_988_800;
        let s = (ntp as i64) - NTP_TO_UNIX_SECONDS;
        if s >= 0 {
            Some(Self(s))
        } else {
            None
        }
    }

    pub fn to_offset_datetime(self, offset: UtcOffset) -> Result<OffsetDateTime> {
        Ok(OffsetDateTime::from_unix_timestamp(self.0)?.to_offset(offset))
    }
}

/// Local time of day plus the calendar date it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// milliseconds since the last whole second, as far as uptime can tell
    pub millis: u16,
    pub date: Date,
}

impl WallTime {
    pub fn from_datetime(dt: OffsetDateTime, millis: u16) -> Self {
        WallTime { hour: dt.hour(), minute: dt.minute(), second: dt.second(), millis, date: dt.date() }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

const WEEKDAYS: [&str; 7] =
    ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

const MONTHS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAYS[weekday.number_days_from_sunday() as usize]
}

pub fn month_name(date: Date) -> &'static str {
    MONTHS[(u8::from(date.month()) - 1) as usize]
}

#[derive(Copy, Clone, Debug)]
struct SyncPoint {
    unix: UnixSeconds,
    at: Milliseconds<u32>,
}

/// The clock the rest of the system reads. See the module docs.
pub struct LocalClock {
    offset: UtcOffset,
    sync_interval_ms: u32,
    retry_ms: u32,
    synced: Option<SyncPoint>,
    last_attempt: Option<Milliseconds<u32>>,
    wait_ms: u32,
    failures: u32,
}

impl LocalClock {
    pub fn new(utc_offset_seconds: i32, sync_interval_ms: u32, retry_ms: u32) -> Result<Self> {
        Ok(LocalClock {
            offset: UtcOffset::from_whole_seconds(utc_offset_seconds)?,
            sync_interval_ms,
            retry_ms,
            synced: None,
            last_attempt: None,
            wait_ms: 0,
            failures: 0,
        })
    }

    pub fn is_synced(&self) -> bool {
        self.synced.is_some()
    }

    /// Consecutive failed synchronization attempts.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Asks the time source for fresh time if a sync is due, then returns the current local
    /// time, or `None` if we never got a valid time.
    pub fn poll(&mut self, now: Milliseconds<u32>, source: &mut dyn TimeSource) -> Option<WallTime> {
        if self.sync_due(now) {
            self.sync(now, source);
        }
        self.now(now)
    }

    /// The extrapolated local time at uptime `now`.
    pub fn now(&self, now: Milliseconds<u32>) -> Option<WallTime> {
        let sync = self.synced?;
        let since = ms_between(sync.at, now);
        let unix = UnixSeconds(sync.unix.0 + (since / 1000) as i64);
        let millis = (since % 1000) as u16;
        unix.to_offset_datetime(self.offset).ok().map(|dt| WallTime::from_datetime(dt, millis))
    }

    fn sync_due(&self, now: Milliseconds<u32>) -> bool {
        match self.last_attempt {
            Some(last) => ms_between(last, now) >= self.wait_ms,
            None => true,
        }
    }

    fn sync(&mut self, now: Milliseconds<u32>, source: &mut dyn TimeSource) {
        match source.fetch() {
            Ok(unix) => match unix.to_offset_datetime(self.offset) {
                Ok(_) => {
                    info!("time synchronized: {} unix seconds", unix.0);
                    self.synced = Some(SyncPoint { unix, at: now });
                    self.failures = 0;
                    self.settle(now, self.sync_interval_ms);
                }
                Err(e) => self.fail(now, e),
            },
            // still in flight, ask again next poll
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => self.fail(now, e),
        }
    }

    fn fail(&mut self, now: Milliseconds<u32>, e: Error) {
        self.failures = self.failures.saturating_add(1);
        warn!("time sync failed ({}), keeping the local clock", e);
        self.settle(now, self.retry_ms);
    }

    fn settle(&mut self, now: Milliseconds<u32>, wait_ms: u32) {
        self.last_attempt = Some(now);
        self.wait_ms = wait_ms;
    }
}
