use crate::clock::WallTime;

/// Process-wide clock state shared by every behavior. It is only ever touched from the main
/// loop, one behavior at a time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClockState {
    /// Latest time of day, `None` until the first network sync succeeded.
    pub time: Option<WallTime>,
    pub last_minute: Option<u8>,
    /// Ticks left of the digit transition after a new minute.
    pub flicker_countdown: u16,
    /// Theme hue for this minute, 0.0..1.0.
    pub hue: f32,
    /// 0.0..=1.0, shared by every pixel and digit intensity calculation
    pub brightness: f32,
    /// Last good ambient light reading.
    pub lux: f32,
}

impl ClockState {
    pub fn new(hue: f32, brightness: f32) -> Self {
        ClockState { time: None, last_minute: None, flicker_countdown: 0, hue, brightness, lux: 0.0 }
    }

    /// Records the minute of the latest time and reports whether it differs from the previous
    /// one. The very first observation only establishes the baseline.
    pub fn observe_minute(&mut self, minute: u8) -> bool {
        let rolled_over = matches!(self.last_minute, Some(last) if last != minute);
        self.last_minute = Some(minute);
        rolled_over
    }

    /// `hour * 10000 + minute * 100 + second`, or `None` without a valid time.
    pub fn display_value(&self) -> Option<i32> {
        self.time.map(|t| t.hour as i32 * 10_000 + t.minute as i32 * 100 + t.second as i32)
    }
}
