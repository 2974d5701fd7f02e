use crate::DOT_COUNT;

// Below here are the compile-time defaults for the desk clock. Everything timing related is in
// milliseconds of uptime.

/// All the tunable numbers of the clock in one place. Periods must be non-zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClockConfig {
    /// period of each dot pulse, one per dot pixel
    pub dot_pulse_periods_ms: [u32; DOT_COUNT],
    /// lightness of a dot at the top of its pulse, before brightness scaling
    pub dot_max_lightness: f32,

    /// how often one trail gets new motion parameters
    pub trail_period_ms: u32,

    /// how often the ambient light is sampled and the brightness slewed
    pub brightness_period_ms: u32,
    /// lux readings are multiplied by this before clamping
    pub lux_scale: f32,
    pub level_min: f32,
    pub level_max: f32,
    /// each step moves the level by 1/divisor of the remaining distance
    pub slew_divisor: f32,
    /// where the slewed level starts after power up
    pub initial_level: f32,
    /// the brightness never drops below this, so the clock stays readable in the dark
    pub min_brightness: f32,
    /// full scale of the brightness PWM; the duty is inverted (output enable is active low)
    pub pwm_max_duty: u16,

    pub status_period_ms: u32,

    pub digit_period_ms: u32,
    /// number of digit ticks the transition lasts after a new minute
    pub flicker_ticks: u16,
    /// a flicker frame is emitted every this many ticks of the transition
    pub flicker_stride: u16,
    /// digit positions (bit 0 is the leftmost digit) that draw more current and get dimmed
    pub dimmed_digits: u8,
    pub dim_factor: f32,

    /// how often the time of day is copied out of the local clock
    pub clock_poll_ms: u32,
    /// how often the local clock is resynchronized with network time
    pub sync_interval_ms: u32,
    /// retry delay after a failed synchronization
    pub sync_retry_ms: u32,
    pub utc_offset_seconds: i32,

    pub random_seed: u64,
}

impl ClockConfig {
    pub const DEFAULT: ClockConfig = ClockConfig {
        dot_pulse_periods_ms: [1_000, 2_000, 3_000, 4_000],
        dot_max_lightness: 0.5,

        trail_period_ms: 6_000,

        brightness_period_ms: 25,
        lux_scale: 10.0,
        level_min: 1.0,
        level_max: 500.0,
        slew_divisor: 20.0,
        initial_level: 250.0,
        min_brightness: 0.05,
        pwm_max_duty: 1023,

        status_period_ms: 100,

        digit_period_ms: 50,
        flicker_ticks: 45,
        flicker_stride: 3,
        dimmed_digits: 0b00_0011,
        dim_factor: 0.9,

        clock_poll_ms: 100,
        sync_interval_ms: 600_000,
        sync_retry_ms: 30_000,
        utc_offset_seconds: 7_200,

        random_seed: 0x5EED_C10C,
    };
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig::DEFAULT
    }
}
