#![cfg_attr(not(test), no_std)]

// must come first so the logging macros are visible in every module below
mod fmt;

pub mod clock;
pub mod colors;
pub mod config;
pub mod controller;
pub mod digits;
pub mod easing;
pub mod effects;
pub mod error;
pub mod hardware;
pub mod leds;
pub mod scheduler;
pub mod state;
pub mod trail;
pub mod utility;

pub use error::{Error, Result};

use leds::ws28xx as strip;

// Pixels on the strip behind the digits. The last DOT_COUNT of them are the dots, the
// trails run over the rest:
pub const NUM_PIXELS: usize = 25;
pub const DOT_COUNT: usize = 4;
pub const TRAIL_PIXELS: usize = NUM_PIXELS - DOT_COUNT - 1;
pub const NUM_TRAILS: usize = 3;

// Seven-segment digits, hh mm ss:
pub const DIGIT_COUNT: usize = 6;

// dots, trail, brightness, status, digits
pub const MAX_SLOTS: usize = DOT_COUNT + 4;

pub const CLOCK_STRIP: strip::PhysicalStrip = strip::PhysicalStrip {
    led_count: NUM_PIXELS,
    reversed: false,
    color_order: strip::ColorOrder::GRB,
    strip_timings: strip::StripTimings::WS2812_ADAFRUIT,
};

// three bytes per led
pub const STRIP_BYTE_BUFFER_LENGTH: usize = CLOCK_STRIP.led_count * 3;
