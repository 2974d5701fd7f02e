//! The behaviors bound to the timer slots of the clock, and the scene they draw into.
//!
//! Every behavior gets the shared [`Scene`] and the hardware [`Devices`] through a
//! [`Context`]. Behaviors never hold on to either between ticks.

use crate::clock::{month_name, weekday_name};
use crate::colors::{Color, Hsl};
use crate::config::ClockConfig;
use crate::digits::{DigitFrame, Glyph, ALL_SEGMENTS};
use crate::easing::{pulse, quadratic_in};
use crate::error::Result;
use crate::hardware::{Devices, LinkStatus};
use crate::leds::PixelBuffer;
use crate::scheduler::{SlotBehavior, SlotUpdate};
use crate::state::ClockState;
use crate::trail::Trail;
use crate::utility::map_range;
use crate::{NUM_PIXELS, NUM_TRAILS, TRAIL_PIXELS};
use core::fmt::Write;
use heapless::String;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Everything the behaviors draw into or read from.
pub struct Scene {
    pub state: ClockState,
    pub pixels: PixelBuffer<NUM_PIXELS>,
    pub trails: [Trail; NUM_TRAILS],
    /// The frame the digits currently show; refreshed on every digit tick.
    pub digits: DigitFrame,
    pub rng: SmallRng,
    pub config: ClockConfig,
}

impl Scene {
    pub fn new(config: ClockConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.random_seed);
        let hue = rng.gen_range(0.0..1.0);
        let trails = [(); NUM_TRAILS].map(|_| Trail::random(hue, &mut rng));
        let brightness = brightness_for_level(config.initial_level, &config);
        Scene {
            state: ClockState::new(hue, brightness),
            pixels: PixelBuffer::new(),
            trails,
            digits: DigitFrame::filled(Glyph::Dash),
            rng,
            config,
        }
    }
}

pub struct Context<'a, 'd> {
    pub scene: &'a mut Scene,
    pub devices: &'a mut Devices<'d>,
}

/// Exponential approach of a level towards a target: every step covers a fixed fraction of
/// the remaining distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slew {
    level: f32,
}

impl Slew {
    pub const fn new(level: f32) -> Self {
        Slew { level }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn step(&mut self, target: f32, divisor: f32) -> f32 {
        self.level += (target - self.level) / divisor;
        self.level
    }
}

/// The behavior bound to a slot, with whatever state it needs to keep between ticks.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Breathes one of the dot pixels at the end of the strip.
    DotPulse { dot: usize },
    /// Moves the trails; gives one of them new parameters every period.
    TrailRedraw,
    /// Follows the ambient light once per period.
    AutoBrightness(Slew),
    /// Pushes a status frame once per period.
    StatusRefresh,
    /// Refreshes the digits every tick, flickering after a new minute.
    DigitRefresh,
}

impl<'a, 'd> SlotBehavior<Context<'a, 'd>> for Effect {
    fn update(&mut self, slot: &SlotUpdate, ctx: &mut Context<'a, 'd>) -> Result<()> {
        match self {
            Effect::DotPulse { dot } => dot_pulse(*dot, slot, ctx),
            Effect::TrailRedraw => trail_redraw(slot, ctx),
            Effect::AutoBrightness(slew) => auto_brightness(slew, slot, ctx),
            Effect::StatusRefresh => status_refresh(slot, ctx),
            Effect::DigitRefresh => digit_refresh(ctx),
        }
    }
}

/// Strip index of a dot. Dots count backwards from the last pixel.
pub const fn dot_pixel(dot: usize) -> usize {
    NUM_PIXELS - 1 - dot
}

fn dot_pulse(dot: usize, slot: &SlotUpdate, ctx: &mut Context) -> Result<()> {
    let scene = &mut *ctx.scene;
    let lightness = pulse(slot.progress) * scene.state.brightness * scene.config.dot_max_lightness;
    let color = Color::from_hsl(Hsl::new(scene.state.hue, 1.0, lightness)).gamma_corrected();
    scene.pixels.set(dot_pixel(dot), color);
    Ok(())
}

fn trail_redraw(slot: &SlotUpdate, ctx: &mut Context) -> Result<()> {
    let scene = &mut *ctx.scene;
    scene.pixels.clear_range(0..TRAIL_PIXELS);

    let segment = scene.pixels.segment_mut(0..TRAIL_PIXELS);
    for trail in scene.trails.iter_mut() {
        trail.draw(segment, scene.state.brightness);
    }

    if slot.is_completed() {
        let index = scene.rng.gen_range(0..NUM_TRAILS);
        let trail = &mut scene.trails[index];
        trail.randomize(&mut scene.rng);
        trail.hue = scene.state.hue;
        trace!("trail {} re-randomized", index);
    }

    ctx.devices.pixels.show(scene.pixels.as_slice())
}

/// Maps a slewed light level to the 0..=1 brightness shared by pixels and digits.
pub fn brightness_for_level(level: f32, config: &ClockConfig) -> f32 {
    map_range(level, config.level_min, config.level_max, 0.0, 1.0).clamp(config.min_brightness, 1.0)
}

/// The output enable of the digit drivers is active low, so full brightness is zero duty.
pub fn duty_for_brightness(brightness: f32, config: &ClockConfig) -> u16 {
    let off = 1.0 - quadratic_in(brightness);
    (config.pwm_max_duty as f32 * off) as u16
}

fn auto_brightness(slew: &mut Slew, slot: &SlotUpdate, ctx: &mut Context) -> Result<()> {
    if !slot.is_completed() {
        return Ok(());
    }
    let scene = &mut *ctx.scene;
    let config = &scene.config;

    // a failed read leaves the last good lux in place
    match ctx.devices.light.read_lux() {
        Ok(lux) => scene.state.lux = lux,
        Err(nb::Error::WouldBlock) => {}
        Err(nb::Error::Other(e)) => debug!("light sensor unavailable: {}", e),
    }

    let target = (scene.state.lux * config.lux_scale).clamp(config.level_min, config.level_max);
    let level = slew.step(target, config.slew_divisor);
    scene.state.brightness = brightness_for_level(level, config);
    ctx.devices.brightness.set_duty(duty_for_brightness(scene.state.brightness, config))
}

/// One screen worth of status text.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusFrame {
    /// `hh:mm:ss.t`, tenths of a second last
    pub time: String<16>,
    pub weekday: &'static str,
    /// e.g. `15 Mar 2024`
    pub date: String<16>,
    pub address: String<16>,
    pub rssi: Option<i8>,
    pub lux: f32,
}

impl StatusFrame {
    pub fn compose(state: &ClockState, link: &dyn LinkStatus) -> Result<Self> {
        let mut frame = StatusFrame {
            time: String::new(),
            weekday: "",
            date: String::new(),
            address: String::new(),
            rssi: link.rssi(),
            lux: state.lux,
        };

        match state.time {
            Some(t) => {
                write!(frame.time, "{:02}:{:02}:{:02}.{}", t.hour, t.minute, t.second, t.millis / 100)?;
                frame.weekday = weekday_name(t.weekday());
                write!(frame.date, "{} {} {}", t.date.day(), month_name(t.date), t.date.year())?;
            }
            None => frame.time.push_str("--:--:--").map_err(|_| core::fmt::Error)?,
        }

        match link.address() {
            Some([a, b, c, d]) => write!(frame.address, "{}.{}.{}.{}", a, b, c, d)?,
            None => frame.address.push_str("offline").map_err(|_| core::fmt::Error)?,
        }

        Ok(frame)
    }
}

fn status_refresh(slot: &SlotUpdate, ctx: &mut Context) -> Result<()> {
    if !slot.is_completed() {
        return Ok(());
    }
    let frame = StatusFrame::compose(&ctx.scene.state, ctx.devices.link)?;
    ctx.devices.status.show(&frame)
}

/// Random segments on every digit.
fn flicker_frame(rng: &mut SmallRng) -> DigitFrame {
    let mut frame = DigitFrame::default();
    for segments in frame.segments.iter_mut() {
        *segments = rng.gen::<u8>() & ALL_SEGMENTS;
    }
    frame
}

/// What the digits show when they are not flickering.
pub fn time_frame(state: &ClockState, config: &ClockConfig) -> DigitFrame {
    match state.display_value() {
        Some(value) => {
            DigitFrame::from_value(value).with_dimmed(config.dimmed_digits, config.dim_factor)
        }
        None => DigitFrame::filled(Glyph::Dash),
    }
}

fn digit_refresh(ctx: &mut Context) -> Result<()> {
    let scene = &mut *ctx.scene;
    let state = &mut scene.state;

    if state.flicker_countdown > 0 {
        // the first tick of the transition always draws
        let ticks_in = scene.config.flicker_ticks.saturating_sub(state.flicker_countdown);
        if ticks_in % scene.config.flicker_stride.max(1) == 0 {
            scene.digits = flicker_frame(&mut scene.rng);
        }
        state.flicker_countdown -= 1;
    } else {
        scene.digits = time_frame(state, &scene.config);
    }

    ctx.devices.digits.show(&scene.digits)
}
