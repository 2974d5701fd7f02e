use crate::clock::UnixSeconds;
use crate::colors::Color;
use crate::digits::DigitFrame;
use crate::effects::StatusFrame;
use crate::error::{Error, Result};
use crate::DIGIT_COUNT;
use bitvec::prelude::*;
use core::convert::Infallible;
use core::fmt::Write;
use embedded_hal::digital::blocking::OutputPin;
use embedded_time::duration::*;

pub type DynamicPin<'a> = &'a mut dyn OutputPin<Error = Infallible>;

/// The digit tubes: one full frame, then a single latch.
pub trait DigitOutput {
    fn show(&mut self, frame: &DigitFrame) -> Result<()>;
}

/// The RGB pixel strip.
pub trait PixelOutput {
    fn show(&mut self, pixels: &[Color]) -> Result<()>;
}

pub trait StatusDisplay {
    fn show(&mut self, frame: &StatusFrame) -> Result<()>;
}

/// Ambient light. `WouldBlock` means no new reading is ready.
pub trait LightSensor {
    fn read_lux(&mut self) -> nb::Result<f32, Error>;
}

/// PWM driving the output enable of the digit drivers.
pub trait BrightnessOutput {
    fn set_duty(&mut self, duty: u16) -> Result<()>;
}

/// Network time. `WouldBlock` while a request is in flight.
pub trait TimeSource {
    fn fetch(&mut self) -> nb::Result<UnixSeconds, Error>;
}

/// Cached state of the network link, cheap to query.
pub trait LinkStatus {
    fn address(&self) -> Option<[u8; 4]>;
    fn rssi(&self) -> Option<i8>;
}

/// Every collaborator the clock talks to during one tick.
pub struct Devices<'a> {
    pub digits: &'a mut dyn DigitOutput,
    pub pixels: &'a mut dyn PixelOutput,
    pub status: &'a mut dyn StatusDisplay,
    pub light: &'a mut dyn LightSensor,
    pub brightness: &'a mut dyn BrightnessOutput,
    pub time: &'a mut dyn TimeSource,
    pub link: &'a dyn LinkStatus,
}

/// Number of refreshes one dithering cycle spans.
pub const DITHER_STEPS: u8 = 16;

/// A chain of 8-bit shift registers, one per digit, clocked MSB first through three pins.
/// Digit intensity is realised by blanking a digit on some of the refreshes of every
/// dithering cycle, so `show` has to be called at a steady rate.
pub struct ShiftRegisterDigits<DATA, CLK, LATCH> {
    data: DATA,
    clock: CLK,
    latch: LATCH,
    refresh: u8,
}

impl<DATA, CLK, LATCH> ShiftRegisterDigits<DATA, CLK, LATCH>
where
    DATA: OutputPin,
    CLK: OutputPin,
    LATCH: OutputPin,
{
    pub fn new(data: DATA, clock: CLK, latch: LATCH) -> Self {
        ShiftRegisterDigits { data, clock, latch, refresh: 0 }
    }

    pub fn release(self) -> (DATA, CLK, LATCH) {
        (self.data, self.clock, self.latch)
    }

    /// The bytes to shift out for one refresh. The last digit goes first so it ends up in
    /// the register farthest down the chain.
    fn frame_bytes(frame: &DigitFrame, phase: u8) -> [u8; DIGIT_COUNT] {
        let mut bytes = [0_u8; DIGIT_COUNT];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let digit = DIGIT_COUNT - 1 - i;
            if is_lit(frame.intensity[digit], phase) {
                *byte = frame.segments[digit];
            }
        }
        bytes
    }

    fn pulse_clock(&mut self) -> Result<()> {
        self.clock.set_high().map_err(|_| Error::Transfer)?;
        self.clock.set_low().map_err(|_| Error::Transfer)
    }
}

/// Whether a digit of the given intensity is on during this dithering phase.
fn is_lit(intensity: u8, phase: u8) -> bool {
    let on_steps = (intensity as u16 + 1) / DITHER_STEPS as u16;
    (phase as u16) < on_steps
}

impl<DATA, CLK, LATCH> DigitOutput for ShiftRegisterDigits<DATA, CLK, LATCH>
where
    DATA: OutputPin,
    CLK: OutputPin,
    LATCH: OutputPin,
{
    fn show(&mut self, frame: &DigitFrame) -> Result<()> {
        let phase = self.refresh % DITHER_STEPS;
        self.refresh = self.refresh.wrapping_add(1);

        let bytes = Self::frame_bytes(frame, phase);
        self.latch.set_low().map_err(|_| Error::Transfer)?;
        for bit in bytes.view_bits::<Msb0>().iter().by_vals() {
            let level = match bit {
                true => self.data.set_high(),
                false => self.data.set_low(),
            };
            level.map_err(|_| Error::Transfer)?;
            self.pulse_clock()?;
        }
        // all digits are in place, show them at once
        self.latch.set_high().map_err(|_| Error::Transfer)
    }
}

/// Drives the active low output enable of the digit drivers from a plain pin. A pin can only
/// blank or light the digits, so every duty below `max_duty` keeps them fully lit and the
/// slewed brightness reaches the pixels only. Dimming the digits needs a PWM channel on this
/// pin.
pub struct OutputEnable<P> {
    pin: P,
    max_duty: u16,
}

impl<P: OutputPin> OutputEnable<P> {
    pub fn new(pin: P, max_duty: u16) -> Self {
        OutputEnable { pin, max_duty }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> BrightnessOutput for OutputEnable<P> {
    fn set_duty(&mut self, duty: u16) -> Result<()> {
        let blanked = match duty >= self.max_duty {
            true => self.pin.set_high(),
            false => self.pin.set_low(),
        };
        blanked.map_err(|_| Error::Transfer)
    }
}

/// Writes status frames as plain text lines, e.g. to the debug UART.
pub struct TextStatus<W> {
    writer: W,
}

impl<W: Write> TextStatus<W> {
    pub fn new(writer: W) -> Self {
        TextStatus { writer }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

impl<W: Write> StatusDisplay for TextStatus<W> {
    fn show(&mut self, frame: &StatusFrame) -> Result<()> {
        writeln!(self.writer, "{} {}\r", frame.time, frame.weekday)?;
        writeln!(self.writer, "{}\r", frame.date)?;
        match frame.rssi {
            Some(rssi) => writeln!(self.writer, "{} {} dBm\r", frame.address, rssi)?,
            None => writeln!(self.writer, "{}\r", frame.address)?,
        }
        writeln!(self.writer, "{:.1} lx\r", frame.lux)?;
        Ok(())
    }
}

/// A hardware timer that can tick at a fixed period. Used to pace the strip bit stream and
/// the main loop.
pub trait PeriodicTimer {
    fn periodic_start(&mut self, time: impl Into<Nanoseconds<u64>>);
    fn periodic_wait(&mut self);
}

#[cfg(feature = "bl602")]
mod bl602 {
    use super::PeriodicTimer;
    use bl602_hal::timer::{ConfiguredTimerChannel0, ConfiguredTimerChannel1, Preload};
    use embedded_time::duration::*;

    macro_rules! setup_periodic_timer {
        ($timer:ident) => {
            impl PeriodicTimer for $timer {
                fn periodic_start(&mut self, time: impl Into<Nanoseconds<u64>>) {
                    let time: Nanoseconds<u64> = time.into();
                    self.set_match2(time);
                    self.enable_match2_interrupt();
                    self.set_preload_value(0.nanoseconds());
                    self.set_preload(Preload::PreloadMatchComparator2);
                    self.enable();
                }

                fn periodic_wait(&mut self) {
                    loop {
                        if self.is_match2() {
                            self.clear_match2_interrupt();
                            break;
                        }
                    }
                }
            }
        };
    }

    setup_periodic_timer!(ConfiguredTimerChannel0);
    setup_periodic_timer!(ConfiguredTimerChannel1);
}
