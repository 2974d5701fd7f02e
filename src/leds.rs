use crate::colors::{self as c, Color};
use core::ops::Range;

/// The colors of every pixel on the strip, in strip order. Drawing happens here; the buffer
/// is pushed to the hardware as a whole.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelBuffer<const N: usize> {
    colors: [Color; N],
}

impl<const N: usize> Default for PixelBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PixelBuffer<N> {
    pub const fn new() -> Self {
        PixelBuffer { colors: [c::C_OFF; N] }
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Out of range indices are ignored.
    pub fn set(&mut self, index: usize, color: Color) {
        if let Some(pixel) = self.colors.get_mut(index) {
            *pixel = color;
        }
    }

    pub fn fill(&mut self, color: Color) {
        self.colors.iter_mut().for_each(|pixel| *pixel = color);
    }

    /// Turns off the pixels in `range`, clipped to the buffer.
    pub fn clear_range(&mut self, range: Range<usize>) {
        let end = range.end.min(N);
        let start = range.start.min(end);
        self.colors[start..end].iter_mut().for_each(|pixel| *pixel = c::C_OFF);
    }

    /// A mutable view of `range`, clipped to the buffer.
    pub fn segment_mut(&mut self, range: Range<usize>) -> &mut [Color] {
        let end = range.end.min(N);
        let start = range.start.min(end);
        &mut self.colors[start..end]
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.colors
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

pub mod ws28xx {
    use crate::colors as c;
    use crate::error::Result;
    use crate::hardware::{DynamicPin, PeriodicTimer, PixelOutput};
    use bitvec::prelude::*;
    use embedded_time::duration::*;

    /// Length of one bit on the wire in nanoseconds. The driver splits it into three timer
    /// periods.
    pub struct StripTimings {
        pub full_cycle: u32,
    }

    impl StripTimings {
        pub const WS2812_ADAFRUIT: StripTimings = StripTimings { full_cycle: 1250_u32 };
    }

    /// Timer periods the data line is held low before every frame, so the pixels latch.
    pub const DELAY_PERIODS_BEFORE_SEND: u32 = 900;

    #[allow(clippy::upper_case_acronyms)]
    pub enum ColorOrder {
        RGB,
        RBG,
        GRB,
        GBR,
        BRG,
        BGR,
    }

    impl ColorOrder {
        pub fn offsets(&self) -> [usize; 3] {
            use ColorOrder::*;
            match self {
                RGB => [0, 1, 2],
                RBG => [0, 2, 1],
                GRB => [1, 0, 2],
                BRG => [1, 2, 0],
                GBR => [2, 0, 1],
                BGR => [2, 1, 0],
            }
        }
    }

    pub struct PhysicalStrip {
        pub led_count: usize,
        pub reversed: bool,
        pub color_order: ColorOrder,
        pub strip_timings: StripTimings,
    }

    /// Writes `colors` into `bytes` three at a time in the wire order of the strip and returns
    /// how many bytes were used. Stops early when `bytes` is full.
    pub fn colors_to_bytes<'c>(
        colors: impl Iterator<Item = &'c c::Color>,
        color_order: &ColorOrder,
        bytes: &mut [u8],
    ) -> usize {
        let offsets = color_order.offsets();
        let mut used = 0;
        for (color, chunk) in colors.zip(bytes.chunks_exact_mut(3)) {
            chunk[offsets[0]] = color.r;
            chunk[offsets[1]] = color.g;
            chunk[offsets[2]] = color.b;
            used += 3;
        }
        used
    }

    /// Bit-bangs one strip through a single pin, each bit one timer period high and two low
    /// (zero) or two high and one low (one).
    pub struct StripDriver<'a, T, const BYTES: usize>
    where
        T: PeriodicTimer,
    {
        pin: DynamicPin<'a>,
        timer: T,
        strip: &'a PhysicalStrip,
    }

    impl<'a, T, const BYTES: usize> StripDriver<'a, T, BYTES>
    where
        T: PeriodicTimer,
    {
        pub fn new(pin: DynamicPin<'a>, timer: T, strip: &'a PhysicalStrip) -> Self {
            StripDriver { pin, timer, strip }
        }

        pub fn release(self) -> T {
            self.timer
        }

        fn send_bits(&mut self, bits: &BitSlice<u8, Msb0>) {
            // restart the timer every time to make sure it's configured correctly and nobody has
            // changed its interrupt timing settings:
            self.timer.periodic_start((self.strip.strip_timings.full_cycle / 3).nanoseconds());
            // keep the data pin low long enough for the leds to reset
            self.pin.set_low().ok();
            for _ in 0..DELAY_PERIODS_BEFORE_SEND {
                self.timer.periodic_wait();
            }
            for bit in bits.iter().by_vals() {
                self.pin.set_high().ok();
                self.timer.periodic_wait();
                if bit {
                    self.timer.periodic_wait();
                }
                self.pin.set_low().ok();
                self.timer.periodic_wait();
                if !bit {
                    self.timer.periodic_wait();
                }
            }
        }
    }

    impl<'a, T, const BYTES: usize> PixelOutput for StripDriver<'a, T, BYTES>
    where
        T: PeriodicTimer,
    {
        fn show(&mut self, pixels: &[c::Color]) -> Result<()> {
            let count = self.strip.led_count.min(pixels.len());
            let pixels = &pixels[..count];

            let mut bytes = [0_u8; BYTES];
            let used = match self.strip.reversed {
                true => colors_to_bytes(pixels.iter().rev(), &self.strip.color_order, &mut bytes),
                false => colors_to_bytes(pixels.iter(), &self.strip.color_order, &mut bytes),
            };
            if used < count * 3 {
                warn!("strip buffer holds {} of {} pixels", used / 3, count);
            }

            self.send_bits(bytes[..used].view_bits::<Msb0>());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ws28xx::*;
    use super::*;
    use crate::colors::{C_BLUE, C_GREEN, C_RED};
    use crate::hardware::{PeriodicTimer, PixelOutput};
    use core::convert::Infallible;
    use embedded_hal::digital::blocking::OutputPin;
    use embedded_time::duration::Nanoseconds;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn clear_range_is_clipped() {
        let mut buffer: PixelBuffer<5> = PixelBuffer::new();
        buffer.fill(C_RED);
        buffer.clear_range(3..10);
        assert_eq!(buffer.get(2), Some(C_RED));
        assert_eq!(buffer.get(3), Some(c::C_OFF));
        assert_eq!(buffer.get(4), Some(c::C_OFF));
        assert_eq!(buffer.get(5), None);

        buffer.set(7, C_GREEN);
        assert_eq!(buffer.segment_mut(4..9).len(), 1);
    }

    #[test]
    fn bytes_follow_color_order() {
        let mut bytes = [0_u8; 6];
        let used = colors_to_bytes([C_RED, C_BLUE].iter(), &ColorOrder::GRB, &mut bytes);
        assert_eq!(used, 6);
        assert_eq!(bytes, [0, 255, 0, 0, 0, 255]);
    }

    /// Counts waits and remembers whether the pin was high during each one.
    struct Scope {
        level: Rc<Cell<bool>>,
        high_periods: Rc<Cell<u32>>,
        waits: Rc<Cell<u32>>,
    }

    impl PeriodicTimer for Scope {
        fn periodic_start(&mut self, _time: impl Into<Nanoseconds<u64>>) {}

        fn periodic_wait(&mut self) {
            self.waits.set(self.waits.get() + 1);
            if self.level.get() {
                self.high_periods.set(self.high_periods.get() + 1);
            }
        }
    }

    struct Line(Rc<Cell<bool>>);

    impl OutputPin for Line {
        type Error = Infallible;

        fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    #[test]
    fn bit_timing_matches_pixel_data() {
        let level = Rc::new(Cell::new(false));
        let high_periods = Rc::new(Cell::new(0));
        let waits = Rc::new(Cell::new(0));
        let scope = Scope { level: level.clone(), high_periods: high_periods.clone(), waits: waits.clone() };
        let mut line = Line(level);
        let strip = PhysicalStrip {
            led_count: 2,
            reversed: false,
            color_order: ColorOrder::RGB,
            strip_timings: StripTimings::WS2812_ADAFRUIT,
        };

        let mut driver: StripDriver<Scope, 6> = StripDriver::new(&mut line, scope, &strip);
        // one extra pixel that the strip does not have
        driver.show(&[C_RED, c::C_OFF, C_GREEN]).unwrap();

        let bits = 2 * 24;
        let ones = 8;
        assert_eq!(waits.get(), DELAY_PERIODS_BEFORE_SEND + bits * 3);
        assert_eq!(high_periods.get(), bits + ones);
    }
}
