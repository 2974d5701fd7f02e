//! Seven-segment glyphs and digit frame sequencing.
//!
//! ```text
//!       ---   A
//!     /   /   F, B
//!     ---     G
//!   /   /     E, C
//!   ---  .    D, DP
//! ```
//!
//! Bit assignment follows the wiring of the large-digit driver boards, so it is not in
//! alphabetical order.

use crate::utility::reverse_digits;
use crate::DIGIT_COUNT;

pub const SEG_A: u8 = 1 << 0;
pub const SEG_B: u8 = 1 << 6;
pub const SEG_C: u8 = 1 << 5;
pub const SEG_D: u8 = 1 << 4;
pub const SEG_E: u8 = 1 << 3;
pub const SEG_F: u8 = 1 << 1;
pub const SEG_G: u8 = 1 << 2;
pub const SEG_DP: u8 = 1 << 7;

/// Every segment except the decimal point.
pub const ALL_SEGMENTS: u8 = !SEG_DP;

/// Something a single digit can show.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Glyph {
    /// 0-9. Anything larger renders blank.
    Digit(u8),
    Blank,
    Dash,
    Underscore,
    /// The lower-case `c` shape shown when something is wrong.
    Error,
}

impl Glyph {
    /// Maps the characters the display understands. Unknown characters become `Blank`.
    pub fn from_char(c: char) -> Self {
        match c {
            '0'..='9' => Glyph::Digit(c as u8 - b'0'),
            '-' => Glyph::Dash,
            '_' => Glyph::Underscore,
            'c' => Glyph::Error,
            _ => Glyph::Blank,
        }
    }

    /// The segment mask for this glyph, decimal point cleared.
    pub fn segments(self) -> u8 {
        match self {
            Glyph::Digit(0) => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
            Glyph::Digit(1) => SEG_B | SEG_C,
            Glyph::Digit(2) => SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,
            Glyph::Digit(3) => SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
            Glyph::Digit(4) => SEG_F | SEG_G | SEG_B | SEG_C,
            Glyph::Digit(5) => SEG_A | SEG_F | SEG_G | SEG_C | SEG_D,
            Glyph::Digit(6) => SEG_A | SEG_F | SEG_G | SEG_E | SEG_C | SEG_D,
            Glyph::Digit(7) => SEG_A | SEG_B | SEG_C,
            Glyph::Digit(8) => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
            Glyph::Digit(9) => SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
            Glyph::Digit(_) => 0,
            Glyph::Blank => 0,
            Glyph::Dash => SEG_G,
            Glyph::Underscore => SEG_D,
            Glyph::Error => SEG_G | SEG_E | SEG_D,
        }
    }
}

/// One complete update of the digit chain. Index 0 is shifted out first and is the
/// most-significant digit. `intensity` is a per-digit level, 255 being full on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitFrame {
    pub segments: [u8; DIGIT_COUNT],
    pub intensity: [u8; DIGIT_COUNT],
}

impl Default for DigitFrame {
    fn default() -> Self {
        DigitFrame::filled(Glyph::Blank)
    }
}

impl DigitFrame {
    pub fn filled(glyph: Glyph) -> Self {
        DigitFrame { segments: [glyph.segments(); DIGIT_COUNT], intensity: [u8::MAX; DIGIT_COUNT] }
    }

    /// Shows `|value|` over all digits with leading zeros.
    pub fn from_value(value: i32) -> Self {
        let mut frame = DigitFrame::default();
        for (segments, digit) in frame.segments.iter_mut().zip(value_digits(value)) {
            *segments = Glyph::Digit(digit).segments();
        }
        frame
    }

    /// Sets the decimal point on every digit whose bit is set in `mask` (bit 0 is index 0).
    pub fn with_decimal_points(mut self, mask: u8) -> Self {
        for (index, segments) in self.segments.iter_mut().enumerate() {
            if mask & (1 << index) != 0 {
                *segments |= SEG_DP;
            }
        }
        self
    }

    /// Scales the intensity of every digit whose bit is set in `mask` by `factor`.
    pub fn with_dimmed(mut self, mask: u8, factor: f32) -> Self {
        for (index, level) in self.intensity.iter_mut().enumerate() {
            if mask & (1 << index) != 0 {
                *level = (*level as f32 * factor.clamp(0.0, 1.0)) as u8;
            }
        }
        self
    }
}

/// Writes the decimal digits of `|value|` into `digits`, most-significant first and zero
/// padded to its length. Values with more digits are truncated to their lowest digits.
pub fn render_value(value: i32, digits: &mut [u8]) {
    let mut number = reverse_digits(value.unsigned_abs(), digits.len());
    for digit in digits.iter_mut() {
        *digit = (number % 10) as u8;
        number /= 10;
    }
}

/// [`render_value`] over all the digits of the clock.
pub fn value_digits(value: i32) -> [u8; DIGIT_COUNT] {
    let mut digits = [0_u8; DIGIT_COUNT];
    render_value(value, &mut digits);
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEGMENTS_A_TO_F: u8 = SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F;

    #[test]
    fn leading_zeros_not_blanks() {
        assert_eq!(value_digits(1234), [0, 0, 1, 2, 3, 4]);
        assert_eq!(value_digits(-1234), [0, 0, 1, 2, 3, 4]);
        assert_eq!(value_digits(0), [0; DIGIT_COUNT]);
        assert_eq!(value_digits(235_959), [2, 3, 5, 9, 5, 9]);
    }

    #[test]
    fn render_into_shorter_displays() {
        let mut four = [9_u8; 4];
        render_value(56, &mut four);
        assert_eq!(four, [0, 0, 5, 6]);
        render_value(123_456, &mut four);
        assert_eq!(four, [3, 4, 5, 6]);
    }

    #[test]
    fn dash_and_blank_leave_outer_segments_dark() {
        assert_eq!(Glyph::from_char('-').segments() & SEGMENTS_A_TO_F, 0);
        assert_eq!(Glyph::from_char(' ').segments() & SEGMENTS_A_TO_F, 0);
        assert_eq!(Glyph::Dash.segments(), SEG_G);
        assert_eq!(Glyph::Blank.segments(), 0);
    }

    #[test]
    fn underscore_and_error_sentinels() {
        assert_eq!(Glyph::from_char('_'), Glyph::Underscore);
        assert_eq!(Glyph::Underscore.segments(), SEG_D);
        assert_eq!(Glyph::from_char('c'), Glyph::Error);
        assert_eq!(Glyph::Error.segments(), SEG_G | SEG_E | SEG_D);
        assert_eq!(Glyph::from_char('C'), Glyph::Blank);
        assert_eq!(DigitFrame::filled(Glyph::Error).segments, [SEG_G | SEG_E | SEG_D; DIGIT_COUNT]);
    }

    #[test]
    fn unknown_symbols_render_blank() {
        assert_eq!(Glyph::from_char('x'), Glyph::Blank);
        assert_eq!(Glyph::Digit(12).segments(), 0);
    }

    #[test]
    fn eight_lights_every_segment() {
        assert_eq!(Glyph::Digit(8).segments(), ALL_SEGMENTS);
        assert_eq!(Glyph::from_char('8'), Glyph::Digit(8));
    }

    #[test]
    fn frame_from_value_is_msd_first() {
        let frame = DigitFrame::from_value(1234);
        assert_eq!(frame.segments[0], Glyph::Digit(0).segments());
        assert_eq!(frame.segments[2], Glyph::Digit(1).segments());
        assert_eq!(frame.segments[5], Glyph::Digit(4).segments());
    }

    #[test]
    fn decimal_points_and_dimming() {
        let frame = DigitFrame::filled(Glyph::Dash)
            .with_decimal_points(0b00_0100)
            .with_dimmed(0b10_0001, 0.5);
        assert_eq!(frame.segments[2], SEG_G | SEG_DP);
        assert_eq!(frame.segments[3], SEG_G);
        assert_eq!(frame.intensity, [127, 255, 255, 255, 255, 127]);
    }
}
