#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    // new color object takes raw rgb color values:
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Converts a hue / saturation / lightness triple into RGB. All three components are in
    /// the 0.0..=1.0 range, lightness 0.5 being the fully saturated color.
    pub fn from_hsl(hsl: Hsl) -> Self {
        let Hsl { hue, saturation, lightness } = hsl.clamped();

        if saturation == 0.0 {
            let grey = unit_to_u8(lightness);
            return Color::new(grey, grey, grey);
        }

        let q = if lightness < 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;

        Color {
            r: unit_to_u8(hue_to_channel(p, q, hue + 1.0 / 3.0)),
            g: unit_to_u8(hue_to_channel(p, q, hue)),
            b: unit_to_u8(hue_to_channel(p, q, hue - 1.0 / 3.0)),
        }
    }

    /// Returns the color as the LEDs should be driven to look like the color you expect.
    pub fn gamma_corrected(&self) -> Color {
        Color {
            r: GAMMA8[self.r as usize],
            g: GAMMA8[self.g as usize],
            b: GAMMA8[self.b as usize],
        }
    }

    // This maps a color to a fractional mid-color based on the position of the factor
    // between the in_min and in_max values. It will automatically truncate any values
    // below 0 or larger than 255 when it is cast back to a u8 at the end of the calculation.
    pub fn color_lerp(
        factor: i32,
        in_min: i32,
        in_max: i32,
        start_color: Color,
        end_color: Color,
    ) -> Color {
        if in_max == in_min {
            return end_color;
        }
        let lerp = |start: u8, end: u8| {
            ((factor - in_min) * (end as i32 - start as i32) / (in_max - in_min) + start as i32)
                as u8
        };
        let mut mid_color = C_OFF;

        mid_color.r = lerp(start_color.r, end_color.r);
        mid_color.g = lerp(start_color.g, end_color.g);
        mid_color.b = lerp(start_color.b, end_color.b);

        mid_color
    }

    /// Linear blend towards `to_color`; `progress` 0.0 keeps `self`, 1.0 yields `to_color`.
    pub fn linear_blend(&self, to_color: Color, progress: f32) -> Color {
        let factor = (progress.clamp(0.0, 1.0) * BLEND_STEPS as f32) as i32;
        Color::color_lerp(factor, 0, BLEND_STEPS, *self, to_color)
    }
}

const BLEND_STEPS: i32 = 256;

fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

fn hue_to_channel(p: f32, q: f32, hue: f32) -> f32 {
    let hue = if hue < 0.0 {
        hue + 1.0
    } else if hue > 1.0 {
        hue - 1.0
    } else {
        hue
    };

    if hue < 1.0 / 6.0 {
        p + (q - p) * 6.0 * hue
    } else if hue < 0.5 {
        q
    } else if hue < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - hue) * 6.0
    } else {
        p
    }
}

/// Hue, saturation and lightness, each in 0.0..=1.0. Hue wraps around the color circle.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Hsl { hue, saturation, lightness }
    }

    fn clamped(self) -> Self {
        let hue = self.hue - libm::floorf(self.hue);
        Hsl {
            hue,
            saturation: self.saturation.clamp(0.0, 1.0),
            lightness: self.lightness.clamp(0.0, 1.0),
        }
    }
}

// Generic colors:
pub const C_RED: Color = Color { r: 255, g: 0, b: 0 };
pub const C_GREEN: Color = Color { r: 0, g: 255, b: 0 };
pub const C_BLUE: Color = Color { r: 0, g: 0, b: 255 };
pub const C_WHITE: Color = Color { r: 255, g: 255, b: 255 };
pub const C_OFF: Color = Color { r: 0, g: 0, b: 0 };

/// A color correction table for LEDs to make them look like the color you expect:
/// Shamelessly stolen from Adafruit's neopixel library somewhere a long time ago.
pub const GAMMA8: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 5, 5, 5,
    5, 6, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 10, 11, 11, 11, 12, 12, 13, 13, 13, 14,
    14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 21, 22, 22, 23, 24, 24, 25, 25, 26, 27,
    27, 28, 29, 29, 30, 31, 32, 32, 33, 34, 35, 35, 36, 37, 38, 39, 39, 40, 41, 42, 43, 44, 45, 46,
    47, 48, 49, 50, 50, 51, 52, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 66, 67, 68, 69, 70, 72,
    73, 74, 75, 77, 78, 79, 81, 82, 83, 85, 86, 87, 89, 90, 92, 93, 95, 96, 98, 99, 101, 102, 104,
    105, 107, 109, 110, 112, 114, 115, 117, 119, 120, 122, 124, 126, 127, 129, 131, 133, 135, 137,
    138, 140, 142, 144, 146, 148, 150, 152, 154, 156, 158, 160, 162, 164, 167, 169, 171, 173, 175,
    177, 180, 182, 184, 186, 189, 191, 193, 196, 198, 200, 203, 205, 208, 210, 213, 215, 218, 220,
    223, 225, 228, 231, 233, 236, 239, 241, 244, 247, 249, 252, 255,
];
