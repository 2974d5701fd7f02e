use crate::colors::{Color, Hsl};
use crate::utility::fract;
use rand::Rng;

/// Once the head passes this position the trail wraps around.
pub const WRAP_THRESHOLD: f32 = 1.0;

/// Distance subtracted on wrap, so the trail re-enters slightly before the strip start and
/// keeps any overshoot instead of snapping to zero.
pub const WRAP_SPAN: f32 = 1.2;

/// A single comet: a bright head followed by a linearly fading tail. Positions are
/// normalized to the animatable segment of the strip, `0.0` the first pixel and `1.0` the
/// last.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Trail {
    /// 0.0..1.0 around the color circle
    pub hue: f32,
    pub position: f32,
    /// position increment per draw
    pub speed: f32,
    /// number of pixels the tail fades over
    pub trail_length: usize,
}

impl Trail {
    pub const fn new(hue: f32, position: f32, speed: f32, trail_length: usize) -> Self {
        Trail { hue, position, speed, trail_length }
    }

    /// A trail with random motion parameters.
    pub fn random(hue: f32, rng: &mut impl Rng) -> Self {
        let mut trail = Trail::new(hue, 0.0, 0.0, 1);
        trail.randomize(rng);
        trail
    }

    /// Picks a new speed, start position and tail length. The hue is left alone.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        self.speed = rng.gen_range(0.0005..0.005);
        self.position = rng.gen_range(0.0..1.0);
        self.trail_length = rng.gen_range(2..=8);
    }

    /// Paints the trail into `segment`, blending 50/50 with whatever is there, then advances
    /// the position by one step.
    pub fn draw(&mut self, segment: &mut [Color], brightness: f32) {
        let last_pixel = segment.len() as i32;
        if last_pixel > 0 {
            let loc = last_pixel as f32 * self.position;
            let base = libm::floorf(loc) as i32;

            // leading pixel, lit by how far the virtual point has moved into it
            self.blend_pixel(segment, base + 1, fract(loc) * brightness);

            let tail = self.trail_length.max(1) as f32;
            for step in 0..=self.trail_length as i32 {
                let index = (base - step).clamp(0, last_pixel);
                let level = 1.0 - libm::fabsf((loc - index as f32) / tail);
                self.blend_pixel(segment, index, level.max(0.0) * brightness);
            }
        }

        self.advance();
    }

    fn blend_pixel(&self, segment: &mut [Color], index: i32, lightness: f32) {
        if index < 0 {
            return;
        }
        if let Some(pixel) = segment.get_mut(index as usize) {
            let color = Color::from_hsl(Hsl::new(self.hue, 1.0, lightness));
            *pixel = color.linear_blend(*pixel, 0.5).gamma_corrected();
        }
    }

    fn advance(&mut self) {
        self.position += self.speed;
        if self.position > WRAP_THRESHOLD {
            self.position -= WRAP_SPAN;
        }
    }
}
