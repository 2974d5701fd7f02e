use embedded_time::duration::Milliseconds;
use embedded_time::fixed_point::FixedPoint;

/// Re-maps a value from one range to another without clamping. A zero-width input range maps
/// everything to `out_min`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_max == in_min {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Fractional part of a value, always in `0.0..1.0` (also for negative values).
pub fn fract(value: f32) -> f32 {
    value - libm::floorf(value)
}

/// Milliseconds elapsed from `earlier` to `later`, tolerating one wrap of the u32 uptime.
pub fn ms_between(earlier: Milliseconds<u32>, later: Milliseconds<u32>) -> u32 {
    later.integer().wrapping_sub(earlier.integer())
}

/// Reverses the lowest `count` decimal digits of `value`, e.g. `reverse_digits(1234, 6)` is
/// `432100`. Emitting the result least-significant digit first then yields the original value
/// most-significant digit first, leading zeros included.
pub fn reverse_digits(mut value: u32, count: usize) -> u32 {
    let mut reversed = 0_u32;
    for _ in 0..count {
        reversed = reversed.wrapping_mul(10).wrapping_add(value % 10);
        value /= 10;
    }
    reversed
}
