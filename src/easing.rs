//! Easing curves on normalized progress. All inputs are clamped to `0.0..=1.0`.

fn clamp_unit(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Starts slow and accelerates.
pub fn quadratic_in(t: f32) -> f32 {
    let t = clamp_unit(t);
    t * t
}

/// Starts fast and decelerates.
pub fn quadratic_out(t: f32) -> f32 {
    let t = clamp_unit(t);
    t * (2.0 - t)
}

/// Symmetric pulse: rises with `quadratic_out` over the first half of the progress and falls
/// back with the complement of `quadratic_in` over the second half. Peaks at 1.0 at t = 0.5.
pub fn pulse(t: f32) -> f32 {
    let t = clamp_unit(t);
    if t < 0.5 {
        quadratic_out(t * 2.0)
    } else {
        1.0 - quadratic_in((t - 0.5) * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn endpoints_are_fixed() {
        assert!(close(quadratic_in(0.0), 0.0));
        assert!(close(quadratic_in(1.0), 1.0));
        assert!(close(quadratic_out(0.0), 0.0));
        assert!(close(quadratic_out(1.0), 1.0));
    }

    #[test]
    fn out_leads_in() {
        assert!(quadratic_out(0.25) > quadratic_in(0.25));
        assert!(close(quadratic_in(0.5), 0.25));
        assert!(close(quadratic_out(0.5), 0.75));
    }

    #[test]
    fn pulse_rises_then_falls() {
        assert!(close(pulse(0.0), 0.0));
        assert!(close(pulse(0.5), 1.0));
        assert!(close(pulse(1.0), 0.0));
        assert!(pulse(0.25) > pulse(0.1));
        assert!(pulse(0.9) < pulse(0.75));
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert!(close(quadratic_in(-3.0), 0.0));
        assert!(close(quadratic_out(7.0), 1.0));
        assert!(close(pulse(2.0), 0.0));
    }
}
