//! Scalar mapping helpers shared by the renderers.
//!
//! `map_range` never clamps: louder input keeps pushing shapes past their
//! nominal ranges.

/// Linearly re-map `value` from `[in_min, in_max]` to `[out_min, out_max]`
///
/// Values outside the input domain extrapolate.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_map_range_inside_domain() {
        assert_relative_eq!(map_range(15.0, 8.0, 50.0, 8.0, 16.0), 8.0 + 7.0 * 8.0 / 42.0, epsilon = 1e-4);
        assert_relative_eq!(map_range(-1.0, -1.0, 1.0, 80.0, 255.0), 80.0, epsilon = 1e-4);
        assert_relative_eq!(map_range(1.0, -1.0, 1.0, 80.0, 255.0), 255.0, epsilon = 1e-4);
    }

    #[test]
    fn test_map_range_extrapolates() {
        // No ceiling above the domain, no floor below it
        assert_relative_eq!(map_range(1.0, 0.1, 0.5, 2.0, 20.0), 42.5, epsilon = 1e-4);
        assert_relative_eq!(map_range(0.0, 8.0, 50.0, 8.0, 16.0), 8.0 - 64.0 / 42.0, epsilon = 1e-4);
    }

    #[test]
    fn test_lerp() {
        assert_relative_eq!(lerp(0.0, 255.0, 0.5), 127.5, epsilon = 1e-4);
        assert_relative_eq!(lerp(10.0, 20.0, 0.0), 10.0, epsilon = 1e-4);
    }
}
