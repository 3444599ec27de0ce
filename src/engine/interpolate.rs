//! Clamped interpolation curves driven by the horizontal drag offset

/// Maps `input` through a three-point piecewise-linear curve.
///
/// `domain` must be ascending. Inputs outside the domain are clamped to the
/// first or last output, never extrapolated.
pub fn interpolate(input: f64, domain: [f64; 3], range: [f64; 3]) -> f64 {
    if input.is_nan() {
        return range[1];
    }
    if input <= domain[0] {
        return range[0];
    }
    if input >= domain[2] {
        return range[2];
    }

    let (d0, d1, r0, r1) = if input <= domain[1] {
        (domain[0], domain[1], range[0], range[1])
    } else {
        (domain[1], domain[2], range[1], range[2])
    };

    if d1 == d0 {
        return r1;
    }
    r0 + (input - d0) / (d1 - d0) * (r1 - r0)
}

const ROTATION_DEGREES: [f64; 3] = [-25.0, 0.0, 20.0];
const LEFT_OVERLAY: [f64; 3] = [1.0, 0.0, 0.0];
const RIGHT_OVERLAY: [f64; 3] = [0.0, 0.0, 1.0];
const NEXT_OPACITY: [f64; 3] = [1.0, 0.0, 1.0];
const NEXT_SCALE: [f64; 3] = [1.0, 0.8, 1.0];

/// Visual values derived from the live drag offset.
///
/// Fields are read-only; the engine rebuilds the whole struct whenever the
/// drag offset or viewport width changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedValues {
    rotation: f64,
    left_opacity: f64,
    right_opacity: f64,
    next_opacity: f64,
    next_scale: f64,
}

impl AnimatedValues {
    pub fn compute(x: f64, width: f64) -> Self {
        let half = [-width / 2.0, 0.0, width / 2.0];
        let quarter = [-width / 4.0, 0.0, width / 4.0];

        Self {
            rotation: interpolate(x, half, ROTATION_DEGREES),
            left_opacity: interpolate(x, quarter, LEFT_OVERLAY),
            right_opacity: interpolate(x, quarter, RIGHT_OVERLAY),
            next_opacity: interpolate(x, half, NEXT_OPACITY),
            next_scale: interpolate(x, half, NEXT_SCALE),
        }
    }

    /// Rotation of the current card in degrees
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn left_opacity(&self) -> f64 {
        self.left_opacity
    }

    pub fn right_opacity(&self) -> f64 {
        self.right_opacity
    }

    pub fn next_opacity(&self) -> f64 {
        self.next_opacity
    }

    pub fn next_scale(&self) -> f64 {
        self.next_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 400.0;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_interpolate_midpoints() {
        let domain = [-100.0, 0.0, 100.0];
        let range = [-25.0, 0.0, 20.0];
        assert!(approx(interpolate(-50.0, domain, range), -12.5));
        assert!(approx(interpolate(50.0, domain, range), 10.0));
        assert!(approx(interpolate(0.0, domain, range), 0.0));
    }

    #[test]
    fn test_interpolate_clamps() {
        let domain = [-100.0, 0.0, 100.0];
        let range = [1.0, 0.8, 1.0];
        assert_eq!(interpolate(-1000.0, domain, range), 1.0);
        assert_eq!(interpolate(1000.0, domain, range), 1.0);
    }

    #[test]
    fn test_interpolate_nan_maps_to_rest() {
        assert_eq!(interpolate(f64::NAN, [-1.0, 0.0, 1.0], [5.0, 6.0, 7.0]), 6.0);
    }

    #[test]
    fn test_interpolate_degenerate_domain() {
        // zero width collapses both segments
        assert_eq!(interpolate(0.0, [0.0, 0.0, 0.0], [1.0, 0.8, 1.0]), 1.0);
    }

    #[test]
    fn test_values_at_rest() {
        let values = AnimatedValues::compute(0.0, WIDTH);
        assert_eq!(values.rotation(), 0.0);
        assert_eq!(values.left_opacity(), 0.0);
        assert_eq!(values.right_opacity(), 0.0);
        assert_eq!(values.next_opacity(), 0.0);
        assert!(approx(values.next_scale(), 0.8));
    }

    #[test]
    fn test_rotation_is_asymmetric() {
        let left = AnimatedValues::compute(-WIDTH / 2.0, WIDTH);
        let right = AnimatedValues::compute(WIDTH / 2.0, WIDTH);
        assert_eq!(left.rotation(), -25.0);
        assert_eq!(right.rotation(), 20.0);
    }

    #[test]
    fn test_overlays_follow_direction() {
        let dragging_left = AnimatedValues::compute(-WIDTH / 8.0, WIDTH);
        assert!(approx(dragging_left.left_opacity(), 0.5));
        assert_eq!(dragging_left.right_opacity(), 0.0);

        let dragging_right = AnimatedValues::compute(WIDTH / 4.0, WIDTH);
        assert_eq!(dragging_right.left_opacity(), 0.0);
        assert_eq!(dragging_right.right_opacity(), 1.0);
    }

    #[test]
    fn test_next_card_grows_both_ways() {
        let left = AnimatedValues::compute(-WIDTH / 4.0, WIDTH);
        let right = AnimatedValues::compute(WIDTH / 4.0, WIDTH);
        assert!(approx(left.next_opacity(), 0.5));
        assert!(approx(right.next_opacity(), 0.5));
        assert!(approx(left.next_scale(), 0.9));
        assert!(approx(right.next_scale(), 0.9));
    }

    #[test]
    fn test_next_card_clamped_outside_half_width() {
        for x in [-10_000.0, -WIDTH, -WIDTH / 2.0 - 1.0, WIDTH / 2.0 + 1.0, WIDTH, 10_000.0] {
            let values = AnimatedValues::compute(x, WIDTH);
            assert_eq!(values.next_opacity(), 1.0, "opacity at x={x}");
            assert_eq!(values.next_scale(), 1.0, "scale at x={x}");
        }
    }
}
