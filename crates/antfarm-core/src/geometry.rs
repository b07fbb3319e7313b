//! Stateless geometry and statistics helpers shared by the field, the index and the ants.

use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Uniform sample in `[min, max)`. Accepts `min == max` (returns `min`) and reversed bounds.
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.random::<f64>() * (max - min) + min
}

/// Clamp that tolerates `min > max` by preferring `min`, and passes NaN through unchanged.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value <= min {
        min
    } else if value >= max {
        max
    } else {
        value
    }
}

/// Convert a polar `(r, theta)` pair (radians) into a cartesian offset.
pub fn polar_to_cartesian(r: f64, theta: f64) -> [f64; 2] {
    let (sin, cos) = theta.sin_cos();
    [r * cos, r * sin]
}

/// Polar coordinates of `point` as seen from `origin`; the angle is normalised into `[0, 2π)`.
pub fn cartesian_to_polar(point: [f64; 2], origin: [f64; 2]) -> (f64, f64) {
    let dx = point[0] - origin[0];
    let dy = point[1] - origin[1];
    let r = (dx * dx + dy * dy).sqrt();
    let theta = dy.atan2(dx);
    let theta = if theta < 0.0 { TAU + theta } else { theta };
    (r, theta)
}

/// Heading (radians, `(-π, π]`) that points from `from` towards `to`.
pub fn heading_towards(from: [f64; 2], to: [f64; 2]) -> f64 {
    (to[1] - from[1]).atan2(to[0] - from[0])
}

pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// Mean and population standard deviation. Empty input yields `(0, 0)`.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Unnormalised Gaussian bump: `exp(-(x - mu)^2 / (2 sd^2))`. Peaks at `1.0` when `x == mu`.
///
/// The density's `1 / (sd * sqrt(2π))` factor would be multiplied straight back out, so it is
/// left out entirely; applying both only adds rounding at the peak.
pub fn gaussian(x: f64, mu: f64, sd: f64) -> f64 {
    let d2 = (x - mu).powi(2);
    let s2 = sd.powi(2);
    (-(d2 / (2.0 * s2))).exp()
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_signed_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn gaussian_peaks_at_one_for_any_spread() {
        for sd in [0.5, 1.0, 50.0, 75.0, 100.0, 1e4] {
            assert_eq!(gaussian(3.0, 3.0, sd), 1.0);
        }
    }

    #[test]
    fn gaussian_is_unnormalised_bump() {
        let expected = (-0.5f64).exp();
        assert!((gaussian(100.0, 0.0, 100.0) - expected).abs() < 1e-12);
        assert!(gaussian(400.0, 0.0, 100.0) < 1e-3);
    }

    #[test]
    fn polar_angles_are_normalised() {
        let (r, theta) = cartesian_to_polar([0.0, -1.0], [0.0, 0.0]);
        assert!((r - 1.0).abs() < 1e-12);
        assert!((theta - 1.5 * PI).abs() < 1e-12);

        let (r, theta) = cartesian_to_polar([5.0, 5.0], [5.0, 5.0]);
        assert_eq!(r, 0.0);
        assert_eq!(theta, 0.0);
    }

    #[test]
    fn polar_to_cartesian_points_along_heading() {
        let [x, y] = polar_to_cartesian(2.0, PI / 2.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn mean_and_std_uses_population_variance() {
        let (mean, std) = mean_and_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
        assert_eq!(mean_and_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn clamp_prefers_bounds_at_edges() {
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
        assert!(clamp(f64::NAN, 0.0, 1.0).is_nan());
    }

    #[test]
    fn rand_range_stays_in_half_open_interval() {
        let mut rng = create_rng(11);
        for _ in 0..1000 {
            let v = rand_range(&mut rng, -140.0, 140.0);
            assert!((-140.0..140.0).contains(&v));
        }
        assert_eq!(rand_range(&mut rng, 3.0, 3.0), 3.0);
    }

    #[test]
    fn heading_towards_matches_atan2() {
        let h = heading_towards([1.0, 1.0], [1.0, 5.0]);
        assert!((h - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn wrap_signed_angle_folds_full_turns() {
        assert!((wrap_signed_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_signed_angle(-PI / 2.0 - TAU) + PI / 2.0).abs() < 1e-12);
    }
}
