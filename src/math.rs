//! Small numeric helpers shared by the simulation and the rasterizer.

use glam::Vec2;

/// Symmetric triangular envelope over a lifetime.
///
/// For life `t` and total lifetime `m`, rises linearly from 0 at `t = 0`
/// to 1 at `t = m / 2` and back to 0 at `t = m`. Periodic with period `m`.
/// Used for per-actor opacity so actors fade in and out instead of
/// popping.
#[inline]
pub fn fade_in_out(t: f32, m: f32) -> f32 {
    let hm = 0.5 * m;
    (((t + hm) % m) - hm).abs() / hm
}

/// Linear interpolation from `a` toward `b` by `weight`.
///
/// `weight = 0` returns `a`, `weight = 1` returns `b`. Applied once per
/// frame this is an exponential smoothing of velocity toward a target.
#[inline]
pub fn lerp(a: f32, b: f32, weight: f32) -> f32 {
    (1.0 - weight) * a + weight * b
}

/// Heading angle in radians from `from` toward `to`.
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Uniform random value in `[-n, n)` range, mirroring a spread around zero.
#[inline]
pub fn spread(rng: &mut impl rand::Rng, n: f32) -> f32 {
    n - rng.gen::<f32>() * 2.0 * n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_endpoints_and_peak() {
        let m = 200.0;
        assert_eq!(fade_in_out(0.0, m), 0.0);
        assert!(fade_in_out(m, m).abs() < 1e-6);
        assert!((fade_in_out(0.5 * m, m) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fade_symmetric() {
        let m = 120.0;
        for t in [10.0, 25.0, 40.0, 55.0] {
            let a = fade_in_out(t, m);
            let b = fade_in_out(m - t, m);
            assert!((a - b).abs() < 1e-5, "fade not symmetric at t={}", t);
        }
    }

    #[test]
    fn test_fade_periodic() {
        let m = 90.0;
        for t in [3.0, 30.0, 61.5] {
            let a = fade_in_out(t, m);
            let b = fade_in_out(t + m, m);
            assert!((a - b).abs() < 1e-4, "fade not periodic at t={}", t);
        }
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert!((lerp(2.0, 6.0, 0.5) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_heading_points_at_target() {
        let h = heading(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        assert!(h.abs() < 1e-6);
        let h = heading(Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0));
        assert!((h - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_spread_bounds() {
        let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(7);
        for _ in 0..200 {
            let v = spread(&mut rng, 100.0);
            assert!(v > -100.0 && v <= 100.0);
        }
    }
}
