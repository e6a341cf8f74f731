//! Scalar easing and damping primitives.
//!
//! All damping here is exponential decay toward a target:
//! `alpha = 1 - e^(-rate · dt)`.  For small `dt` this is the familiar
//! `lerp(current, target, rate · dt)`, but it never overshoots when a frame
//! runs long and the result is the same whether a second is split into 30
//! steps or 144.

use glam::Vec3;

/// Cubic ease-out: `1 - (1 - x)^3`, clamped to [0, 1].
pub fn ease_out_cubic(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    1.0 - (1.0 - x).powi(3)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fraction of the remaining distance covered in `dt` seconds at `rate`.
pub fn decay_alpha(rate: f32, dt: f32) -> f32 {
    if !(dt > 0.0) || !(rate > 0.0) {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Move `current` toward `target` by exponential decay.
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    lerp(current, target, decay_alpha(rate, dt))
}

pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, decay_alpha(rate, dt))
}

/// Per-particle progress derived from the global progress.
///
/// Each particle starts moving once the global value passes
/// `seed · stagger` and finishes when the global value reaches
/// `seed · stagger + (1 - stagger)`.
pub fn local_progress(global: f32, seed: f32, stagger: f32) -> f32 {
    let span = (1.0 - stagger).max(f32::EPSILON);
    ((global - seed * stagger) / span).clamp(0.0, 1.0)
}

/// Foliage brightness in [0.2, 1.0]; values above 0.95 read as a gold glint.
pub fn shimmer(seed: f32, elapsed: f32) -> f32 {
    0.6 + 0.4 * (elapsed + seed * 10.0).sin()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ease_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
    }

    #[test]
    fn ease_is_front_loaded() {
        // Ease-out covers most of the distance early.
        assert!(ease_out_cubic(0.5) > 0.85);
    }

    #[test]
    fn decay_alpha_bounds() {
        assert_eq!(decay_alpha(1.5, 0.0), 0.0);
        assert_eq!(decay_alpha(1.5, -1.0), 0.0);
        assert_eq!(decay_alpha(1.5, f32::NAN), 0.0);
        assert!(decay_alpha(1.5, 1000.0) <= 1.0);
    }

    #[test]
    fn decay_matches_linear_for_small_steps() {
        let dt = 1.0 / 240.0;
        assert!((decay_alpha(1.5, dt) - 1.5 * dt).abs() < 1e-4);
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let run = |steps: usize| {
            let dt = 1.0 / steps as f32;
            (0..steps).fold(0.0_f32, |v, _| damp(v, 1.0, 1.5, dt))
        };
        assert!((run(30) - run(144)).abs() < 1e-4);
    }

    #[test]
    fn local_progress_staggers_by_seed() {
        // seed 0 leads, seed 1 lags by the full stagger.
        assert_eq!(local_progress(0.2, 1.0, 0.2), 0.0);
        assert!((local_progress(0.2, 0.0, 0.2) - 0.25).abs() < 1e-6);
        assert_eq!(local_progress(1.0, 1.0, 0.2), 1.0);
        assert_eq!(local_progress(0.0, 0.0, 0.2), 0.0);
    }

    #[test]
    fn shimmer_range() {
        for i in 0..100 {
            let s = shimmer(i as f32 / 100.0, i as f32 * 0.37);
            assert!((0.2..=1.0).contains(&s));
        }
    }

    proptest! {
        #[test]
        fn ease_monotone(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease_out_cubic(lo) <= ease_out_cubic(hi));
        }

        #[test]
        fn ease_stays_in_unit_interval(x in 0.0f32..=1.0) {
            let y = ease_out_cubic(x);
            prop_assert!((0.0..=1.0).contains(&y));
        }

        #[test]
        fn damping_converges_without_overshoot(
            start in 0.0f32..=1.0,
            formed in any::<bool>(),
            dt in 0.001f32..0.5,
        ) {
            let target = if formed { 1.0 } else { 0.0 };
            let mut v = start;
            let mut gap = (target - v).abs();
            for _ in 0..400 {
                v = damp(v, target, 1.5, dt);
                let next_gap = (target - v).abs();
                prop_assert!(next_gap <= gap);
                prop_assert!((0.0..=1.0).contains(&v));
                gap = next_gap;
            }
        }

        #[test]
        fn local_progress_in_unit_interval(g in 0.0f32..=1.0, seed in 0.0f32..=1.0) {
            let l = local_progress(g, seed, 0.2);
            prop_assert!((0.0..=1.0).contains(&l));
        }
    }
}
