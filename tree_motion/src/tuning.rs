//! Visual tuning constants for the transition.

/// How the whole-group rotation closes on its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationDamping {
    /// Frame-rate corrected exponential decay, in 1/s.
    PerSecond(f32),
    /// Fixed fraction of the remaining angle per `advance` call, independent
    /// of the frame delta.
    PerStep(f32),
}

/// Rates and thresholds driving the chaos ⇄ tree transition.
///
/// Position rates are in 1/s; see [`crate::easing::decay_alpha`].
#[derive(Clone, Debug, PartialEq)]
pub struct MotionTuning {
    /// Global particle progress rate.
    pub progress_rate:    f32,
    /// Fraction of the progress range a seed of 1.0 lags behind a seed of 0.0.
    pub stagger:          f32,
    /// Local progress above which foliage starts swaying.
    pub settle_threshold: f32,
    pub sway_amplitude:   f32,
    pub sway_freq_x:      f32,
    pub sway_freq_z:      f32,
    pub ornament_rate:    f32,
    pub polaroid_rate:    f32,
    /// Polaroid tumble in rad/s about X and Z while in chaos.
    pub tumble_rate:      f32,
    pub rotation:         RotationDamping,
}

impl Default for MotionTuning {
    fn default() -> Self {
        MotionTuning {
            progress_rate:    1.5,
            stagger:          0.2,
            settle_threshold: 0.9,
            sway_amplitude:   0.05,
            sway_freq_x:      2.0,
            sway_freq_z:      1.5,
            ornament_rate:    2.0,
            polaroid_rate:    2.5,
            tumble_rate:      1.0,
            // Heavier than every position rate above.
            rotation:         RotationDamping::PerSecond(0.9),
        }
    }
}

impl MotionTuning {
    /// The reference per-call damping of 0.05, tied to the caller's frame rate.
    pub fn with_per_step_rotation(mut self) -> Self {
        self.rotation = RotationDamping::PerStep(0.05);
        self
    }
}
