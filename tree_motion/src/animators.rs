//! Per-entity animation state and pure step functions.
//!
//! Each animator is a small `Copy` value advanced by
//! `step(self, input, dt) -> Self`.  Nothing here reads a clock; elapsed time
//! and deltas always arrive as arguments.

use glam::{EulerRot, Quat, Vec3};
use tree_scene::{ParticleRecord, TreeState};

use crate::easing::{damp, damp_vec3, decay_alpha, ease_out_cubic, lerp, local_progress};
use crate::tuning::{MotionTuning, RotationDamping};

// ════════════════════════════════════════════════════════════════════════════
// ParticleProgress — the global foliage scalar
// ════════════════════════════════════════════════════════════════════════════

/// Global foliage progress: 0 = chaos, 1 = formed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleProgress(pub f32);

impl ParticleProgress {
    /// Snap straight to the state's target (initialization only).
    pub fn settled(state: TreeState) -> Self {
        ParticleProgress(state.progress_target())
    }

    pub fn step(self, state: TreeState, dt: f32, tuning: &MotionTuning) -> Self {
        ParticleProgress(damp(self.0, state.progress_target(), tuning.progress_rate, dt))
    }

    pub fn value(self) -> f32 { self.0 }
}

/// Where a foliage particle is drawn for a given global progress.
///
/// The sway term is applied to the output only; it never feeds back into
/// progress.
pub fn foliage_position(
    record:   &ParticleRecord,
    progress: ParticleProgress,
    elapsed:  f32,
    tuning:   &MotionTuning,
) -> Vec3 {
    let local = local_progress(progress.0, record.random_seed, tuning.stagger);
    let mut pos = record.chaos_pos.lerp(record.target_pos, ease_out_cubic(local));
    if local > tuning.settle_threshold {
        pos.x += (elapsed * tuning.sway_freq_x + pos.y).sin() * tuning.sway_amplitude;
        pos.z += (elapsed * tuning.sway_freq_z + pos.y).cos() * tuning.sway_amplitude;
    }
    pos
}

// ════════════════════════════════════════════════════════════════════════════
// Instance motion — ornaments
// ════════════════════════════════════════════════════════════════════════════

/// The layout position an instance heads for in `state`.
pub fn instance_target(state: TreeState, chaos: Vec3, target: Vec3) -> Vec3 {
    match state {
        TreeState::Chaos  => chaos,
        TreeState::Formed => target,
    }
}

/// One ornament step: decay toward the state's layout position.
pub fn step_ornament(position: Vec3, goal: Vec3, dt: f32, tuning: &MotionTuning) -> Vec3 {
    damp_vec3(position, goal, tuning.ornament_rate, dt)
}

// ════════════════════════════════════════════════════════════════════════════
// PolaroidMotion — position plus orientation
// ════════════════════════════════════════════════════════════════════════════

/// Rendered pose of one photo panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolaroidMotion {
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
}

impl PolaroidMotion {
    pub fn at(position: Vec3) -> Self {
        PolaroidMotion { position, rotation: Vec3::ZERO }
    }

    pub fn step(self, state: TreeState, goal: Vec3, dt: f32, tuning: &MotionTuning) -> Self {
        let position = damp_vec3(self.position, goal, tuning.polaroid_rate, dt);
        let rotation = match state {
            TreeState::Formed => face_trunk(position).unwrap_or(self.rotation),
            TreeState::Chaos  => {
                let spin = tuning.tumble_rate * dt.max(0.0);
                Vec3::new(self.rotation.x + spin, self.rotation.y, self.rotation.z + spin)
            }
        };
        PolaroidMotion { position, rotation }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Direction the photo face points (local +Z).
    pub fn facing(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }
}

/// Euler angles turning local +Z toward the trunk point `(0, y, 0)` at the
/// panel's own height.  `None` when the panel sits on the trunk axis.
fn face_trunk(position: Vec3) -> Option<Vec3> {
    let dx = -position.x;
    let dz = -position.z;
    if dx * dx + dz * dz < 1e-12 {
        return None;
    }
    Some(Vec3::new(0.0, dx.atan2(dz), 0.0))
}

// ════════════════════════════════════════════════════════════════════════════
// GroupRotation — whole-scene yaw
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroupRotation(pub f32);

impl GroupRotation {
    pub fn step(self, target: f32, dt: f32, tuning: &MotionTuning) -> Self {
        let alpha = match tuning.rotation {
            RotationDamping::PerSecond(rate) => decay_alpha(rate, dt),
            RotationDamping::PerStep(k)      => k.clamp(0.0, 1.0),
        };
        GroupRotation(lerp(self.0, target, alpha))
    }

    pub fn angle(self) -> f32 { self.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
