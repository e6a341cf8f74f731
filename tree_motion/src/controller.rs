//! The per-frame transition engine.
//!
//! `TransitionController` owns all mutable render state: the global foliage
//! progress, the drawn foliage positions, one position per ornament, one pose
//! per polaroid and the group yaw.  Element `i` of every buffer always
//! corresponds to record `i` of the [`SceneData`] it was built from.

use glam::Vec3;
use tracing::{debug, trace};
use tree_scene::{SceneData, TreeState};

use crate::animators::{
    foliage_position, instance_target, step_ornament, GroupRotation, ParticleProgress,
    PolaroidMotion,
};
use crate::frame::SceneFrame;
use crate::tuning::MotionTuning;

// ════════════════════════════════════════════════════════════════════════════
// FrameInput
// ════════════════════════════════════════════════════════════════════════════

/// Everything one `advance` call needs from the outside world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    pub state:           TreeState,
    /// Seconds since the previous frame.
    pub delta:           f32,
    /// Seconds since the session started.
    pub elapsed:         f32,
    /// Yaw the whole group should turn toward, in radians.
    pub rotation_target: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// TransitionController
// ════════════════════════════════════════════════════════════════════════════

pub struct TransitionController {
    tuning:    MotionTuning,
    state:     TreeState,
    elapsed:   f32,
    progress:  ParticleProgress,
    rotation:  GroupRotation,
    foliage:   Vec<Vec3>,
    ornaments: Vec<Vec3>,
    polaroids: Vec<PolaroidMotion>,
}

impl TransitionController {
    /// Start fully dispersed, with every element at its chaos position.
    pub fn new(scene: &SceneData, tuning: MotionTuning) -> Self {
        Self::settled_in(scene, tuning, TreeState::Chaos)
    }

    /// Start already settled in `state`.  This is the only place progress
    /// jumps instead of easing.
    pub fn settled_in(scene: &SceneData, tuning: MotionTuning, state: TreeState) -> Self {
        let progress = ParticleProgress::settled(state);
        let foliage = scene
            .foliage()
            .iter()
            .map(|r| foliage_position(r, progress, 0.0, &tuning))
            .collect();
        let ornaments = scene
            .ornaments()
            .iter()
            .map(|o| instance_target(state, o.chaos_pos, o.target_pos))
            .collect();
        let polaroids = scene
            .polaroids()
            .iter()
            .map(|p| PolaroidMotion::at(instance_target(state, p.chaos_pos, p.target_pos)))
            .collect();

        TransitionController {
            tuning,
            state,
            elapsed: 0.0,
            progress,
            rotation: GroupRotation::default(),
            foliage,
            ornaments,
            polaroids,
        }
    }

    /// Advance every animated value by one frame.
    ///
    /// `scene` must be the scene this controller was built from: element `i`
    /// of each buffer tracks record `i`.
    pub fn advance(&mut self, scene: &SceneData, input: FrameInput) {
        debug_assert_eq!(self.foliage.len(), scene.foliage().len(), "foliage count changed");
        debug_assert_eq!(self.ornaments.len(), scene.ornaments().len(), "ornament count changed");
        debug_assert_eq!(self.polaroids.len(), scene.polaroids().len(), "polaroid count changed");
        if input.state != self.state {
            debug!(from = self.state.name(), to = input.state.name(), "transition retargeted");
            self.state = input.state;
        }
        let dt = if input.delta.is_finite() { input.delta.max(0.0) } else { 0.0 };
        self.elapsed = input.elapsed;

        let tuning = &self.tuning;
        self.progress = self.progress.step(input.state, dt, tuning);
        self.rotation = self.rotation.step(input.rotation_target, dt, tuning);

        let progress = self.progress;
        let elapsed = input.elapsed;
        for (pos, rec) in self.foliage.iter_mut().zip(scene.foliage()) {
            *pos = foliage_position(rec, progress, elapsed, tuning);
        }

        for (pos, rec) in self.ornaments.iter_mut().zip(scene.ornaments()) {
            let goal = instance_target(input.state, rec.chaos_pos, rec.target_pos);
            *pos = step_ornament(*pos, goal, dt, tuning);
        }

        for (motion, rec) in self.polaroids.iter_mut().zip(scene.polaroids()) {
            let goal = instance_target(input.state, rec.chaos_pos, rec.target_pos);
            *motion = motion.step(input.state, goal, dt, tuning);
        }

        trace!(progress = progress.value(), rotation = self.rotation.angle(), "frame advanced");
    }

    /// Borrow the current render-facing buffers.
    pub fn frame(&self) -> SceneFrame<'_> {
        SceneFrame {
            state:          self.state,
            elapsed:        self.elapsed,
            progress:       self.progress.value(),
            group_rotation: self.rotation.angle(),
            star_scale:     if self.state == TreeState::Formed { 1.0 } else { 0.0 },
            foliage:        &self.foliage,
            ornaments:      &self.ornaments,
            polaroids:      &self.polaroids,
        }
    }

    pub fn progress(&self) -> f32           { self.progress.value() }
    pub fn state(&self)    -> TreeState     { self.state }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
