//! Read-only view of one animated frame, handed to the renderer.

use glam::Vec3;
use tree_scene::TreeState;

use crate::animators::PolaroidMotion;

/// Borrowed snapshot of everything the renderer draws.
///
/// Index `i` of each slice lines up with record `i` of the scene population
/// it came from, so colors, scales and image ids can be looked up directly.
#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    pub state:          TreeState,
    pub elapsed:        f32,
    pub progress:       f32,
    pub group_rotation: f32,
    /// 1.0 when formed, 0.0 otherwise.
    pub star_scale:     f32,
    pub foliage:        &'a [Vec3],
    pub ornaments:      &'a [Vec3],
    pub polaroids:      &'a [PolaroidMotion],
}

impl SceneFrame<'_> {
    pub fn star_visible(&self) -> bool {
        self.star_scale > 0.0
    }

    /// Mean distance of the ornaments from `targets`, for headless traces.
    pub fn mean_ornament_gap(&self, targets: impl IntoIterator<Item = Vec3>) -> f32 {
        let (sum, n) = self
            .ornaments
            .iter()
            .zip(targets)
            .fold((0.0_f32, 0usize), |(s, n), (p, t)| (s + p.distance(t), n + 1));
        if n == 0 { 0.0 } else { sum / n as f32 }
    }
}
