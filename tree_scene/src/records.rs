//! Record types for the three populations and the discrete tree state.

use glam::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// TreeState
// ════════════════════════════════════════════════════════════════════════════

/// The two discrete states of the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TreeState {
    /// Elements float in their dispersed cloud.
    #[default]
    Chaos,
    /// Elements settle into the cone.
    Formed,
}

impl TreeState {
    /// The opposite state.
    pub fn flipped(self) -> Self {
        match self {
            TreeState::Chaos  => TreeState::Formed,
            TreeState::Formed => TreeState::Chaos,
        }
    }

    /// Value the global particle progress approaches in this state.
    pub fn progress_target(self) -> f32 {
        match self {
            TreeState::Chaos  => 0.0,
            TreeState::Formed => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TreeState::Chaos  => "CHAOS",
            TreeState::Formed => "FORMED",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleRecord — one foliage point
// ════════════════════════════════════════════════════════════════════════════

/// A single foliage particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRecord {
    pub chaos_pos:   Vec3,
    pub target_pos:  Vec3,
    /// Uniform in [0, 1]; drives settling lag and shimmer phase.
    pub random_seed: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// OrnamentRecord
// ════════════════════════════════════════════════════════════════════════════

/// Ornament finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrnamentColor {
    Gold,
    Red,
}

impl OrnamentColor {
    /// Packed ARGB (0xAARRGGBB) used by the software renderer.
    pub fn argb(self) -> u32 {
        match self {
            OrnamentColor::Gold => 0xFFFFD700,
            OrnamentColor::Red  => 0xFF800020,
        }
    }
}

/// A single instanced ornament.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrnamentRecord {
    pub chaos_pos:  Vec3,
    pub target_pos: Vec3,
    pub color:      OrnamentColor,
    pub scale:      f32,
}

// ════════════════════════════════════════════════════════════════════════════
// PolaroidRecord
// ════════════════════════════════════════════════════════════════════════════

/// A single photo panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolaroidRecord {
    pub chaos_pos:  Vec3,
    pub target_pos: Vec3,
    pub id:         u32,
}

impl PolaroidRecord {
    /// Deterministic image reference for this panel.
    pub fn image_url(&self) -> String {
        format!("https://picsum.photos/seed/{}/200/200", self.id + 100)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_chaos() {
        assert_eq!(TreeState::default(), TreeState::Chaos);
    }

    #[test]
    fn flip_round_trips() {
        assert_eq!(TreeState::Chaos.flipped(), TreeState::Formed);
        assert_eq!(TreeState::Formed.flipped(), TreeState::Chaos);
    }

    #[test]
    fn progress_targets() {
        assert_eq!(TreeState::Chaos.progress_target(), 0.0);
        assert_eq!(TreeState::Formed.progress_target(), 1.0);
    }

    #[test]
    fn polaroid_image_is_seeded_by_id() {
        let p = PolaroidRecord { chaos_pos: Vec3::ZERO, target_pos: Vec3::ZERO, id: 3 };
        assert_eq!(p.image_url(), "https://picsum.photos/seed/103/200/200");
    }

    #[test]
    fn ornament_colors_opaque_and_distinct() {
        assert_eq!(OrnamentColor::Gold.argb() >> 24, 0xFF);
        assert_eq!(OrnamentColor::Red.argb() >> 24, 0xFF);
        assert_ne!(OrnamentColor::Gold.argb(), OrnamentColor::Red.argb());
    }
}
