//! Startup configuration for scene generation.
//!
//! [`TreeConfig`] is the user-facing surface (population counts and tree
//! dimensions).  [`PopulationLayout`] holds the per-population shape
//! constants; the defaults reproduce the reference look.

use crate::error::SceneError;

// ════════════════════════════════════════════════════════════════════════════
// TreeConfig
// ════════════════════════════════════════════════════════════════════════════

/// Population counts and cone dimensions, supplied once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    pub foliage_count:  usize,
    pub ornament_count: usize,
    pub polaroid_count: usize,
    /// Cone height in world units.
    pub tree_height:    f32,
    /// Cone base radius in world units.
    pub tree_radius:    f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            foliage_count:  4500,
            ornament_count: 150,
            polaroid_count: 24,
            tree_height:    14.0,
            tree_radius:    5.5,
        }
    }
}

impl TreeConfig {
    pub fn new(
        foliage_count: usize,
        ornament_count: usize,
        polaroid_count: usize,
        tree_height: f32,
        tree_radius: f32,
    ) -> Self {
        TreeConfig { foliage_count, ornament_count, polaroid_count, tree_height, tree_radius }
    }

    /// Reject dimensions that would produce non-finite geometry.
    ///
    /// Zero counts are fine; an empty population simply yields no records.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !self.tree_height.is_finite() || self.tree_height <= 0.0 {
            return Err(SceneError::InvalidDimension { name: "tree_height", value: self.tree_height });
        }
        if !self.tree_radius.is_finite() || self.tree_radius <= 0.0 {
            return Err(SceneError::InvalidDimension { name: "tree_radius", value: self.tree_radius });
        }
        Ok(())
    }

    /// Total number of generated records across all three populations.
    pub fn total_count(&self) -> usize {
        self.foliage_count + self.ornament_count + self.polaroid_count
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PopulationLayout — tunable shape constants
// ════════════════════════════════════════════════════════════════════════════

/// Shape constants that differ between the three populations.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationLayout {
    // ── chaos cloud ──────────────────────────────────────────────────────
    pub foliage_chaos_radius:   f32,
    pub foliage_chaos_lift:     f32,
    pub ornament_chaos_radius:  f32,
    pub ornament_chaos_lift:    f32,
    pub polaroid_chaos_radius:  f32,
    pub polaroid_chaos_lift:    f32,

    // ── target cone ──────────────────────────────────────────────────────
    /// Radians of spiral twist per world unit of foliage height.
    pub foliage_spiral_twist:   f32,
    /// Ornaments stay this far below the apex.
    pub ornament_top_margin:    f32,
    /// Polaroids keep this far from both the base and the apex.
    pub polaroid_band_margin:   f32,
    /// Polaroids hang slightly outside the foliage cone.
    pub polaroid_radius_pad:    f32,
    /// Radians swept by the polaroid index spiral across the population.
    pub polaroid_spiral_sweep:  f32,
    /// Vertical recentering applied after `height - H/2`.
    pub pivot_lift:             f32,

    // ── ornament styling ─────────────────────────────────────────────────
    /// A uniform draw above this threshold makes a gold ornament.
    pub gold_threshold:         f32,
    pub ornament_min_scale:     f32,
    pub ornament_scale_range:   f32,
}

impl Default for PopulationLayout {
    fn default() -> Self {
        PopulationLayout {
            foliage_chaos_radius:  15.0,
            foliage_chaos_lift:    5.0,
            ornament_chaos_radius: 15.0,
            ornament_chaos_lift:   10.0,
            polaroid_chaos_radius: 20.0,
            polaroid_chaos_lift:   0.0,

            foliage_spiral_twist:  3.0,
            ornament_top_margin:   1.0,
            polaroid_band_margin:  2.0,
            polaroid_radius_pad:   0.5,
            polaroid_spiral_sweep: 8.0 * std::f32::consts::PI,
            pivot_lift:            2.0,

            gold_threshold:        0.7,
            ornament_min_scale:    0.2,
            ornament_scale_range:  0.3,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
