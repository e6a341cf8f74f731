//! Scene data generation — the dual layouts for every population.
//!
//! Generation happens exactly once per session.  The resulting [`SceneData`]
//! exposes its records only through shared slices, so the chaos layout can
//! never be re-rolled underneath the animation.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::{PopulationLayout, TreeConfig};
use crate::error::SceneError;
use crate::records::{OrnamentColor, OrnamentRecord, ParticleRecord, PolaroidRecord};

// ════════════════════════════════════════════════════════════════════════════
// Shape primitives
// ════════════════════════════════════════════════════════════════════════════

/// Sample a point uniformly inside a ball of radius `max_radius`, then lift
/// it by `lift` along +Y.
///
/// Azimuth is uniform in [0, 2π); the polar angle is `acos` of a uniform
/// variate in [-1, 1] (uniform over the sphere surface) and the radius is
/// the cube root of a uniform variate (uniform over the volume).
pub fn sample_ball<R: Rng + ?Sized>(rng: &mut R, max_radius: f32, lift: f32) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let phi   = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r     = max_radius * rng.random::<f32>().cbrt();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin() + lift,
        r * phi.cos(),
    )
}

/// Radius of the cone at `height` above its base; zero at the apex.
pub fn cone_radius(height: f32, tree_height: f32, tree_radius: f32) -> f32 {
    (tree_radius * (tree_height - height) / tree_height).max(0.0)
}

/// World-space Y of a point `height` above the cone base.
pub fn tree_y(height: f32, tree_height: f32, pivot_lift: f32) -> f32 {
    height - tree_height / 2.0 + pivot_lift
}

fn on_circle(radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

// ════════════════════════════════════════════════════════════════════════════
// SceneData
// ════════════════════════════════════════════════════════════════════════════

/// The immutable record populations for one session.
#[derive(Clone, Debug)]
pub struct SceneData {
    config:    TreeConfig,
    foliage:   Vec<ParticleRecord>,
    ornaments: Vec<OrnamentRecord>,
    polaroids: Vec<PolaroidRecord>,
}

impl SceneData {
    /// Generate all three populations with the default layout constants.
    pub fn generate<R: Rng + ?Sized>(config: &TreeConfig, rng: &mut R) -> Result<Self, SceneError> {
        Self::generate_with_layout(config, &PopulationLayout::default(), rng)
    }

    /// Generate with an explicit seed so a layout can be reproduced.
    pub fn generate_seeded(config: &TreeConfig, seed: u64) -> Result<Self, SceneError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(config, &mut rng)
    }

    /// Generate from OS entropy.
    pub fn generate_random(config: &TreeConfig) -> Result<Self, SceneError> {
        Self::generate(config, &mut rand::rng())
    }

    pub fn generate_with_layout<R: Rng + ?Sized>(
        config: &TreeConfig,
        layout: &PopulationLayout,
        rng:    &mut R,
    ) -> Result<Self, SceneError> {
        config.validate()?;

        let foliage   = generate_foliage(config, layout, rng);
        let ornaments = generate_ornaments(config, layout, rng);
        let polaroids = generate_polaroids(config, layout, rng);

        let gold = ornaments.iter().filter(|o| o.color == OrnamentColor::Gold).count();
        info!(
            foliage = foliage.len(),
            ornaments = ornaments.len(),
            gold,
            polaroids = polaroids.len(),
            "scene generated"
        );

        Ok(SceneData { config: config.clone(), foliage, ornaments, polaroids })
    }

    pub fn config(&self)    -> &TreeConfig         { &self.config }
    pub fn foliage(&self)   -> &[ParticleRecord]   { &self.foliage }
    pub fn ornaments(&self) -> &[OrnamentRecord]   { &self.ornaments }
    pub fn polaroids(&self) -> &[PolaroidRecord]   { &self.polaroids }

    /// Apex of the cone, where the star sits (lifted half a unit above).
    pub fn star_position(&self) -> Vec3 {
        let layout = PopulationLayout::default();
        Vec3::new(0.0, self.config.tree_height / 2.0 + layout.pivot_lift + 0.5, 0.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-population generators
// ════════════════════════════════════════════════════════════════════════════

fn generate_foliage<R: Rng + ?Sized>(
    config: &TreeConfig,
    layout: &PopulationLayout,
    rng:    &mut R,
) -> Vec<ParticleRecord> {
    let h = config.tree_height;
    (0..config.foliage_count)
        .map(|_| {
            let chaos_pos = sample_ball(rng, layout.foliage_chaos_radius, layout.foliage_chaos_lift);

            let height = rng.random::<f32>() * h;
            let cone_r = cone_radius(height, h, config.tree_radius);
            let angle  = height * layout.foliage_spiral_twist + rng.random::<f32>() * TAU;
            // Radial jitter fills the cone volume instead of just its shell.
            let jitter = rng.random::<f32>() * cone_r;
            let target_pos = on_circle(jitter, angle, tree_y(height, h, layout.pivot_lift));

            ParticleRecord { chaos_pos, target_pos, random_seed: rng.random::<f32>() }
        })
        .collect()
}

fn generate_ornaments<R: Rng + ?Sized>(
    config: &TreeConfig,
    layout: &PopulationLayout,
    rng:    &mut R,
) -> Vec<OrnamentRecord> {
    let h = config.tree_height;
    let band = (h - layout.ornament_top_margin).max(0.0);
    (0..config.ornament_count)
        .map(|_| {
            let height = rng.random::<f32>() * band;
            let cone_r = cone_radius(height, h, config.tree_radius);
            let angle  = rng.random::<f32>() * TAU;
            let target_pos = on_circle(cone_r, angle, tree_y(height, h, layout.pivot_lift));

            let chaos_pos = sample_ball(rng, layout.ornament_chaos_radius, layout.ornament_chaos_lift);

            let color = if rng.random::<f32>() > layout.gold_threshold {
                OrnamentColor::Gold
            } else {
                OrnamentColor::Red
            };
            let scale = layout.ornament_min_scale + rng.random::<f32>() * layout.ornament_scale_range;

            OrnamentRecord { chaos_pos, target_pos, color, scale }
        })
        .collect()
}

fn generate_polaroids<R: Rng + ?Sized>(
    config: &TreeConfig,
    layout: &PopulationLayout,
    rng:    &mut R,
) -> Vec<PolaroidRecord> {
    let h = config.tree_height;
    let n = config.polaroid_count;
    let band = (h - 2.0 * layout.polaroid_band_margin).max(0.0);
    (0..n)
        .map(|i| {
            let height = layout.polaroid_band_margin + rng.random::<f32>() * band;
            let cone_r = cone_radius(height, h, config.tree_radius + layout.polaroid_radius_pad);
            // Index-proportional sweep spaces the panels evenly around the spiral.
            let angle  = (i as f32 / n as f32) * layout.polaroid_spiral_sweep;
            let target_pos = on_circle(cone_r, angle, tree_y(height, h, layout.pivot_lift));

            let chaos_pos = sample_ball(rng, layout.polaroid_chaos_radius, layout.polaroid_chaos_lift);

            debug!(id = i, ?target_pos, "polaroid placed");
            PolaroidRecord { chaos_pos, target_pos, id: i as u32 }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn finite(v: Vec3) -> bool { v.is_finite() }

    fn scene(seed: u64) -> SceneData {
        SceneData::generate_seeded(&TreeConfig::default(), seed).unwrap()
    }

    #[test]
    fn counts_match_config() {
        let s = scene(1);
        assert_eq!(s.foliage().len(), 4500);
        assert_eq!(s.ornaments().len(), 150);
        assert_eq!(s.polaroids().len(), 24);
    }

    #[test]
    fn single_ornament_and_polaroid_without_foliage() {
        let cfg = TreeConfig::new(0, 1, 1, 14.0, 5.5);
        let s = SceneData::generate_seeded(&cfg, 99).unwrap();
        assert!(s.foliage().is_empty());
        assert_eq!(s.ornaments().len(), 1);
        assert_eq!(s.polaroids().len(), 1);
        let o = s.ornaments()[0];
        let p = s.polaroids()[0];
        assert!(finite(o.chaos_pos) && finite(o.target_pos));
        assert!(finite(p.chaos_pos) && finite(p.target_pos));
        assert_eq!(p.id, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = TreeConfig::new(10, 10, 10, -1.0, 5.5);
        assert!(SceneData::generate_seeded(&cfg, 0).is_err());
    }

    #[test]
    fn same_seed_same_layout() {
        let a = scene(42);
        let b = scene(42);
        assert_eq!(a.foliage(), b.foliage());
        assert_eq!(a.ornaments(), b.ornaments());
        assert_eq!(a.polaroids(), b.polaroids());
    }

    #[test]
    fn rereading_records_is_idempotent() {
        let s = scene(5);
        let first: Vec<ParticleRecord> = s.foliage().to_vec();
        let again: Vec<ParticleRecord> = s.foliage().to_vec();
        assert_eq!(first, again);
    }

    #[test]
    fn foliage_chaos_inside_lifted_ball() {
        let s = scene(2);
        for p in s.foliage() {
            let centred = p.chaos_pos - Vec3::new(0.0, 5.0, 0.0);
            assert!(centred.length() <= 15.0 + 1e-3);
        }
    }

    #[test]
    fn foliage_target_inside_cone() {
        let cfg = TreeConfig::default();
        let s = scene(3);
        for p in s.foliage() {
            let height = p.target_pos.y + cfg.tree_height / 2.0 - 2.0;
            assert!(height >= -1e-4 && height < cfg.tree_height + 1e-4);
            let radial = (p.target_pos.x.powi(2) + p.target_pos.z.powi(2)).sqrt();
            let allowed = cone_radius(height, cfg.tree_height, cfg.tree_radius);
            assert!(radial <= allowed + 1e-3, "radial {} > cone {}", radial, allowed);
        }
    }

    #[test]
    fn seeds_in_unit_interval() {
        for p in scene(4).foliage() {
            assert!((0.0..=1.0).contains(&p.random_seed));
        }
    }

    #[test]
    fn ornaments_sit_on_cone_surface() {
        let cfg = TreeConfig::default();
        for o in scene(6).ornaments() {
            let height = o.target_pos.y + cfg.tree_height / 2.0 - 2.0;
            assert!(height < cfg.tree_height - 1.0 + 1e-4);
            let radial = (o.target_pos.x.powi(2) + o.target_pos.z.powi(2)).sqrt();
            let expect = cone_radius(height, cfg.tree_height, cfg.tree_radius);
            assert!((radial - expect).abs() < 1e-3);
            assert!(o.scale >= 0.2 && o.scale <= 0.5);
        }
    }

    #[test]
    fn ornament_gold_share_near_thirty_percent() {
        let cfg = TreeConfig::new(0, 4000, 0, 14.0, 5.5);
        let s = SceneData::generate_seeded(&cfg, 11).unwrap();
        let gold = s.ornaments().iter().filter(|o| o.color == OrnamentColor::Gold).count();
        let share = gold as f32 / 4000.0;
        assert!((0.25..0.35).contains(&share), "gold share {}", share);
    }

    #[test]
    fn polaroids_follow_index_spiral() {
        let s = scene(8);
        let n = s.polaroids().len() as f32;
        for p in s.polaroids() {
            let expected = (p.id as f32 / n) * 8.0 * std::f32::consts::PI;
            let v = Vec3::new(expected.cos(), 0.0, expected.sin());
            let flat = Vec3::new(p.target_pos.x, 0.0, p.target_pos.z).normalize();
            assert!(flat.dot(v) > 0.999, "polaroid {} off spiral", p.id);
        }
    }

    #[test]
    fn polaroid_ids_are_sequential() {
        let s = scene(9);
        for (i, p) in s.polaroids().iter().enumerate() {
            assert_eq!(p.id as usize, i);
        }
    }

    #[test]
    fn cone_radius_shrinks_to_zero_at_apex() {
        assert_eq!(cone_radius(0.0, 14.0, 5.5), 5.5);
        assert_eq!(cone_radius(14.0, 14.0, 5.5), 0.0);
        assert!((cone_radius(7.0, 14.0, 5.5) - 2.75).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn generated_vectors_are_finite(
            seed in any::<u64>(),
            foliage in 0usize..60,
            ornaments in 0usize..20,
            polaroids in 0usize..10,
            height in 0.5f32..40.0,
            radius in 0.1f32..20.0,
        ) {
            let cfg = TreeConfig::new(foliage, ornaments, polaroids, height, radius);
            let s = SceneData::generate_seeded(&cfg, seed).unwrap();
            prop_assert_eq!(s.foliage().len(), foliage);
            prop_assert_eq!(s.ornaments().len(), ornaments);
            prop_assert_eq!(s.polaroids().len(), polaroids);
            for p in s.foliage() {
                prop_assert!(finite(p.chaos_pos) && finite(p.target_pos));
            }
            for o in s.ornaments() {
                prop_assert!(finite(o.chaos_pos) && finite(o.target_pos));
            }
            for p in s.polaroids() {
                prop_assert!(finite(p.chaos_pos) && finite(p.target_pos));
            }
        }
    }
}
