//! # tree_scene
//!
//! Procedural record generation for the particle tree.
//!
//! Every element of the scene carries **two** positions, computed once:
//!
//! | Population | Chaos layout | Target layout | Extra |
//! |---|---|---|---|
//! | Foliage particle | uniform ball, r ≤ 15, lifted +5 | cone spiral with radial jitter | animation seed ∈ [0,1] |
//! | Ornament | uniform ball, r ≤ 15, lifted +10 | cone surface, random angle | gold / red, scale |
//! | Polaroid | uniform ball, r ≤ 20 | cone surface, index spiral sweeping 8π | id → image reference |
//!
//! The chaos layout is the dispersed cloud the scene starts in; the target
//! layout is the assembled tree.  Records are immutable once generated;
//! everything that moves lives in `tree_motion`.
//!
//! ## Quick start
//!
//! ```rust
//! use tree_scene::{SceneData, TreeConfig};
//!
//! let scene = SceneData::generate_seeded(&TreeConfig::default(), 7).unwrap();
//! assert_eq!(scene.foliage().len(), 4500);
//! assert_eq!(scene.ornaments().len(), 150);
//! assert_eq!(scene.polaroids().len(), 24);
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod records;

pub use config::{PopulationLayout, TreeConfig};
pub use error::SceneError;
pub use generator::{cone_radius, sample_ball, tree_y, SceneData};
pub use records::{OrnamentColor, OrnamentRecord, ParticleRecord, PolaroidRecord, TreeState};

/// Re-exported so downstream crates agree on the vector type.
pub use glam::Vec3;
