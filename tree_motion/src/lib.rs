//! # tree_motion
//!
//! Frame-by-frame animation of a [`tree_scene::SceneData`] between its
//! dispersed and formed layouts.
//!
//! | Population | Driven by                               | Rate (1/s) |
//! |------------|-----------------------------------------|------------|
//! | Foliage    | one global progress, staggered per seed | 1.5        |
//! | Ornaments  | per-instance position decay             | 2.0        |
//! | Polaroids  | position decay + face trunk / tumble    | 2.5        |
//! | Group yaw  | decay toward the hand target            | 0.9        |
//!
//! The renderer owns nothing but a [`SceneFrame`] borrowed from the
//! [`TransitionController`] once per frame.
//!
//! ```
//! use tree_motion::{FrameInput, MotionTuning, TransitionController};
//! use tree_scene::{SceneData, TreeConfig, TreeState};
//!
//! let scene = SceneData::generate_seeded(&TreeConfig::default(), 3).unwrap();
//! let mut ctl = TransitionController::new(&scene, MotionTuning::default());
//! ctl.advance(&scene, FrameInput {
//!     state: TreeState::Formed, delta: 1.0 / 60.0, elapsed: 1.0 / 60.0, rotation_target: 0.0,
//! });
//! assert!(ctl.progress() > 0.0);
//! ```

pub mod animators;
pub mod controller;
pub mod easing;
pub mod frame;
pub mod tuning;

pub use animators::{GroupRotation, ParticleProgress, PolaroidMotion};
pub use controller::{FrameInput, TransitionController};
pub use easing::{damp, decay_alpha, ease_out_cubic, local_progress, shimmer};
pub use frame::SceneFrame;
pub use tuning::{MotionTuning, RotationDamping};
