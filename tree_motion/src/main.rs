//! Headless trace of a chaos → formed → chaos cycle.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tree_motion::{FrameInput, MotionTuning, TransitionController};
use tree_scene::{SceneData, TreeConfig, TreeState};

#[derive(Debug, Parser)]
#[command(name = "motion_trace", about = "Step the transition without a window and print its progress")]
struct Args {
    /// Simulated frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Seconds spent in each state.
    #[arg(long, default_value_t = 4.0)]
    hold: f32,
    /// Print every Nth frame.
    #[arg(long, default_value_t = 15)]
    every: usize,
    /// Use the fixed per-frame rotation damping instead of the per-second rate.
    #[arg(long)]
    per_step_rotation: bool,
    /// Group yaw target while formed, in radians.
    #[arg(long, default_value_t = std::f32::consts::PI)]
    yaw: f32,
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if !(args.fps > 0.0) {
        eprintln!("Error: --fps must be positive");
        std::process::exit(1);
    }

    let scene = match SceneData::generate_seeded(&TreeConfig::default(), args.seed) {
        Ok(s)  => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut tuning = MotionTuning::default();
    if args.per_step_rotation {
        tuning = tuning.with_per_step_rotation();
    }
    info!(fps = args.fps, rotation = ?tuning.rotation, "tracing transition");

    let mut ctl = TransitionController::new(&scene, tuning);
    let dt = 1.0 / args.fps;
    let frames_per_phase = (args.hold * args.fps).round().max(1.0) as usize;
    let every = args.every.max(1);

    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              Grand Tree — Motion Trace               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  {:>8}  {:<7}  {:>8}  {:>10}  {:>8}", "t (s)", "state", "progress", "orn. gap", "yaw");

    let mut elapsed = 0.0_f32;
    let mut frame_no = 0usize;
    for (state, yaw) in [(TreeState::Formed, args.yaw), (TreeState::Chaos, 0.0)] {
        for _ in 0..frames_per_phase {
            elapsed += dt;
            frame_no += 1;
            ctl.advance(&scene, FrameInput { state, delta: dt, elapsed, rotation_target: yaw });
            if frame_no % every == 0 {
                let f = ctl.frame();
                let gap = f.mean_ornament_gap(scene.ornaments().iter().map(|o| o.target_pos));
                println!(
                    "  {:>8.2}  {:<7}  {:>8.3}  {:>10.3}  {:>8.3}",
                    elapsed, state.name(), f.progress, gap, f.group_rotation
                );
            }
        }
    }
    println!();
}
