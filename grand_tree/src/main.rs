//! grand_tree — interactive entry point.

use clap::Parser;
use grand_tree::app::{run, AppConfig};
use grand_tree::greeting::DEFAULT_MODEL;
use tracing_subscriber::EnvFilter;
use tree_motion::MotionTuning;
use tree_scene::TreeConfig;

#[derive(Debug, Parser)]
#[command(name = "grand_tree", about = "The Grand Tree: a gesture-driven luxury Christmas tree")]
struct Cli {
    #[arg(long, default_value_t = 4500)]
    foliage: usize,
    #[arg(long, default_value_t = 150)]
    ornaments: usize,
    #[arg(long, default_value_t = 24)]
    polaroids: usize,
    #[arg(long, default_value_t = 14.0)]
    height: f32,
    #[arg(long, default_value_t = 5.5)]
    radius: f32,
    /// Reproduce a specific layout.
    #[arg(long)]
    seed: Option<u64>,
    /// Start with hand tracking enabled.
    #[arg(long)]
    camera: bool,
    /// Gemini API key; without one a fixed greeting is shown.
    #[arg(long, env = "GEMINI_API_KEY")]
    api_key: Option<String>,
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
    /// Damp the tree rotation by a fixed fraction per frame.
    #[arg(long)]
    per_frame_rotation: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          The Grand Tree — Interactive Luxury Experience      ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");

    let api_key = cli
        .api_key
        .or_else(|| std::env::var("API_KEY").ok())
        .filter(|k| !k.trim().is_empty());
    match api_key {
        Some(_) => println!("  Greeting: {} (live)", cli.model),
        None    => println!("  Greeting: offline (set GEMINI_API_KEY for live greetings)"),
    }
    println!();

    let mut tuning = MotionTuning::default();
    if cli.per_frame_rotation {
        tuning = tuning.with_per_step_rotation();
    }

    let cfg = AppConfig {
        tree: TreeConfig::new(cli.foliage, cli.ornaments, cli.polaroids, cli.height, cli.radius),
        seed: cli.seed,
        camera: cli.camera,
        api_key,
        model: cli.model,
        tuning,
    };

    println!("  Opening window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
