//! Headless summary of a generated scene: counts, bounds and color split.

use clap::Parser;
use tree_scene::{OrnamentColor, SceneData, TreeConfig, Vec3};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scene_stats", about = "Generate the tree layouts once and summarise them")]
struct Args {
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
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = TreeConfig::new(args.foliage, args.ornaments, args.polaroids, args.height, args.radius);

    let scene = match args.seed {
        Some(seed) => SceneData::generate_seeded(&cfg, seed),
        None       => SceneData::generate_random(&cfg),
    };
    let scene = match scene {
        Ok(s)  => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              Grand Tree — Scene Summary              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Tree: height {:.2}  radius {:.2}", cfg.tree_height, cfg.tree_radius);
    println!();

    let foliage_chaos:  Vec<Vec3> = scene.foliage().iter().map(|p| p.chaos_pos).collect();
    let foliage_target: Vec<Vec3> = scene.foliage().iter().map(|p| p.target_pos).collect();
    print_population("Foliage", &foliage_chaos, &foliage_target);

    let orn_chaos:  Vec<Vec3> = scene.ornaments().iter().map(|o| o.chaos_pos).collect();
    let orn_target: Vec<Vec3> = scene.ornaments().iter().map(|o| o.target_pos).collect();
    print_population("Ornaments", &orn_chaos, &orn_target);
    let gold = scene.ornaments().iter().filter(|o| o.color == OrnamentColor::Gold).count();
    println!("  │  gold / red : {} / {}", gold, scene.ornaments().len() - gold);
    println!("  └─");

    let pol_chaos:  Vec<Vec3> = scene.polaroids().iter().map(|p| p.chaos_pos).collect();
    let pol_target: Vec<Vec3> = scene.polaroids().iter().map(|p| p.target_pos).collect();
    print_population("Polaroids", &pol_chaos, &pol_target);
    if let Some(first) = scene.polaroids().first() {
        println!("  │  first image: {}", first.image_url());
    }
    println!("  └─");

    println!();
    println!("  Star at {:?}", scene.star_position());
    println!();
}

fn print_population(label: &str, chaos: &[Vec3], target: &[Vec3]) {
    println!("  ┌─ {} ({}) ─", label, chaos.len());
    match (bounds(chaos), bounds(target)) {
        (Some((cmin, cmax)), Some((tmin, tmax))) => {
            println!("  │  chaos  min {:>7.2?}  max {:>7.2?}", cmin.to_array(), cmax.to_array());
            println!("  │  target min {:>7.2?}  max {:>7.2?}", tmin.to_array(), tmax.to_array());
        }
        _ => println!("  │  (empty)"),
    }
    if label == "Foliage" {
        println!("  └─");
    }
}

fn bounds(points: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))))
}
