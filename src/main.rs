//! # photon-tracer
//!
//! A physically-based Monte Carlo path tracer for triangle-mesh scenes.
//!
//! ## Architecture
//!
//! - **Geometry**: triangles only, accelerated by an arena-backed BVH.
//! - **Materials**: Phong (diffuse + glossy specular, optionally emissive
//!   or textured) and smooth dielectric glass.
//! - **Integrator**: unidirectional path tracing with next-event
//!   estimation, multiple importance sampling, and Russian roulette.
//! - **Ingestion**: `.obj`/`.mtl` meshes via `tobj`, a `.toml` sidecar for
//!   camera parameters and emissive material declarations.
//!
//! ## Rendering equation
//!
//! ```text
//!   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
//! ```

mod aabb;
mod accumulator;
mod bvh;
mod camera;
mod error;
mod integrator;
mod light;
mod loader;
mod material;
mod math;
mod ray;
mod rng;
mod scene;
mod texture;
mod triangle;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use accumulator::Accumulator;
use camera::Camera;
use integrator::{PathTracer, RenderConfig};
use scene::Scene;

/// Renders a triangle-mesh scene with Monte Carlo path tracing.
#[derive(Parser, Debug)]
#[command(
    name = "photon-tracer",
    version,
    about = "A physically-based Monte Carlo path tracer for triangle-mesh scenes",
    after_help = "EXAMPLE:\n  photon-tracer demos/cornell scene --samples 200 --bounces 16"
)]
struct Cli {
    /// Directory containing `<inputname>.obj`, `.mtl`, and `.toml`
    inputdir: PathBuf,

    /// Base name shared by the mesh, material, and config files
    inputname: String,

    /// Samples per pixel
    #[arg(long, default_value_t = 30)]
    samples: u32,

    /// Maximum path bounce depth
    #[arg(long, default_value_t = 12)]
    bounces: u32,

    /// Output image path (defaults to `<inputname>.jpg` in the working directory)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let obj_path = cli.inputdir.join(format!("{}.obj", cli.inputname));
    let config_path = cli.inputdir.join(format!("{}.toml", cli.inputname));
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.jpg", cli.inputname)));

    tracing::info!(?obj_path, ?config_path, "loading scene");
    let scene_config = loader::SceneConfig::load(&config_path)?;
    let (triangles, materials) = loader::load_mesh(&obj_path, &scene_config.lights)?;
    tracing::info!(
        triangle_count = triangles.len(),
        material_count = materials.len(),
        "mesh loaded"
    );

    let camera = Camera::new(&scene_config.camera_config());
    let scene = Scene::new(triangles, materials, camera);
    tracing::info!(has_lights = !scene.lights.is_empty(), "BVH and light set built");

    let render_config = RenderConfig {
        width: scene_config.camera.width,
        height: scene_config.camera.height,
        samples_per_pixel: cli.samples,
        max_bounces: cli.bounces,
    };
    let mut acc = Accumulator::new(render_config.width, render_config.height);

    let tracer = PathTracer {
        scene: &scene,
        config: &render_config,
    };

    tracing::info!(
        width = render_config.width,
        height = render_config.height,
        samples = render_config.samples_per_pixel,
        "rendering"
    );

    const PROGRESS_BATCH: u32 = 5;
    let t0 = Instant::now();
    let mut rendered = 0u32;
    while rendered < render_config.samples_per_pixel {
        let batch = PROGRESS_BATCH.min(render_config.samples_per_pixel - rendered);
        tracer.render(&mut acc, batch);
        rendered += batch;

        let image = acc.snapshot(rendered);
        image.save(&output_path)?;
        tracing::info!(rendered, total = render_config.samples_per_pixel, "progress snapshot written");
    }
    let elapsed = t0.elapsed();

    let total_rays = render_config.width as u64 * render_config.height as u64 * render_config.samples_per_pixel as u64;
    tracing::info!(
        elapsed_secs = elapsed.as_secs_f64(),
        mrays_per_sec = total_rays as f64 / elapsed.as_secs_f64() / 1e6,
        "render finished"
    );
    tracing::info!(?output_path, "wrote final output image");

    Ok(())
}
