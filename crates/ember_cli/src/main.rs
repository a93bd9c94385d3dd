mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use ember_core::RenderSettings;
use ember_renderer::{render_parallel, BvhNode, Camera, Hittable, RenderConfig, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scenes::SceneKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Offline Monte Carlo path tracer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::Cornell)]
    scene: SceneKind,

    /// JSON render settings; missing fields keep their defaults, and camera
    /// fields not given keep the scene's
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Output image. `.ppm` is written as ASCII PPM, other extensions by format
    #[arg(long, short = 'o', value_name = "FILE", default_value = "image.ppm")]
    output: PathBuf,

    /// Samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Seed for scene construction and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Image for the earth sphere of the next-week scene
    #[arg(long, value_name = "FILE", default_value = "assets/earthmap.jpg")]
    earth_texture: PathBuf,
}

/// Settings file first, then command line flags on top.
fn load_settings(args: &Args) -> Result<RenderSettings> {
    let mut settings = match &args.settings {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => RenderSettings::default(),
    };

    if let Some(samples) = args.samples {
        settings.samples_per_pixel = samples;
    }
    if let Some(width) = args.width {
        settings.image_width = width;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    settings.validate().context("invalid render settings")?;
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    log::info!("Building scene {:?}", args.scene);
    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let description = args
        .scene
        .build(&mut rng, &args.earth_texture)
        .context("failed to build scene")?;

    let world: Arc<dyn Hittable> = if description.objects.is_empty() {
        Arc::new(description.objects)
    } else {
        let objects = description.objects.into_objects();
        let count = objects.len();
        let bvh = BvhNode::new(objects, &mut rng).context("failed to build BVH")?;
        log::info!("BVH over {} objects built in {:.2?}", count, start.elapsed());
        Arc::new(bvh)
    };
    let scene = Scene::new(world, description.lights);

    let camera_settings = settings
        .camera_for(description.camera)
        .context("invalid camera settings")?;
    let camera = Camera::new(&camera_settings);
    let config = RenderConfig::from_settings(
        &settings,
        camera_settings.aspect_ratio,
        description.background,
    );

    let image = match args.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("failed to start render threads")?;
            pool.install(|| render_parallel(&camera, &scene, &config))
        }
        None => render_parallel(&camera, &scene, &config),
    };

    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("Done in {:.2?}", start.elapsed());
    Ok(())
}
