use std::{num::NonZeroU32, path::PathBuf};

use clap::{Parser, ValueEnum};
use image::RgbImage;
use indicatif::ProgressBar;
use log::LevelFilter;
use voxtrace::{
    Camera, Grid, RenderSettings, Scene,
    demo::{demo_camera, demo_scene},
    geometry::ScreenSize,
    render,
    renderer::{GridRayTracer, RayTracer, SimpleRayTracer, WorkerCount},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Renders the built-in demo scene into a PNG file.
#[derive(Parser)]
#[command(name = "voxtrace")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Worker threads; 0 uses all cores, -N leaves N cores free
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    threads: i64,

    /// Anti-aliasing grid resolution, the pixel is sampled N x N times
    #[arg(short, long, default_value_t = NonZeroU32::MIN)]
    anti_aliasing: NonZeroU32,

    /// Voxels along each axis of the acceleration grid
    #[arg(long, default_value = "16")]
    grid_density: NonZeroU32,

    /// Test every surface for every ray instead of using the grid
    #[arg(long)]
    no_grid: bool,

    /// Rows of spheres in the demo scene
    #[arg(long, default_value_t = 8)]
    spheres: u32,

    /// Seed for repeatable images
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of the image between two progress bar updates
    #[arg(long, default_value_t = 0.1)]
    progress_interval: f64,

    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    #[arg(short, long, default_value = "voxtrace.png")]
    output: PathBuf,
}

impl Args {
    fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            worker_count: WorkerCount::from_signed(self.threads),
            progress_interval: self.progress_interval,
            seed: self.seed,
        }
    }
}

fn render_image<T: RayTracer>(
    tracer: &T,
    camera: &Camera,
    settings: &RenderSettings,
) -> anyhow::Result<RgbImage> {
    let resolution = camera.resolution();
    let mut image = RgbImage::new(resolution.x, resolution.y);

    let bar = ProgressBar::new(resolution.y as u64);
    render(tracer, camera, settings, &mut image, |fraction| {
        bar.set_position((fraction * resolution.y as f64).round() as u64)
    })?;
    bar.finish();

    Ok(image)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let scene: Scene = demo_scene(args.spheres)?;
    let camera = demo_camera(ScreenSize::new(args.width, args.height), args.anti_aliasing)?;
    let settings = args.render_settings();
    settings.validate()?;

    let image = if args.no_grid {
        render_image(&SimpleRayTracer::new(&scene), &camera, &settings)?
    } else {
        let grid = Grid::build(&scene.geometries, args.grid_density);
        grid.print_statistics();
        render_image(&GridRayTracer::new(&scene, &grid), &camera, &settings)?
    };

    image.save(&args.output)?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
