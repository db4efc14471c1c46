//! NanoPOV command-line entry point.
//!
//! Reads a device description and an optional project configuration, writes
//! the POV-Ray scene next to the device file, and renders it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use nanopov_io::{load_device, render, write_pov_file, ProjectConfig};
use nanopov_renderer::CameraStyle;

/// Render a layered nanophotonic device with POV-Ray.
#[derive(Parser)]
#[command(name = "nanopov")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Device description (JSON)
    device: PathBuf,

    /// Project configuration (JSON); defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene file to write [default: <device>.pov]
    #[arg(long)]
    pov: Option<PathBuf>,

    /// Image file to render [default: <device>.png]
    #[arg(long)]
    image: Option<PathBuf>,

    /// Camera style, overriding the configuration
    #[arg(long)]
    style: Option<String>,

    /// Camera rotation about z in degrees, overriding the configuration
    #[arg(long)]
    rotate: Option<f64>,

    /// Write the scene without running the renderer
    #[arg(long)]
    no_render: bool,

    /// Do not open the rendered image
    #[arg(long)]
    no_open: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::default(),
    };
    if let Some(style) = &cli.style {
        config.camera.style = CameraStyle::parse(style);
    }
    if let Some(rotate) = cli.rotate {
        config.camera.rotate = rotate;
    }
    if cli.no_render {
        config.render.render = false;
    }
    if cli.no_open {
        config.render.open_image = false;
    }

    let device = load_device(&cli.device)?;
    let pov = cli.pov.unwrap_or_else(|| cli.device.with_extension("pov"));
    let image = cli.image.unwrap_or_else(|| cli.device.with_extension("png"));

    let built = write_pov_file(&device, &config, &pov)?;
    println!(
        "Wrote {} ({} tiles, {} warnings)",
        pov.display(),
        built.scene.tile_count,
        built.warning_count()
    );

    render(&config, &pov, &image)?;
    Ok(())
}
