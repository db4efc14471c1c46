//! # NanoPOV I/O
//!
//! Reading device descriptions and project configuration, writing `.pov`
//! scene files, and driving the external POV-Ray renderer.

pub mod device;
pub mod povray;
pub mod project;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use nanopov_core::{build_lattice, DeviceDescription, ModelError};
use nanopov_renderer::{PovWriter, Scene};

pub use device::{load_device, parse_device, DeviceFileError, DeviceReader};
pub use povray::{RenderError, RenderJob};
pub use project::{ConfigError, ProjectConfig, RenderSettings};

#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Failed to write scene: {0}")]
    Io(#[from] io::Error),
}

/// Summary of a written scene.
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub scene: Scene,
}

impl BuiltScene {
    /// Warnings recorded while building, not counting informational entries.
    pub fn warning_count(&self) -> usize {
        self.scene.diagnostics.warning_count()
    }
}

/// Build the scene for `device` and write it as POV-Ray text to `writer`.
pub fn write_pov<W: Write>(
    device: &DeviceDescription,
    config: &ProjectConfig,
    writer: W,
) -> Result<BuiltScene, SceneError> {
    let lattice = build_lattice(device, &config.build)?;
    let scene = Scene::compose(lattice, &config.camera, &config.header);
    PovWriter::new(writer).write(&scene)?;
    log::info!(
        "Wrote scene: {} tiles, {} primitives, {} warnings",
        scene.tile_count,
        scene.primitive_count(),
        scene.diagnostics.warning_count()
    );
    Ok(BuiltScene { scene })
}

/// Write the scene for `device` to the file at `path`.
pub fn write_pov_file(
    device: &DeviceDescription,
    config: &ProjectConfig,
    path: impl AsRef<Path>,
) -> Result<BuiltScene, SceneError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let built = write_pov(device, config, BufWriter::new(file))?;
    log::info!("Scene written to {}", path.display());
    Ok(built)
}

/// Render `pov` to `image` with the configured renderer, then open it.
pub fn render(config: &ProjectConfig, pov: &Path, image: &Path) -> Result<(), RenderError> {
    povray::render(&config.render, pov, image)
}
