use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nanopov_core::BuildOptions;
use nanopov_renderer::{CameraOptions, HeaderOptions};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for the external ray tracer and image viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub height: u32,
    pub width: u32,
    /// Show the image while it renders.
    pub display: bool,
    /// Keep an alpha channel in the output image.
    pub transparent: bool,
    pub antialias: bool,
    /// Worker threads; 0 leaves the choice to the renderer.
    pub num_threads: u32,
    /// Run the renderer after writing the scene.
    pub render: bool,
    /// Open the image in `viewer` after a successful render.
    pub open_image: bool,
    pub renderer: String,
    pub viewer: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            height: 800,
            width: 800,
            display: false,
            transparent: true,
            antialias: true,
            num_threads: 0,
            render: true,
            open_image: true,
            renderer: "povray".to_string(),
            viewer: "eog".to_string(),
        }
    }
}

/// Everything needed to go from a device description to an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub build: BuildOptions,
    pub camera: CameraOptions,
    pub header: HeaderOptions,
    pub render: RenderSettings,
}

impl ProjectConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanopov_core::{ColorSpec, Finish, HoleGeometry};
    use nanopov_renderer::CameraStyle;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ProjectConfig::from_json("{}").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.build.num_uc_x, 5);
        assert!(config.build.use_default_colors);
        assert_eq!(config.build.finish, Finish::Dull);
        assert_eq!(config.camera.style, CameraStyle::Perspective);
        assert!((config.camera.rotate - 60.0).abs() < 1e-10);
        assert_eq!(config.render.width, 800);
        assert_eq!(config.render.renderer, "povray");
        assert_eq!(config.header.background, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "build": {
                "num_uc_x": 3,
                "use_default_colors": false,
                "custom_colors": [[1, 0, 0], [0, 1, 0, 0.1, 0.2]],
                "finish": "glass",
                "hole_geometry": "solid_copy"
            },
            "camera": {"style": "orthographic", "look_at": [0, 0, -1]},
            "render": {"num_threads": 4, "open_image": false}
        }"#;
        let config = ProjectConfig::from_json(json).unwrap();
        assert_eq!(config.build.num_uc_x, 3);
        assert_eq!(config.build.num_uc_y, 5);
        assert_eq!(
            config.build.custom_colors,
            vec![
                ColorSpec::rgb(1.0, 0.0, 0.0),
                ColorSpec::rgbft(0.0, 1.0, 0.0, 0.1, 0.2)
            ]
        );
        assert_eq!(config.build.finish, Finish::Glass);
        assert_eq!(config.build.hole_geometry, HoleGeometry::SolidCopy);
        assert_eq!(config.camera.style, CameraStyle::Orthographic);
        assert_eq!(config.camera.look_at, Some([0.0, 0.0, -1.0]));
        assert_eq!(config.camera.location, None);
        assert_eq!(config.render.num_threads, 4);
        assert!(!config.render.open_image);
        assert!(config.render.render);
    }

    #[test]
    fn test_bad_color_rejected() {
        let json = r#"{"build": {"custom_colors": [[1, 0]]}}"#;
        assert!(matches!(
            ProjectConfig::from_json(json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("nanopov-config-{}.json", std::process::id()));
        let mut config = ProjectConfig::default();
        config.render.viewer = "feh".into();
        config.camera.shadowless = true;
        config.save(&path).unwrap();
        let loaded = ProjectConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
