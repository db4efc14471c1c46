//! Running the external ray tracer and image viewer.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::project::RenderSettings;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// One invocation of the renderer on a scene file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub program: String,
    pub args: Vec<String>,
    pub image: PathBuf,
}

impl RenderJob {
    pub fn new(settings: &RenderSettings, pov: &Path, image: &Path) -> Self {
        let mut args = vec![
            format!("Input_File_Name={}", pov.display()),
            format!("Output_File_Name={}", image.display()),
            format!("+H{}", settings.height),
            format!("+W{}", settings.width),
            format!("Display={}", if settings.display { "on" } else { "off" }),
        ];
        if settings.transparent {
            args.push("+ua".to_string());
        }
        if settings.antialias {
            args.push("+A".to_string());
        }
        if settings.num_threads > 0 {
            args.push(format!("+WT{}", settings.num_threads));
        }
        Self {
            program: settings.renderer.clone(),
            args,
            image: image.to_path_buf(),
        }
    }

    /// The command as a single shell-style line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the renderer and wait for it to finish.
    pub fn run(&self) -> Result<(), RenderError> {
        log::info!("Rendering: {}", self.command_line());
        run_program(&self.program, &self.args)
    }
}

/// Render `pov` into `image` if the settings ask for it, then open the image.
///
/// The render command is logged even when rendering is disabled.
pub fn render(settings: &RenderSettings, pov: &Path, image: &Path) -> Result<(), RenderError> {
    let job = RenderJob::new(settings, pov, image);
    if !settings.render {
        log::info!("Render command (not run): {}", job.command_line());
        return Ok(());
    }
    job.run()?;
    log::info!("Rendered {}", image.display());

    if settings.open_image {
        open_image(&settings.viewer, image)?;
    }
    Ok(())
}

/// Open `image` in `viewer` without waiting for it to close.
pub fn open_image(viewer: &str, image: &Path) -> Result<(), RenderError> {
    log::info!("Opening {} with {}", image.display(), viewer);
    Command::new(viewer)
        .arg(image)
        .spawn()
        .map_err(|source| RenderError::Spawn {
            program: viewer.to_string(),
            source,
        })?;
    Ok(())
}

fn run_program(program: &str, args: &[String]) -> Result<(), RenderError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| RenderError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(RenderError::Failed {
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_line() {
        let job = RenderJob::new(
            &RenderSettings::default(),
            Path::new("scene.pov"),
            Path::new("scene.png"),
        );
        assert_eq!(
            job.command_line(),
            concat!(
                "povray Input_File_Name=scene.pov Output_File_Name=scene.png",
                " +H800 +W800 Display=off +ua +A"
            )
        );
    }

    #[test]
    fn test_command_line_options() {
        let settings = RenderSettings {
            height: 600,
            width: 400,
            display: true,
            transparent: false,
            antialias: false,
            num_threads: 8,
            ..Default::default()
        };
        let job = RenderJob::new(&settings, Path::new("a.pov"), Path::new("a.png"));
        assert_eq!(
            job.args,
            vec![
                "Input_File_Name=a.pov",
                "Output_File_Name=a.png",
                "+H600",
                "+W400",
                "Display=on",
                "+WT8",
            ]
        );
    }

    #[test]
    fn test_disabled_render_is_a_no_op() {
        let settings = RenderSettings {
            render: false,
            renderer: "nanopov-no-such-renderer".into(),
            ..Default::default()
        };
        assert!(render(&settings, Path::new("x.pov"), Path::new("x.png")).is_ok());
    }

    #[test]
    fn test_missing_renderer_fails_to_spawn() {
        let settings = RenderSettings {
            renderer: "nanopov-no-such-renderer".into(),
            ..Default::default()
        };
        match render(&settings, Path::new("x.pov"), Path::new("x.png")) {
            Err(RenderError::Spawn { program, .. }) => {
                assert_eq!(program, "nanopov-no-such-renderer")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
