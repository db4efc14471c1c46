use std::fmt;

use serde::{Deserialize, Serialize};

use nanopov_core::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use nanopov_core::{BoundingDims, Point, Vec3};

/// Light sits this many degrees behind the camera around the z axis.
const LIGHT_LAG_DEGREES: f64 = 12.0;

/// Camera projection style, written verbatim into the camera block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CameraStyle {
    #[default]
    Perspective,
    Orthographic,
    /// Any other renderer camera type; framed with the perspective constants.
    Other(String),
}

impl CameraStyle {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "" | "perspective" => CameraStyle::Perspective,
            "orthographic" => CameraStyle::Orthographic,
            other => CameraStyle::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CameraStyle::Perspective => "perspective",
            CameraStyle::Orthographic => "orthographic",
            CameraStyle::Other(name) => name,
        }
    }

    /// `(offset scale, z scale)` tuned for this style, if any.
    fn framing(&self) -> Option<(f64, f64)> {
        match self {
            CameraStyle::Perspective | CameraStyle::Orthographic => Some((1.2, 1.0)),
            CameraStyle::Other(_) => None,
        }
    }
}

impl From<String> for CameraStyle {
    fn from(name: String) -> Self {
        CameraStyle::parse(&name)
    }
}

impl From<CameraStyle> for String {
    fn from(style: CameraStyle) -> Self {
        style.name().to_string()
    }
}

impl fmt::Display for CameraStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Camera position, look-at point and light position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: Vec3,
    pub look_at: Vec3,
    pub light: Vec3,
}

/// Heuristic camera and light placement framing a device of extent `dims`.
///
/// `angle` rotates the camera about z in degrees; 0 looks at the side of the
/// device down the x axis. The light trails the camera by 12 degrees and sits
/// higher. Styles without tuned constants fall back to perspective framing
/// and record a warning.
pub fn guess_camera(
    dims: &BoundingDims,
    coating: [f64; 3],
    style: &CameraStyle,
    angle: f64,
    center: Point,
    diagnostics: &mut Diagnostics,
) -> CameraPlacement {
    let (offset_scale, z_scale) = style.framing().unwrap_or_else(|| {
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::StyleNotOptimized,
            format!("camera parameters have not been optimized for style '{style}'"),
        ));
        (1.2, 1.0)
    });

    let theta = angle.to_radians();
    let light_theta = (angle - LIGHT_LAG_DEGREES).to_radians();
    let max_coating = coating.iter().copied().fold(f64::MIN, f64::max);

    let offset = offset_scale * (dims.max_extent() + 0.8 * max_coating);

    let position = Vec3::new(
        (offset + dims.x) * theta.cos(),
        (offset + dims.x) * theta.sin(),
        z_scale * (dims.z + 0.5 * coating[2]),
    );
    let look_at = Vec3::new(center.x, center.y, -0.66 * dims.z + 0.50 * coating[2]);

    let light_offset = 1.25 * offset;
    let light = Vec3::new(
        (dims.x + light_offset) * light_theta.cos(),
        (dims.y + light_offset) * light_theta.sin(),
        position.z + light_offset / 3.0,
    );

    log::debug!(
        "Estimated camera at {:?} looking at {:?}, light at {:?}",
        position.to_array(),
        look_at.to_array(),
        light.to_array()
    );

    CameraPlacement {
        position,
        look_at,
        light,
    }
}

/// Camera and lighting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub style: CameraStyle,
    /// Rotation of the camera about z, degrees.
    pub rotate: f64,
    /// Field of view of the orthographic camera, degrees.
    pub ortho_angle: f64,
    /// Explicit camera location; estimated when absent.
    pub location: Option<[f64; 3]>,
    /// Explicit look-at point; estimated when absent.
    pub look_at: Option<[f64; 3]>,
    /// Explicit light location; estimated when absent.
    pub light: Option<[f64; 3]>,
    pub up: [f64; 3],
    pub right: [f64; 3],
    pub sky: [f64; 3],
    pub shadowless: bool,
    /// Extent of any coating over the device.
    pub coating_dims: [f64; 3],
    pub center: [f64; 2],
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            style: CameraStyle::Perspective,
            rotate: 60.0,
            ortho_angle: 30.0,
            location: None,
            look_at: None,
            light: None,
            up: [0.0, 0.0, 1.33],
            right: [0.0, 1.0, 0.0],
            sky: [0.0, 0.0, 1.33],
            shadowless: false,
            coating_dims: [0.0; 3],
            center: [0.0; 2],
        }
    }
}

impl CameraOptions {
    /// Estimate placement for `dims`, then apply any explicit overrides.
    pub fn placement(&self, dims: &BoundingDims, diagnostics: &mut Diagnostics) -> CameraPlacement {
        let mut placement = guess_camera(
            dims,
            self.coating_dims,
            &self.style,
            self.rotate,
            Point::new(self.center[0], self.center[1]),
            diagnostics,
        );
        if let Some(location) = self.location {
            placement.position = Vec3::from_array(location);
        }
        if let Some(look_at) = self.look_at {
            placement.look_at = Vec3::from_array(look_at);
        }
        if let Some(light) = self.light {
            placement.light = Vec3::from_array(light);
        }
        placement
    }

    /// Build the camera and its single light for a device of extent `dims`.
    pub fn resolve(
        &self,
        dims: &BoundingDims,
        diagnostics: &mut Diagnostics,
    ) -> (Camera, LightSource) {
        let placement = self.placement(dims, diagnostics);
        let camera = Camera {
            style: self.style.clone(),
            angle: match self.style {
                CameraStyle::Orthographic => Some(self.ortho_angle),
                _ => None,
            },
            location: placement.position,
            look_at: placement.look_at,
            up: Vec3::from_array(self.up),
            right: Vec3::from_array(self.right),
            sky: Vec3::from_array(self.sky),
        };
        let light = LightSource {
            position: placement.light,
            color: [1.0, 1.0, 1.0],
            shadowless: self.shadowless,
        };
        (camera, light)
    }
}

/// A fully specified camera block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub style: CameraStyle,
    /// Field of view, written for orthographic cameras only.
    pub angle: Option<f64>,
    pub location: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub sky: Vec3,
}

/// A point light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub position: Vec3,
    pub color: [f64; 3],
    pub shadowless: bool,
}
