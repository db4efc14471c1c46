use serde::{Deserialize, Serialize};

use nanopov_core::diagnostics::Diagnostics;
use nanopov_core::lattice::{LatticeScene, UNIT_CELL_NAME};
use nanopov_core::{BoundingDims, SceneObject};

use crate::camera::{Camera, CameraOptions, LightSource};

/// Global scene settings written before the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    /// Background color, rgb.
    pub background: [f64; 3],
    pub assumed_gamma: f64,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            background: [1.0, 1.0, 1.0],
            assumed_gamma: 1.0,
        }
    }
}

/// A named object emitted once and referenced by the placed objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub object: SceneObject,
}

/// A complete, renderer-independent scene: header, camera, lights, and geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub header: HeaderOptions,
    pub camera: Camera,
    pub lights: Vec<LightSource>,
    pub declarations: Vec<Declaration>,
    pub objects: Vec<SceneObject>,
    /// Extent used to frame the camera.
    pub bounds: BoundingDims,
    pub tile_count: usize,
    pub diagnostics: Diagnostics,
}

impl Scene {
    /// Frame `lattice` with a camera and light and gather it into one scene.
    pub fn compose(lattice: LatticeScene, camera: &CameraOptions, header: &HeaderOptions) -> Self {
        let LatticeScene {
            unit_cell,
            tiles,
            edge_buffer,
            camera_bounds,
            tile_count,
            mut diagnostics,
        } = lattice;

        let (camera, light) = camera.resolve(&camera_bounds, &mut diagnostics);

        let mut objects = vec![tiles];
        objects.extend(edge_buffer);

        Self {
            header: header.clone(),
            camera,
            lights: vec![light],
            declarations: vec![Declaration {
                name: UNIT_CELL_NAME.to_string(),
                object: unit_cell,
            }],
            objects,
            bounds: camera_bounds,
            tile_count,
            diagnostics,
        }
    }

    /// Primitive leaves across declarations and placed objects.
    pub fn primitive_count(&self) -> usize {
        self.declarations
            .iter()
            .map(|d| &d.object)
            .chain(&self.objects)
            .map(|o| o.solid.primitive_count())
            .sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanopov_core::device::{DeviceDescription, Layer, LatticeVectors, Shape};
    use nanopov_core::{build_lattice, BuildOptions, Point};

    fn lattice_scene(add_edge_buffer: bool) -> LatticeScene {
        let mut device = DeviceDescription::new(
            LatticeVectors::new(Point::new(4.0, 0.0), Point::new(0.0, 4.0)),
            3.0,
        );
        device.push_layer(Layer::patterned(
            2.0,
            vec![Shape::circle("Si", Point::default(), 1.0)],
        ));
        let options = BuildOptions {
            num_uc_x: 1,
            num_uc_y: 1,
            add_edge_buffer,
            ..Default::default()
        };
        build_lattice(&device, &options).unwrap()
    }

    #[test]
    fn test_compose_single_tile() {
        let scene = Scene::compose(
            lattice_scene(false),
            &CameraOptions::default(),
            &HeaderOptions::default(),
        );
        assert_eq!(scene.declarations.len(), 1);
        assert_eq!(scene.declarations[0].name, "UnitCell");
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.tile_count, 1);
        // cylinder + substrate slab
        assert_eq!(scene.primitive_count(), 2);
        assert!((scene.bounds.z - 5.0).abs() < 1e-10);
        assert!(scene.diagnostics.is_empty());
    }

    #[test]
    fn test_compose_with_edge_buffer() {
        let scene = Scene::compose(
            lattice_scene(true),
            &CameraOptions::default(),
            &HeaderOptions::default(),
        );
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.primitive_count(), 3);
    }

    #[test]
    fn test_scene_serializes() {
        let scene = Scene::compose(
            lattice_scene(false),
            &CameraOptions::default(),
            &HeaderOptions::default(),
        );
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"UnitCell\""));
        assert!(json.contains("\"perspective\""));
    }
}
