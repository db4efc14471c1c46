use serde::{Deserialize, Serialize};

use crate::bounds::BoundingDims;
use crate::compositor::{HoleGeometry, LayerCompositor};
use crate::device::DeviceDescription;
use crate::diagnostics::Diagnostics;
use crate::error::ModelError;
use crate::geometry::{SceneObject, Solid, Vec3, ZExtent};
use crate::material::{ColorSpec, Finish, FinishSelection, Palette, Texture, DEFAULT_CUSTOM_COLOR};

/// Substrates thinner than this are drawn at this thickness.
pub const MIN_SUBSTRATE_THICKNESS: f64 = 1.0;

/// Options controlling how a device is turned into geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Unit cells along the first lattice vector.
    pub num_uc_x: u32,
    /// Unit cells along the second lattice vector.
    pub num_uc_y: u32,
    /// Add an oversized substrate slab around the tiling.
    pub add_edge_buffer: bool,
    /// Color by material (`true`) or from `custom_colors`, one per shape (`false`).
    pub use_default_colors: bool,
    pub custom_colors: Vec<ColorSpec>,
    pub finish: Finish,
    /// Finish text used with [`Finish::Custom`].
    pub custom_finish: String,
    /// Interior index of refraction for the translucent finish.
    pub ior: f64,
    pub hole_geometry: HoleGeometry,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            num_uc_x: 5,
            num_uc_y: 5,
            add_edge_buffer: false,
            use_default_colors: true,
            custom_colors: vec![DEFAULT_CUSTOM_COLOR],
            finish: Finish::Dull,
            custom_finish: String::new(),
            ior: 1.0,
            hole_geometry: HoleGeometry::Own,
        }
    }
}

impl BuildOptions {
    pub fn finish_selection(&self) -> FinishSelection {
        FinishSelection {
            finish: self.finish,
            custom_finish: self.custom_finish.clone(),
            ior: self.ior,
        }
    }
}

/// Mutable state threaded through one unit-cell build.
#[derive(Debug)]
pub struct BuildState {
    pub palette: Palette,
    pub bounds: BoundingDims,
    pub diagnostics: Diagnostics,
}

/// The assembled unit cell: device layers followed by the substrate slab.
#[derive(Debug, Clone)]
pub struct UnitCell {
    pub objects: Vec<SceneObject>,
    /// Vertical span of the substrate slab.
    pub substrate: ZExtent,
    /// Bounds of the whole cell, substrate depth included.
    pub bounds: BoundingDims,
    /// Bounds snapshot after each rendered device layer, in build order.
    pub layer_bounds: Vec<BoundingDims>,
    pub diagnostics: Diagnostics,
}

impl UnitCell {
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// Walks a device description top-down and builds its unit cell.
pub struct DeviceAssembler<'a> {
    options: &'a BuildOptions,
}

impl<'a> DeviceAssembler<'a> {
    pub fn new(options: &'a BuildOptions) -> Self {
        Self { options }
    }

    pub fn assemble(&self, device: &DeviceDescription) -> Result<UnitCell, ModelError> {
        // Every promised layer must exist before anything is sized from the count.
        let mut layers = Vec::new();
        for index in 0..device.num_layers {
            layers.push(device.layer(index)?);
        }

        let finish = self.options.finish_selection();
        let mut state = BuildState {
            palette: Palette::new(
                self.options.use_default_colors,
                &self.options.custom_colors,
                layers.len(),
            ),
            bounds: BoundingDims::default(),
            diagnostics: Diagnostics::new(),
        };
        let mut objects = Vec::new();
        let mut layer_bounds = Vec::with_capacity(layers.len());

        for (index, layer) in layers.into_iter().enumerate() {
            let Some(shapes) = layer.shapes.as_deref() else {
                log::debug!("Layer {} is uniform; not rendered", index);
                continue;
            };

            let thickness = layer.thickness.max(0.0);
            let compositor = LayerCompositor {
                finish: &finish,
                hole_geometry: self.options.hole_geometry,
                layer_index: index,
                z: ZExtent::below(state.bounds.z, thickness),
            };
            let layer_objects = compositor.compose(shapes, &mut state);
            log::debug!(
                "Layer {}: {} shapes -> {} objects",
                index,
                shapes.len(),
                layer_objects.len()
            );
            objects.extend(layer_objects);

            state.bounds.add_depth(thickness);
            layer_bounds.push(state.bounds);
        }

        let thickness = device.sub_layer.thickness.max(MIN_SUBSTRATE_THICKNESS);
        let half = device.lattice_vecs.cell_halfwidths();
        let substrate = ZExtent::below(state.bounds.z, thickness);
        objects.push(SceneObject::new(
            Solid::Slab {
                min: Vec3::new(-half.x, -half.y, substrate.top),
                max: Vec3::new(half.x, half.y, substrate.bottom),
            },
            Texture::substrate(),
        ));
        state.bounds.add_depth(thickness);

        log::info!(
            "Assembled unit cell: {} objects, bounds {:?}, {} warnings",
            objects.len(),
            state.bounds.to_array(),
            state.diagnostics.len()
        );

        Ok(UnitCell {
            objects,
            substrate,
            bounds: state.bounds,
            layer_bounds,
            diagnostics: state.diagnostics,
        })
    }
}
