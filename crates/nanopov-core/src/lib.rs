//! # NanoPOV Core
//!
//! Geometry engine for layered nanophotonic devices: the device model, a
//! constructive-solid-geometry scene graph, per-layer shape composition with
//! silo (shape-with-holes) detection, unit-cell assembly with running bounds,
//! and lattice replication.
//!
//! Everything here is a single-pass, in-memory build. Turning the result into
//! renderer text lives in `nanopov-renderer`.

pub mod assembler;
pub mod bounds;
pub mod compositor;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod lattice;
pub mod material;
pub mod primitives;

pub use assembler::{BuildOptions, DeviceAssembler, UnitCell};
pub use bounds::BoundingDims;
pub use compositor::{classify, group_features, Feature, HoleGeometry, LayerTag};
pub use device::{DeviceDescription, Layer, LatticeVectors, Shape, ShapeGeometry, SubstrateLayer};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::ModelError;
pub use geometry::{HalfWidths, Point, SceneObject, Solid, Vec3, ZExtent};
pub use lattice::{LatticeReplicator, LatticeScene, Tiling};
pub use material::{ColorSpec, Finish, SurfaceFinish, Texture};

/// Assemble the unit cell of `device` and tile it as `options` requests.
pub fn build_lattice(
    device: &DeviceDescription,
    options: &BuildOptions,
) -> Result<LatticeScene, ModelError> {
    let cell = DeviceAssembler::new(options).assemble(device)?;
    Ok(LatticeReplicator {
        lattice: &device.lattice_vecs,
        tiling: Tiling::new(options.num_uc_x, options.num_uc_y),
        add_edge_buffer: options.add_edge_buffer,
    }
    .replicate(cell))
}
