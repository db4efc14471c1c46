use serde::{Deserialize, Serialize};

use crate::geometry::HalfWidths;

/// Tiling multiple beyond which camera framing stops growing.
pub const CAMERA_TILE_CAP: u32 = 5;

/// Running bounding estimate of everything emitted so far: in-plane
/// half-extents and total depth. Never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingDims {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoundingDims {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.max(0.0),
            y: y.max(0.0),
            z: z.max(0.0),
        }
    }

    /// Widen to cover a shape with the given half-widths.
    pub fn include_shape(&mut self, halfwidths: HalfWidths) {
        self.x = self.x.max(halfwidths.x.abs());
        self.y = self.y.max(halfwidths.y.abs());
    }

    /// Add one layer's thickness to the depth.
    pub fn add_depth(&mut self, thickness: f64) {
        self.z += thickness.max(0.0);
    }

    /// Scale the in-plane extents by the tiling counts, capped at
    /// [`CAMERA_TILE_CAP`] cells per axis. Depth is unchanged.
    pub fn capped_for_tiling(&self, num_x: u32, num_y: u32) -> Self {
        let fx = f64::from(num_x.min(CAMERA_TILE_CAP));
        let fy = f64::from(num_y.min(CAMERA_TILE_CAP));
        Self {
            x: self.x.max(fx * self.x),
            y: self.y.max(fy * self.y),
            z: self.z,
        }
    }

    pub fn max_extent(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Component-wise `>=`.
    pub fn dominates(&self, other: &BoundingDims) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }
}
