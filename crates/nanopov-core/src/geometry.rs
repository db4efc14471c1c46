use serde::{Deserialize, Serialize};

use crate::material::Texture;

/// A 2D point in the device plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 3D vector in scene coordinates (z points up, layers grow downward from z = 0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Half-widths of an ellipse or rectangle along its local x and y axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfWidths {
    pub x: f64,
    pub y: f64,
}

impl HalfWidths {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both half-widths equal to `r`, as used for circles.
    pub fn uniform(r: f64) -> Self {
        Self { x: r, y: r }
    }
}

/// Vertical span of an extruded shape, `top` above `bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZExtent {
    pub top: f64,
    pub bottom: f64,
}

impl ZExtent {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// The span of a layer of `thickness` whose top sits `depth` below z = 0.
    pub fn below(depth: f64, thickness: f64) -> Self {
        Self {
            top: -depth,
            bottom: -depth - thickness,
        }
    }

    /// Grow the span by `epsilon` at both ends so a subtracted hole cuts cleanly through.
    pub fn widened(&self, epsilon: f64) -> Self {
        Self {
            top: self.top + epsilon,
            bottom: self.bottom - epsilon,
        }
    }

    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }
}

/// A node of the constructive solid geometry tree handed to the scene emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Solid {
    /// Right circular cylinder between `z.top` and `z.bottom`.
    Cylinder {
        center: Point,
        z: ZExtent,
        radius: f64,
    },
    /// Unit cylinder scaled by the half-widths, rotated `angle` degrees about z,
    /// then moved to `center`.
    EllipticCylinder {
        center: Point,
        z: ZExtent,
        halfwidths: HalfWidths,
        angle: f64,
    },
    /// Box of `2*hx x 2*hy`, rotated `angle` degrees about z, then moved to `center`.
    RectPrism {
        center: Point,
        z: ZExtent,
        halfwidths: HalfWidths,
        angle: f64,
    },
    /// Axis-aligned box between two corners.
    Slab { min: Vec3, max: Vec3 },
    /// `base` with every hole removed.
    Difference { base: Box<Solid>, holes: Vec<Solid> },
    /// Union of textured objects with interior surfaces removed.
    Merge(Vec<SceneObject>),
    /// A previously declared object, by name.
    Reference(String),
    Translate { solid: Box<Solid>, offset: Vec3 },
}

impl Solid {
    pub fn translated(self, offset: Vec3) -> Self {
        Solid::Translate {
            solid: Box::new(self),
            offset,
        }
    }

    /// Number of primitive leaves in this tree, not counting referenced declarations.
    pub fn primitive_count(&self) -> usize {
        match self {
            Solid::Cylinder { .. }
            | Solid::EllipticCylinder { .. }
            | Solid::RectPrism { .. }
            | Solid::Slab { .. } => 1,
            Solid::Difference { base, holes } => {
                base.primitive_count() + holes.iter().map(Solid::primitive_count).sum::<usize>()
            }
            Solid::Merge(objects) => objects.iter().map(|o| o.solid.primitive_count()).sum(),
            Solid::Reference(_) => 0,
            Solid::Translate { solid, .. } => solid.primitive_count(),
        }
    }
}

/// A solid with an optional surface texture attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub solid: Solid,
    pub texture: Option<Texture>,
}

impl SceneObject {
    pub fn new(solid: Solid, texture: Texture) -> Self {
        Self {
            solid,
            texture: Some(texture),
        }
    }

    pub fn bare(solid: Solid) -> Self {
        Self {
            solid,
            texture: None,
        }
    }
}
