//! Extruded 2D primitives.
//!
//! Every builder returns a [`Solid`] spanning `z.top` to `z.bottom`. The same
//! node serves as a standalone object or as an operand of a silo difference;
//! callers widen the span of holes with [`ZExtent::widened`] and [`HOLE_EPSILON`].

use crate::device::ShapeGeometry;
use crate::geometry::{HalfWidths, Point, Solid, ZExtent};

/// Extra depth added to both ends of a hole so it cuts cleanly through its solid.
pub const HOLE_EPSILON: f64 = 0.001;

pub fn circle(center: Point, z: ZExtent, radius: f64) -> Solid {
    Solid::Cylinder { center, z, radius }
}

/// Unit cylinder scaled to `(hx, hy)`, rotated by `angle` degrees about z.
pub fn ellipse(center: Point, z: ZExtent, halfwidths: HalfWidths, angle: f64) -> Solid {
    Solid::EllipticCylinder {
        center,
        z,
        halfwidths,
        angle,
    }
}

/// Prism of `2*hx x 2*hy`, rotated by `angle` degrees about z.
pub fn rectangle(center: Point, z: ZExtent, halfwidths: HalfWidths, angle: f64) -> Solid {
    Solid::RectPrism {
        center,
        z,
        halfwidths,
        angle,
    }
}

/// Polygons are not supported; there is never a solid to return.
pub fn polygon() -> Option<Solid> {
    None
}

/// Build the solid for any shape record, or `None` when its type is unsupported.
pub fn build(geometry: &ShapeGeometry, z: ZExtent) -> Option<Solid> {
    match geometry {
        ShapeGeometry::Circle { center, radius } => Some(circle(*center, z, *radius)),
        ShapeGeometry::Ellipse {
            center,
            halfwidths,
            angle,
        } => Some(ellipse(*center, z, *halfwidths, *angle)),
        ShapeGeometry::Rectangle {
            center,
            halfwidths,
            angle,
        } => Some(rectangle(*center, z, *halfwidths, *angle)),
        ShapeGeometry::Polygon => polygon(),
        ShapeGeometry::Unknown(_) => None,
    }
}
