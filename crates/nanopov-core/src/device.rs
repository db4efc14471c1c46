use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::geometry::{HalfWidths, Point};

/// Material names that mark a shape as a hole.
pub const VACUUM_MATERIALS: [&str; 2] = ["Vacuum", "vacuum"];

/// The two in-plane lattice vectors of the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeVectors {
    pub a: Point,
    pub b: Point,
}

impl LatticeVectors {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Half-widths of the unit-cell footprint used for the substrate slab.
    pub fn cell_halfwidths(&self) -> HalfWidths {
        HalfWidths::new(0.5 * self.a.x, 0.5 * self.b.y)
    }
}

/// Geometry of a single shape record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ShapeGeometry {
    Circle {
        center: Point,
        radius: f64,
    },
    Ellipse {
        center: Point,
        halfwidths: HalfWidths,
        angle: f64,
    },
    Rectangle {
        center: Point,
        halfwidths: HalfWidths,
        angle: f64,
    },
    /// Accepted on input but never rendered.
    Polygon,
    /// Any shape type name this crate does not know.
    #[serde(skip)]
    Unknown(String),
}

impl ShapeGeometry {
    /// The shape type name as it appears in device files.
    pub fn type_name(&self) -> &str {
        match self {
            ShapeGeometry::Circle { .. } => "circle",
            ShapeGeometry::Ellipse { .. } => "ellipse",
            ShapeGeometry::Rectangle { .. } => "rectangle",
            ShapeGeometry::Polygon => "polygon",
            ShapeGeometry::Unknown(name) => name,
        }
    }

    /// In-plane half-extent contributed to the bounding dimensions.
    pub fn halfwidths(&self) -> Option<HalfWidths> {
        match self {
            ShapeGeometry::Circle { radius, .. } => Some(HalfWidths::uniform(*radius)),
            ShapeGeometry::Ellipse { halfwidths, .. }
            | ShapeGeometry::Rectangle { halfwidths, .. } => Some(*halfwidths),
            ShapeGeometry::Polygon | ShapeGeometry::Unknown(_) => None,
        }
    }
}

/// One patterned shape within a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub material: String,
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
}

impl Shape {
    pub fn new(material: &str, geometry: ShapeGeometry) -> Self {
        Self {
            material: material.to_string(),
            geometry,
        }
    }

    pub fn circle(material: &str, center: Point, radius: f64) -> Self {
        Self::new(material, ShapeGeometry::Circle { center, radius })
    }

    pub fn ellipse(material: &str, center: Point, halfwidths: HalfWidths, angle: f64) -> Self {
        Self::new(
            material,
            ShapeGeometry::Ellipse {
                center,
                halfwidths,
                angle,
            },
        )
    }

    pub fn rectangle(material: &str, center: Point, halfwidths: HalfWidths, angle: f64) -> Self {
        Self::new(
            material,
            ShapeGeometry::Rectangle {
                center,
                halfwidths,
                angle,
            },
        )
    }

    pub fn is_vacuum(&self) -> bool {
        VACUUM_MATERIALS.contains(&self.material.as_str())
    }
}

/// A device layer. Layers without shapes are uniform and are not rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub thickness: f64,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub shapes: Option<Vec<Shape>>,
}

impl Layer {
    pub fn patterned(thickness: f64, shapes: Vec<Shape>) -> Self {
        Self {
            thickness,
            background: None,
            shapes: Some(shapes),
        }
    }

    pub fn uniform(thickness: f64, background: &str) -> Self {
        Self {
            thickness,
            background: Some(background.to_string()),
            shapes: None,
        }
    }
}

/// The substrate beneath the device layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateLayer {
    pub thickness: f64,
    #[serde(default)]
    pub background: Option<String>,
}

/// Full description of a layered device, read-only for the duration of a scene build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescription {
    pub num_layers: usize,
    pub lattice_vecs: LatticeVectors,
    pub dev_layers: BTreeMap<usize, Layer>,
    pub sub_layer: SubstrateLayer,
}

impl DeviceDescription {
    pub fn new(lattice_vecs: LatticeVectors, substrate_thickness: f64) -> Self {
        Self {
            num_layers: 0,
            lattice_vecs,
            dev_layers: BTreeMap::new(),
            sub_layer: SubstrateLayer {
                thickness: substrate_thickness,
                background: None,
            },
        }
    }

    /// Append a layer below the existing ones.
    pub fn push_layer(&mut self, layer: Layer) {
        self.dev_layers.insert(self.num_layers, layer);
        self.num_layers += 1;
    }

    /// Look up layer `index`, failing when the description promises more layers than it holds.
    pub fn layer(&self, index: usize) -> Result<&Layer, ModelError> {
        self.dev_layers
            .get(&index)
            .ok_or_else(|| ModelError::MissingField {
                path: format!("statepoint.dev_layers.{index}"),
            })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_lattice() -> LatticeVectors {
        LatticeVectors::new(Point::new(4.0, 0.0), Point::new(0.0, 4.0))
    }

    #[test]
    fn test_vacuum_detection() {
        assert!(Shape::circle("Vacuum", Point::default(), 1.0).is_vacuum());
        assert!(Shape::circle("vacuum", Point::default(), 1.0).is_vacuum());
        assert!(!Shape::circle("VACUUM", Point::default(), 1.0).is_vacuum());
        assert!(!Shape::circle("Si", Point::default(), 1.0).is_vacuum());
    }

    #[test]
    fn test_missing_layer_is_fatal() {
        let mut device = DeviceDescription::new(square_lattice(), 3.0);
        device.push_layer(Layer::uniform(1.0, "Si"));
        device.num_layers = 2;
        assert!(device.layer(0).is_ok());
        match device.layer(1) {
            Err(ModelError::MissingField { path }) => assert_eq!(path, "statepoint.dev_layers.1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_shape_halfwidths() {
        let c = Shape::circle("Si", Point::default(), 1.5);
        assert_eq!(c.geometry.halfwidths(), Some(HalfWidths::uniform(1.5)));
        let p = Shape::new("Si", ShapeGeometry::Polygon);
        assert_eq!(p.geometry.halfwidths(), None);
        assert_eq!(p.geometry.type_name(), "polygon");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut device = DeviceDescription::new(square_lattice(), 3.0);
        device.push_layer(Layer::patterned(
            2.0,
            vec![Shape::ellipse("SiO2", Point::new(1.0, 0.0), HalfWidths::new(1.0, 0.5), 30.0)],
        ));
        let json = device.to_json().unwrap();
        let back = DeviceDescription::from_json(&json).unwrap();
        assert_eq!(back, device);
    }
}
