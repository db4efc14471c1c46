//! Device description reader.
//!
//! The device file is a JSON document with a single `statepoint` root:
//!
//! ```text
//! statepoint
//!   num_layers
//!   lattice_vecs.{a,b}.{x,y}
//!   dev_layers.<i>.{thickness, background?, shapes?}
//!   sub_layer.{thickness, background?}
//! ```
//!
//! Shapes are keyed `"0"`, `"1"`, ... (or given as an array) and carry
//! `material`, `shape` and `shape_vars`. Every lookup tracks its dotted path
//! so a missing field names exactly where it should have been.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use nanopov_core::device::{
    DeviceDescription, Layer, LatticeVectors, Shape, ShapeGeometry, SubstrateLayer,
};
use nanopov_core::geometry::{HalfWidths, Point};
use nanopov_core::ModelError;

pub const ROOT_KEY: &str = "statepoint";

#[derive(Error, Debug)]
pub enum DeviceFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed device file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A JSON value together with the dotted path it was reached by.
#[derive(Clone, Copy)]
struct Node<'a> {
    value: &'a Value,
    path: &'a str,
}

/// Owned-path variant used while descending.
struct Field<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Field<'a> {
    fn node(&self) -> Node<'_> {
        Node {
            value: self.value,
            path: &self.path,
        }
    }
}

impl<'a> Node<'a> {
    fn child_path(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    fn get(&self, key: &str) -> Option<Field<'a>> {
        let value = match self.value {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }?;
        Some(Field {
            value,
            path: self.child_path(key),
        })
    }

    fn field(&self, key: &str) -> Result<Field<'a>, ModelError> {
        self.get(key).ok_or_else(|| ModelError::MissingField {
            path: self.child_path(key),
        })
    }

    fn optional(&self, key: &str) -> Option<Field<'a>> {
        self.get(key).filter(|f| !f.value.is_null())
    }

    fn invalid(&self, message: impl Into<String>) -> ModelError {
        ModelError::InvalidValue {
            path: self.path.to_string(),
            message: message.into(),
        }
    }

    fn as_f64(&self) -> Result<f64, ModelError> {
        self.value
            .as_f64()
            .ok_or_else(|| self.invalid(format!("expected a number, found {}", self.value)))
    }

    fn as_usize(&self) -> Result<usize, ModelError> {
        match self.value.as_u64() {
            Some(n) => usize::try_from(n).map_err(|_| self.invalid("value out of range")),
            // Whole-valued floats are accepted as counts.
            None => match self.value.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as usize),
                _ => Err(self.invalid(format!(
                    "expected a non-negative integer, found {}",
                    self.value
                ))),
            },
        }
    }

    fn as_str(&self) -> Result<&'a str, ModelError> {
        self.value
            .as_str()
            .ok_or_else(|| self.invalid(format!("expected a string, found {}", self.value)))
    }

    fn number(&self, key: &str) -> Result<f64, ModelError> {
        self.field(key)?.node().as_f64()
    }

    fn text(&self, key: &str) -> Result<String, ModelError> {
        self.field(key)?.node().as_str().map(str::to_string)
    }

    fn optional_text(&self, key: &str) -> Result<Option<String>, ModelError> {
        self.optional(key)
            .map(|f| f.node().as_str().map(str::to_string))
            .transpose()
    }

    /// A 2-vector given as `{x, y}` or `[x, y]`.
    fn pair(&self) -> Result<(f64, f64), ModelError> {
        match self.value {
            Value::Array(items) if items.len() == 2 => Ok((
                self.field("0")?.node().as_f64()?,
                self.field("1")?.node().as_f64()?,
            )),
            Value::Array(items) => {
                Err(self.invalid(format!("expected 2 elements, found {}", items.len())))
            }
            Value::Object(_) => Ok((self.number("x")?, self.number("y")?)),
            other => Err(self.invalid(format!("expected {{x, y}} or [x, y], found {other}"))),
        }
    }

    fn point(&self, key: &str) -> Result<Point, ModelError> {
        let (x, y) = self.field(key)?.node().pair()?;
        Ok(Point::new(x, y))
    }

    fn halfwidths(&self, key: &str) -> Result<HalfWidths, ModelError> {
        let (x, y) = self.field(key)?.node().pair()?;
        Ok(HalfWidths::new(x, y))
    }

    /// Entries of an object keyed `"0".."n-1"` or of an array, in index order.
    fn indexed(&self) -> Result<Vec<Field<'a>>, ModelError> {
        let count = match self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            other => {
                return Err(self.invalid(format!("expected an object or array, found {other}")))
            }
        };
        (0..count).map(|i| self.field(&i.to_string())).collect()
    }
}

/// Reads a [`DeviceDescription`] from a JSON stream.
pub struct DeviceReader<R: Read> {
    reader: R,
}

impl<R: Read> DeviceReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read(&mut self) -> Result<DeviceDescription, DeviceFileError> {
        let document: Value = serde_json::from_reader(&mut self.reader)?;
        let device = parse_document(&document)?;
        log::info!(
            "Loaded device: {} layers, lattice a = ({}, {}), b = ({}, {})",
            device.num_layers,
            device.lattice_vecs.a.x,
            device.lattice_vecs.a.y,
            device.lattice_vecs.b.x,
            device.lattice_vecs.b.y
        );
        Ok(device)
    }
}

/// Load a device description from a file.
pub fn load_device(path: impl AsRef<Path>) -> Result<DeviceDescription, DeviceFileError> {
    let path = path.as_ref();
    log::debug!("Reading device description from {}", path.display());
    let file = File::open(path)?;
    DeviceReader::new(BufReader::new(file)).read()
}

/// Parse a device description from a JSON string.
pub fn parse_device(json: &str) -> Result<DeviceDescription, DeviceFileError> {
    DeviceReader::new(json.as_bytes()).read()
}

fn parse_document(document: &Value) -> Result<DeviceDescription, ModelError> {
    let root = document
        .get(ROOT_KEY)
        .ok_or_else(|| ModelError::MissingField {
            path: ROOT_KEY.to_string(),
        })?;
    let root = Node {
        value: root,
        path: ROOT_KEY,
    };

    let num_layers = root.field("num_layers")?.node().as_usize()?;

    let lattice = root.field("lattice_vecs")?;
    let lattice = lattice.node();
    let lattice_vecs = LatticeVectors::new(lattice.point("a")?, lattice.point("b")?);

    let layers = root.field("dev_layers")?;
    let layers = layers.node();
    let mut device = DeviceDescription::new(lattice_vecs, 0.0);
    for index in 0..num_layers {
        let layer = layers.field(&index.to_string())?;
        device.push_layer(parse_layer(layer.node())?);
    }

    let sub = root.field("sub_layer")?;
    let sub = sub.node();
    device.sub_layer = SubstrateLayer {
        thickness: sub.number("thickness")?,
        background: sub.optional_text("background")?,
    };
    Ok(device)
}

fn parse_layer(layer: Node<'_>) -> Result<Layer, ModelError> {
    let thickness = layer.number("thickness")?;
    let background = layer.optional_text("background")?;
    let shapes = match layer.optional("shapes") {
        Some(field) => {
            let entries = field.node().indexed()?;
            Some(
                entries
                    .iter()
                    .map(|s| parse_shape(s.node()))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        None => None,
    };
    Ok(Layer {
        thickness,
        background,
        shapes,
    })
}

fn parse_shape(shape: Node<'_>) -> Result<Shape, ModelError> {
    let material = shape.text("material")?;
    let kind = shape.text("shape")?;
    let geometry = match kind.as_str() {
        "circle" => {
            let vars = shape.field("shape_vars")?;
            let vars = vars.node();
            ShapeGeometry::Circle {
                center: vars.point("center")?,
                radius: vars.number("radius")?,
            }
        }
        "ellipse" | "rectangle" => {
            let vars = shape.field("shape_vars")?;
            let vars = vars.node();
            let center = vars.point("center")?;
            let halfwidths = vars.halfwidths("halfwidths")?;
            let angle = vars.number("angle")?;
            if kind == "ellipse" {
                ShapeGeometry::Ellipse {
                    center,
                    halfwidths,
                    angle,
                }
            } else {
                ShapeGeometry::Rectangle {
                    center,
                    halfwidths,
                    angle,
                }
            }
        }
        "polygon" => ShapeGeometry::Polygon,
        other => ShapeGeometry::Unknown(other.to_string()),
    };
    Ok(Shape { material, geometry })
}
