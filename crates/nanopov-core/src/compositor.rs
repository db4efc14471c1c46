//! Per-layer shape classification and silo composition.
//!
//! A non-vacuum shape immediately followed by one or more vacuum shapes is a
//! silo: the contiguous vacuum run that follows it is subtracted from it.
//! Vacuum shapes outside such a run are never emitted; each one is reported
//! as an informational diagnostic.

use serde::{Deserialize, Serialize};

use crate::assembler::BuildState;
use crate::device::{Shape, ShapeGeometry};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::geometry::{HalfWidths, SceneObject, Solid, ZExtent};
use crate::material::FinishSelection;
use crate::primitives::{self, HOLE_EPSILON};

/// Classification of one shape record within its layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerTag {
    Circle,
    Ellipse,
    Rectangle,
    Polygon,
    Unknown(String),
    Vacuum,
    Silo,
}

impl LayerTag {
    fn of(shape: &Shape) -> Self {
        if shape.is_vacuum() {
            return LayerTag::Vacuum;
        }
        match &shape.geometry {
            ShapeGeometry::Circle { .. } => LayerTag::Circle,
            ShapeGeometry::Ellipse { .. } => LayerTag::Ellipse,
            ShapeGeometry::Rectangle { .. } => LayerTag::Rectangle,
            ShapeGeometry::Polygon => LayerTag::Polygon,
            ShapeGeometry::Unknown(name) => LayerTag::Unknown(name.clone()),
        }
    }
}

/// Tag every shape, then retag each non-vacuum shape followed by a vacuum shape as a silo.
pub fn classify(shapes: &[Shape]) -> Vec<LayerTag> {
    let mut tags: Vec<LayerTag> = shapes.iter().map(LayerTag::of).collect();
    if !tags.contains(&LayerTag::Vacuum) {
        return tags;
    }
    for i in 0..tags.len().saturating_sub(1) {
        if tags[i] != LayerTag::Vacuum && tags[i + 1] == LayerTag::Vacuum {
            tags[i] = LayerTag::Silo;
        }
    }
    tags
}

/// One renderable unit of a layer, with indices into the layer's shape list.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature<'a> {
    Plain {
        index: usize,
        shape: &'a Shape,
    },
    Silo {
        index: usize,
        solid: &'a Shape,
        holes: Vec<(usize, &'a Shape)>,
    },
    /// Vacuum shape with no solid to cut.
    Orphan {
        index: usize,
    },
}

/// Group a layer into plain shapes, silos with their holes, and orphan vacuums.
pub fn group_features(shapes: &[Shape]) -> Vec<Feature<'_>> {
    let tags = classify(shapes);
    let mut features = Vec::new();
    let mut i = 0;
    while i < shapes.len() {
        match tags[i] {
            LayerTag::Silo => {
                let mut holes = Vec::new();
                let mut j = i + 1;
                while j < shapes.len() && tags[j] == LayerTag::Vacuum {
                    holes.push((j, &shapes[j]));
                    j += 1;
                }
                features.push(Feature::Silo {
                    index: i,
                    solid: &shapes[i],
                    holes,
                });
                i = j;
            }
            LayerTag::Vacuum => {
                features.push(Feature::Orphan { index: i });
                i += 1;
            }
            _ => {
                features.push(Feature::Plain {
                    index: i,
                    shape: &shapes[i],
                });
                i += 1;
            }
        }
    }
    features
}

/// Where ellipse and rectangle holes take their geometry from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleGeometry {
    /// Each hole uses its own center, half-widths and angle.
    #[default]
    Own,
    /// Ellipse and rectangle holes copy the placement of their silo's solid.
    SolidCopy,
}

/// Turns the shapes of one layer into textured objects.
pub struct LayerCompositor<'a> {
    pub finish: &'a FinishSelection,
    pub hole_geometry: HoleGeometry,
    pub layer_index: usize,
    pub z: ZExtent,
}

impl LayerCompositor<'_> {
    pub fn compose(&self, shapes: &[Shape], state: &mut BuildState) -> Vec<SceneObject> {
        let mut objects = Vec::new();
        for feature in group_features(shapes) {
            let (index, built) = match feature {
                Feature::Plain { index, shape } => (index, self.plain(index, shape, state)),
                Feature::Silo {
                    index,
                    solid,
                    holes,
                } => (index, self.silo(index, solid, &holes, state)),
                Feature::Orphan { index } => {
                    state.diagnostics.push(
                        Diagnostic::info(
                            DiagnosticKind::OrphanVacuum,
                            "vacuum shape has no solid to cut; not emitted",
                        )
                        .at(self.layer_index, index),
                    );
                    continue;
                }
            };
            if let Some((material, solid, halfwidths)) = built {
                objects.push(self.finish_object(index, material, solid, halfwidths, state));
            }
        }
        objects
    }

    fn plain<'s>(
        &self,
        index: usize,
        shape: &'s Shape,
        state: &mut BuildState,
    ) -> Option<(&'s str, Solid, HalfWidths)> {
        match (primitives::build(&shape.geometry, self.z), shape.geometry.halfwidths()) {
            (Some(solid), Some(halfwidths)) => Some((shape.material.as_str(), solid, halfwidths)),
            _ => {
                self.unsupported(index, shape, state);
                None
            }
        }
    }

    fn silo<'s>(
        &self,
        index: usize,
        solid: &'s Shape,
        holes: &[(usize, &Shape)],
        state: &mut BuildState,
    ) -> Option<(&'s str, Solid, HalfWidths)> {
        let (base, halfwidths) = match (
            primitives::build(&solid.geometry, self.z),
            solid.geometry.halfwidths(),
        ) {
            (Some(base), Some(halfwidths)) => (base, halfwidths),
            _ => {
                self.unsupported(index, solid, state);
                return None;
            }
        };
        if !matches!(solid.geometry, ShapeGeometry::Circle { .. }) {
            self.untested(index, solid, state);
        }

        let hole_z = self.z.widened(HOLE_EPSILON);
        let mut cut = Vec::with_capacity(holes.len());
        for &(hole_index, hole) in holes {
            let geometry = match (&hole.geometry, self.hole_geometry) {
                (ShapeGeometry::Ellipse { .. }, HoleGeometry::SolidCopy)
                | (ShapeGeometry::Rectangle { .. }, HoleGeometry::SolidCopy) => {
                    copy_placement(&hole.geometry, &solid.geometry)
                }
                (own, _) => own.clone(),
            };
            match primitives::build(&geometry, hole_z) {
                Some(hole_solid) => {
                    if !matches!(geometry, ShapeGeometry::Circle { .. }) {
                        self.untested(hole_index, hole, state);
                    }
                    cut.push(hole_solid);
                }
                None => self.unsupported(hole_index, hole, state),
            }
        }

        let silo = if cut.is_empty() {
            base
        } else {
            Solid::Difference {
                base: Box::new(base),
                holes: cut,
            }
        };
        Some((solid.material.as_str(), silo, halfwidths))
    }

    fn finish_object(
        &self,
        index: usize,
        material: &str,
        solid: Solid,
        halfwidths: HalfWidths,
        state: &mut BuildState,
    ) -> SceneObject {
        let (color, color_diag) = state.palette.next_color(material);
        let (texture, finish_diag) = self.finish.apply(material, color);
        for diag in [color_diag, finish_diag].into_iter().flatten() {
            state.diagnostics.push(diag.at(self.layer_index, index));
        }
        state.bounds.include_shape(halfwidths);
        SceneObject::new(solid, texture)
    }

    fn unsupported(&self, index: usize, shape: &Shape, state: &mut BuildState) {
        state.diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::UnsupportedShape,
                format!("shape type '{}' is not supported; skipped", shape.geometry.type_name()),
            )
            .at(self.layer_index, index),
        );
    }

    fn untested(&self, index: usize, shape: &Shape, state: &mut BuildState) {
        state.diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::UntestedPath,
                format!("{} inside a silo has not been tested", shape.geometry.type_name()),
            )
            .at(self.layer_index, index),
        );
    }
}

/// Keep the hole's shape type but take center, half-widths and angle from `source`.
fn copy_placement(hole: &ShapeGeometry, source: &ShapeGeometry) -> ShapeGeometry {
    let (center, halfwidths, angle) = match source {
        ShapeGeometry::Circle { center, radius } => (*center, HalfWidths::uniform(*radius), 0.0),
        ShapeGeometry::Ellipse {
            center,
            halfwidths,
            angle,
        }
        | ShapeGeometry::Rectangle {
            center,
            halfwidths,
            angle,
        } => (*center, *halfwidths, *angle),
        ShapeGeometry::Polygon | ShapeGeometry::Unknown(_) => return hole.clone(),
    };
    match hole {
        ShapeGeometry::Ellipse { .. } => ShapeGeometry::Ellipse {
            center,
            halfwidths,
            angle,
        },
        ShapeGeometry::Rectangle { .. } => ShapeGeometry::Rectangle {
            center,
            halfwidths,
            angle,
        },
        other => other.clone(),
    }
}
