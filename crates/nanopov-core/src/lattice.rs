use serde::{Deserialize, Serialize};

use crate::assembler::UnitCell;
use crate::bounds::BoundingDims;
use crate::device::LatticeVectors;
use crate::diagnostics::Diagnostics;
use crate::geometry::{SceneObject, Solid, Vec3};
use crate::material::Texture;

/// Name under which the unit cell is declared in the scene.
pub const UNIT_CELL_NAME: &str = "UnitCell";

/// Number of unit cells along each lattice vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tiling {
    pub num_x: u32,
    pub num_y: u32,
}

impl Tiling {
    pub fn new(num_x: u32, num_y: u32) -> Self {
        Self { num_x, num_y }
    }

    /// Index offsets that put the original cell near the middle of the grid.
    pub fn adjustment(&self) -> (i64, i64) {
        (centering_offset(self.num_x), centering_offset(self.num_y))
    }

    /// Total number of tiles.
    pub fn count(&self) -> u64 {
        u64::from(self.num_x) * u64::from(self.num_y)
    }

    /// Translation of every tile, `x` index outermost.
    pub fn offsets(&self, lattice: &LatticeVectors) -> impl Iterator<Item = Vec3> {
        let (adj_x, adj_y) = self.adjustment();
        let (ax, by) = (lattice.a.x, lattice.b.y);
        let num_y = i64::from(self.num_y);
        (0..i64::from(self.num_x)).flat_map(move |i| {
            (0..num_y).map(move |j| {
                Vec3::new((i - adj_x) as f64 * ax, (j - adj_y) as f64 * by, 0.0)
            })
        })
    }
}

/// `floor(0.5 * (n - (1 + (n - 1) mod 2)))`: one tile stays at the origin,
/// an extra one is dropped for even counts, half of the rest go backward.
pub fn centering_offset(n: u32) -> i64 {
    if n == 0 {
        return 0;
    }
    let n = i64::from(n);
    (n - (1 + (n - 1) % 2)) / 2
}

/// The tiled scene geometry: declared cell, its instances, and the optional buffer slab.
#[derive(Debug, Clone)]
pub struct LatticeScene {
    /// `UnitCell` declaration, a merge of every unit-cell object.
    pub unit_cell: SceneObject,
    /// Merge of translated references to the unit cell.
    pub tiles: SceneObject,
    pub edge_buffer: Option<SceneObject>,
    /// Unit-cell bounds scaled by the capped tiling counts, for camera framing.
    pub camera_bounds: BoundingDims,
    pub tile_count: usize,
    pub diagnostics: Diagnostics,
}

impl LatticeScene {
    /// Objects in emission order after the declaration.
    pub fn placed_objects(&self) -> Vec<&SceneObject> {
        std::iter::once(&self.tiles)
            .chain(self.edge_buffer.as_ref())
            .collect()
    }
}

/// Replicates a unit cell across a lattice.
pub struct LatticeReplicator<'a> {
    pub lattice: &'a LatticeVectors,
    pub tiling: Tiling,
    pub add_edge_buffer: bool,
}

impl LatticeReplicator<'_> {
    pub fn replicate(&self, cell: UnitCell) -> LatticeScene {
        let tiles: Vec<SceneObject> = self
            .tiling
            .offsets(self.lattice)
            .map(|offset| {
                SceneObject::bare(Solid::Reference(UNIT_CELL_NAME.to_string()).translated(offset))
            })
            .collect();
        let tile_count = tiles.len();

        let edge_buffer = self.add_edge_buffer.then(|| self.edge_buffer(&cell));
        let camera_bounds = cell
            .bounds
            .capped_for_tiling(self.tiling.num_x, self.tiling.num_y);

        log::info!(
            "Tiled unit cell {}x{} ({} instances){}",
            self.tiling.num_x,
            self.tiling.num_y,
            self.tiling.count(),
            if edge_buffer.is_some() { " with edge buffer" } else { "" }
        );

        LatticeScene {
            unit_cell: SceneObject::bare(Solid::Merge(cell.objects)),
            tiles: SceneObject::bare(Solid::Merge(tiles)),
            edge_buffer,
            camera_bounds,
            tile_count,
            diagnostics: cell.diagnostics,
        }
    }

    /// Substrate-textured slab reaching one and a half cells past the tiling.
    fn edge_buffer(&self, cell: &UnitCell) -> SceneObject {
        let (adj_x, adj_y) = self.tiling.adjustment();
        let ax = self.lattice.a.x;
        let by = self.lattice.b.y;
        let min_x = -(adj_x as f64 + 1.5) * ax;
        let max_x = (f64::from(self.tiling.num_x) - adj_x as f64 + 0.5) * ax;
        let min_y = -(adj_y as f64 + 1.5) * by;
        let max_y = (f64::from(self.tiling.num_y) - adj_y as f64 + 0.5) * by;
        SceneObject::new(
            Solid::Slab {
                min: Vec3::new(min_x, min_y, cell.substrate.bottom),
                max: Vec3::new(max_x, max_y, cell.substrate.top),
            },
            Texture::substrate(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, ZExtent};

    fn lattice() -> LatticeVectors {
        LatticeVectors::new(Point::new(4.0, 0.0), Point::new(0.0, 3.0))
    }

    fn empty_cell() -> UnitCell {
        UnitCell {
            objects: Vec::new(),
            substrate: ZExtent::new(-2.0, -5.0),
            bounds: BoundingDims::new(1.0, 1.0, 5.0),
            layer_bounds: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    #[test]
    fn test_centering_offset_values() {
        let expected = [(1, 0), (2, 0), (3, 1), (4, 1), (5, 2), (6, 2), (7, 3)];
        for (n, adj) in expected {
            assert_eq!(centering_offset(n), adj, "n = {n}");
        }
        assert_eq!(centering_offset(0), 0);
    }

    #[test]
    fn test_centered_tile_sits_at_origin() {
        for n in 1..=10u32 {
            let adj = centering_offset(n);
            let indices: Vec<i64> = (0..i64::from(n)).map(|i| i - adj).collect();
            assert!(indices.contains(&0), "n = {n}");
            let below = indices.iter().filter(|&&i| i < 0).count() as i64;
            let above = indices.iter().filter(|&&i| i > 0).count() as i64;
            assert_eq!(above - below, (n as i64 + 1) % 2, "n = {n}");
        }
    }

    #[test]
    fn test_offsets_follow_lattice() {
        let offsets: Vec<Vec3> = Tiling::new(3, 2).offsets(&lattice()).collect();
        assert_eq!(offsets.len(), 6);
        assert_eq!(offsets[0], Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(offsets[1], Vec3::new(-4.0, 3.0, 0.0));
        assert_eq!(offsets[2], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(offsets[5], Vec3::new(4.0, 3.0, 0.0));
    }

    #[test]
    fn test_large_tiling_counts_without_overflow() {
        let tiling = Tiling::new(70_000, 70_000);
        assert_eq!(tiling.count(), 4_900_000_000);
        let first: Vec<Vec3> = tiling.offsets(&lattice()).take(2).collect();
        assert_eq!(first[0], Vec3::new(-34_999.0 * 4.0, -34_999.0 * 3.0, 0.0));
        assert_eq!(first[1], Vec3::new(-34_999.0 * 4.0, -34_998.0 * 3.0, 0.0));
    }

    #[test]
    fn test_replicate_single_tile() {
        let lattice = lattice();
        let scene = LatticeReplicator {
            lattice: &lattice,
            tiling: Tiling::new(1, 1),
            add_edge_buffer: false,
        }
        .replicate(empty_cell());
        assert_eq!(scene.tile_count, 1);
        assert!(scene.edge_buffer.is_none());
        match &scene.tiles.solid {
            Solid::Merge(tiles) => match &tiles[0].solid {
                Solid::Translate { solid, offset } => {
                    assert_eq!(**solid, Solid::Reference(UNIT_CELL_NAME.into()));
                    assert_eq!(*offset, Vec3::default());
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(scene.camera_bounds, BoundingDims::new(1.0, 1.0, 5.0));
        assert_eq!(scene.placed_objects().len(), 1);
    }

    #[test]
    fn test_edge_buffer_extent() {
        let lattice = lattice();
        let scene = LatticeReplicator {
            lattice: &lattice,
            tiling: Tiling::new(5, 4),
            add_edge_buffer: true,
        }
        .replicate(empty_cell());
        let buffer = scene.edge_buffer.as_ref().unwrap();
        assert_eq!(buffer.texture, Some(Texture::substrate()));
        match &buffer.solid {
            Solid::Slab { min, max } => {
                assert!((min.x + 14.0).abs() < 1e-10);
                assert!((max.x - 14.0).abs() < 1e-10);
                assert!((min.y + 7.5).abs() < 1e-10);
                assert!((max.y - 10.5).abs() < 1e-10);
                assert!((min.z + 5.0).abs() < 1e-10);
                assert!((max.z + 2.0).abs() < 1e-10);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!((scene.camera_bounds.x - 5.0).abs() < 1e-10);
        assert!((scene.camera_bounds.y - 4.0).abs() < 1e-10);
        assert_eq!(scene.placed_objects().len(), 2);
    }
}
