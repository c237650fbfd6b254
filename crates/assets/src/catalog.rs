use blockworld_core::{BlockKind, BlockPos, Direction};

use crate::model::FaceUvs;
use crate::{BlockModelDefinition, CatalogDefinition, CatalogError, MeshVertex};

/// Height of a water surface that has no water above it.
pub const WATER_SURFACE_HEIGHT: f32 = 0.875;

/// Unit-cube corners for each face, counter-clockwise seen from outside,
/// ordered bottom-left, bottom-right, top-right, top-left.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // PosX
    [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
    // NegX
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    // PosY
    [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    // NegY
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    // PosZ
    [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    // NegZ
    [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
];

/// Per-kind face UV table, parsed once and queried per visible face.
///
/// Lookups never fail: every renderable kind is validated when the
/// catalog is built. `Air` resolves to an empty UV rectangle.
#[derive(Debug, Clone)]
pub struct BlockModelCatalog {
    columns: u32,
    rows: u32,
    faces: [FaceUvs; BlockKind::COUNT],
}

impl BlockModelCatalog {
    /// Catalog over the default 4x4 terrain atlas.
    pub fn builtin() -> Self {
        let cell = |c: u32, r: u32| Some([c, r]);
        let all = |c, r| BlockModelDefinition {
            all: cell(c, r),
            ..Default::default()
        };
        let blocks = [
            (BlockKind::Stone, all(0, 0)),
            (BlockKind::Dirt, all(1, 0)),
            (
                BlockKind::Grass,
                BlockModelDefinition {
                    top: cell(2, 0),
                    side: cell(3, 0),
                    bottom: cell(1, 0),
                    ..Default::default()
                },
            ),
            (
                BlockKind::Log,
                BlockModelDefinition {
                    side: cell(0, 1),
                    top: cell(1, 1),
                    bottom: cell(1, 1),
                    ..Default::default()
                },
            ),
            (BlockKind::Sand, all(2, 1)),
            (BlockKind::Water, all(3, 1)),
            (BlockKind::Glass, all(0, 2)),
            (BlockKind::Leaves, all(1, 2)),
            (BlockKind::Rose, all(2, 2)),
            (BlockKind::Dandelion, all(3, 2)),
        ];

        let definition = CatalogDefinition {
            columns: 4,
            rows: 4,
            blocks: blocks
                .into_iter()
                .map(|(kind, def)| (kind.name().to_string(), def))
                .collect(),
        };
        match Self::from_definition(&definition) {
            Ok(catalog) => catalog,
            Err(err) => unreachable!("builtin catalog is invalid: {err}"),
        }
    }

    /// Validate a parsed definition and resolve every face.
    pub fn from_definition(def: &CatalogDefinition) -> Result<Self, CatalogError> {
        if def.columns == 0 || def.rows == 0 {
            return Err(CatalogError::InvalidLayout(format!(
                "atlas grid must be non-empty, got {}x{}",
                def.columns, def.rows
            )));
        }

        let mut faces = [FaceUvs::default(); BlockKind::COUNT];
        let mut seen = [false; BlockKind::COUNT];
        for (name, model) in &def.blocks {
            let kind = BlockKind::from_name(name)
                .filter(|kind| !kind.is_air())
                .ok_or_else(|| CatalogError::UnknownKind(name.clone()))?;
            faces[kind as usize] = FaceUvs::resolve(kind.name(), model, def.columns, def.rows)?;
            seen[kind as usize] = true;
        }

        if let Some(missing) = BlockKind::ALL
            .iter()
            .find(|kind| !kind.is_air() && !seen[**kind as usize])
        {
            return Err(CatalogError::MissingModel(missing.name()));
        }

        Ok(Self {
            columns: def.columns,
            rows: def.rows,
            faces,
        })
    }

    /// Atlas grid dimensions `(columns, rows)`.
    pub fn grid(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Resolved UVs for `kind`.
    pub fn uvs(&self, kind: BlockKind) -> &FaceUvs {
        &self.faces[kind as usize]
    }

    /// The four vertices of `kind`'s face toward `dir` for the block at `pos`.
    pub fn face(&self, kind: BlockKind, dir: Direction, pos: BlockPos) -> [MeshVertex; 4] {
        self.build_face(kind, dir, pos, 1.0)
    }

    /// Water face. Without water above, the top corners drop to
    /// [`WATER_SURFACE_HEIGHT`] so the surface sits below the block top.
    pub fn fluid_face(&self, dir: Direction, pos: BlockPos, water_above: bool) -> [MeshVertex; 4] {
        let top = if water_above { 1.0 } else { WATER_SURFACE_HEIGHT };
        self.build_face(BlockKind::Water, dir, pos, top)
    }

    fn build_face(&self, kind: BlockKind, dir: Direction, pos: BlockPos, top: f32) -> [MeshVertex; 4] {
        let uv = self.faces[kind as usize].get(dir);
        let uvs = [[uv.u0, uv.v1], [uv.u1, uv.v1], [uv.u1, uv.v0], [uv.u0, uv.v0]];
        let normal = dir.normal();
        let origin = [pos.x as f32, pos.y as f32, pos.z as f32];
        let corners = &FACE_CORNERS[dir as usize];

        std::array::from_fn(|i| {
            let [cx, cy, cz] = corners[i];
            let cy = if cy > 0.0 { top } else { cy };
            MeshVertex {
                position: [origin[0] + cx, origin[1] + cy, origin[2] + cz],
                normal,
                uv: uvs[i],
            }
        })
    }
}

impl Default for BlockModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn faces_wind_counter_clockwise_from_outside() {
        let catalog = BlockModelCatalog::builtin();
        for dir in Direction::ALL {
            let quad = catalog.face(BlockKind::Stone, dir, BlockPos::new(0, 0, 0));
            let n = cross(
                sub(quad[1].position, quad[0].position),
                sub(quad[2].position, quad[0].position),
            );
            let expected = dir.normal();
            assert_eq!(n, expected, "winding for {dir:?}");
            assert!(quad.iter().all(|v| v.normal == expected));
        }
    }

    #[test]
    fn face_is_offset_to_world_position() {
        let catalog = BlockModelCatalog::builtin();
        let quad = catalog.face(BlockKind::Dirt, Direction::PosY, BlockPos::new(-3, 64, 17));
        for v in quad {
            assert_eq!(v.position[1], 65.0);
            assert!((-3.0..=-2.0).contains(&v.position[0]));
            assert!((17.0..=18.0).contains(&v.position[2]));
        }
    }

    #[test]
    fn grass_uses_distinct_top_and_side() {
        let catalog = BlockModelCatalog::builtin();
        let uvs = catalog.uvs(BlockKind::Grass);
        assert_ne!(uvs.get(Direction::PosY), uvs.get(Direction::PosX));
        assert_eq!(uvs.get(Direction::NegY), catalog.uvs(BlockKind::Dirt).get(Direction::NegY));
    }

    #[test]
    fn fluid_top_is_lowered_without_water_above() {
        let catalog = BlockModelCatalog::builtin();
        let pos = BlockPos::new(0, 60, 0);

        let open = catalog.fluid_face(Direction::PosY, pos, false);
        assert!(open.iter().all(|v| v.position[1] == 60.0 + WATER_SURFACE_HEIGHT));

        let covered = catalog.fluid_face(Direction::PosY, pos, true);
        assert!(covered.iter().all(|v| v.position[1] == 61.0));

        let side = catalog.fluid_face(Direction::NegX, pos, false);
        let heights: Vec<f32> = side.iter().map(|v| v.position[1]).collect();
        assert_eq!(heights, vec![60.0, 60.0, 60.0 + WATER_SURFACE_HEIGHT, 60.0 + WATER_SURFACE_HEIGHT]);
    }

    #[test]
    fn missing_model_is_rejected() {
        let mut definition = CatalogDefinition {
            columns: 2,
            rows: 2,
            blocks: Default::default(),
        };
        definition.blocks.insert(
            "stone".into(),
            BlockModelDefinition {
                all: Some([0, 0]),
                ..Default::default()
            },
        );
        let err = BlockModelCatalog::from_definition(&definition).unwrap_err();
        assert!(matches!(err, CatalogError::MissingModel("dirt")));
    }

    #[test]
    fn air_and_unknown_names_are_rejected() {
        for name in ["air", "obsidian"] {
            let mut definition = CatalogDefinition {
                columns: 1,
                rows: 1,
                blocks: Default::default(),
            };
            definition.blocks.insert(name.into(), BlockModelDefinition::default());
            let err = BlockModelCatalog::from_definition(&definition).unwrap_err();
            assert!(matches!(err, CatalogError::UnknownKind(ref n) if n == name));
        }
    }
}
