use blockworld_core::Direction;

use crate::{BlockModelDefinition, CatalogError};

/// Normalized UV rectangle of one atlas cell (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvRect {
    /// Left U coordinate.
    pub u0: f32,
    /// Top V coordinate.
    pub v0: f32,
    /// Right U coordinate.
    pub u1: f32,
    /// Bottom V coordinate.
    pub v1: f32,
}

impl UvRect {
    /// Rectangle covering grid cell `[column, row]`.
    pub fn cell(cell: [u32; 2], columns: u32, rows: u32) -> Result<Self, CatalogError> {
        let [column, row] = cell;
        if column >= columns || row >= rows {
            return Err(CatalogError::InvalidLayout(format!(
                "cell [{column}, {row}] outside {columns}x{rows} grid"
            )));
        }
        let w = 1.0 / columns as f32;
        let h = 1.0 / rows as f32;
        Ok(Self {
            u0: column as f32 * w,
            v0: row as f32 * h,
            u1: (column + 1) as f32 * w,
            v1: (row + 1) as f32 * h,
        })
    }
}

/// Resolved UVs for the six faces of one block kind, indexed by [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceUvs([UvRect; 6]);

impl FaceUvs {
    /// UV rectangle for `dir`.
    #[inline]
    pub fn get(&self, dir: Direction) -> UvRect {
        self.0[dir as usize]
    }

    pub(crate) fn resolve(
        kind: &'static str,
        def: &BlockModelDefinition,
        columns: u32,
        rows: u32,
    ) -> Result<Self, CatalogError> {
        let mut faces = [UvRect::default(); 6];
        for dir in Direction::ALL {
            let cell = cell_for(def, dir).ok_or(CatalogError::MissingFace {
                kind,
                face: face_name(dir),
            })?;
            faces[dir as usize] = UvRect::cell(cell, columns, rows)?;
        }
        Ok(Self(faces))
    }
}

fn cell_for(def: &BlockModelDefinition, dir: Direction) -> Option<[u32; 2]> {
    let specific = match dir {
        Direction::PosY => def.top,
        Direction::NegY => def.bottom,
        Direction::NegZ => def.north,
        Direction::PosZ => def.south,
        Direction::PosX => def.east,
        Direction::NegX => def.west,
    };
    let side = if dir.is_cardinal() { def.side } else { None };
    specific.or(side).or(def.all)
}

fn face_name(dir: Direction) -> &'static str {
    match dir {
        Direction::PosY => "top",
        Direction::NegY => "bottom",
        Direction::NegZ => "north",
        Direction::PosZ => "south",
        Direction::PosX => "east",
        Direction::NegX => "west",
    }
}
