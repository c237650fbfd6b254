//! Oak trees planted during terrain generation.

use blockworld_core::{BlockKind, BlockPos, ChunkPos, CHUNK_HEIGHT};
use rand::Rng;

use crate::visibility::NeighborLookup;

/// Columns around a trunk that must be free of logs and leaves.
pub const TREE_EXCLUSION_RADIUS: i32 = 3;

/// Trunk heights are drawn from this range (inclusive).
pub const TREE_HEIGHT_RANGE: (usize, usize) = (4, 5);

/// Tree structure anchored on a surface block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tree {
    /// World position of the surface block the trunk stands on.
    pub base: BlockPos,
    /// Number of log blocks.
    pub trunk_height: usize,
}

impl Tree {
    /// Roll a trunk height for a tree on `base`.
    pub fn roll<R: Rng>(base: BlockPos, rng: &mut R) -> Self {
        let (lo, hi) = TREE_HEIGHT_RANGE;
        Self {
            base,
            trunk_height: rng.gen_range(lo..=hi),
        }
    }

    /// World y of the top log.
    pub fn top(&self) -> i32 {
        self.base.y + self.trunk_height as i32
    }

    /// Every block the tree occupies, logs first.
    pub fn blocks(&self) -> Vec<(BlockPos, BlockKind)> {
        let mut out = Vec::with_capacity(self.trunk_height + 64);
        for dy in 1..=self.trunk_height as i32 {
            out.push((
                BlockPos::new(self.base.x, self.base.y + dy, self.base.z),
                BlockKind::Log,
            ));
        }

        let top = self.top();
        for y in top - 1..=top + 2 {
            let layer = y - top;
            for dx in -2i32..=2 {
                for dz in -2i32..=2 {
                    let include = match layer {
                        -1 | 0 => !(dx.abs() == 2 && dz.abs() == 2),
                        1 => dx.abs() <= 1 && dz.abs() <= 1,
                        _ => dx.abs() + dz.abs() <= 1,
                    };
                    let trunk = dx == 0 && dz == 0 && layer <= 0;
                    if include && !trunk {
                        out.push((
                            BlockPos::new(self.base.x + dx, y, self.base.z + dz),
                            BlockKind::Leaves,
                        ));
                    }
                }
            }
        }
        out
    }
}

/// Chunk-local view used while planting: this chunk's grid, already
/// spilled blocks and loaded neighbours.
pub(crate) struct PlantingSite<'a, N: ?Sized> {
    pub position: ChunkPos,
    pub blocks: &'a mut [BlockKind],
    pub spills: &'a mut Vec<(BlockPos, BlockKind)>,
    pub neighbors: &'a N,
}

impl<N: NeighborLookup + ?Sized> PlantingSite<'_, N> {
    fn kind_at(&self, pos: BlockPos) -> Option<BlockKind> {
        if pos.chunk() == self.position {
            return pos.local().map(|local| self.blocks[local.index()]);
        }
        if let Some(kind) = self.neighbors.block_at(pos) {
            return Some(kind);
        }
        self.spills
            .iter()
            .rev()
            .find(|(spilled, _)| *spilled == pos)
            .map(|(_, kind)| *kind)
    }

    /// True when no log or leaf lies within the exclusion box of `tree`.
    pub fn has_room(&self, tree: &Tree) -> bool {
        let r = TREE_EXCLUSION_RADIUS;
        let crown = tree.top() + 2;
        if crown >= CHUNK_HEIGHT as i32 {
            return false;
        }
        for dx in -r..=r {
            for dz in -r..=r {
                for y in tree.base.y..=crown {
                    let pos = BlockPos::new(tree.base.x + dx, y, tree.base.z + dz);
                    if matches!(self.kind_at(pos), Some(BlockKind::Log | BlockKind::Leaves)) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Write the tree. Cells outside this chunk are spilled for the caller.
    pub fn place(&mut self, tree: &Tree) {
        for (pos, kind) in tree.blocks() {
            if pos.chunk() != self.position {
                self.spills.push((pos, kind));
                continue;
            }
            let Some(local) = pos.local() else {
                continue;
            };
            let cell = &mut self.blocks[local.index()];
            if cell.is_air() {
                *cell = kind;
            }
        }
    }
}
