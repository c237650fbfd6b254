//! Face visibility rules and the per-block face cache.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use blockworld_assets::MeshVertex;
use blockworld_core::{BlockKind, BlockPos};

/// Read access to blocks owned by other chunks.
pub trait NeighborLookup {
    /// Block at `pos`, or `None` when its chunk is not loaded or `y` is out
    /// of range.
    fn block_at(&self, pos: BlockPos) -> Option<BlockKind>;
}

/// Lookup for a chunk with no loaded neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNeighbors;

impl NeighborLookup for NoNeighbors {
    fn block_at(&self, _pos: BlockPos) -> Option<BlockKind> {
        None
    }
}

/// Whether a face of `current` toward `neighbor` is drawn.
///
/// Leaves always show their faces toward other leaves; any other pair of
/// identical transparent kinds hides the shared face.
pub fn face_visible(current: BlockKind, neighbor: BlockKind) -> bool {
    if neighbor.is_air() {
        return true;
    }
    match (current.is_transparent(), neighbor.is_transparent()) {
        (false, false) => false,
        (true, true) => current != neighbor || current == BlockKind::Leaves,
        _ => true,
    }
}

/// [`face_visible`] against a neighbour that may be unknown.
///
/// Unknown neighbours (unloaded chunk, outside the height range) count as
/// visible.
#[inline]
pub fn face_visible_toward(current: BlockKind, neighbor: Option<BlockKind>) -> bool {
    neighbor.map_or(true, |kind| face_visible(current, kind))
}

/// Cached output for one non-air block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    /// Faces must be re-evaluated on the next rebuild.
    pub dirty: bool,
    /// Bitmask of emitted faces, one bit per [`blockworld_core::Direction`].
    pub faces: u8,
    /// Emitted quads in direction order.
    pub quads: Vec<[MeshVertex; 4]>,
}

impl CacheEntry {
    /// Entry that has not been evaluated yet.
    pub fn pending() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }
}

/// Face cache keyed by [`blockworld_core::LocalPos::pack`].
///
/// Uses a fixed hasher so iteration order, and with it mesh layout, is the
/// same on every run.
pub type FaceCache = HashMap<u16, CacheEntry, BuildHasherDefault<DefaultHasher>>;

#[cfg(test)]
mod tests {
    use super::*;
    use BlockKind::*;

    #[test]
    fn air_neighbour_exposes_everything() {
        for kind in BlockKind::ALL.into_iter().filter(|k| !k.is_air()) {
            assert!(face_visible(kind, Air), "{kind:?}");
        }
    }

    #[test]
    fn opaque_pairs_hide_each_other() {
        assert!(!face_visible(Stone, Dirt));
        assert!(!face_visible(Grass, Grass));
    }

    #[test]
    fn mixed_transparency_is_visible_both_ways() {
        assert!(face_visible(Stone, Water));
        assert!(face_visible(Water, Stone));
        assert!(face_visible(Glass, Sand));
    }

    #[test]
    fn same_transparent_kind_hides_except_leaves() {
        assert!(!face_visible(Water, Water));
        assert!(!face_visible(Glass, Glass));
        assert!(face_visible(Leaves, Leaves));
        assert!(face_visible(Water, Glass));
        assert!(face_visible(Rose, Dandelion));
    }

    #[test]
    fn unknown_neighbour_fails_open() {
        assert!(face_visible_toward(Stone, None));
        assert!(!face_visible_toward(Stone, Some(Stone)));
        assert!(NoNeighbors.block_at(BlockPos::new(0, 0, 0)).is_none());
    }
}
