use std::collections::HashMap;
use std::hash::BuildHasher;
use std::ops::RangeInclusive;

use blockworld_assets::BlockModelCatalog;
use blockworld_core::{BlockKind, BlockPos, ChunkPos, Direction, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};
use glam::Vec3;
use tracing::debug;

use crate::frustum::{Aabb, Frustum};
use crate::mesh::{ChunkMesh, MeshBuilder};
use crate::persist::EditRecord;
use crate::terrain::WATER_LEVEL;
use crate::translucent::{build_translucent, SortMode, TranslucentFace, TranslucentMesh};
use crate::visibility::{face_visible_toward, CacheEntry, FaceCache, NeighborLookup};

/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Dirty flags set whenever chunk data changes.
    pub struct DirtyFlags: u8 {
        /// Cache entries need re-evaluation and both meshes a rebuild.
        const MESH = 0b0000_0001;
        /// Only the blended faces need re-ordering.
        const SORT = 0b0000_0010;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags::empty()
    }
}

/// One 16x16 column stack of blocks plus its cached geometry.
pub struct Chunk {
    position: ChunkPos,
    blocks: Box<[BlockKind]>,
    lowest_y: usize,
    highest_y: usize,
    dirty: DirtyFlags,
    is_center: bool,
    visible: bool,
    sort_reference: Option<[f32; 3]>,
    cache: FaceCache,
    opaque: ChunkMesh,
    translucent_faces: Vec<TranslucentFace>,
    translucent: TranslucentMesh,
}

impl Chunk {
    /// Build a chunk from a full `[x][z][y]` grid.
    ///
    /// Every non-air block with a face that is visible from inside the chunk
    /// (or that faces another chunk) gets a pending cache entry.
    pub fn from_blocks(position: ChunkPos, blocks: Vec<BlockKind>) -> Self {
        assert_eq!(blocks.len(), CHUNK_VOLUME, "chunk grid has wrong size");
        let mut chunk = Self {
            position,
            blocks: blocks.into_boxed_slice(),
            lowest_y: 0,
            highest_y: WATER_LEVEL,
            dirty: DirtyFlags::MESH,
            is_center: false,
            visible: true,
            sort_reference: None,
            cache: FaceCache::default(),
            opaque: ChunkMesh::empty(),
            translucent_faces: Vec::new(),
            translucent: TranslucentMesh::default(),
        };
        chunk.recompute_bounds();
        chunk.seed_cache();
        chunk
    }

    /// Build a chunk by evaluating `fill` at every local position.
    pub fn from_fn(position: ChunkPos, mut fill: impl FnMut(LocalPos) -> BlockKind) -> Self {
        let blocks = (0..CHUNK_VOLUME)
            .map(|index| fill(LocalPos::from_index(index)))
            .collect();
        Self::from_blocks(position, blocks)
    }

    /// Finish generated terrain: pending overrides land in air cells only,
    /// then persisted edits replay in order.
    pub fn from_terrain(
        position: ChunkPos,
        mut blocks: Vec<BlockKind>,
        overrides: &[(LocalPos, BlockKind)],
        edits: &[EditRecord],
    ) -> Self {
        for (local, kind) in overrides {
            if let Some(cell) = slot(*local).map(|index| &mut blocks[index]) {
                if cell.is_air() {
                    *cell = *kind;
                }
            }
        }
        for edit in edits {
            if let Some(index) = slot(edit.local) {
                blocks[index] = edit.kind;
            }
        }
        Self::from_blocks(position, blocks)
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// Block at `local`; out-of-range positions read as air.
    #[inline]
    pub fn block(&self, local: LocalPos) -> BlockKind {
        slot(local).map_or(BlockKind::Air, |index| self.blocks[index])
    }

    /// Block at signed local coordinates; anything outside the chunk is air.
    pub fn block_or_air(&self, x: i32, y: i32, z: i32) -> BlockKind {
        LocalPos::checked(x, y, z).map_or(BlockKind::Air, |local| self.block(local))
    }

    /// Raw `[x][z][y]` grid.
    pub fn blocks(&self) -> &[BlockKind] {
        &self.blocks
    }

    /// Lowest y that may hold a non-air block.
    pub fn lowest_y(&self) -> usize {
        self.lowest_y
    }

    /// Highest y that may hold a non-air block; never below the water level.
    pub fn highest_y(&self) -> usize {
        self.highest_y
    }

    /// World-space bounds: origin to origin + `[16, highest_y + 1, 16]`.
    pub fn aabb(&self) -> Aabb {
        let (ox, oz) = self.position.origin();
        let min = Vec3::new(ox as f32, 0.0, oz as f32);
        let max = min + Vec3::new(CHUNK_SIZE as f32, (self.highest_y + 1) as f32, CHUNK_SIZE as f32);
        Aabb::new(min, max)
    }

    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// True when the next update will rebuild the meshes.
    pub fn needs_rebuild(&self) -> bool {
        self.dirty.contains(DirtyFlags::MESH)
    }

    pub fn is_center(&self) -> bool {
        self.is_center
    }

    /// Flag this chunk as the one under the observer.
    pub fn set_center(&mut self, center: bool) {
        if self.is_center != center {
            self.is_center = center;
            self.dirty.insert(DirtyFlags::SORT);
        }
    }

    /// Observer position used by distance sorting while this is the center.
    pub fn set_sort_reference(&mut self, reference: [f32; 3]) {
        self.sort_reference = Some(reference);
        if self.is_center {
            self.dirty.insert(DirtyFlags::SORT);
        }
    }

    /// Result of the last frustum test.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Re-test against `frustum` and store the result.
    pub fn update_visibility(&mut self, frustum: &Frustum) -> bool {
        self.visible = frustum.intersects_aabb(&self.aabb());
        self.visible
    }

    pub fn opaque_mesh(&self) -> &ChunkMesh {
        &self.opaque
    }

    pub fn translucent_mesh(&self) -> &TranslucentMesh {
        &self.translucent
    }

    /// Unordered blended faces from the last rebuild.
    pub fn translucent_faces(&self) -> &[TranslucentFace] {
        &self.translucent_faces
    }

    /// Number of cached blocks.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cache entry for `local`, if the block is tracked.
    pub fn cache_entry(&self, local: LocalPos) -> Option<&CacheEntry> {
        self.cache.get(&local.pack())
    }

    /// Positions whose cache entries await re-evaluation, sorted.
    pub fn pending_positions(&self) -> Vec<LocalPos> {
        let mut pending: Vec<LocalPos> = self
            .cache
            .iter()
            .filter(|(_, entry)| entry.dirty)
            .map(|(key, _)| LocalPos::unpack(*key))
            .collect();
        pending.sort();
        pending
    }

    /// Write a block and invalidate it plus its in-chunk neighbours.
    ///
    /// Neighbours across a chunk border are the caller's responsibility
    /// (see [`Chunk::mark_block_dirty`]). Returns false when nothing changed
    /// or `local` is outside the chunk.
    pub fn set_block(&mut self, local: LocalPos, kind: BlockKind) -> bool {
        let Some(index) = slot(local) else {
            return false;
        };
        let cell = &mut self.blocks[index];
        if *cell == kind {
            return false;
        }
        *cell = kind;

        if !kind.is_air() {
            self.lowest_y = self.lowest_y.min(local.y);
            self.highest_y = self.highest_y.max(local.y);
        }

        match self.cache.get_mut(&local.pack()) {
            Some(entry) => entry.dirty = true,
            None if !kind.is_air() => {
                self.cache.insert(local.pack(), CacheEntry::pending());
            }
            None => {}
        }
        for dir in Direction::ALL {
            if let Some(next) = local.step(dir) {
                self.mark_block_dirty(next);
            }
        }
        self.dirty.insert(DirtyFlags::MESH);
        true
    }

    /// Write `kind` only if the cell is currently air.
    pub fn place_if_air(&mut self, local: LocalPos, kind: BlockKind) -> bool {
        self.block(local).is_air() && self.set_block(local, kind)
    }

    /// Queue re-evaluation of a non-air block's faces. Air and out-of-range
    /// positions are ignored.
    pub fn mark_block_dirty(&mut self, local: LocalPos) {
        if self.block(local).is_air() {
            return;
        }
        self.cache.entry(local.pack()).or_insert_with(CacheEntry::pending).dirty = true;
        self.dirty.insert(DirtyFlags::MESH);
    }

    /// Re-check the boundary layer facing `dir` against a newly available
    /// `neighbor` and invalidate every block whose face toward it changed.
    ///
    /// Returns the number of entries marked.
    pub fn stitch_border(&mut self, dir: Direction, neighbor: &Chunk) -> usize {
        if !dir.is_cardinal() {
            return 0;
        }
        let lo = self.lowest_y.min(neighbor.lowest_y);
        let hi = self.highest_y.max(neighbor.highest_y);
        let marked = self.restitch_layer(dir, lo..=hi, |theirs| Some(neighbor.block(theirs)));
        debug!(chunk = %self.position, neighbor = %neighbor.position, ?dir, marked, "Stitched border");
        marked
    }

    /// Counterpart of [`Chunk::stitch_border`] for a neighbour that was
    /// unloaded: faces toward `dir` become visible again.
    pub fn open_border(&mut self, dir: Direction) -> usize {
        if !dir.is_cardinal() {
            return 0;
        }
        let marked = self.restitch_layer(dir, self.lowest_y..=self.highest_y, |_| None);
        debug!(chunk = %self.position, ?dir, marked, "Opened border");
        marked
    }

    /// Mark every non-air block on the `dir` edge whose cached face toward
    /// `dir` disagrees with `other`, the block across the border.
    fn restitch_layer(
        &mut self,
        dir: Direction,
        ys: RangeInclusive<usize>,
        other: impl Fn(LocalPos) -> Option<BlockKind>,
    ) -> usize {
        let edge = CHUNK_SIZE - 1;
        let mut marked = 0;

        for along in 0..CHUNK_SIZE {
            let (mine, theirs) = match dir {
                Direction::PosX => ((edge, along), (0, along)),
                Direction::NegX => ((0, along), (edge, along)),
                Direction::PosZ => ((along, edge), (along, 0)),
                _ => ((along, 0), (along, edge)),
            };
            for y in ys.clone() {
                let local = LocalPos::new(mine.0, y, mine.1);
                let kind = self.block(local);
                if kind.is_air() {
                    continue;
                }
                let visible = face_visible_toward(kind, other(LocalPos::new(theirs.0, y, theirs.1)));
                let changed = match self.cache.get(&local.pack()) {
                    Some(entry) => !entry.dirty && (entry.faces & dir.bit() != 0) != visible,
                    None => visible,
                };
                if changed {
                    self.cache.entry(local.pack()).or_insert_with(CacheEntry::pending).dirty = true;
                    marked += 1;
                }
            }
        }

        if marked > 0 {
            self.dirty.insert(DirtyFlags::MESH);
        }
        marked
    }

    /// Rebuild dirty meshes and re-sort blended faces as needed.
    ///
    /// Returns true when the meshes were rebuilt.
    pub fn update<N: NeighborLookup + ?Sized>(&mut self, neighbors: &N, catalog: &BlockModelCatalog) -> bool {
        let rebuilt = self.dirty.contains(DirtyFlags::MESH);
        if rebuilt {
            self.rebuild(neighbors, catalog);
        }
        if rebuilt || self.dirty.contains(DirtyFlags::SORT) {
            self.sort_translucent();
        }
        self.dirty = DirtyFlags::empty();
        rebuilt
    }

    fn rebuild<N: NeighborLookup + ?Sized>(&mut self, neighbors: &N, catalog: &BlockModelCatalog) {
        let Self {
            position,
            blocks,
            cache,
            ..
        } = &mut *self;
        let position = *position;
        let blocks: &[BlockKind] = blocks;

        cache.retain(|key, _| !blocks[LocalPos::unpack(*key).index()].is_air());

        let mut opaque = MeshBuilder::with_capacity(cache.len());
        let mut translucent = Vec::new();
        let mut refreshed = 0usize;

        for blended in [false, true] {
            cache.retain(|&key, entry| {
                let local = LocalPos::unpack(key);
                let kind = blocks[local.index()];
                if kind.is_transparent() != blended {
                    return true;
                }
                if entry.dirty {
                    refresh_entry(entry, position, blocks, local, kind, neighbors, catalog);
                    refreshed += 1;
                    if entry.faces == 0 {
                        return false;
                    }
                }
                match kind.transparency() {
                    Some(category) => translucent.extend(
                        entry
                            .quads
                            .iter()
                            .map(|quad| TranslucentFace::new(*quad, category)),
                    ),
                    None => entry.quads.iter().for_each(|quad| opaque.push_quad(quad)),
                }
                true
            });
        }

        debug!(
            chunk = %position,
            refreshed,
            cached = cache.len(),
            opaque_quads = opaque.quad_count(),
            translucent_quads = translucent.len(),
            "Rebuilt chunk mesh"
        );
        self.opaque = opaque.finish();
        self.translucent_faces = translucent;
    }

    fn sort_translucent(&mut self) {
        let mode = match (self.is_center, self.sort_reference) {
            (true, Some(reference)) => SortMode::Distance { reference },
            _ => SortMode::Category,
        };
        self.translucent = build_translucent(&self.translucent_faces, mode);
    }

    fn recompute_bounds(&mut self) {
        let mut lowest = None;
        let mut highest = None;
        for (index, kind) in self.blocks.iter().enumerate() {
            if kind.is_air() {
                continue;
            }
            let y = index % CHUNK_HEIGHT;
            lowest = Some(lowest.map_or(y, |l: usize| l.min(y)));
            highest = Some(highest.map_or(y, |h: usize| h.max(y)));
        }
        self.highest_y = highest.unwrap_or(0).max(WATER_LEVEL);
        self.lowest_y = lowest.unwrap_or(0).min(self.highest_y);
    }

    fn seed_cache(&mut self) {
        for index in 0..CHUNK_VOLUME {
            let kind = self.blocks[index];
            if kind.is_air() {
                continue;
            }
            let local = LocalPos::from_index(index);
            let exposed = Direction::ALL.into_iter().any(|dir| {
                let next = local.step(dir).map(|next| self.blocks[next.index()]);
                face_visible_toward(kind, next)
            });
            if exposed {
                self.cache.insert(local.pack(), CacheEntry::pending());
            }
        }
    }
}

/// Grid index for `local`, or `None` outside the chunk.
#[inline]
fn slot(local: LocalPos) -> Option<usize> {
    local.in_bounds().then(|| local.index())
}

/// Neighbour kind for a face: in-chunk blocks directly, other chunks through
/// `neighbors`, `None` when unknown.
fn neighbor_kind<N: NeighborLookup + ?Sized>(
    position: ChunkPos,
    blocks: &[BlockKind],
    local: LocalPos,
    dir: Direction,
    neighbors: &N,
) -> Option<BlockKind> {
    if let Some(next) = local.step(dir) {
        return Some(blocks[next.index()]);
    }
    let world = BlockPos::from_local(position, local).offset(dir);
    if !(0..CHUNK_HEIGHT as i32).contains(&world.y) {
        return None;
    }
    neighbors.block_at(world)
}

fn refresh_entry<N: NeighborLookup + ?Sized>(
    entry: &mut CacheEntry,
    position: ChunkPos,
    blocks: &[BlockKind],
    local: LocalPos,
    kind: BlockKind,
    neighbors: &N,
    catalog: &BlockModelCatalog,
) {
    let world = BlockPos::from_local(position, local);
    let water_above = local
        .step(Direction::PosY)
        .is_some_and(|above| blocks[above.index()] == BlockKind::Water);

    entry.faces = 0;
    entry.quads.clear();
    for dir in Direction::ALL {
        if !face_visible_toward(kind, neighbor_kind(position, blocks, local, dir, neighbors)) {
            continue;
        }
        let quad = if kind == BlockKind::Water {
            catalog.fluid_face(dir, world, water_above)
        } else {
            catalog.face(kind, dir, world)
        };
        entry.faces |= dir.bit();
        entry.quads.push(quad);
    }
    entry.dirty = false;
}

impl<S: BuildHasher> NeighborLookup for HashMap<ChunkPos, Chunk, S> {
    fn block_at(&self, pos: BlockPos) -> Option<BlockKind> {
        let local = pos.local()?;
        self.get(&pos.chunk()).map(|chunk| chunk.block(local))
    }
}
