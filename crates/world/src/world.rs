use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;

use blockworld_assets::BlockModelCatalog;
use blockworld_core::{BlockKind, BlockPos, ChunkPos, Direction, LocalPos, SimTick};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunk::Chunk;
use crate::frustum::Frustum;
use crate::mesh::ChunkMesh;
use crate::noise::{NoiseConfig, NoiseProvider, PerlinHeight};
use crate::persist::{ChunkPersistence, EditRecord};
use crate::terrain::TerrainGenerator;
use crate::translucent::TranslucentMesh;
use crate::visibility::NeighborLookup;

/// World settings, loadable from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for terrain and per-chunk randomness.
    pub seed: u64,
    /// Streaming radius in chunks; the window is `(2R+1)^2` chunks.
    pub render_distance: i32,
    /// Root directory for edit logs.
    pub save_dir: PathBuf,
    /// Horizontal feature scale of the height field, in blocks.
    pub terrain_grid_size: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            render_distance: 4,
            save_dir: PathBuf::from("saves"),
            terrain_grid_size: 64.0,
        }
    }
}

/// Per-frame camera state.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Combined view-projection matrix (0..1 depth).
    pub view_projection: Mat4,
    /// Observer world position. Movement inside the tracked chunk re-sorts
    /// its blended faces; chunk crossings go through [`World::track`].
    pub observer: Vec3,
}

/// Renderable piece of one chunk.
#[derive(Debug, Clone, Copy)]
pub enum RenderPiece<'a> {
    /// Opaque terrain mesh.
    TerrainChunk {
        /// Owning chunk.
        position: ChunkPos,
        /// Mesh snapshot.
        mesh: &'a ChunkMesh,
    },
    /// Ordered blended geometry.
    TranslucentBatch {
        /// Owning chunk.
        position: ChunkPos,
        /// Mesh snapshot with category ranges.
        mesh: &'a TranslucentMesh,
    },
}

impl RenderPiece<'_> {
    /// Chunk the piece belongs to.
    pub fn position(&self) -> ChunkPos {
        match self {
            RenderPiece::TerrainChunk { position, .. }
            | RenderPiece::TranslucentBatch { position, .. } => *position,
        }
    }

    /// Triangles submitted for this piece.
    pub fn triangle_count(&self) -> usize {
        match self {
            RenderPiece::TerrainChunk { mesh, .. } => mesh.triangle_count(),
            RenderPiece::TranslucentBatch { mesh, .. } => mesh.indices.len() / 3,
        }
    }
}

/// What one [`World::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Chunk generated this tick.
    pub added: Option<ChunkPos>,
    /// Chunks whose meshes were rebuilt.
    pub rebuilt: usize,
    /// Chunks inside the frustum.
    pub visible: usize,
    /// Chunks skipped by frustum culling.
    pub culled: usize,
}

/// Loaded chunks around a tracked observer.
pub struct World {
    config: WorldConfig,
    catalog: BlockModelCatalog,
    noise: Box<dyn NoiseProvider>,
    persistence: ChunkPersistence,
    chunks: HashMap<ChunkPos, Chunk>,
    pending: VecDeque<ChunkPos>,
    /// Tree blocks waiting for an unloaded chunk, keyed by target then by
    /// the chunk whose generation produced them.
    overrides: HashMap<ChunkPos, BTreeMap<ChunkPos, Vec<(LocalPos, BlockKind)>>>,
    tracked_chunk: Option<ChunkPos>,
    tracked_block: Option<BlockPos>,
    draw_order: Vec<ChunkPos>,
    order_dirty: bool,
    removed: Vec<ChunkPos>,
    tick: SimTick,
}

impl World {
    /// World with Perlin terrain for `config.seed`.
    pub fn new(config: WorldConfig, catalog: BlockModelCatalog) -> Self {
        let noise = PerlinHeight::new(config.seed, NoiseConfig::default());
        Self::with_noise(config, catalog, Box::new(noise))
    }

    /// World with a custom height field.
    pub fn with_noise(
        config: WorldConfig,
        catalog: BlockModelCatalog,
        noise: Box<dyn NoiseProvider>,
    ) -> Self {
        let persistence = ChunkPersistence::new(&config.save_dir, config.seed);
        Self {
            config,
            catalog,
            noise,
            persistence,
            chunks: HashMap::new(),
            pending: VecDeque::new(),
            overrides: HashMap::new(),
            tracked_chunk: None,
            tracked_block: None,
            draw_order: Vec::new(),
            order_dirty: false,
            removed: Vec::new(),
            tick: SimTick::ZERO,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BlockModelCatalog {
        &self.catalog
    }

    pub fn persistence(&self) -> &ChunkPersistence {
        &self.persistence
    }

    /// Updates run so far.
    pub fn tick(&self) -> SimTick {
        self.tick
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Loaded coordinates, sorted.
    pub fn loaded_positions(&self) -> Vec<ChunkPos> {
        let mut positions: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        positions.sort();
        positions
    }

    /// Queued chunk additions in processing order.
    pub fn pending_adds(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.pending.iter().copied()
    }

    /// Number of blocks waiting for `pos` to be generated.
    pub fn pending_override_count(&self, pos: ChunkPos) -> usize {
        self.overrides
            .get(&pos)
            .map_or(0, |sources| sources.values().map(Vec::len).sum())
    }

    pub fn tracked_chunk(&self) -> Option<ChunkPos> {
        self.tracked_chunk
    }

    pub fn tracked_block(&self) -> Option<BlockPos> {
        self.tracked_block
    }

    /// Loaded chunks, farthest from the tracked chunk first.
    pub fn draw_order(&self) -> &[ChunkPos] {
        &self.draw_order
    }

    /// Chunks dropped since the last call, in removal order.
    ///
    /// At most [`World::removal_backlog`] entries are kept between calls;
    /// older ones are discarded.
    pub fn take_removed(&mut self) -> Vec<ChunkPos> {
        std::mem::take(&mut self.removed)
    }

    /// Block at a world position, if its chunk is loaded.
    pub fn block(&self, pos: BlockPos) -> Option<BlockKind> {
        self.chunks.block_at(pos)
    }

    /// Poll the observer position and raise chunk/block change events.
    ///
    /// Returns true when the observer entered a new chunk.
    pub fn track(&mut self, position: Vec3) -> bool {
        let block = BlockPos::containing(position.x, position.y, position.z);
        let chunk = block.chunk();
        let crossed = self.tracked_chunk != Some(chunk);
        if crossed {
            self.on_tracked_chunk_changed(chunk);
        }
        if self.tracked_block != Some(block) {
            self.on_tracked_block_changed(block);
        }
        crossed
    }

    /// Move the streaming window to `center`.
    ///
    /// Chunks outside the new window are dropped immediately. Missing window
    /// chunks are queued nearest first and generated one per update.
    pub fn on_tracked_chunk_changed(&mut self, center: ChunkPos) {
        if let Some(previous) = self.tracked_chunk.replace(center) {
            if let Some(chunk) = self.chunks.get_mut(&previous) {
                chunk.set_center(false);
            }
        }
        let reference = self.tracked_block.map(BlockPos::center);
        if let Some(chunk) = self.chunks.get_mut(&center) {
            chunk.set_center(true);
            if let Some(reference) = reference {
                chunk.set_sort_reference(reference);
            }
        }

        let radius = self.config.render_distance.max(0);
        let outside: Vec<ChunkPos> = self
            .loaded_positions()
            .into_iter()
            .filter(|pos| pos.chebyshev(center) > radius)
            .collect();
        for pos in &outside {
            self.remove_chunk(*pos);
        }

        self.pending.retain(|target| target.chebyshev(center) <= radius);
        self.overrides.retain(|target, _| target.chebyshev(center) <= radius + 1);
        let mut fresh = Vec::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let target = ChunkPos::new(center.x + dx, center.z + dz);
                if self.pending.contains(&target) || self.chunks.contains_key(&target) {
                    continue;
                }
                fresh.push(target);
            }
        }
        fresh.sort_by_key(|target| (target.distance_sq(center), target.x, target.z));
        let queued = fresh.len();
        self.pending.extend(fresh);
        self.order_dirty = true;

        info!(
            center = %center,
            removed = outside.len(),
            queued,
            pending = self.pending.len(),
            "Streaming window moved"
        );
    }

    /// Record the observer's block and re-sort the center chunk around it.
    pub fn on_tracked_block_changed(&mut self, block: BlockPos) {
        self.tracked_block = Some(block);
        if let Some(center) = self.tracked_chunk {
            if let Some(chunk) = self.chunks.get_mut(&center) {
                chunk.set_sort_reference(block.center());
            }
        }
    }

    /// One frame: generate at most one queued chunk, rebuild dirty chunks,
    /// refresh draw order and frustum visibility.
    pub fn update(&mut self, frame: &FrameInput) -> UpdateStats {
        self.tick = self.tick.advance(1);
        let observed = BlockPos::containing(frame.observer.x, frame.observer.y, frame.observer.z);
        if self.tracked_chunk == Some(observed.chunk()) && self.tracked_block != Some(observed) {
            self.on_tracked_block_changed(observed);
        }

        let mut stats = UpdateStats {
            added: self.process_next_add(),
            ..UpdateStats::default()
        };

        if self.order_dirty {
            self.resort_draw_order();
        }

        let stale: Vec<ChunkPos> = self
            .draw_order
            .iter()
            .copied()
            .filter(|pos| {
                self.chunks
                    .get(pos)
                    .is_some_and(|chunk| !chunk.dirty_flags().is_empty())
            })
            .collect();
        for pos in stale {
            if let Some(mut chunk) = self.chunks.remove(&pos) {
                if chunk.update(&self.chunks, &self.catalog) {
                    stats.rebuilt += 1;
                }
                self.chunks.insert(pos, chunk);
            }
        }

        let frustum = Frustum::from_view_projection(frame.view_projection);
        for chunk in self.chunks.values_mut() {
            if chunk.update_visibility(&frustum) {
                stats.visible += 1;
            } else {
                stats.culled += 1;
            }
        }

        debug!(tick = self.tick.0, ?stats, "World updated");
        stats
    }

    /// Renderable pieces for the current frame: opaque meshes far to near,
    /// then blended batches far to near. Culled chunks are skipped.
    pub fn render_pieces(&self) -> Vec<RenderPiece<'_>> {
        let visible = || {
            self.draw_order
                .iter()
                .filter_map(|pos| self.chunks.get(pos))
                .filter(|chunk| chunk.is_visible())
        };

        let mut pieces: Vec<RenderPiece<'_>> = visible()
            .filter(|chunk| !chunk.opaque_mesh().is_empty())
            .map(|chunk| RenderPiece::TerrainChunk {
                position: chunk.position(),
                mesh: chunk.opaque_mesh(),
            })
            .collect();
        pieces.extend(
            visible()
                .filter(|chunk| !chunk.translucent_mesh().is_empty())
                .map(|chunk| RenderPiece::TranslucentBatch {
                    position: chunk.position(),
                    mesh: chunk.translucent_mesh(),
                }),
        );
        pieces
    }

    /// Gameplay block write: updates the grid, invalidates neighbours on
    /// both sides of a chunk border and appends to the edit log.
    ///
    /// Returns false when the chunk is not loaded, `y` is out of range or
    /// the block already has that kind.
    pub fn set_block(&mut self, pos: BlockPos, kind: BlockKind) -> bool {
        let Some(local) = pos.local() else {
            return false;
        };
        let chunk_pos = pos.chunk();
        let Some(chunk) = self.chunks.get_mut(&chunk_pos) else {
            debug!(?pos, "Ignoring edit in unloaded chunk");
            return false;
        };
        if !chunk.set_block(local, kind) {
            return false;
        }
        self.mark_across_border(pos);

        if let Err(err) = self.persistence.append(chunk_pos, EditRecord { local, kind }) {
            warn!(%err, chunk = %chunk_pos, "Edit not persisted");
        }
        true
    }

    /// Add a chunk and stitch it with every loaded cardinal neighbour, both
    /// ways. Replaces any chunk already at that position.
    pub fn insert_chunk(&mut self, mut chunk: Chunk) {
        let pos = chunk.position();
        if self.tracked_chunk == Some(pos) {
            chunk.set_center(true);
            if let Some(block) = self.tracked_block {
                chunk.set_sort_reference(block.center());
            }
        }

        for dir in Direction::CARDINAL {
            if let Some(neighbor) = self.chunks.get_mut(&pos.neighbor(dir)) {
                chunk.stitch_border(dir, neighbor);
                neighbor.stitch_border(dir.opposite(), &chunk);
            }
        }

        self.chunks.insert(pos, chunk);
        self.order_dirty = true;
    }

    /// Drop a chunk and report it through [`World::take_removed`].
    ///
    /// Loaded cardinal neighbours re-open their faces toward it, and tree
    /// blocks it spilled into still-unloaded chunks are forgotten.
    pub fn remove_chunk(&mut self, pos: ChunkPos) -> Option<Chunk> {
        let chunk = self.chunks.remove(&pos)?;
        if self.persistence.open_chunk() == Some(pos) {
            self.persistence.close();
        }
        for dir in Direction::CARDINAL {
            if let Some(neighbor) = self.chunks.get_mut(&pos.neighbor(dir)) {
                neighbor.open_border(dir.opposite());
            }
        }
        self.forget_spills_from(pos);

        self.removed.push(pos);
        let backlog = self.removal_backlog();
        if self.removed.len() > backlog {
            let dropped = self.removed.len() - backlog;
            self.removed.drain(..dropped);
            debug!(dropped, "Discarded unpolled removals");
        }
        self.order_dirty = true;
        debug!(chunk = %pos, "Removed chunk");
        Some(chunk)
    }

    /// Unpolled removals kept by [`World::take_removed`]: four windows' worth.
    pub fn removal_backlog(&self) -> usize {
        let side = 2 * self.config.render_distance.max(0) as usize + 1;
        4 * side * side
    }

    /// Generate, assemble and insert the chunk at `pos`.
    pub fn load_chunk(&mut self, pos: ChunkPos) {
        let generator = TerrainGenerator::new(
            self.config.seed,
            self.config.terrain_grid_size,
            self.noise.as_ref(),
        );
        let terrain = generator.generate(pos, &self.chunks);

        self.forget_spills_from(pos);
        for (world, kind) in terrain.spills {
            self.place_spill(pos, world, kind);
        }

        let overrides: Vec<(LocalPos, BlockKind)> = self
            .overrides
            .remove(&pos)
            .unwrap_or_default()
            .into_values()
            .flatten()
            .collect();
        let edits = self.persistence.load(pos).unwrap_or_else(|err| {
            warn!(%err, chunk = %pos, "Edits not loaded");
            Vec::new()
        });

        let chunk = Chunk::from_terrain(pos, terrain.blocks, &overrides, &edits);
        debug!(
            chunk = %pos,
            overrides = overrides.len(),
            edits = edits.len(),
            lowest = chunk.lowest_y(),
            highest = chunk.highest_y(),
            "Loaded chunk"
        );
        self.insert_chunk(chunk);
    }

    fn process_next_add(&mut self) -> Option<ChunkPos> {
        let center = self.tracked_chunk?;
        let radius = self.config.render_distance.max(0);
        while let Some(target) = self.pending.pop_front() {
            if target.chebyshev(center) > radius || self.chunks.contains_key(&target) {
                continue;
            }
            self.load_chunk(target);
            return Some(target);
        }
        None
    }

    /// Route one tree block generated by `source` into its chunk.
    fn place_spill(&mut self, source: ChunkPos, world: BlockPos, kind: BlockKind) {
        let Some(local) = world.local() else {
            return;
        };
        let target = world.chunk();
        match self.chunks.get_mut(&target) {
            Some(chunk) => {
                if chunk.place_if_air(local, kind) {
                    self.mark_across_border(world);
                }
            }
            None => self
                .overrides
                .entry(target)
                .or_default()
                .entry(source)
                .or_default()
                .push((local, kind)),
        }
    }

    fn forget_spills_from(&mut self, source: ChunkPos) {
        self.overrides.retain(|_, sources| {
            sources.remove(&source);
            !sources.is_empty()
        });
    }

    fn mark_across_border(&mut self, pos: BlockPos) {
        let home = pos.chunk();
        for dir in Direction::CARDINAL {
            let next = pos.offset(dir);
            if next.chunk() == home {
                continue;
            }
            if let (Some(chunk), Some(local)) = (self.chunks.get_mut(&next.chunk()), next.local()) {
                chunk.mark_block_dirty(local);
            }
        }
    }

    fn resort_draw_order(&mut self) {
        let center = self.tracked_chunk.unwrap_or(ChunkPos::new(0, 0));
        let mut order = self.loaded_positions();
        order.sort_by(|a, b| {
            b.distance_sq(center)
                .cmp(&a.distance_sq(center))
                .then_with(|| a.cmp(b))
        });
        self.draw_order = order;
        self.order_dirty = false;
    }
}
