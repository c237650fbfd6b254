//! Column-by-column terrain generation.
//!
//! Each column samples one height, becomes a beach under water or a grass
//! surface above it, and may grow a tree or a flower. Blocks that fall into
//! another chunk are returned as spills for the world to route.

use blockworld_core::{chunk_rng, BlockKind, BlockPos, ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};
use rand::Rng;
use tracing::{debug, instrument};

use crate::chunk::CHUNK_VOLUME;
use crate::noise::NoiseProvider;
use crate::trees::{PlantingSite, Tree};
use crate::visibility::NeighborLookup;

/// Highest water-filled y.
pub const WATER_LEVEL: usize = 62;
/// Surface y for a zero height sample.
pub const TERRAIN_BASE: usize = 48;
/// Surface rise for a height sample of one.
pub const TERRAIN_AMPLITUDE: f32 = 40.0;
/// Dirt layers between the surface and stone.
pub const DIRT_DEPTH: usize = 3;
/// One in this many grass columns attempts a tree.
pub const TREE_CHANCE: u32 = 50;
/// One in this many grass columns attempts a flower.
pub const FLOWER_CHANCE: u32 = 20;

/// Headroom kept above the surface for a full tree.
const SURFACE_HEADROOM: usize = 10;

/// Generated grid plus blocks addressed to other chunks.
#[derive(Debug, Clone)]
pub struct GeneratedTerrain {
    /// `[x][z][y]` grid.
    pub blocks: Vec<BlockKind>,
    /// World-positioned blocks that belong to neighbouring chunks.
    pub spills: Vec<(BlockPos, BlockKind)>,
}

/// Terrain generator for one world seed.
pub struct TerrainGenerator<'a> {
    world_seed: u64,
    grid_size: f64,
    noise: &'a dyn NoiseProvider,
}

impl<'a> TerrainGenerator<'a> {
    /// Generator sampling `noise` at `grid_size` horizontal scale.
    pub fn new(world_seed: u64, grid_size: f64, noise: &'a dyn NoiseProvider) -> Self {
        Self {
            world_seed,
            grid_size,
            noise,
        }
    }

    /// Surface y for a normalized height sample.
    pub fn surface_level(height: f32) -> usize {
        let level = TERRAIN_BASE as f32 + height.clamp(0.0, 1.0) * TERRAIN_AMPLITUDE;
        (level.round() as usize).clamp(1, CHUNK_HEIGHT - SURFACE_HEADROOM)
    }

    /// Generate terrain for a chunk at the given position.
    ///
    /// `neighbors` is only consulted for tree spacing across the border.
    #[instrument(skip(self, neighbors), fields(chunk = %position, world_seed = self.world_seed))]
    pub fn generate<N: NeighborLookup + ?Sized>(&self, position: ChunkPos, neighbors: &N) -> GeneratedTerrain {
        let mut rng = chunk_rng(self.world_seed, position);
        let mut blocks = vec![BlockKind::Air; CHUNK_VOLUME];
        let mut spills = Vec::new();
        let (origin_x, origin_z) = position.origin();
        let mut trees = 0usize;
        let mut flowers = 0usize;

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let world_x = origin_x + x as i32;
                let world_z = origin_z + z as i32;
                let height =
                    self.noise
                        .sample_height(self.world_seed, world_x as f64, world_z as f64, self.grid_size);
                let level = Self::surface_level(height);
                let at = |y: usize| LocalPos::new(x, y, z).index();

                for y in 0..level {
                    blocks[at(y)] = if y + DIRT_DEPTH >= level {
                        BlockKind::Dirt
                    } else {
                        BlockKind::Stone
                    };
                }

                if level <= WATER_LEVEL {
                    blocks[at(level)] = BlockKind::Sand;
                    for y in level + 1..=WATER_LEVEL {
                        blocks[at(y)] = BlockKind::Water;
                    }
                    continue;
                }

                blocks[at(level)] = BlockKind::Grass;

                if rng.gen_ratio(1, TREE_CHANCE) {
                    let tree = Tree::roll(BlockPos::new(world_x, level as i32, world_z), &mut rng);
                    let mut site = PlantingSite {
                        position,
                        blocks: &mut blocks,
                        spills: &mut spills,
                        neighbors,
                    };
                    if site.has_room(&tree) {
                        site.place(&tree);
                        trees += 1;
                    }
                }

                if rng.gen_ratio(1, FLOWER_CHANCE) && blocks[at(level + 1)].is_air() {
                    blocks[at(level + 1)] = if rng.gen_bool(0.5) {
                        BlockKind::Rose
                    } else {
                        BlockKind::Dandelion
                    };
                    flowers += 1;
                }
            }
        }

        debug!(trees, flowers, spills = spills.len(), "Generated terrain");
        GeneratedTerrain { blocks, spills }
    }
}
