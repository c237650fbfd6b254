use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Chunk width and depth in voxels.
pub const CHUNK_SIZE: usize = 16;
/// Chunk height in voxels.
pub const CHUNK_HEIGHT: usize = 256;

/// Chunk coordinate (X,Z) in chunk space.
///
/// The world-space origin is always a multiple of [`CHUNK_SIZE`].
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    /// Chunk index along X.
    pub x: i32,
    /// Chunk index along Z.
    pub z: i32,
}

impl ChunkPos {
    /// Create a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World-space block coordinate of the chunk's (0, 0) column.
    pub const fn origin(self) -> (i32, i32) {
        (self.x * CHUNK_SIZE as i32, self.z * CHUNK_SIZE as i32)
    }

    /// Adjacent chunk in a horizontal direction. Vertical directions return `self`.
    pub const fn neighbor(self, dir: Direction) -> Self {
        let (dx, _, dz) = dir.offset();
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev(self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// Squared euclidean distance in chunks.
    pub fn distance_sq(self, other: ChunkPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// Hash that is stable across runs and platforms.
    pub fn stable_hash(self) -> u64 {
        let packed = ((self.x as u32 as u64) << 32) | self.z as u32 as u64;
        // splitmix64 finalizer
        let mut h = packed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        h ^ (h >> 31)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalPos {
    /// Column X in `[0, CHUNK_SIZE)`.
    pub x: usize,
    /// Height in `[0, CHUNK_HEIGHT)`.
    pub y: usize,
    /// Column Z in `[0, CHUNK_SIZE)`.
    pub z: usize,
}

impl LocalPos {
    /// Create a local position (unchecked).
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Build from signed components, returning `None` when outside the chunk.
    pub fn checked(x: i32, y: i32, z: i32) -> Option<Self> {
        let inside = (0..CHUNK_SIZE as i32).contains(&x)
            && (0..CHUNK_HEIGHT as i32).contains(&y)
            && (0..CHUNK_SIZE as i32).contains(&z);
        inside.then(|| Self::new(x as usize, y as usize, z as usize))
    }

    /// True when every component lies inside the chunk.
    #[inline]
    pub fn in_bounds(self) -> bool {
        self.x < CHUNK_SIZE && self.y < CHUNK_HEIGHT && self.z < CHUNK_SIZE
    }

    /// Linear index into a `[x][z][y]` grid.
    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE);
        debug_assert!(self.y < CHUNK_HEIGHT);
        debug_assert!(self.z < CHUNK_SIZE);
        (self.x * CHUNK_SIZE + self.z) * CHUNK_HEIGHT + self.y
    }

    /// Inverse of [`LocalPos::index`].
    #[inline]
    pub fn from_index(index: usize) -> Self {
        let y = index % CHUNK_HEIGHT;
        let column = index / CHUNK_HEIGHT;
        Self::new(column / CHUNK_SIZE, y, column % CHUNK_SIZE)
    }

    /// Pack into 16 bits: `y` in the high byte, then `x` and `z` nibbles.
    #[inline]
    pub fn pack(self) -> u16 {
        ((self.y as u16) << 8) | ((self.x as u16) << 4) | self.z as u16
    }

    /// Inverse of [`LocalPos::pack`]. Every `u16` is a valid position.
    #[inline]
    pub fn unpack(packed: u16) -> Self {
        Self::new(
            ((packed >> 4) & 0xF) as usize,
            (packed >> 8) as usize,
            (packed & 0xF) as usize,
        )
    }

    /// Step one block in `dir`, staying inside the chunk.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dx, dy, dz) = dir.offset();
        Self::checked(
            self.x as i32 + dx,
            self.y as i32 + dy,
            self.z as i32 + dz,
        )
    }
}

/// World-space block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// World X.
    pub x: i32,
    /// World Y.
    pub y: i32,
    /// World Z.
    pub z: i32,
}

impl BlockPos {
    /// Create a world block coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World position of `local` inside `chunk`.
    pub fn from_local(chunk: ChunkPos, local: LocalPos) -> Self {
        let (ox, oz) = chunk.origin();
        Self::new(ox + local.x as i32, local.y as i32, oz + local.z as i32)
    }

    /// Block containing a floating point world position.
    pub fn containing(x: f32, y: f32, z: f32) -> Self {
        Self::new(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    /// Chunk that owns this column.
    pub fn chunk(self) -> ChunkPos {
        ChunkPos::new(
            self.x.div_euclid(CHUNK_SIZE as i32),
            self.z.div_euclid(CHUNK_SIZE as i32),
        )
    }

    /// Position inside the owning chunk, or `None` when `y` is out of range.
    pub fn local(self) -> Option<LocalPos> {
        LocalPos::checked(
            self.x.rem_euclid(CHUNK_SIZE as i32),
            self.y,
            self.z.rem_euclid(CHUNK_SIZE as i32),
        )
    }

    /// Neighbouring block in `dir`.
    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Center of the block.
    pub fn center(self) -> [f32; 3] {
        [
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        ]
    }
}
