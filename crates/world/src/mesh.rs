use blake3::Hasher;
use blockworld_assets::MeshVertex;

/// Index pattern for one quad (two triangles).
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Hash of the combined vertex/index buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHash(pub [u8; 32]);

impl MeshHash {
    /// Lowercase hex rendering of the hash.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Opaque mesh output for one chunk.
#[derive(Debug, Clone)]
pub struct ChunkMesh {
    /// Vertex buffer used for draw submission.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indexing into `vertices`.
    pub indices: Vec<u32>,
    /// Stable hash of the vertex + index buffers for cache comparisons.
    pub hash: MeshHash,
}

impl ChunkMesh {
    /// Construct an empty mesh (useful for initialization).
    pub fn empty() -> Self {
        MeshBuilder::new().finish()
    }

    /// Number of triangles in the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Default for ChunkMesh {
    fn default() -> Self {
        Self::empty()
    }
}

/// Accumulates quads into one indexed buffer pair.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder sized for roughly `quads` faces.
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// Append one quad, reusing its vertices as-is.
    pub fn push_quad(&mut self, quad: &[MeshVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(quad);
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Number of quads pushed so far.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Seal the buffers and hash them.
    pub fn finish(self) -> ChunkMesh {
        let MeshBuilder { vertices, indices } = self;
        let mut hasher = Hasher::new();
        hasher.update(bytemuck::cast_slice(&vertices));
        hasher.update(bytemuck::cast_slice(&indices));
        ChunkMesh {
            vertices,
            indices,
            hash: MeshHash(*hasher.finalize().as_bytes()),
        }
    }
}
